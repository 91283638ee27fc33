//! Sampling-based ("random shooting") model predictive control
//!
//! Each call to `predict` tries four fixed seed commands followed by `tries`
//! uniformly drawn ones. Every candidate is held constant for `horizon`
//! steps of the motion model on a private copy of the state; the rollout is
//! scored by the lowest cost it reaches at any step. The best command wins,
//! with a preference for commands whose rollout reaches the next waypoint.
//!
//! Rollouts share nothing, so candidates can be evaluated in any order or in
//! parallel. Selection itself is sequential over the candidate order.

use log::{debug, trace};
use rand::Rng;

use crate::common::{Command, CostFunction, MotionModel, MpcError, MpcResult, Track, VehicleState};
use crate::path_tracking::cost::ManhattanCost;
use crate::path_tracking::point_mass::PointMassModel;
use crate::utils::random_in_range;

/// Commands always evaluated first, in this order
pub const SEED_COMMANDS: [Command; 4] = [
    Command { acceleration: -5.0, steering: 0.0 },
    Command { acceleration: 5.0, steering: 0.0 },
    Command { acceleration: 1.0, steering: -1.0 },
    Command { acceleration: 1.0, steering: 1.0 },
];

/// How a rollout that reaches the next waypoint is preferred during selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressTieBreak {
    /// The best candidate's progress flag follows every replacement, so an
    /// advancing candidate is only displaced by a strictly cheaper one.
    Tracked,
    /// The best candidate's progress flag is never updated and stays `false`:
    /// every advancing candidate replaces the current best regardless of cost.
    Legacy,
}

/// Configuration for the sampling controller
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingMpcConfig {
    /// Steps per rollout
    pub horizon: usize,
    /// Random candidates drawn after the seed commands
    pub tries: usize,
    /// Bounds of the uniformly drawn acceleration
    pub accel_range: (f64, f64),
    /// Bounds of the uniformly drawn steering
    pub steer_range: (f64, f64),
    pub tie_break: ProgressTieBreak,
}

impl Default for SamplingMpcConfig {
    fn default() -> Self {
        Self {
            horizon: 15,
            tries: 25,
            accel_range: (-5.0, 5.0),
            steer_range: (-0.5, 0.5),
            tie_break: ProgressTieBreak::Tracked,
        }
    }
}

impl SamplingMpcConfig {
    pub fn new(horizon: usize, tries: usize) -> MpcResult<Self> {
        let config = Self { horizon, tries, ..Default::default() };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MpcResult<()> {
        if self.horizon == 0 {
            return Err(MpcError::InvalidConfiguration("horizon must be positive".to_string()));
        }
        check_range("accel_range", self.accel_range)?;
        check_range("steer_range", self.steer_range)?;
        Ok(())
    }
}

fn check_range(name: &str, (min, max): (f64, f64)) -> MpcResult<()> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(MpcError::InvalidConfiguration(format!(
            "{} must be a finite range with min <= max, got ({}, {})", name, min, max
        )));
    }
    Ok(())
}

/// Outcome of holding one command for the whole horizon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rollout {
    pub command: Command,
    /// Lowest cost reached at any step of the rollout
    pub cost: f64,
    /// Whether the rollout ended on a different waypoint than it started on
    pub advanced: bool,
}

/// Command chosen for one tick together with its diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub command: Command,
    pub cost: f64,
    pub advanced: bool,
}

impl Default for Prediction {
    /// Sentinel before any candidate is seen
    fn default() -> Self {
        Self { command: Command::zero(), cost: f64::INFINITY, advanced: false }
    }
}

/// Random-shooting controller over a motion model and a cost function
#[derive(Debug, Clone)]
pub struct SamplingMpc<M = PointMassModel, C = ManhattanCost> {
    config: SamplingMpcConfig,
    model: M,
    cost_fn: C,
}

impl<M: MotionModel> SamplingMpc<M, ManhattanCost> {
    /// Create a controller scoring rollouts with the Manhattan cost
    pub fn new(config: SamplingMpcConfig, model: M) -> MpcResult<Self> {
        Self::with_cost_function(config, model, ManhattanCost)
    }
}

impl<M: MotionModel, C: CostFunction> SamplingMpc<M, C> {
    pub fn with_cost_function(config: SamplingMpcConfig, model: M, cost_fn: C) -> MpcResult<Self> {
        config.validate()?;
        Ok(Self { config, model, cost_fn })
    }

    pub fn config(&self) -> &SamplingMpcConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Seed commands followed by `tries` random draws, in evaluation order
    pub fn candidates<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Command> {
        let (accel_min, accel_max) = self.config.accel_range;
        let (steer_min, steer_max) = self.config.steer_range;

        let mut candidates = Vec::with_capacity(SEED_COMMANDS.len() + self.config.tries);
        candidates.extend_from_slice(&SEED_COMMANDS);
        for _ in 0..self.config.tries {
            let acceleration = random_in_range(rng, accel_min, accel_max);
            let steering = random_in_range(rng, steer_min, steer_max);
            candidates.push(Command::new(acceleration, steering));
        }
        candidates
    }

    /// Hold `command` for `horizon` steps starting from a copy of `state`
    pub fn rollout(&self, state: &VehicleState, command: Command, track: &Track) -> MpcResult<Rollout> {
        let mut working = *state;
        let start_index = working.path_index;
        let mut cost = f64::INFINITY;

        for _ in 0..self.config.horizon {
            working = self.model.advance(&working, &command, track)?;
            cost = cost.min(self.cost_fn.cost(&working, track)?);
        }

        let advanced = working.path_index != start_index;
        trace!("rollout {} cost {:.3} advanced {}", command, cost, advanced);
        Ok(Rollout { command, cost, advanced })
    }

    /// Pick the best rollout, visiting them in candidate order
    pub fn select<I>(&self, rollouts: I) -> Prediction
    where
        I: IntoIterator<Item = Rollout>,
    {
        let mut best = Prediction::default();
        for rollout in rollouts {
            if rollout.cost < best.cost || (rollout.advanced && !best.advanced) {
                best.command = rollout.command;
                best.cost = rollout.cost;
                if self.config.tie_break == ProgressTieBreak::Tracked {
                    best.advanced = rollout.advanced;
                }
            }
        }
        best
    }

    /// Choose the command to apply for this tick.
    ///
    /// `state` and `track` are only read; the random draws come from `rng`,
    /// so a seeded generator makes the choice reproducible.
    pub fn predict<R: Rng + ?Sized>(&self, state: &VehicleState, track: &Track, rng: &mut R)
        -> MpcResult<Prediction> {
        track.target(state.path_index)?;

        let rollouts = self
            .candidates(rng)
            .into_iter()
            .map(|command| self.rollout(state, command, track))
            .collect::<MpcResult<Vec<_>>>()?;

        let best = self.select(rollouts);
        debug!("best {} cost {:.3} advanced {}", best.command, best.cost, best.advanced);
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Point2D;
    use crate::path_tracking::point_mass::VehicleConfig;
    use crate::path_tracking::track::TrackPreset;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn controller(config: SamplingMpcConfig) -> SamplingMpc {
        let model = PointMassModel::new(VehicleConfig::default()).unwrap();
        SamplingMpc::new(config, model).unwrap()
    }

    fn rollout(cost: f64, advanced: bool, acceleration: f64) -> Rollout {
        Rollout { command: Command::new(acceleration, 0.0), cost, advanced }
    }

    /// Scores a rollout by how fast the vehicle goes, ignoring the track
    struct SpeedCost;

    impl CostFunction for SpeedCost {
        fn cost(&self, state: &VehicleState, _track: &Track) -> MpcResult<f64> {
            Ok(state.speed)
        }
    }

    fn speed_controller(tie_break: ProgressTieBreak) -> SamplingMpc<PointMassModel, SpeedCost> {
        let config = SamplingMpcConfig { tries: 0, tie_break, ..Default::default() };
        let model = PointMassModel::new(VehicleConfig::default()).unwrap();
        SamplingMpc::with_cost_function(config, model, SpeedCost).unwrap()
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let result = SamplingMpcConfig::new(0, 25);
        assert!(matches!(result, Err(MpcError::InvalidConfiguration(_))));

        let config = SamplingMpcConfig { horizon: 0, ..Default::default() };
        let model = PointMassModel::new(VehicleConfig::default()).unwrap();
        assert!(matches!(SamplingMpc::new(config, model), Err(MpcError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let config = SamplingMpcConfig { steer_range: (0.5, -0.5), ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_candidates_order_and_bounds() {
        let mpc = controller(SamplingMpcConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        let candidates = mpc.candidates(&mut rng);

        assert_eq!(candidates.len(), 4 + 25);
        assert_eq!(&candidates[..4], &SEED_COMMANDS[..]);
        for c in &candidates[4..] {
            assert!(c.acceleration >= -5.0 && c.acceleration <= 5.0);
            assert!(c.steering >= -0.5 && c.steering <= 0.5);
        }
    }

    #[test]
    fn test_rollout_uses_minimum_cost() {
        // drives straight through the target and out the other side
        let track = Track::new(vec![Point2D::new(150.0, 100.0)]).unwrap();
        let mpc = controller(SamplingMpcConfig { horizon: 15, ..Default::default() });
        let state = VehicleState::new(100.0, 100.0, 35.0, 0.0, 0);
        let result = mpc.rollout(&state, Command::zero(), &track).unwrap();

        // the final position is x = 152.5 but x = 149.0 and x = 152.5 are
        // 1.0 and 2.5 away, so the minimum is 1.0
        assert!((result.cost - 1.0).abs() < 1e-9);
        // single-waypoint track wraps back onto itself
        assert!(!result.advanced);
    }

    #[test]
    fn test_rollout_detects_advance() {
        let track = TrackPreset::Acceleration.build().unwrap();
        let mpc = controller(SamplingMpcConfig::default());
        // 70 short of waypoint 2 at x = 170, moving at full speed
        let state = VehicleState::new(100.0, 175.0, 35.0, 0.0, 2);
        let result = mpc.rollout(&state, Command::new(5.0, 0.0), &track).unwrap();
        assert!(result.advanced);
    }

    #[test]
    fn test_select_prefers_lower_cost() {
        let mpc = controller(SamplingMpcConfig::default());
        let best = mpc.select(vec![rollout(10.0, false, 1.0), rollout(5.0, false, 2.0), rollout(7.0, false, 3.0)]);
        assert_eq!(best.command.acceleration, 2.0);
        assert_eq!(best.cost, 5.0);
    }

    #[test]
    fn test_select_first_wins_ties() {
        let mpc = controller(SamplingMpcConfig::default());
        let best = mpc.select(vec![rollout(5.0, false, 1.0), rollout(5.0, false, 2.0)]);
        assert_eq!(best.command.acceleration, 1.0);
    }

    #[test]
    fn test_select_prefers_progress() {
        let mpc = controller(SamplingMpcConfig::default());
        let best = mpc.select(vec![rollout(5.0, false, 1.0), rollout(50.0, true, 2.0)]);
        assert_eq!(best.command.acceleration, 2.0);
        assert!(best.advanced);
    }

    #[test]
    fn test_select_tracked_tie_break() {
        let mpc = controller(SamplingMpcConfig::default());
        // once an advancing rollout is best, a costlier advancing one does not replace it
        let best = mpc.select(vec![rollout(20.0, true, 1.0), rollout(30.0, true, 2.0)]);
        assert_eq!(best.command.acceleration, 1.0);
        assert!(best.advanced);
    }

    #[test]
    fn test_select_legacy_tie_break() {
        let config = SamplingMpcConfig { tie_break: ProgressTieBreak::Legacy, ..Default::default() };
        let mpc = controller(config);
        // the progress flag never sticks, so the later advancing rollout wins
        let best = mpc.select(vec![rollout(20.0, true, 1.0), rollout(30.0, true, 2.0)]);
        assert_eq!(best.command.acceleration, 2.0);
        assert_eq!(best.cost, 30.0);
        assert!(!best.advanced);
    }

    #[test]
    fn test_select_empty_returns_default() {
        let mpc = controller(SamplingMpcConfig::default());
        let best = mpc.select(Vec::new());
        assert_eq!(best.command, Command::zero());
        assert!(best.cost.is_infinite());
    }

    #[test]
    fn test_predict_does_not_mutate_inputs() {
        let mpc = controller(SamplingMpcConfig::default());
        let track = TrackPreset::Ring.build().unwrap();
        let state = TrackPreset::Ring.initial_state();
        let track_before = track.clone();
        let state_before = state;

        let mut rng = StdRng::seed_from_u64(3);
        let prediction = mpc.predict(&state, &track, &mut rng).unwrap();

        assert_eq!(state, state_before);
        assert_eq!(track, track_before);
        assert!(prediction.cost.is_finite());
        assert!(prediction.cost >= 0.0);
    }

    #[test]
    fn test_predict_is_deterministic_for_seed() {
        let mpc = controller(SamplingMpcConfig::default());
        let track = TrackPreset::Ring.build().unwrap();
        let state = VehicleState::new(300.0, 200.0, 12.0, 0.7, 4);

        let a = mpc.predict(&state, &track, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = mpc.predict(&state, &track, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_predict_rejects_dangling_index() {
        let mpc = controller(SamplingMpcConfig::default());
        let track = TrackPreset::Ring.build().unwrap();
        let state = VehicleState::new(100.0, 100.0, 0.0, 0.0, 20);
        let result = mpc.predict(&state, &track, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(MpcError::InvalidTrack(_))));
    }

    #[test]
    fn test_predict_without_random_tries() {
        let config = SamplingMpcConfig { tries: 0, ..Default::default() };
        let mpc = controller(config);
        let track = TrackPreset::Acceleration.build().unwrap();
        let state = TrackPreset::Acceleration.initial_state();
        let prediction = mpc.predict(&state, &track, &mut StdRng::seed_from_u64(0)).unwrap();
        // target is straight ahead, full throttle gets closest
        assert_eq!(prediction.command, SEED_COMMANDS[1]);
    }

    #[test]
    fn test_predict_prefers_advancing_command() {
        // waypoint 0 is 89 ahead; at top speed full throttle covers 52.5 in
        // 15 steps and ends 36.5 away, braking covers 47.25 and ends 41.75 away
        let track = Track::new(vec![Point2D::new(189.0, 100.0), Point2D::new(400.0, 100.0)]).unwrap();
        let state = VehicleState::new(100.0, 100.0, 35.0, 0.0, 0);

        for &tie_break in &[ProgressTieBreak::Tracked, ProgressTieBreak::Legacy] {
            let mpc = speed_controller(tie_break);

            let braking = mpc.rollout(&state, SEED_COMMANDS[0], &track).unwrap();
            let throttle = mpc.rollout(&state, SEED_COMMANDS[1], &track).unwrap();
            assert!(!braking.advanced);
            assert!(throttle.advanced);
            assert!(braking.cost < throttle.cost);

            let prediction = mpc.predict(&state, &track, &mut StdRng::seed_from_u64(0)).unwrap();
            assert_eq!(prediction.command, SEED_COMMANDS[1], "{:?}", tie_break);
            assert_eq!(prediction.cost, 35.0);
            assert_eq!(prediction.advanced, tie_break == ProgressTieBreak::Tracked);
        }
    }

    #[test]
    fn test_predict_propagates_divergence() {
        let mpc = controller(SamplingMpcConfig::default());
        let track = TrackPreset::Ring.build().unwrap();
        // finite, but the first Euler step overflows x
        let state = VehicleState::new(f64::MAX, 100.0, f64::MAX, 0.0, 0);
        let result = mpc.predict(&state, &track, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(MpcError::NumericDivergence(_))));
    }

    #[test]
    fn test_predict_with_huge_steering_range() {
        let config = SamplingMpcConfig { steer_range: (-1e18, 1e18), ..Default::default() };
        let mpc = controller(config);
        let track = TrackPreset::Ring.build().unwrap();
        let state = TrackPreset::Ring.initial_state();
        let prediction = mpc.predict(&state, &track, &mut StdRng::seed_from_u64(4)).unwrap();
        assert!(prediction.cost.is_finite());
    }
}
