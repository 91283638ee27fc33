//! Closed-loop simulation context
//!
//! Owns the authoritative vehicle state, the track, the controller and the
//! random source. Each `step` asks the controller for a command against the
//! current state and applies it once through the controller's own model.

use log::{debug, info, warn};
use rand::Rng;

use crate::common::{Command, MotionModel, MpcError, MpcResult, Track, VehicleState};
use crate::path_tracking::point_mass::{PointMassModel, VehicleConfig};
use crate::path_tracking::sampling_mpc::{SamplingMpc, SamplingMpcConfig};
use crate::path_tracking::track::TrackPreset;

/// What a tick exposes for display and diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Authoritative state after the tick
    pub state: VehicleState,
    /// Command applied during the tick
    pub command: Command,
    /// Best rollout cost found by the controller
    pub cost: f64,
    /// Whether the vehicle moved on to the next waypoint during the tick
    pub advanced: bool,
}

pub struct Simulation<R: Rng> {
    controller: SamplingMpc,
    track: Track,
    preset: Option<TrackPreset>,
    state: VehicleState,
    rng: R,
    paused: bool,
    ticks: u64,
}

impl<R: Rng> Simulation<R> {
    /// Start an episode on a preset track
    pub fn new(
        preset: TrackPreset,
        vehicle_config: VehicleConfig,
        mpc_config: SamplingMpcConfig,
        rng: R,
    ) -> MpcResult<Self> {
        let mut sim = Self::with_track(
            preset.build()?,
            preset.initial_state(),
            vehicle_config,
            mpc_config,
            rng,
        )?;
        sim.preset = Some(preset);
        info!("reset on {} track", preset);
        Ok(sim)
    }

    /// Start an episode on a caller-built track
    pub fn with_track(
        track: Track,
        initial_state: VehicleState,
        vehicle_config: VehicleConfig,
        mpc_config: SamplingMpcConfig,
        rng: R,
    ) -> MpcResult<Self> {
        let model = PointMassModel::new(vehicle_config)?;
        let controller = SamplingMpc::new(mpc_config, model)?;
        check_initial_state(&initial_state, &track)?;

        Ok(Self {
            controller,
            track,
            preset: None,
            state: initial_state,
            rng,
            paused: false,
            ticks: 0,
        })
    }

    /// Replace the track with `preset` and reset the vehicle onto it
    pub fn reset(&mut self, preset: TrackPreset) -> MpcResult<()> {
        self.track = preset.build()?;
        self.state = preset.initial_state();
        self.preset = Some(preset);
        self.ticks = 0;
        info!("reset on {} track", preset);
        Ok(())
    }

    /// Advance the episode by one tick.
    ///
    /// On error the authoritative state is left untouched; the caller
    /// decides whether to stop, reset or retry.
    pub fn step(&mut self) -> MpcResult<TickReport> {
        if self.paused {
            return Ok(TickReport {
                state: self.state,
                command: Command::zero(),
                cost: f64::INFINITY,
                advanced: false,
            });
        }

        match self.try_step() {
            Ok(report) => Ok(report),
            Err(e) => {
                warn!("tick {} failed: {}", self.ticks, e);
                Err(e)
            }
        }
    }

    fn try_step(&mut self) -> MpcResult<TickReport> {
        let prediction = self.controller.predict(&self.state, &self.track, &mut self.rng)?;
        let next = self.controller.model().advance(&self.state, &prediction.command, &self.track)?;

        let advanced = next.path_index != self.state.path_index;
        self.state = next;
        self.ticks += 1;

        if advanced {
            info!("tick {}: reached waypoint, now chasing {}", self.ticks, next.path_index);
        }
        debug!("tick {}: {} | {} | cost {:.2}", self.ticks, next, prediction.command, prediction.cost);

        Ok(TickReport { state: next, command: prediction.command, cost: prediction.cost, advanced })
    }

    /// Run up to `ticks` steps, collecting every report
    pub fn run(&mut self, ticks: usize) -> MpcResult<Vec<TickReport>> {
        (0..ticks).map(|_| self.step()).collect()
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Preset the current track was built from, `None` for a custom track
    pub fn preset(&self) -> Option<TrackPreset> {
        self.preset
    }

    pub fn controller(&self) -> &SamplingMpc {
        &self.controller
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Ticks applied since the last reset
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

fn check_initial_state(state: &VehicleState, track: &Track) -> MpcResult<()> {
    track.target(state.path_index)?;
    if !state.is_finite() {
        return Err(MpcError::NumericDivergence(format!("initial state is not finite: {:?}", state)));
    }
    Ok(())
}
