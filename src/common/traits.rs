//! Traits at the seams between the dynamics, the cost and the controller

use crate::common::error::MpcResult;
use crate::common::types::{Command, Track, VehicleState};

/// Trait for vehicle motion models
pub trait MotionModel {
    /// Propagate `state` forward by one fixed time step under `command`.
    ///
    /// Path progress along `track` is part of the step, so the returned
    /// state carries the updated waypoint index.
    fn advance(&self, state: &VehicleState, command: &Command, track: &Track)
        -> MpcResult<VehicleState>;

    /// Fixed integration step [s]
    fn dt(&self) -> f64;
}

/// Trait for scoring a state against its current target on the track.
/// Lower is better.
pub trait CostFunction {
    fn cost(&self, state: &VehicleState, track: &Track) -> MpcResult<f64>;
}
