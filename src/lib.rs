//! sampling_mpc - sampling-based predictive control of a point-mass vehicle
//!
//! This crate drives a point-mass vehicle around a cyclic waypoint track.
//! Every tick a random-shooting controller rolls candidate commands forward
//! under the vehicle model, scores them against the current waypoint and
//! applies the best one.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod path_tracking;

// Re-export common types for convenience
pub use common::{Point2D, VehicleState, Command, Track};
pub use common::{MotionModel, CostFunction};
pub use common::{MpcError, MpcResult};
pub use path_tracking::{TrackPreset, PointMassModel, VehicleConfig};
pub use path_tracking::{SamplingMpc, SamplingMpcConfig, ProgressTieBreak, Prediction};
pub use path_tracking::{Simulation, TickReport};
