//! Utility modules for sampling_mpc

pub mod math;
pub mod visualization;

pub use math::*;
pub use visualization::{TrackPlotter, colors};
