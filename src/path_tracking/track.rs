//! Track presets and the capture zone constants
//!
//! A vehicle chases `track[path_index]` and moves on to the next waypoint
//! once it enters the capture zone around it.

use std::fmt;
use std::str::FromStr;

use crate::common::{MpcError, MpcResult, Point2D, Track, VehicleState};

/// Squared capture radius around the current waypoint
pub const CAPTURE_RADIUS_SQ: f64 = 1500.0;

/// Number of waypoints the presets are sampled with
pub const PRESET_WAYPOINTS: usize = 20;

/// Track presets selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackPreset {
    /// Ellipse centered at (400, 175) with radii (300, 150)
    Ring,
    /// Straight line of length 700 starting at (100, 175)
    Acceleration,
}

impl TrackPreset {
    pub fn build(&self) -> MpcResult<Track> {
        match self {
            TrackPreset::Ring => {
                Track::ring(Point2D::new(400.0, 175.0), 300.0, 150.0, PRESET_WAYPOINTS)
            }
            TrackPreset::Acceleration => {
                Track::straight(Point2D::new(100.0, 175.0), 700.0, PRESET_WAYPOINTS)
            }
        }
    }

    /// Reset state of an episode on this preset
    pub fn initial_state(&self) -> VehicleState {
        let state = VehicleState::new(75.0, 75.0, 0.0, 0.0, 15);
        match self {
            TrackPreset::Ring => state,
            TrackPreset::Acceleration => VehicleState { x: 100.0, y: 175.0, ..state },
        }
    }
}

impl FromStr for TrackPreset {
    type Err = MpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ring" => Ok(TrackPreset::Ring),
            "acceleration" => Ok(TrackPreset::Acceleration),
            other => Err(MpcError::InvalidTrack(format!("unknown track preset `{}`", other))),
        }
    }
}

impl fmt::Display for TrackPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackPreset::Ring => write!(f, "ring"),
            TrackPreset::Acceleration => write!(f, "acceleration"),
        }
    }
}
