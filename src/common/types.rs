//! Common types used throughout sampling_mpc

use std::f64::consts::PI;
use std::fmt;

use itertools::Itertools;
use nalgebra::Vector2;

use crate::common::error::{MpcError, MpcResult};
use crate::utils::fmt_signed;

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(&self, other: &Point2D) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    /// L1 distance, `|dx| + |dy|`
    pub fn manhattan_distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// Kinematic state of the point-mass vehicle.
///
/// `path_index` is the index of the waypoint currently being chased on the
/// track. The state is `Copy`, so every rollout works on its own value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VehicleState {
    pub x: f64,
    pub y: f64,
    /// Forward speed, kept within `[0, max_speed]`
    pub speed: f64,
    /// Heading [rad], kept within `(-pi, pi]`
    pub yaw: f64,
    pub path_index: usize,
}

impl VehicleState {
    pub fn new(x: f64, y: f64, speed: f64, yaw: f64, path_index: usize) -> Self {
        Self { x, y, speed, yaw, path_index }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.speed.is_finite() && self.yaw.is_finite()
    }
}

impl fmt::Display for VehicleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x: {} y: {} speed: {} yaw: {} waypoint: {}",
            fmt_signed(self.x),
            fmt_signed(self.y),
            fmt_signed(self.speed),
            fmt_signed(self.yaw),
            self.path_index
        )
    }
}

/// Control command applied for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Command {
    pub acceleration: f64,
    pub steering: f64,
}

impl Command {
    pub fn new(acceleration: f64, steering: f64) -> Self {
        Self { acceleration, steering }
    }

    pub fn zero() -> Self {
        Self { acceleration: 0.0, steering: 0.0 }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "acceleration: {} steering: {}",
            fmt_signed(self.acceleration),
            fmt_signed(self.steering)
        )
    }
}

/// Ordered, cyclic sequence of waypoints. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    waypoints: Vec<Point2D>,
}

impl Track {
    pub fn new(waypoints: Vec<Point2D>) -> MpcResult<Self> {
        if waypoints.is_empty() {
            return Err(MpcError::InvalidTrack("track has no waypoints".to_string()));
        }
        if waypoints.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(MpcError::InvalidTrack("waypoint is not finite".to_string()));
        }
        Ok(Self { waypoints })
    }

    pub fn from_xy(x: &[f64], y: &[f64]) -> MpcResult<Self> {
        if x.len() != y.len() {
            return Err(MpcError::InvalidTrack(format!(
                "coordinate length mismatch: {} x vs {} y", x.len(), y.len()
            )));
        }
        Self::new(x.iter().zip(y.iter()).map(|(&x, &y)| Point2D::new(x, y)).collect())
    }

    /// Ellipse of `n` waypoints around `center`, counter-clockwise from angle 0
    pub fn ring(center: Point2D, radius_x: f64, radius_y: f64, n: usize) -> MpcResult<Self> {
        let waypoints = (0..n)
            .map(|i| {
                let v = i as f64 / n as f64 * PI * 2.0;
                Point2D::new(center.x + v.cos() * radius_x, center.y + v.sin() * radius_y)
            })
            .collect();
        Self::new(waypoints)
    }

    /// `n` evenly spaced waypoints along +x, `start.x + length * i / n`
    pub fn straight(start: Point2D, length: f64, n: usize) -> MpcResult<Self> {
        let waypoints = (0..n)
            .map(|i| Point2D::new(start.x + length * i as f64 / n as f64, start.y))
            .collect();
        Self::new(waypoints)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false for a constructed track
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoints(&self) -> &[Point2D] {
        &self.waypoints
    }

    /// Waypoint at `index`, which must be a valid index into the track
    pub fn target(&self, index: usize) -> MpcResult<Point2D> {
        self.waypoints.get(index).copied().ok_or_else(|| {
            MpcError::InvalidTrack(format!(
                "waypoint index {} out of range for track of length {}",
                index,
                self.waypoints.len()
            ))
        })
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.waypoints.len()
    }

    /// True when `state` lies strictly inside the capture zone of its target
    pub fn should_advance(&self, state: &VehicleState, capture_radius_sq: f64) -> MpcResult<bool> {
        let target = self.target(state.path_index)?;
        Ok(state.position().distance_squared(&target) < capture_radius_sq)
    }

    /// Waypoint index after a dynamics step ended in `state`
    pub fn progress(&self, state: &VehicleState, capture_radius_sq: f64) -> MpcResult<usize> {
        if self.should_advance(state, capture_radius_sq)? {
            Ok(self.next_index(state.path_index))
        } else {
            Ok(state.path_index)
        }
    }

    /// Length of the closed polyline, last waypoint joined back to the first
    pub fn total_length(&self) -> f64 {
        if self.waypoints.len() < 2 {
            return 0.0;
        }
        self.waypoints
            .iter()
            .circular_tuple_windows()
            .map(|(a, b)| a.distance(b))
            .sum()
    }
}
