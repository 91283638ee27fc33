//! Point-mass vehicle model
//!
//! Forward Euler over a fixed time step. After integration the state is
//! bounded: position wraps toroidally into the domain, speed is clamped to
//! `[0, max_speed]` and yaw is normalized into `(-pi, pi]`. Waypoint progress
//! is evaluated last, on the bounded position.

use nalgebra::Vector2;

use crate::common::{Command, MotionModel, MpcError, MpcResult, Point2D, Track, VehicleState};
use crate::path_tracking::track::CAPTURE_RADIUS_SQ;
use crate::utils::{normalize_angle, wrap_into};

/// Configuration of the point-mass model and its bounding domain
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleConfig {
    /// Integration step [s]
    pub dt: f64,
    pub max_speed: f64,
    /// Wrap domain is `[0, domain_width) x [0, domain_height)`
    pub domain_width: f64,
    pub domain_height: f64,
    /// Squared distance below which the current waypoint counts as reached
    pub capture_radius_sq: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            max_speed: 35.0,
            domain_width: 800.0,
            domain_height: 350.0,
            capture_radius_sq: CAPTURE_RADIUS_SQ,
        }
    }
}

impl VehicleConfig {
    pub fn validate(&self) -> MpcResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(MpcError::InvalidConfiguration(format!("dt must be positive, got {}", self.dt)));
        }
        if !(self.max_speed.is_finite() && self.max_speed >= 0.0) {
            return Err(MpcError::InvalidConfiguration(format!(
                "max_speed must be non-negative, got {}", self.max_speed
            )));
        }
        if !(self.domain_width.is_finite() && self.domain_width > 0.0)
            || !(self.domain_height.is_finite() && self.domain_height > 0.0)
        {
            return Err(MpcError::InvalidConfiguration(format!(
                "domain must be positive, got {} x {}", self.domain_width, self.domain_height
            )));
        }
        if !(self.capture_radius_sq.is_finite() && self.capture_radius_sq > 0.0) {
            return Err(MpcError::InvalidConfiguration(format!(
                "capture_radius_sq must be positive, got {}", self.capture_radius_sq
            )));
        }
        Ok(())
    }
}

/// Point-mass dynamics with the bounds policy applied after every step
#[derive(Debug, Clone)]
pub struct PointMassModel {
    config: VehicleConfig,
}

impl PointMassModel {
    pub fn new(config: VehicleConfig) -> MpcResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    /// Kinematics only, no bounds
    fn integrate(&self, state: &VehicleState, command: &Command) -> VehicleState {
        let dt = self.config.dt;
        let velocity = Vector2::new(state.yaw.cos(), state.yaw.sin()) * state.speed;
        let position = Point2D::from(state.position().to_vector() + velocity * dt);

        VehicleState {
            x: position.x,
            y: position.y,
            yaw: state.yaw + command.steering * dt,
            speed: state.speed + command.acceleration * dt,
            path_index: state.path_index,
        }
    }

    /// Wrap position, clamp speed, normalize yaw. `state` must be finite.
    pub fn apply_bounds(&self, state: &VehicleState) -> VehicleState {
        VehicleState {
            x: wrap_into(state.x, self.config.domain_width),
            y: wrap_into(state.y, self.config.domain_height),
            speed: state.speed.clamp(0.0, self.config.max_speed),
            yaw: normalize_angle(state.yaw),
            path_index: state.path_index,
        }
    }
}

impl MotionModel for PointMassModel {
    fn advance(&self, state: &VehicleState, command: &Command, track: &Track)
        -> MpcResult<VehicleState> {
        // reject a dangling index before doing any work
        track.target(state.path_index)?;

        let integrated = self.integrate(state, command);
        if !integrated.is_finite() {
            return Err(MpcError::NumericDivergence(format!(
                "non-finite state x={} y={} speed={} yaw={} under {:?}",
                integrated.x, integrated.y, integrated.speed, integrated.yaw, command
            )));
        }

        let mut next = self.apply_bounds(&integrated);
        next.path_index = track.progress(&next, self.config.capture_radius_sq)?;
        Ok(next)
    }

    fn dt(&self) -> f64 {
        self.config.dt
    }
}
