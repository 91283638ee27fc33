//! Rollout cost: Manhattan distance to the current target waypoint.
//!
//! Cheap and non-smooth. It rewards axis-aligned proximity only; heading
//! is not scored.

use crate::common::{CostFunction, MpcResult, Track, VehicleState};

/// `|target.x - x| + |target.y - y|` against `track[state.path_index]`
pub fn manhattan_cost(state: &VehicleState, track: &Track) -> MpcResult<f64> {
    let target = track.target(state.path_index)?;
    Ok(state.position().manhattan_distance(&target))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManhattanCost;

impl CostFunction for ManhattanCost {
    fn cost(&self, state: &VehicleState, track: &Track) -> MpcResult<f64> {
        manhattan_cost(state, track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{MpcError, Point2D};

    fn track() -> Track {
        Track::new(vec![Point2D::new(10.0, 20.0), Point2D::new(-5.0, 5.0)]).unwrap()
    }

    #[test]
    fn test_cost_is_manhattan_distance() {
        let state = VehicleState::new(13.0, 16.0, 0.0, 0.0, 0);
        assert!((manhattan_cost(&state, &track()).unwrap() - 7.0).abs() < 1e-10);

        let state = VehicleState::new(0.0, 0.0, 0.0, 0.0, 1);
        assert!((ManhattanCost.cost(&state, &track()).unwrap() - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_cost_zero_only_on_target() {
        let on_target = VehicleState::new(10.0, 20.0, 3.0, 1.0, 0);
        assert_eq!(manhattan_cost(&on_target, &track()).unwrap(), 0.0);

        let near = VehicleState::new(10.0, 20.001, 0.0, 0.0, 0);
        assert!(manhattan_cost(&near, &track()).unwrap() > 0.0);
    }

    #[test]
    fn test_cost_ignores_heading() {
        let a = VehicleState::new(0.0, 0.0, 0.0, 0.0, 0);
        let b = VehicleState::new(0.0, 0.0, 0.0, 2.0, 0);
        assert_eq!(manhattan_cost(&a, &track()).unwrap(), manhattan_cost(&b, &track()).unwrap());
    }

    #[test]
    fn test_cost_invalid_index() {
        let state = VehicleState::new(0.0, 0.0, 0.0, 0.0, 2);
        assert!(matches!(manhattan_cost(&state, &track()), Err(MpcError::InvalidTrack(_))));
    }
}
