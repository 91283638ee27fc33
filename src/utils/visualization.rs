//! Visualization utilities for sampling_mpc
//!
//! Offline replacement for the live canvas: plots the track and the driven
//! trajectory with gnuplot.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{MpcError, MpcResult, Point2D, Track, VehicleState};

/// Color palette for consistent styling
pub mod colors {
    pub const TRACK: &str = "#FAC850";
    pub const TRAJECTORY: &str = "#C80000";
    pub const TARGET: &str = "#0000FF";
    pub const START: &str = "#00FF00";
}

/// Plot of one episode: the track, the trajectory and the final vehicle pose
pub struct TrackPlotter {
    title: String,
    track: Vec<Point2D>,
    trajectory: Vec<Point2D>,
    vehicle: Option<VehicleState>,
    target: Option<Point2D>,
    domain: Option<(f64, f64)>,
}

impl TrackPlotter {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            track: Vec::new(),
            trajectory: Vec::new(),
            vehicle: None,
            target: None,
            domain: None,
        }
    }

    /// Track is drawn closed, like the cyclic index it represents
    pub fn plot_track(&mut self, track: &Track) -> &mut Self {
        self.track = track.waypoints().to_vec();
        if let Some(first) = self.track.first().copied() {
            self.track.push(first);
        }
        self
    }

    pub fn plot_trajectory(&mut self, trajectory: &[Point2D]) -> &mut Self {
        self.trajectory = trajectory.to_vec();
        self
    }

    pub fn plot_vehicle(&mut self, state: &VehicleState) -> &mut Self {
        self.vehicle = Some(*state);
        self
    }

    /// Waypoint the vehicle is currently chasing
    pub fn plot_target(&mut self, target: Point2D) -> &mut Self {
        self.target = Some(target);
        self
    }

    /// Fix the axes to the wrap domain `[0, width) x [0, height)`
    pub fn set_domain(&mut self, width: f64, height: f64) -> &mut Self {
        self.domain = Some((width, height));
        self
    }

    /// Save plot to SVG file
    pub fn save_svg(&self, path: &str) -> MpcResult<()> {
        let mut fg = self.render();
        fg.save_to_svg(path, 800, 600)
            .map_err(|e| MpcError::VisualizationError(e.to_string()))
    }

    fn render(&self) -> Figure {
        let mut fg = Figure::new();
        {
            let axes = fg.axes2d()
                .set_title(&self.title, &[])
                .set_x_label("x", &[])
                .set_y_label("y", &[])
                .set_aspect_ratio(AutoOption::Fix(1.0));

            if let Some((width, height)) = self.domain {
                axes.set_x_range(AutoOption::Fix(0.0), AutoOption::Fix(width));
                axes.set_y_range(AutoOption::Fix(0.0), AutoOption::Fix(height));
            }

            let (tx, ty) = split_xy(&self.track);
            axes.lines(&tx, &ty, &[Caption("Track"), Color(colors::TRACK), LineWidth(2.0)]);

            let (px, py) = split_xy(&self.trajectory);
            axes.points(&px, &py, &[
                Caption("Trajectory"),
                Color(colors::TRAJECTORY),
                PointSymbol('.'),
                PointSize(0.5),
            ]);

            if let Some(start) = self.trajectory.first() {
                axes.points(&[start.x], &[start.y], &[
                    Caption("Start"),
                    Color(colors::START),
                    PointSymbol('O'),
                ]);
            }

            if let Some(target) = self.target {
                axes.points(&[target.x], &[target.y], &[
                    Caption("Target"),
                    Color(colors::TARGET),
                    PointSymbol('x'),
                    PointSize(2.0),
                ]);
            }

            if let Some(vehicle) = self.vehicle {
                // heading tick of the vehicle
                let end_x = vehicle.x + 20.0 * vehicle.yaw.cos();
                let end_y = vehicle.y + 20.0 * vehicle.yaw.sin();
                axes.lines(&[vehicle.x, end_x], &[vehicle.y, end_y], &[
                    Caption("Vehicle"),
                    Color(colors::TRAJECTORY),
                    LineWidth(3.0),
                ]);
            }
        }
        fg
    }
}

fn split_xy(points: &[Point2D]) -> (Vec<f64>, Vec<f64>) {
    points.iter().map(|p| (p.x, p.y)).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_plotter_closes_track() {
        let track = Track::new(vec![Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)]).unwrap();
        let mut plotter = TrackPlotter::new("test");
        plotter.plot_track(&track);
        assert_eq!(plotter.track.len(), 3);
        assert_eq!(plotter.track[0], plotter.track[2]);
    }

    #[test]
    fn test_track_plotter_keeps_target() {
        let mut plotter = TrackPlotter::new("test");
        assert!(plotter.target.is_none());
        plotter.plot_target(Point2D::new(400.0, 25.0));
        assert_eq!(plotter.target, Some(Point2D::new(400.0, 25.0)));
    }

    #[test]
    fn test_split_xy() {
        let (x, y) = split_xy(&[Point2D::new(1.0, 2.0), Point2D::new(3.0, 4.0)]);
        assert_eq!(x, vec![1.0, 3.0]);
        assert_eq!(y, vec![2.0, 4.0]);
    }
}
