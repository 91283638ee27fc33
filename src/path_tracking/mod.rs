// Path tracking with sampling-based predictive control

pub mod track;
pub mod cost;
pub mod point_mass;
pub mod sampling_mpc;
pub mod simulation;

pub use track::*;
pub use cost::*;
pub use point_mass::*;
pub use sampling_mpc::*;
pub use simulation::*;
