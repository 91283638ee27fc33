//! Common types, traits, and error definitions for sampling_mpc
//!
//! This module provides the building blocks shared by the dynamics model,
//! the cost function and the sampling controller.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
