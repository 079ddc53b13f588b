//! Gearfolio - animated gear backdrop and project model viewer
//!
//! The binary wires these modules into a winit application; they are
//! exposed as a library for integration tests.

pub mod config;
pub mod input;
pub mod scene;
pub mod systems;
