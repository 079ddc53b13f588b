//! Pointer input for the backdrop camera
//!
//! This crate turns mouse drags and wheel motion into orbit camera
//! movement, and slowly spins the camera when the user leaves it alone.

mod orbit_controller;

pub use orbit_controller::{OrbitControl, OrbitController};
