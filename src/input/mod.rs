//! Input handling module
//!
//! Maps raw key events to application actions. Pointer orbiting is
//! handled by `gearfolio_input::OrbitController`.

mod input_mapper;

pub use input_mapper::{InputMapper, InputAction};
