//! Application systems
//!
//! Modular systems extracted from main.rs for better organization and testability.

mod backdrop;
mod render;
mod viewer;
mod window;

pub use backdrop::{AnimationClock, BackdropSystem};
pub use render::RenderSystem;
pub use viewer::ViewerSystem;
pub use window::{format_title, TitleStatus, WindowError, WindowSystem};
