//! Input mapping from raw events to semantic actions
//!
//! Maps keyboard input to high-level actions like ToggleViewer, Exit, etc.
//! Orbit keys (arrows) are NOT mapped here - they go directly to the OrbitController.

use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Actions triggered by special keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Open or close the project viewer (V key)
    ToggleViewer,
    /// Close the project viewer (Escape while it is open)
    CloseViewer,
    /// Exit application (Escape while the viewer is closed)
    Exit,
    /// Toggle fullscreen mode (F key)
    ToggleFullscreen,
    /// Stop or resume the animation clock (P key)
    TogglePause,
    /// Reset camera to its starting position (R key)
    ResetCamera,
}

/// Maps raw input events to semantic actions
pub struct InputMapper;

impl InputMapper {
    /// Map keyboard input to an action
    ///
    /// Returns `Some(action)` for special keys, `None` for everything else
    pub fn map_keyboard(key: KeyCode, state: ElementState, viewer_open: bool) -> Option<InputAction> {
        // Only handle key presses, not releases
        if state != ElementState::Pressed {
            return None;
        }

        match key {
            KeyCode::Escape => {
                if viewer_open {
                    Some(InputAction::CloseViewer)
                } else {
                    Some(InputAction::Exit)
                }
            }
            KeyCode::KeyV => Some(InputAction::ToggleViewer),
            KeyCode::KeyF => Some(InputAction::ToggleFullscreen),
            KeyCode::KeyP => Some(InputAction::TogglePause),
            KeyCode::KeyR => Some(InputAction::ResetCamera),
            _ => None,
        }
    }
}
