//! Window management system
//!
//! Handles window creation, fullscreen toggle, and title updates. The
//! title doubles as the viewer's placeholder display.

use std::sync::Arc;
use winit::{
    event_loop::ActiveEventLoop,
    window::{Fullscreen, Window},
};
use crate::config::WindowConfig;

/// What the title bar reports besides the base title
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TitleStatus<'a> {
    /// Viewer placeholder ("Loading model…" / "Model unavailable")
    pub placeholder: Option<&'a str>,
    /// The viewer is open with a model shown
    pub viewer_open: bool,
    /// The animation clock is stopped
    pub paused: bool,
    /// Frame time in milliseconds and instance count, when stats are enabled
    pub stats: Option<(f32, usize)>,
}

/// Build the window title
pub fn format_title(base: &str, status: &TitleStatus<'_>) -> String {
    let mut title = base.to_string();
    if let Some(text) = status.placeholder {
        title.push_str(" - ");
        title.push_str(text);
    } else if status.viewer_open {
        title.push_str(" - Project viewer [Esc to close]");
    }
    if status.paused {
        title.push_str(" [Paused]");
    }
    if let Some((frame_ms, instances)) = status.stats {
        title.push_str(&format!(" ({:.1} ms, {} instances)", frame_ms, instances));
    }
    title
}

/// Manages the application window
pub struct WindowSystem {
    window: Arc<Window>,
    base_title: String,
    last_title: String,
}

impl WindowSystem {
    /// Create window from config
    pub fn create(
        event_loop: &ActiveEventLoop,
        config: &WindowConfig,
    ) -> Result<Self, WindowError> {
        let mut attrs = Window::default_attributes()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.width,
                config.height,
            ));

        if config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| WindowError::CreationFailed(e.to_string()))?,
        );

        Ok(Self {
            window,
            base_title: config.title.clone(),
            last_title: config.title.clone(),
        })
    }

    /// Get window reference (for RenderContext creation)
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&self) {
        let new_fullscreen = if self.window.fullscreen().is_some() {
            None
        } else {
            Some(Fullscreen::Borderless(None))
        };
        self.window.set_fullscreen(new_fullscreen);
    }

    /// Update window title, skipping the call when nothing changed
    pub fn update_title(&mut self, status: &TitleStatus<'_>) {
        let title = format_title(&self.base_title, status);
        if title != self.last_title {
            self.window.set_title(&title);
            self.last_title = title;
        }
    }

    /// Request a redraw
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

#[derive(Debug)]
pub enum WindowError {
    CreationFailed(String),
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::CreationFailed(msg) => write!(f, "Window creation failed: {}", msg),
        }
    }
}

impl std::error::Error for WindowError {}

#[cfg(test)]
mod tests {
    use super::*;
    use gearfolio_core::{LOADING_TEXT, UNAVAILABLE_TEXT};

    #[test]
    fn test_plain_title() {
        assert_eq!(format_title("Gearfolio", &TitleStatus::default()), "Gearfolio");
    }

    #[test]
    fn test_placeholder_in_title() {
        let status = TitleStatus {
            placeholder: Some(LOADING_TEXT),
            viewer_open: true,
            ..Default::default()
        };
        assert_eq!(format_title("Gearfolio", &status), "Gearfolio - Loading model…");

        let status = TitleStatus {
            placeholder: Some(UNAVAILABLE_TEXT),
            viewer_open: true,
            ..Default::default()
        };
        assert!(format_title("Gearfolio", &status).ends_with("Model unavailable"));
    }

    #[test]
    fn test_viewer_paused_and_stats() {
        let status = TitleStatus {
            placeholder: None,
            viewer_open: true,
            paused: true,
            stats: Some((16.66, 513)),
        };
        assert_eq!(
            format_title("G", &status),
            "G - Project viewer [Esc to close] [Paused] (16.7 ms, 513 instances)"
        );
    }

    #[test]
    fn test_window_error_display() {
        let err = WindowError::CreationFailed("no display".to_string());
        assert_eq!(err.to_string(), "Window creation failed: no display");
    }
}
