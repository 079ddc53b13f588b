//! Render error types

/// Errors raised while uploading or drawing
#[derive(Debug)]
pub enum RenderError {
    /// Surface was lost (window resized, minimized, etc.)
    SurfaceLost,
    /// GPU out of memory
    OutOfMemory,
    /// Depth texture not created yet
    DepthTextureMissing,
    /// A mesh without triangles cannot be uploaded
    EmptyMesh(String),
    /// More instances than the batch was created for
    CapacityExceeded {
        batch: String,
        capacity: usize,
        requested: usize,
    },
    /// Other surface error
    Other(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::SurfaceLost => write!(f, "Surface lost"),
            RenderError::OutOfMemory => write!(f, "Out of memory"),
            RenderError::DepthTextureMissing => write!(f, "Depth texture not created"),
            RenderError::EmptyMesh(label) => write!(f, "Mesh '{}' has no triangles", label),
            RenderError::CapacityExceeded { batch, capacity, requested } => write!(
                f,
                "Batch '{}' holds {} instances, got {}",
                batch, capacity, requested
            ),
            RenderError::Other(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(e: wgpu::SurfaceError) -> Self {
        match e {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => RenderError::SurfaceLost,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            other => RenderError::Other(format!("{:?}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_display() {
        assert_eq!(format!("{}", RenderError::SurfaceLost), "Surface lost");
        assert_eq!(format!("{}", RenderError::OutOfMemory), "Out of memory");
        assert_eq!(
            format!("{}", RenderError::Other("test".to_string())),
            "Render error: test"
        );
        let err = RenderError::CapacityExceeded {
            batch: "gears/0".to_string(),
            capacity: 2,
            requested: 3,
        };
        assert_eq!(format!("{}", err), "Batch 'gears/0' holds 2 instances, got 3");
    }

    #[test]
    fn test_from_surface_error() {
        assert!(matches!(RenderError::from(wgpu::SurfaceError::Lost), RenderError::SurfaceLost));
        assert!(matches!(RenderError::from(wgpu::SurfaceError::Outdated), RenderError::SurfaceLost));
        assert!(matches!(RenderError::from(wgpu::SurfaceError::Timeout), RenderError::Other(_)));
    }
}
