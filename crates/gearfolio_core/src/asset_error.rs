//! Asset error types

use std::fmt;
use std::io;

/// Error type for asset loading and caching
#[derive(Debug)]
pub enum AssetError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// The file was read but its contents are invalid
    Parse(String),
    /// No asset is cached under the given handle or path
    NotFound(String),
    /// The file is valid but contains nothing drawable
    Empty(String),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Io(err) => write!(f, "Asset IO error: {}", err),
            AssetError::Parse(msg) => write!(f, "Asset parse error: {}", msg),
            AssetError::NotFound(path) => write!(f, "Asset not found: {}", path),
            AssetError::Empty(path) => write!(f, "Asset has no geometry: {}", path),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AssetError {
    fn from(err: io::Error) -> Self {
        AssetError::Io(err)
    }
}

impl From<gltf::Error> for AssetError {
    fn from(err: gltf::Error) -> Self {
        match err {
            gltf::Error::Io(e) => AssetError::Io(e),
            other => AssetError::Parse(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_messages() {
        let io = AssetError::Io(io::Error::new(io::ErrorKind::NotFound, "file missing"));
        assert!(io.to_string().contains("IO error"));
        assert!(io.to_string().contains("file missing"));
        assert!(AssetError::Parse("bad header".into()).to_string().contains("bad header"));
        assert!(AssetError::Empty("a.glb".into()).to_string().contains("no geometry"));
    }

    #[test]
    fn test_from_io_error_keeps_kind() {
        let err: AssetError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        match err {
            AssetError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("Expected Io variant, got {:?}", other),
        }
    }

    #[test]
    fn test_error_source() {
        let io = AssetError::Io(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(io.source().is_some());
        assert!(AssetError::NotFound("x".into()).source().is_none());
    }
}
