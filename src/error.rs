//! Error types shared across the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while writing annotations or classes to storage.
///
/// These never reach interaction code directly: the background sink logs
/// them and counts failures.
#[derive(Error, Debug)]
pub enum PersistError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image name that would escape the annotations directory
    #[error("Invalid image name: {name:?}")]
    InvalidImageName {
        /// The rejected name
        name: String,
    },
}

impl PersistError {
    pub fn invalid_image_name(name: impl Into<String>) -> Self {
        Self::InvalidImageName { name: name.into() }
    }
}

/// Errors raised while decoding an image.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Decoder error from the image crate
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// URL that cannot be resolved to a local file
    #[error("Unsupported image URL: {0}")]
    UnsupportedUrl(String),

    /// Failed to start the decoder thread
    #[error("Failed to spawn decoder thread: {0}")]
    Spawn(std::io::Error),

    /// Decoder thread is no longer running
    #[error("Decoder thread is not running")]
    WorkerGone,
}

/// Errors raised while opening a project directory.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON file
    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        /// File that failed to parse
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// Project root does not exist or is not a directory
    #[error("Not a project directory: {path:?}")]
    NotADirectory {
        /// The rejected path
        path: PathBuf,
    },

    /// Image referenced by name is not part of the project
    #[error("Image not found in project: {name}")]
    ImageNotFound {
        /// Requested image name
        name: String,
    },
}

impl ProjectError {
    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::NotADirectory { path: path.into() }
    }

    pub fn image_not_found(name: impl Into<String>) -> Self {
        Self::ImageNotFound { name: name.into() }
    }
}

/// Result alias for project operations.
pub type ProjectResult<T> = Result<T, ProjectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PersistError::invalid_image_name("../x.png");
        assert_eq!(err.to_string(), "Invalid image name: \"../x.png\"");

        let err = ProjectError::image_not_found("a.png");
        assert_eq!(err.to_string(), "Image not found in project: a.png");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PersistError = io.into();
        assert!(matches!(err, PersistError::Io(_)));
    }
}
