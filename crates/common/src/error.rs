//! Error types shared across Reelforge crates.

use std::path::PathBuf;

/// Error raised while loading, saving or validating shared configuration.
#[derive(Debug, thiserror::Error)]
pub enum ReelforgeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ReelforgeError.
pub type ReelforgeResult<T> = Result<T, ReelforgeError>;

impl ReelforgeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_message() {
        let err = ReelforgeError::config("bad poll interval");
        assert_eq!(err.to_string(), "Configuration error: bad poll interval");
    }

    #[test]
    fn test_io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ReelforgeError = io.into();
        assert_eq!(err.to_string(), "gone");
    }

    #[test]
    fn test_json_error_converts() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ReelforgeError = parse.into();
        assert!(matches!(err, ReelforgeError::Json(_)));
    }
}
