use std::convert::Infallible;
use std::path::PathBuf;

use assetwatch_core::error::CoreError;

/// Errors raised by persistent providers and the configuration service.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Reading or writing the backing file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration map could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<Infallible> for StoreError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_error_is_transparent() {
        let err = StoreError::from(CoreError::Forbidden("nope".into()));
        assert_eq!(err.to_string(), "Forbidden: nope");
    }

    #[test]
    fn io_error_names_path() {
        let err = StoreError::Io {
            path: PathBuf::from("/tmp/configs.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "I/O error on /tmp/configs.json: denied");
    }
}
