use std::path::PathBuf;

/// Failures of the persistence backend.
///
/// The [`Storage`](crate::Storage) facade logs and absorbs these; they surface
/// only through the raw [`KeyValueStore`](crate::KeyValueStore) API and
/// settings validation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid value {value:?} for setting {key:?}")]
    InvalidSetting { key: String, value: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
