use thiserror::Error;

use starseed_core::{ConfigError, StoreError};

use crate::time_index::TimeIndexError;

/// Fatal errors emitted by the generation engine.
///
/// Date lookups that miss the time index are not errors: populators resolve
/// them locally and count them in the report.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("write to {table} failed: {source}")]
    Write {
        table: &'static str,
        #[source]
        source: StoreError,
    },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    TimeIndex(#[from] TimeIndexError),
}

impl From<ConfigError> for GenerationError {
    fn from(value: ConfigError) -> Self {
        GenerationError::Configuration(value.to_string())
    }
}
