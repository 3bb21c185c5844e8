//! Core contracts shared by the starseed crates.
//!
//! Holds the generation configuration, the cell value type written to the
//! warehouse, dimension key pools, and the store-level error type.

pub mod config;
pub mod error;
pub mod pool;
pub mod redaction;
pub mod value;

pub use config::{ConfigError, GenerationConfig, load_config};
pub use error::{StoreError, StoreResult};
pub use pool::DimensionKeyPool;
pub use redaction::{RedactedConnection, redact_connection_string};
pub use value::Value;

/// Maximum number of bound parameters accepted by the reference target in a
/// single statement.
pub const DEFAULT_PARAMETER_CEILING: usize = 2_100;
