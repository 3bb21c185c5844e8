//! Star-schema warehouse generation engine.
//!
//! Population runs in three phases. Phase 1 fills the independent
//! dimensions concurrently (product, customer, branch, time) and builds the
//! [`TimeIndex`]; phase 2 fills channel, order status and employee; phase 3
//! fills the facts from the key pools of the first two. Every table is
//! written through a [`BatchWriter`] in its own transaction.

pub mod batch;
pub mod context;
pub mod dimensions;
pub mod engine;
pub mod errors;
pub mod facts;
pub mod model;
pub mod sampler;
pub mod store;
pub mod time_index;

pub use batch::{BatchStats, BatchWriter, InsertStatement, build_insert, rows_per_batch};
pub use engine::{GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use facts::DimensionPools;
pub use model::{GenerationReport, TableReport};
pub use store::{MemoryStore, MemoryTable, PgStore, Store, StoreTransaction};
pub use time_index::{TimeIndex, TimeIndexError};
