//! Store boundary: transactional bulk inserts plus key read-back.

use async_trait::async_trait;

use starseed_core::StoreResult;

use crate::batch::InsertStatement;

mod memory;
mod postgres;

pub use memory::{MemoryStore, MemoryTable, MemoryTransaction};
pub use postgres::{PgStore, PgTransaction};

/// A relational target the generator writes into.
#[async_trait]
pub trait Store: Send + Sync {
    type Transaction: StoreTransaction;

    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    async fn begin(&self) -> StoreResult<Self::Transaction>;

    /// Every value of `key_column` in `table`, ascending.
    async fn fetch_keys(&self, table: &str, key_column: &str) -> StoreResult<Vec<i64>>;
}

/// One populator's transaction scope.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Execute one insert, returning the number of rows affected.
    async fn execute(&mut self, statement: &InsertStatement) -> StoreResult<u64>;

    async fn commit(self) -> StoreResult<()>;

    async fn rollback(self) -> StoreResult<()>;
}
