use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use starseed_core::{StoreError, StoreResult, Value};

use super::{Store, StoreTransaction};
use crate::batch::InsertStatement;
use crate::dimensions::employee;

/// Committed contents of one in-memory table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl MemoryTable {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    /// Values of one column in insertion order.
    pub fn column(&self, column: &str) -> Vec<&Value> {
        match self.column_index(column) {
            Some(idx) => self.rows.iter().map(|row| &row[idx]).collect(),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: BTreeMap<String, MemoryTable>,
    identity_columns: BTreeMap<String, String>,
    failing_tables: BTreeSet<String>,
    max_params: BTreeMap<String, usize>,
}

/// In-memory store used for dry runs and tests.
///
/// Rows become visible on commit. Tables registered through
/// [`MemoryStore::with_identity`] get their key column assigned on commit,
/// the way an identity column would be.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the warehouse's auto-assigned key columns registered.
    pub fn for_warehouse() -> Self {
        Self::new().with_identity(employee::TABLE, employee::KEY_COLUMN)
    }

    pub fn with_identity(self, table: &str, key_column: &str) -> Self {
        self.lock()
            .identity_columns
            .insert(table.to_string(), key_column.to_string());
        self
    }

    /// Make every insert into `table` fail.
    pub fn fail_writes_to(&self, table: &str) {
        self.lock().failing_tables.insert(table.to_string());
    }

    pub fn table(&self, table: &str) -> Option<MemoryTable> {
        self.lock().tables.get(table).cloned()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.lock().tables.get(table).map_or(0, MemoryTable::len)
    }

    /// Largest parameter count seen in a single statement for `table`.
    pub fn max_params(&self, table: &str) -> usize {
        self.lock().max_params.get(table).copied().unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct MemoryTransaction {
    store: MemoryStore,
    staged: Vec<InsertStatement>,
}

#[async_trait]
impl Store for MemoryStore {
    type Transaction = MemoryTransaction;

    fn engine(&self) -> &'static str {
        "memory"
    }

    async fn begin(&self) -> StoreResult<MemoryTransaction> {
        Ok(MemoryTransaction {
            store: self.clone(),
            staged: Vec::new(),
        })
    }

    async fn fetch_keys(&self, table: &str, key_column: &str) -> StoreResult<Vec<i64>> {
        let state = self.lock();
        let Some(data) = state.tables.get(table) else {
            return Ok(Vec::new());
        };
        let mut keys: Vec<i64> = data
            .column(key_column)
            .into_iter()
            .filter_map(Value::as_i64)
            .collect();
        keys.sort_unstable();
        Ok(keys)
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn execute(&mut self, statement: &InsertStatement) -> StoreResult<u64> {
        let mut state = self.store.lock();
        if state.failing_tables.contains(statement.table) {
            return Err(StoreError::Rejected(format!(
                "writes to {} are disabled",
                statement.table
            )));
        }
        if statement.params.len() != statement.rows * statement.columns.len() {
            return Err(StoreError::Rejected(format!(
                "{} parameters for {} rows of {} columns",
                statement.params.len(),
                statement.rows,
                statement.columns.len()
            )));
        }
        let max = state
            .max_params
            .entry(statement.table.to_string())
            .or_insert(0);
        *max = (*max).max(statement.param_count());
        drop(state);

        self.staged.push(statement.clone());
        Ok(statement.rows as u64)
    }

    async fn commit(self) -> StoreResult<()> {
        let mut state = self.store.lock();
        for statement in self.staged {
            let identity = state.identity_columns.get(statement.table).cloned();
            let table = state
                .tables
                .entry(statement.table.to_string())
                .or_default();

            if table.columns.is_empty() {
                table.columns = identity.iter().cloned().collect();
                table
                    .columns
                    .extend(statement.columns.iter().map(|column| column.to_string()));
            }

            for chunk in statement.params.chunks(statement.columns.len()) {
                let mut row = Vec::with_capacity(table.columns.len());
                if identity.is_some() {
                    row.push(Value::Int(table.rows.len() as i64 + 1));
                }
                row.extend(chunk.iter().cloned());
                table.rows.push(row);
            }
        }
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::build_insert;

    const COLUMNS: &[&str] = &["code", "name"];

    fn statement(table: &'static str, rows: usize) -> InsertStatement {
        build_insert(
            table,
            COLUMNS,
            (0..rows)
                .map(|idx| vec![Value::Int(idx as i64), Value::from(format!("row {idx}"))])
                .collect(),
        )
    }

    #[tokio::test]
    async fn rows_visible_only_after_commit() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.expect("begin");
        tx.execute(&statement("dim_demo", 3)).await.expect("execute");
        assert_eq!(store.row_count("dim_demo"), 0);

        tx.commit().await.expect("commit");
        assert_eq!(store.row_count("dim_demo"), 3);
        assert_eq!(store.max_params("dim_demo"), 6);
    }

    #[tokio::test]
    async fn rollback_discards_staged_rows() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.expect("begin");
        tx.execute(&statement("dim_demo", 2)).await.expect("execute");
        tx.rollback().await.expect("rollback");
        assert!(store.table("dim_demo").is_none());
    }

    #[tokio::test]
    async fn identity_keys_assigned_on_commit() {
        let store = MemoryStore::new().with_identity("dim_demo", "demo_key");
        for rows in [2, 3] {
            let mut tx = store.begin().await.expect("begin");
            tx.execute(&statement("dim_demo", rows)).await.expect("execute");
            tx.commit().await.expect("commit");
        }

        let table = store.table("dim_demo").expect("table");
        assert_eq!(table.columns, vec!["demo_key", "code", "name"]);
        let keys = store.fetch_keys("dim_demo", "demo_key").await.expect("keys");
        assert_eq!(keys, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn failing_table_rejects_inserts() {
        let store = MemoryStore::new();
        store.fail_writes_to("dim_demo");
        let mut tx = store.begin().await.expect("begin");
        let err = tx
            .execute(&statement("dim_demo", 1))
            .await
            .expect_err("write should fail");
        assert!(matches!(err, StoreError::Rejected(_)));
    }
}
