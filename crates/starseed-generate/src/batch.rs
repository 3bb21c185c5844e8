//! Bounded multi-row inserts.
//!
//! A [`BatchWriter`] owns one table's transaction and packs rows into
//! `INSERT ... VALUES (...), (...)` statements whose bound parameter count
//! stays strictly below the configured ceiling.

use tracing::{debug, warn};

use starseed_core::{StoreError, Value};

use crate::errors::GenerationError;
use crate::store::StoreTransaction;

/// One multi-row insert with its bound values in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub rows: usize,
    pub sql: String,
    pub params: Vec<Value>,
}

impl InsertStatement {
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// Build an insert where every value gets its own `$n` placeholder,
/// numbered row-major from 1.
pub fn build_insert(
    table: &'static str,
    columns: &'static [&'static str],
    rows: Vec<Vec<Value>>,
) -> InsertStatement {
    let width = columns.len();
    let mut groups = Vec::with_capacity(rows.len());
    let mut params = Vec::with_capacity(rows.len() * width);

    for (row_idx, row) in rows.into_iter().enumerate() {
        let placeholders: Vec<String> = (0..row.len())
            .map(|col_idx| format!("${}", row_idx * width + col_idx + 1))
            .collect();
        groups.push(format!("({})", placeholders.join(",")));
        params.extend(row);
    }

    let sql = format!(
        "INSERT INTO {table} ({}) VALUES {}",
        columns.join(","),
        groups.join(",")
    );

    InsertStatement {
        table,
        columns,
        rows: groups.len(),
        sql,
        params,
    }
}

/// Largest row count `b` with `b <= batch_size` and `b * columns < ceiling`.
pub fn rows_per_batch(
    columns: usize,
    batch_size: usize,
    ceiling: usize,
) -> Result<usize, GenerationError> {
    if columns == 0 {
        return Err(GenerationError::Configuration(
            "insert needs at least one column".to_string(),
        ));
    }
    let by_ceiling = ceiling.saturating_sub(1) / columns;
    let rows = batch_size.min(by_ceiling);
    if rows == 0 {
        return Err(GenerationError::Configuration(format!(
            "parameter ceiling {ceiling} cannot fit one row of {columns} columns"
        )));
    }
    Ok(rows)
}

/// Counters for a finished writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub rows_written: u64,
    pub batches: u64,
    pub max_params: usize,
}

pub struct BatchWriter<T: StoreTransaction> {
    tx: Option<T>,
    table: &'static str,
    columns: &'static [&'static str],
    max_rows: usize,
    pending: Vec<Vec<Value>>,
    stats: BatchStats,
}

impl<T: StoreTransaction> BatchWriter<T> {
    pub fn new(
        tx: T,
        table: &'static str,
        columns: &'static [&'static str],
        batch_size: usize,
        ceiling: usize,
    ) -> Result<Self, GenerationError> {
        let max_rows = rows_per_batch(columns.len(), batch_size, ceiling)?;
        Ok(Self {
            tx: Some(tx),
            table,
            columns,
            max_rows,
            pending: Vec::with_capacity(max_rows),
            stats: BatchStats::default(),
        })
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    pub fn pending_rows(&self) -> usize {
        self.pending.len()
    }

    /// Queue a row, flushing first if the batch is full.
    pub async fn add(&mut self, row: Vec<Value>) -> Result<(), GenerationError> {
        if row.len() != self.columns.len() {
            return Err(GenerationError::Configuration(format!(
                "{}: row has {} values for {} columns",
                self.table,
                row.len(),
                self.columns.len()
            )));
        }
        if self.pending.len() >= self.max_rows {
            self.flush().await?;
        }
        self.pending.push(row);
        Ok(())
    }

    /// Execute pending rows as one statement. A failed execute rolls the
    /// transaction back and the writer cannot be used again.
    pub async fn flush(&mut self) -> Result<(), GenerationError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let rows = std::mem::replace(&mut self.pending, Vec::with_capacity(self.max_rows));
        let statement = build_insert(self.table, self.columns, rows);

        let executed = match self.tx.as_mut() {
            Some(tx) => tx.execute(&statement).await,
            None => Err(StoreError::Closed),
        };
        if let Err(source) = executed {
            self.abort().await;
            return Err(self.write_error(source));
        }

        self.stats.rows_written += statement.rows as u64;
        self.stats.batches += 1;
        self.stats.max_params = self.stats.max_params.max(statement.param_count());
        debug!(
            table = self.table,
            rows = statement.rows,
            params = statement.param_count(),
            "batch flushed"
        );
        Ok(())
    }

    /// Flush the final partial batch and commit.
    pub async fn commit(mut self) -> Result<BatchStats, GenerationError> {
        self.flush().await?;
        let Some(tx) = self.tx.take() else {
            return Err(self.write_error(StoreError::Closed));
        };
        tx.commit()
            .await
            .map_err(|source| self.write_error(source))?;
        Ok(self.stats)
    }

    async fn abort(&mut self) {
        if let Some(tx) = self.tx.take()
            && let Err(err) = tx.rollback().await
        {
            warn!(table = self.table, error = %err, "rollback failed");
        }
    }

    fn write_error(&self, source: StoreError) -> GenerationError {
        GenerationError::Write {
            table: self.table,
            source,
        }
    }
}
