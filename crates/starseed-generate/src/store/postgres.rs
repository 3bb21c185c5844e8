use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use starseed_core::{StoreError, StoreResult, Value};

use super::{Store, StoreTransaction};
use crate::batch::InsertStatement;

/// Store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Store for PgStore {
    type Transaction = PgTransaction;

    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn begin(&self) -> StoreResult<PgTransaction> {
        let tx = self.pool.begin().await.map_err(db_error)?;
        Ok(PgTransaction { tx })
    }

    async fn fetch_keys(&self, table: &str, key_column: &str) -> StoreResult<Vec<i64>> {
        let sql = format!("select {key_column} from {table} order by {key_column}");
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)
    }
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn execute(&mut self, statement: &InsertStatement) -> StoreResult<u64> {
        let mut query = sqlx::query(&statement.sql);
        for value in &statement.params {
            query = match value {
                Value::Bool(value) => query.bind(*value),
                Value::Int(value) => query.bind(*value),
                Value::Float(value) => query.bind(*value),
                Value::Text(value) => query.bind(value.as_str()),
                Value::Date(value) => query.bind(*value),
            };
        }
        let result = query.execute(&mut *self.tx).await.map_err(db_error)?;
        Ok(result.rows_affected())
    }

    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(db_error)
    }

    async fn rollback(self) -> StoreResult<()> {
        self.tx.rollback().await.map_err(db_error)
    }
}

fn db_error(err: sqlx::Error) -> StoreError {
    StoreError::Db(err.to_string())
}
