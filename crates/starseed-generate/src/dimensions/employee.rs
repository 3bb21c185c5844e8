//! Employee dimension.
//!
//! The store assigns `employee_key` on insert, so keys are collected in a
//! second step: commit, then read back every key in ascending order. The
//! resulting pool follows the store's assignment order, not generation
//! order.

use std::time::Instant;

use fake::Fake;
use fake::faker::name::raw::Name;
use fake::locales::EN;
use rand::Rng;
use tracing::info;

use starseed_core::{DimensionKeyPool, Value};

use crate::context::{PopulateContext, Populated, pick, random_past_date};
use crate::errors::GenerationError;
use crate::model::TableReport;
use crate::store::Store;

pub const TABLE: &str = "dim_employee";

pub const KEY_COLUMN: &str = "employee_key";

/// Inserted columns; the key column is left to the store.
pub const COLUMNS: &[&str] = &[
    "employee_code",
    "employee_name",
    "role",
    "department",
    "branch_key",
    "hired_on",
    "is_active",
];

const ROLES: &[&str] = &["Sales Associate", "Cashier", "Courier", "Manager", "Supervisor"];
const DEPARTMENTS: &[&str] = &["Sales", "Operations", "Administration", "Logistics"];

pub async fn populate<S: Store>(
    ctx: &PopulateContext<'_, S>,
    branches: &DimensionKeyPool,
) -> Result<Populated, GenerationError> {
    let started = Instant::now();
    let count = ctx.config.employees;
    info!(
        table = TABLE,
        rows = count,
        branches = branches.len(),
        "populating dimension"
    );

    let mut rng = ctx.rng(TABLE);
    let mut writer = ctx.writer(TABLE, COLUMNS).await?;

    for idx in 0..count {
        let branch_key = branches.sample(&mut rng).ok_or_else(|| {
            GenerationError::Configuration(format!("{TABLE} needs a non-empty branch pool"))
        })?;
        let name: String = Name(EN).fake_with_rng(&mut rng);
        writer
            .add(vec![
                Value::Text(format!("EMP-{:05}", idx + 1)),
                Value::Text(name),
                Value::from(pick(ROLES, &mut rng)),
                Value::from(pick(DEPARTMENTS, &mut rng)),
                Value::Int(branch_key),
                Value::Date(random_past_date(ctx.anchor, 10, &mut rng)),
                Value::Bool(rng.random_bool(0.92)),
            ])
            .await?;
    }

    let stats = writer.commit().await?;

    let keys = ctx
        .store
        .fetch_keys(TABLE, KEY_COLUMN)
        .await
        .map_err(|source| GenerationError::Write {
            table: TABLE,
            source,
        })?;
    let pool = DimensionKeyPool::from_keys(TABLE, keys);

    let mut report = TableReport::new(TABLE, 2, count as u64);
    report.record_batches(stats);
    report.duration_ms = started.elapsed().as_millis() as u64;
    info!(
        table = TABLE,
        rows = report.rows_written,
        keys_read_back = pool.len(),
        "dimension populated"
    );

    Ok(Populated { pool, report })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use starseed_core::GenerationConfig;

    use super::*;
    use crate::store::MemoryStore;

    fn config(employees: usize) -> GenerationConfig {
        GenerationConfig {
            employees,
            ..GenerationConfig::default()
        }
    }

    #[tokio::test]
    async fn keys_are_read_back_from_the_store() {
        let store = MemoryStore::for_warehouse();
        let config = config(7);
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 31).expect("date");
        let ctx = PopulateContext::new(&store, &config, 1, anchor);
        let branches = DimensionKeyPool::from_keys("dim_branch", vec![10, 20, 30]);

        let populated = populate(&ctx, &branches).await.expect("populate");
        assert_eq!(populated.pool.keys(), &[1, 2, 3, 4, 5, 6, 7]);

        let table = store.table(TABLE).expect("employees written");
        for value in table.column("branch_key") {
            let key = value.as_i64().expect("integer key");
            assert!(branches.contains(key));
        }
    }

    #[tokio::test]
    async fn empty_branch_pool_is_rejected() {
        let store = MemoryStore::for_warehouse();
        let config = config(3);
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 31).expect("date");
        let ctx = PopulateContext::new(&store, &config, 1, anchor);
        let branches = DimensionKeyPool::with_capacity("dim_branch", 0);

        let err = populate(&ctx, &branches).await.expect_err("no branches");
        assert!(matches!(err, GenerationError::Configuration(_)));
        assert!(store.table(TABLE).is_none());
    }
}
