use std::time::Instant;

use rand::Rng;
use tracing::info;

use starseed_core::{DimensionKeyPool, Value};

use super::{CITIES, REGION};
use crate::context::{PopulateContext, Populated, pick};
use crate::errors::GenerationError;
use crate::model::TableReport;
use crate::store::Store;

pub const TABLE: &str = "dim_branch";

pub const COLUMNS: &[&str] = &[
    "branch_key",
    "branch_code",
    "branch_name",
    "address",
    "city",
    "region",
    "branch_type",
    "is_active",
];

const BRANCH_TYPES: &[&str] = &["Store", "Supermarket", "Wholesale"];

pub async fn populate<S: Store>(
    ctx: &PopulateContext<'_, S>,
) -> Result<Populated, GenerationError> {
    let started = Instant::now();
    let count = ctx.config.branches;
    info!(table = TABLE, rows = count, "populating dimension");

    let mut rng = ctx.rng(TABLE);
    let mut writer = ctx.writer(TABLE, COLUMNS).await?;
    let mut pool = DimensionKeyPool::with_capacity(TABLE, count);

    for idx in 0..count {
        let key = idx as i64 + 1;
        let city = CITIES[idx % CITIES.len()];
        let ordinal = idx / CITIES.len() + 1;
        let address = format!(
            "Calle {} #{}-{}",
            rng.random_range(1..=100),
            rng.random_range(1..=50),
            rng.random_range(1..=100)
        );
        writer
            .add(vec![
                Value::Int(key),
                Value::Text(format!("BR-{key:03}")),
                Value::Text(format!("{city} Branch {ordinal}")),
                Value::Text(address),
                Value::from(city),
                Value::from(REGION),
                Value::from(pick(BRANCH_TYPES, &mut rng)),
                Value::Bool(true),
            ])
            .await?;
        pool.push(key);
    }

    let stats = writer.commit().await?;
    let mut report = TableReport::new(TABLE, 1, count as u64);
    report.record_batches(stats);
    report.duration_ms = started.elapsed().as_millis() as u64;
    info!(table = TABLE, rows = report.rows_written, "dimension populated");

    Ok(Populated { pool, report })
}
