use std::time::Instant;

use tracing::info;

use starseed_core::{DimensionKeyPool, Value};

use crate::context::{PopulateContext, Populated};
use crate::errors::GenerationError;
use crate::model::TableReport;
use crate::store::Store;

pub const TABLE: &str = "dim_order_status";

pub const COLUMNS: &[&str] = &["status_key", "status_code", "description", "is_final"];

/// (code, description, terminal state)
const STATUSES: &[(&str, &str, bool)] = &[
    ("PEND", "Pending", false),
    ("CONF", "Confirmed", false),
    ("PREP", "In Preparation", false),
    ("SHIP", "Shipped", false),
    ("DELV", "Delivered", true),
    ("CANC", "Cancelled", true),
];

pub async fn populate<S: Store>(
    ctx: &PopulateContext<'_, S>,
) -> Result<Populated, GenerationError> {
    let started = Instant::now();
    info!(table = TABLE, rows = STATUSES.len(), "populating dimension");

    let mut writer = ctx.writer(TABLE, COLUMNS).await?;
    let mut pool = DimensionKeyPool::with_capacity(TABLE, STATUSES.len());

    for (idx, (code, description, is_final)) in STATUSES.iter().enumerate() {
        let key = idx as i64 + 1;
        writer
            .add(vec![
                Value::Int(key),
                Value::from(*code),
                Value::from(*description),
                Value::Bool(*is_final),
            ])
            .await?;
        pool.push(key);
    }

    let stats = writer.commit().await?;
    let mut report = TableReport::new(TABLE, 2, STATUSES.len() as u64);
    report.record_batches(stats);
    report.duration_ms = started.elapsed().as_millis() as u64;
    info!(table = TABLE, rows = report.rows_written, "dimension populated");

    Ok(Populated { pool, report })
}
