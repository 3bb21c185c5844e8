use std::time::Instant;

use fake::Fake;
use fake::faker::name::raw::Name;
use fake::locales::EN;
use rand::Rng;
use tracing::info;

use starseed_core::{DimensionKeyPool, Value};

use super::{CITIES, REGION};
use crate::context::{PopulateContext, Populated, pick, pick_weighted, random_past_date};
use crate::errors::GenerationError;
use crate::model::TableReport;
use crate::store::Store;

pub const TABLE: &str = "dim_customer";

pub const COLUMNS: &[&str] = &[
    "customer_key",
    "customer_code",
    "customer_name",
    "customer_type",
    "segment",
    "city",
    "region",
    "registered_on",
    "is_active",
];

const CUSTOMER_TYPES: &[&str] = &["Retail", "Wholesale", "Corporate"];

/// Segment A is the top 20% of customers by value.
pub const SEGMENTS: &[(&str, f64)] = &[("A", 0.2), ("B", 0.3), ("C", 0.5)];

pub async fn populate<S: Store>(
    ctx: &PopulateContext<'_, S>,
) -> Result<Populated, GenerationError> {
    let started = Instant::now();
    let count = ctx.config.customers;
    info!(table = TABLE, rows = count, "populating dimension");

    let mut rng = ctx.rng(TABLE);
    let mut writer = ctx.writer(TABLE, COLUMNS).await?;
    let mut pool = DimensionKeyPool::with_capacity(TABLE, count);

    for idx in 0..count {
        let key = idx as i64 + 1;
        let name: String = Name(EN).fake_with_rng(&mut rng);
        writer
            .add(vec![
                Value::Int(key),
                Value::Text(format!("CUS-{key:06}")),
                Value::Text(name),
                Value::from(pick(CUSTOMER_TYPES, &mut rng)),
                Value::from(pick_weighted(SEGMENTS, &mut rng)),
                Value::from(pick(CITIES, &mut rng)),
                Value::from(REGION),
                Value::Date(random_past_date(ctx.anchor, 5, &mut rng)),
                Value::Bool(rng.random_bool(0.95)),
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
