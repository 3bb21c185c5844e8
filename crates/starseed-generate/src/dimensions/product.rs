use std::time::Instant;

use rand::Rng;
use tracing::info;

use starseed_core::{DimensionKeyPool, Value};

use crate::context::{PopulateContext, Populated, pick};
use crate::errors::GenerationError;
use crate::model::TableReport;
use crate::store::Store;

pub const TABLE: &str = "dim_product";

pub const COLUMNS: &[&str] = &[
    "product_key",
    "sku",
    "product_name",
    "category",
    "subcategory",
    "brand",
    "product_line",
    "is_active",
];

const CATEGORIES: &[&str] = &["Fresh", "Processed", "Seafood", "Cold Cuts"];
const SUBCATEGORIES: &[&str] = &["Premium", "Standard", "Value"];
const BRANDS: &[&str] = &["DelCaribe", "FrescoMar", "Carnes Selectas", "Tradicion"];

pub async fn populate<S: Store>(
    ctx: &PopulateContext<'_, S>,
) -> Result<Populated, GenerationError> {
    let started = Instant::now();
    let count = ctx.config.products;
    info!(table = TABLE, rows = count, "populating dimension");

    let mut rng = ctx.rng(TABLE);
    let mut writer = ctx.writer(TABLE, COLUMNS).await?;
    let mut pool = DimensionKeyPool::with_capacity(TABLE, count);

    for idx in 0..count {
        let key = idx as i64 + 1;
        // categories rotate so each gets an equal share
        let category = CATEGORIES[idx % CATEGORIES.len()];
        writer
            .add(vec![
                Value::Int(key),
                Value::Text(format!("SKU-{key:06}")),
                Value::Text(format!("{category} product {key}")),
                Value::from(category),
                Value::from(pick(SUBCATEGORIES, &mut rng)),
                Value::from(pick(BRANDS, &mut rng)),
                Value::from("Main Line"),
                Value::Bool(rng.random_bool(0.8)),
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
