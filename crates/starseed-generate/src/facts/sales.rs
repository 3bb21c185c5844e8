use std::time::Instant;

use chrono::Days;
use rand::Rng;
use tracing::info;

use starseed_core::Value;

use super::{DateResolver, DimensionPools, sample_key};
use crate::context::PopulateContext;
use crate::errors::GenerationError;
use crate::model::TableReport;
use crate::sampler::{COST_SKEW_EXPONENT, sample_skewed};
use crate::store::Store;
use crate::time_index::TimeIndex;

pub const TABLE: &str = "fact_sales";

pub const COLUMNS: &[&str] = &[
    "order_number",
    "sale_time_key",
    "order_time_key",
    "delivery_time_key",
    "product_key",
    "customer_key",
    "branch_key",
    "employee_key",
    "channel_key",
    "order_status_key",
    "quantity",
    "unit_price",
    "unit_cost",
    "unit_discount",
];

pub const MIN_UNIT_COST: f64 = 30.0;
pub const MAX_UNIT_COST: f64 = 150.0;

const PROGRESS_EVERY: usize = 100_000;

pub async fn populate<S: Store>(
    ctx: &PopulateContext<'_, S>,
    pools: &DimensionPools,
    index: &TimeIndex,
) -> Result<TableReport, GenerationError> {
    let started = Instant::now();
    let count = ctx.config.sales_rows;
    info!(table = TABLE, rows = count, "populating fact");

    let start = ctx.years_back(ctx.config.time_window_years)?;
    let span = (ctx.anchor - start).num_days().max(0) as u64;

    let mut rng = ctx.rng(TABLE);
    let mut writer = ctx.writer(TABLE, COLUMNS).await?;
    let mut resolver = DateResolver::new(index);
    let mut revenue = 0.0_f64;

    for idx in 0..count {
        let sale_date = start + Days::new(rng.random_range(0..=span));
        let order_date = sale_date
            .checked_sub_days(Days::new(rng.random_range(0..3)))
            .unwrap_or(sale_date);
        let delivery_date = sale_date
            .checked_add_days(Days::new(rng.random_range(1..=5)))
            .unwrap_or(sale_date);

        let Some(sale_key) = resolver.primary(&sale_date) else {
            continue;
        };
        let order_key = resolver.secondary(&order_date, sale_key);
        let delivery_key = resolver.secondary(&delivery_date, sale_key);

        let unit_cost = sample_skewed(&mut rng, MIN_UNIT_COST, MAX_UNIT_COST, COST_SKEW_EXPONENT);
        let margin = 1.2 + rng.random::<f64>() * 0.8;
        let unit_price = unit_cost * margin;
        let unit_discount = unit_price * rng.random::<f64>() * 0.15;
        let quantity: i64 = rng.random_range(1..=20);
        revenue += (unit_price - unit_discount) * quantity as f64;

        writer
            .add(vec![
                Value::Text(format!("ORD-{:08}", idx + 1)),
                Value::Int(sale_key),
                Value::Int(order_key),
                Value::Int(delivery_key),
                Value::Int(sample_key(&pools.products, &mut rng)?),
                Value::Int(sample_key(&pools.customers, &mut rng)?),
                Value::Int(sample_key(&pools.branches, &mut rng)?),
                Value::Int(sample_key(&pools.employees, &mut rng)?),
                Value::Int(sample_key(&pools.channels, &mut rng)?),
                Value::Int(sample_key(&pools.statuses, &mut rng)?),
                Value::Int(quantity),
                Value::Float(unit_price),
                Value::Float(unit_cost),
                Value::Float(unit_discount),
            ])
            .await?;

        if (idx + 1) % PROGRESS_EVERY == 0 {
            info!(
                table = TABLE,
                rows = idx + 1,
                percent = (idx + 1) as f64 / count as f64 * 100.0,
                "progress"
            );
        }
    }

    let stats = writer.commit().await?;
    let mut report = TableReport::new(TABLE, 3, count as u64);
    report.record_batches(stats);
    report.rows_dropped = resolver.dropped;
    report.date_fallbacks = resolver.fallbacks;
    report.duration_ms = started.elapsed().as_millis() as u64;
    info!(
        table = TABLE,
        rows = report.rows_written,
        dropped = report.rows_dropped,
        fallbacks = report.date_fallbacks,
        revenue_millions = revenue / 1_000_000.0,
        "fact populated"
    );

    Ok(report)
}
