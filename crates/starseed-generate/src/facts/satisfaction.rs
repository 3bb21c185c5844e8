//! Customer satisfaction survey results.

use std::time::Instant;

use chrono::Days;
use rand::Rng;
use tracing::info;

use starseed_core::Value;

use super::{DateResolver, DimensionPools, sample_key};
use crate::context::PopulateContext;
use crate::errors::GenerationError;
use crate::model::TableReport;
use crate::sampler::sample_score;
use crate::store::Store;
use crate::time_index::TimeIndex;

pub const TABLE: &str = "fact_customer_satisfaction";

pub const COLUMNS: &[&str] = &[
    "time_key",
    "branch_key",
    "customer_key",
    "product_key",
    "service_score",
    "product_score",
    "overall_score",
    "would_recommend",
];

pub const SERVICE_MEAN: f64 = 8.0;
pub const SERVICE_STDDEV: f64 = 1.5;
pub const PRODUCT_MEAN: f64 = 7.5;
pub const PRODUCT_STDDEV: f64 = 1.8;

/// Overall score from which a respondent recommends the company.
pub const RECOMMEND_THRESHOLD: i64 = 7;

pub async fn populate<S: Store>(
    ctx: &PopulateContext<'_, S>,
    pools: &DimensionPools,
    index: &TimeIndex,
) -> Result<TableReport, GenerationError> {
    let started = Instant::now();
    let count = ctx.config.satisfaction_rows;
    info!(table = TABLE, rows = count, "populating fact");

    let start = ctx.years_back(ctx.config.satisfaction_years)?;
    let span = (ctx.anchor - start).num_days().max(0) as u64;

    let mut rng = ctx.rng(TABLE);
    let mut writer = ctx.writer(TABLE, COLUMNS).await?;
    let mut resolver = DateResolver::new(index);

    for _ in 0..count {
        let survey_date = start + Days::new(rng.random_range(0..=span));
        let Some(time_key) = resolver.primary(&survey_date) else {
            continue;
        };

        let service_score = sample_score(&mut rng, SERVICE_MEAN, SERVICE_STDDEV);
        let product_score = sample_score(&mut rng, PRODUCT_MEAN, PRODUCT_STDDEV);
        let overall_score = (service_score + product_score) / 2;

        writer
            .add(vec![
                Value::Int(time_key),
                Value::Int(sample_key(&pools.branches, &mut rng)?),
                Value::Int(sample_key(&pools.customers, &mut rng)?),
                Value::Int(sample_key(&pools.products, &mut rng)?),
                Value::Int(service_score),
                Value::Int(product_score),
                Value::Int(overall_score),
                Value::Bool(overall_score >= RECOMMEND_THRESHOLD),
            ])
            .await?;
    }

    let stats = writer.commit().await?;
    let mut report = TableReport::new(TABLE, 3, count as u64);
    report.record_batches(stats);
    report.rows_dropped = resolver.dropped;
    report.duration_ms = started.elapsed().as_millis() as u64;
    info!(
        table = TABLE,
        rows = report.rows_written,
        dropped = report.rows_dropped,
        "fact populated"
    );

    Ok(report)
}
