//! Monthly traffic and conversion per digital channel.
//!
//! Session volume grows with the month's position in the window rather
//! than being resampled around a flat mean.

use std::time::Instant;

use chrono::{Datelike, Months};
use rand::Rng;
use tracing::{debug, info};

use starseed_core::{DimensionKeyPool, Value};

use super::DateResolver;
use crate::context::PopulateContext;
use crate::errors::GenerationError;
use crate::model::TableReport;
use crate::sampler::traffic_growth_factor;
use crate::store::Store;
use crate::time_index::TimeIndex;

pub const TABLE: &str = "fact_web_metrics";

pub const COLUMNS: &[&str] = &[
    "time_key",
    "channel_key",
    "sessions",
    "unique_users",
    "conversions",
    "conversion_rate",
    "digital_revenue",
];

pub async fn populate<S: Store>(
    ctx: &PopulateContext<'_, S>,
    digital_channels: &DimensionKeyPool,
    index: &TimeIndex,
) -> Result<TableReport, GenerationError> {
    let started = Instant::now();
    let months = ctx.config.web_metrics_months;
    let requested = months as u64 * digital_channels.len() as u64;
    info!(
        table = TABLE,
        months,
        channels = digital_channels.len(),
        "populating fact"
    );

    let start = ctx.months_back(months)?;
    let mut rng = ctx.rng(TABLE);
    let mut writer = ctx.writer(TABLE, COLUMNS).await?;
    let mut resolver = DateResolver::new(index);

    for month in 0..months {
        let first_of_month = start
            .checked_add_months(Months::new(month))
            .and_then(|date| date.with_day(1));
        let Some(time_key) = first_of_month.and_then(|date| index.get(&date)) else {
            debug!(table = TABLE, month, "first of month outside time window");
            resolver.drop_rows(digital_channels.len() as u64);
            continue;
        };
        let growth = traffic_growth_factor(month, months);

        for &channel_key in digital_channels.keys() {
            let sessions = (rng.random_range(2_000.0..7_000.0) * growth).round() as i64;
            let unique_users = (sessions as f64 * rng.random_range(0.60..0.80)).round() as i64;
            let conversion = rng.random_range(0.02..0.08);
            let conversions = (sessions as f64 * conversion).round() as i64;
            let conversion_rate = if sessions > 0 {
                conversions as f64 / sessions as f64 * 100.0
            } else {
                0.0
            };
            let ticket = rng.random_range(20.0..200.0);

            writer
                .add(vec![
                    Value::Int(time_key),
                    Value::Int(channel_key),
                    Value::Int(sessions),
                    Value::Int(unique_users),
                    Value::Int(conversions),
                    Value::Float(conversion_rate),
                    Value::Float(conversions as f64 * ticket),
                ])
                .await?;
        }
    }

    let stats = writer.commit().await?;
    let mut report = TableReport::new(TABLE, 3, requested);
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
