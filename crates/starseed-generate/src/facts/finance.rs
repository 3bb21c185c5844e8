//! Monthly financial results, one row per branch per month.

use std::time::Instant;

use chrono::{Datelike, Months, NaiveDate};
use rand::Rng;
use tracing::{debug, info};

use starseed_core::{DimensionKeyPool, Value};

use super::DateResolver;
use crate::context::PopulateContext;
use crate::errors::GenerationError;
use crate::model::TableReport;
use crate::sampler::seasonal_revenue_factor;
use crate::store::Store;
use crate::time_index::TimeIndex;

pub const TABLE: &str = "fact_finance";

pub const COLUMNS: &[&str] = &[
    "time_key",
    "branch_key",
    "revenue",
    "costs",
    "operating_expenses",
    "gross_profit",
    "net_profit",
    "gross_margin_pct",
];

const OPERATING_EXPENSE_RATIO: f64 = 0.15;

pub async fn populate<S: Store>(
    ctx: &PopulateContext<'_, S>,
    branches: &DimensionKeyPool,
    index: &TimeIndex,
) -> Result<TableReport, GenerationError> {
    let started = Instant::now();
    let months = ctx.config.finance_years.saturating_mul(12);
    let requested = months as u64 * branches.len() as u64;
    info!(table = TABLE, months, branches = branches.len(), "populating fact");

    let start = ctx.years_back(ctx.config.finance_years)?;
    let mut rng = ctx.rng(TABLE);
    let mut writer = ctx.writer(TABLE, COLUMNS).await?;
    let mut resolver = DateResolver::new(index);

    for month in 0..months {
        let Some(period) = start.checked_add_months(Months::new(month)) else {
            resolver.drop_rows(branches.len() as u64);
            continue;
        };
        let Some(time_key) = month_key(index, period) else {
            debug!(table = TABLE, period = %period, "month outside time window");
            resolver.drop_rows(branches.len() as u64);
            continue;
        };
        let seasonal = seasonal_revenue_factor(period.month());

        for &branch_key in branches.keys() {
            let revenue = rng.random_range(500_000.0..1_000_000.0) * seasonal;
            let costs = revenue * rng.random_range(0.60..0.75);
            let operating_expenses = revenue * OPERATING_EXPENSE_RATIO;
            let gross_profit = revenue - costs;
            let net_profit = gross_profit - operating_expenses;
            let gross_margin_pct = gross_profit / revenue * 100.0;

            writer
                .add(vec![
                    Value::Int(time_key),
                    Value::Int(branch_key),
                    Value::Float(revenue),
                    Value::Float(costs),
                    Value::Float(operating_expenses),
                    Value::Float(gross_profit),
                    Value::Float(net_profit),
                    Value::Float(gross_margin_pct),
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

/// The period's own day, else the first of its month.
fn month_key(index: &TimeIndex, period: NaiveDate) -> Option<i64> {
    index
        .get(&period)
        .or_else(|| period.with_day(1).and_then(|first| index.get(&first)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_key_falls_back_to_first_of_month() {
        let index = TimeIndex::new();
        let first = NaiveDate::from_ymd_opt(2024, 2, 1).expect("date");
        index.put(&first, 32).expect("insert");

        let mid = NaiveDate::from_ymd_opt(2024, 2, 14).expect("date");
        assert_eq!(month_key(&index, mid), Some(32));

        index.put(&mid, 45).expect("insert");
        assert_eq!(month_key(&index, mid), Some(45));

        let outside = NaiveDate::from_ymd_opt(2023, 2, 14).expect("date");
        assert_eq!(month_key(&index, outside), None);
    }
}
