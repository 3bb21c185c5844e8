//! Calendar dimension: one row per day of the historical window.
//!
//! This is the only populator that also fills the [`TimeIndex`]; each day's
//! key is registered in the index under the same value that is written to
//! the table.

use std::time::Instant;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::info;

use starseed_core::{DimensionKeyPool, Value};

use crate::context::{PopulateContext, Populated};
use crate::errors::GenerationError;
use crate::model::TableReport;
use crate::store::Store;
use crate::time_index::TimeIndex;

pub const TABLE: &str = "dim_time";

pub const COLUMNS: &[&str] = &[
    "time_key",
    "full_date",
    "year",
    "semester",
    "quarter",
    "month",
    "month_name",
    "day",
    "weekday",
    "weekday_name",
    "iso_week",
    "is_weekend",
    "is_holiday",
    "quarter_label",
];

const MONTH_NAMES: &[&str] = &[
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Fixed-date national holidays as (month, day).
const FIXED_HOLIDAYS: &[(u32, u32)] = &[(1, 1), (5, 1), (7, 20), (8, 7), (12, 8), (12, 25)];

/// Calendar attributes of one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub year: i32,
    pub semester: u32,
    pub quarter: u32,
    pub month: u32,
    pub month_name: &'static str,
    pub day: u32,
    /// 1 = Sunday ... 7 = Saturday.
    pub weekday: u32,
    pub weekday_name: &'static str,
    pub iso_week: u32,
    pub is_weekend: bool,
    pub is_holiday: bool,
}

impl CalendarDay {
    pub fn new(date: NaiveDate) -> Self {
        let month = date.month();
        let weekday = date.weekday();
        Self {
            date,
            year: date.year(),
            semester: if month > 6 { 2 } else { 1 },
            quarter: (month - 1) / 3 + 1,
            month,
            month_name: MONTH_NAMES[month as usize - 1],
            day: date.day(),
            weekday: weekday.number_from_sunday(),
            weekday_name: weekday_name(weekday),
            iso_week: date.iso_week().week(),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
            is_holiday: FIXED_HOLIDAYS.contains(&(month, date.day())),
        }
    }

    pub fn quarter_label(&self) -> String {
        format!("Q{}-{}", self.quarter, self.year)
    }

    fn into_row(self, key: i64) -> Vec<Value> {
        let quarter_label = self.quarter_label();
        vec![
            Value::Int(key),
            Value::Date(self.date),
            Value::from(self.year),
            Value::from(self.semester),
            Value::from(self.quarter),
            Value::from(self.month),
            Value::from(self.month_name),
            Value::from(self.day),
            Value::from(self.weekday),
            Value::from(self.weekday_name),
            Value::from(self.iso_week),
            Value::Bool(self.is_weekend),
            Value::Bool(self.is_holiday),
            Value::Text(quarter_label),
        ]
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Write every day in `[anchor - window, anchor]` and register it in `index`.
pub async fn populate<S: Store>(
    ctx: &PopulateContext<'_, S>,
    index: &TimeIndex,
) -> Result<Populated, GenerationError> {
    let started = Instant::now();
    let start = ctx.years_back(ctx.config.time_window_years)?;
    let days = (ctx.anchor - start).num_days() as usize + 1;
    info!(table = TABLE, rows = days, from = %start, to = %ctx.anchor, "populating dimension");

    let mut writer = ctx.writer(TABLE, COLUMNS).await?;
    let mut pool = DimensionKeyPool::with_capacity(TABLE, days);

    let mut date = start;
    let mut key = 1_i64;
    while date <= ctx.anchor {
        writer.add(CalendarDay::new(date).into_row(key)).await?;
        index.put(&date, key)?;
        pool.push(key);

        key += 1;
        let Some(next) = date.checked_add_days(Days::new(1)) else {
            break;
        };
        date = next;
    }

    let stats = writer.commit().await?;
    let mut report = TableReport::new(TABLE, 1, days as u64);
    report.record_batches(stats);
    report.duration_ms = started.elapsed().as_millis() as u64;
    info!(table = TABLE, rows = report.rows_written, cached = index.len(), "dimension populated");

    Ok(Populated { pool, report })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn christmas_attributes() {
        let calendar = CalendarDay::new(day(2023, 12, 25));
        assert_eq!(calendar.year, 2023);
        assert_eq!(calendar.semester, 2);
        assert_eq!(calendar.quarter, 4);
        assert_eq!(calendar.month_name, "December");
        assert_eq!(calendar.weekday, 2);
        assert_eq!(calendar.weekday_name, "Monday");
        assert_eq!(calendar.iso_week, 52);
        assert!(!calendar.is_weekend);
        assert!(calendar.is_holiday);
        assert_eq!(calendar.quarter_label(), "Q4-2023");
    }

    #[test]
    fn weekend_and_iso_week_rollover() {
        // 2021-01-03 is a Sunday that still belongs to ISO week 53 of 2020
        let calendar = CalendarDay::new(day(2021, 1, 3));
        assert_eq!(calendar.weekday, 1);
        assert!(calendar.is_weekend);
        assert_eq!(calendar.iso_week, 53);
        assert!(!calendar.is_holiday);
        assert_eq!(calendar.semester, 1);
        assert_eq!(calendar.quarter, 1);
    }

    #[test]
    fn row_matches_column_list() {
        let row = CalendarDay::new(day(2024, 7, 20)).into_row(9);
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(row[0], Value::Int(9));
        assert_eq!(row[12], Value::Bool(true));
    }
}
