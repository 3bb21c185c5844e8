//! Calendar date to time-dimension key lookup.
//!
//! Written once by the time populator during phase 1, read by every fact
//! populator afterwards. Entries are keyed on a `YYYY-MM-DD` string so
//! values carrying a time of day resolve to the same entry as their date.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Datelike;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeIndexError {
    #[error("time index already holds {date} (key {existing})")]
    Duplicate { date: String, existing: i64 },
}

#[derive(Debug, Default)]
pub struct TimeIndex {
    entries: RwLock<HashMap<String, i64>>,
}

impl TimeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a date once; a second insert for the same day is rejected.
    pub fn put<D: Datelike>(&self, date: &D, key: i64) -> Result<(), TimeIndexError> {
        let normalized = normalize(date);
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(existing) = entries.get(&normalized) {
            return Err(TimeIndexError::Duplicate {
                date: normalized,
                existing: *existing,
            });
        }
        entries.insert(normalized, key);
        Ok(())
    }

    /// Key for the date, `None` when the day was never generated (or not yet).
    pub fn get<D: Datelike>(&self, date: &D) -> Option<i64> {
        let normalized = normalize(date);
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&normalized)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn normalize<D: Datelike>(date: &D) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn put_then_get_returns_same_key() {
        let index = TimeIndex::new();
        index.put(&day(2024, 2, 29), 42).expect("first insert");
        assert_eq!(index.get(&day(2024, 2, 29)), Some(42));
        assert_eq!(index.get(&day(2024, 3, 1)), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn second_put_for_same_day_is_rejected() {
        let index = TimeIndex::new();
        index.put(&day(2023, 12, 25), 1).expect("first insert");
        let err = index.put(&day(2023, 12, 25), 2).expect_err("duplicate");
        assert_eq!(
            err,
            TimeIndexError::Duplicate {
                date: "2023-12-25".to_string(),
                existing: 1
            }
        );
        assert_eq!(index.get(&day(2023, 12, 25)), Some(1));
    }

    #[test]
    fn time_of_day_does_not_cause_misses() {
        let index = TimeIndex::new();
        index.put(&day(2024, 7, 20), 7).expect("insert");
        let evening = day(2024, 7, 20).and_time(NaiveTime::from_hms_opt(23, 59, 59).expect("time"));
        assert_eq!(index.get(&evening), Some(7));
    }

    #[test]
    fn concurrent_readers_see_complete_entries() {
        let index = Arc::new(TimeIndex::new());
        let start = day(2022, 1, 1);
        for offset in 0..365 {
            let date = start + chrono::Days::new(offset);
            index.put(&date, offset as i64 + 1).expect("insert");
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    (0..365)
                        .filter(|offset| {
                            index.get(&(start + chrono::Days::new(*offset)))
                                == Some(*offset as i64 + 1)
                        })
                        .count()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().expect("reader thread"), 365);
        }
    }
}
