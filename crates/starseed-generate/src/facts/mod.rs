//! Fact populators.
//!
//! Facts sample dimension keys uniformly from the pools built in phases 1
//! and 2 and resolve calendar dates through the [`TimeIndex`]. A date with
//! no time key is handled locally: a secondary date falls back to the row's
//! primary date key, and a row whose primary date misses is dropped.

use chrono::Datelike;
use rand::Rng;

use starseed_core::DimensionKeyPool;

use crate::errors::GenerationError;
use crate::time_index::TimeIndex;

pub mod finance;
pub mod sales;
pub mod satisfaction;
pub mod web_metrics;

/// Key pools produced by the dimension phases, read-only from here on.
#[derive(Debug, Clone)]
pub struct DimensionPools {
    pub products: DimensionKeyPool,
    pub customers: DimensionKeyPool,
    pub branches: DimensionKeyPool,
    pub employees: DimensionKeyPool,
    pub channels: DimensionKeyPool,
    pub digital_channels: DimensionKeyPool,
    pub statuses: DimensionKeyPool,
}

pub(crate) fn sample_key<R: Rng + ?Sized>(
    pool: &DimensionKeyPool,
    rng: &mut R,
) -> Result<i64, GenerationError> {
    pool.sample(rng).ok_or_else(|| {
        GenerationError::Configuration(format!("{} key pool is empty", pool.table()))
    })
}

/// Time-key lookups that apply the fallback policy and count its outcomes.
pub(crate) struct DateResolver<'a> {
    index: &'a TimeIndex,
    pub fallbacks: u64,
    pub dropped: u64,
}

impl<'a> DateResolver<'a> {
    pub fn new(index: &'a TimeIndex) -> Self {
        Self {
            index,
            fallbacks: 0,
            dropped: 0,
        }
    }

    /// Key of a row's anchoring date; `None` means the row must be dropped.
    pub fn primary<D: Datelike>(&mut self, date: &D) -> Option<i64> {
        let key = self.index.get(date);
        if key.is_none() {
            self.dropped += 1;
        }
        key
    }

    /// Key of a secondary date, or the primary key when it is outside the window.
    pub fn secondary<D: Datelike>(&mut self, date: &D, primary_key: i64) -> i64 {
        match self.index.get(date) {
            Some(key) => key,
            None => {
                self.fallbacks += 1;
                primary_key
            }
        }
    }

    /// Count rows dropped as a group (one missing period spans several rows).
    pub fn drop_rows(&mut self, rows: u64) {
        self.dropped += rows;
    }
}
