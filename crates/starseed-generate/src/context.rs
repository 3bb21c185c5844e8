use chrono::{Days, Months, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use starseed_core::{DimensionKeyPool, GenerationConfig};

use crate::batch::BatchWriter;
use crate::errors::GenerationError;
use crate::model::TableReport;
use crate::store::Store;

/// Everything a populator needs besides the pools it consumes.
pub struct PopulateContext<'a, S: Store> {
    pub store: &'a S,
    pub config: &'a GenerationConfig,
    pub seed: u64,
    /// Last day of the historical window.
    pub anchor: NaiveDate,
}

impl<'a, S: Store> PopulateContext<'a, S> {
    pub fn new(store: &'a S, config: &'a GenerationConfig, seed: u64, anchor: NaiveDate) -> Self {
        Self {
            store,
            config,
            seed,
            anchor,
        }
    }

    /// Independent generator per table, derived from the run seed.
    pub fn rng(&self, table: &str) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(hash_seed(self.seed, table))
    }

    /// Open a transaction for `table` wrapped in a batch writer.
    pub async fn writer(
        &self,
        table: &'static str,
        columns: &'static [&'static str],
    ) -> Result<BatchWriter<S::Transaction>, GenerationError> {
        let tx = self
            .store
            .begin()
            .await
            .map_err(|source| GenerationError::Write { table, source })?;
        BatchWriter::new(
            tx,
            table,
            columns,
            self.config.batch_size,
            self.config.parameter_ceiling,
        )
    }

    pub fn months_back(&self, months: u32) -> Result<NaiveDate, GenerationError> {
        self.anchor
            .checked_sub_months(Months::new(months))
            .ok_or_else(|| {
                GenerationError::Configuration(format!(
                    "window of {months} months before {} is out of range",
                    self.anchor
                ))
            })
    }

    pub fn years_back(&self, years: u32) -> Result<NaiveDate, GenerationError> {
        self.months_back(years.saturating_mul(12))
    }
}

/// A dimension's key pool together with its table report.
#[derive(Debug, Clone)]
pub struct Populated {
    pub pool: DimensionKeyPool,
    pub report: TableReport,
}

/// FNV-1a fold of `key` over the run seed, giving each table its own stream.
pub(crate) fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

pub(crate) fn pick<'v, R: Rng + ?Sized>(values: &[&'v str], rng: &mut R) -> &'v str {
    values[rng.random_range(0..values.len())]
}

/// Pick from `(value, weight)` buckets; weights need not sum to one.
pub(crate) fn pick_weighted<'v, R: Rng + ?Sized>(
    buckets: &[(&'v str, f64)],
    rng: &mut R,
) -> &'v str {
    let total: f64 = buckets.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.random::<f64>() * total;
    for (value, weight) in buckets {
        if roll < *weight {
            return *value;
        }
        roll -= weight;
    }
    buckets[buckets.len() - 1].0
}

/// A day up to `max_years` years, 11 months and 27 days before `anchor`.
pub(crate) fn random_past_date<R: Rng + ?Sized>(
    anchor: NaiveDate,
    max_years: u32,
    rng: &mut R,
) -> NaiveDate {
    let months = rng.random_range(0..max_years) * 12 + rng.random_range(0..12);
    let days = rng.random_range(0..28);
    anchor
        .checked_sub_months(Months::new(months))
        .and_then(|date| date.checked_sub_days(Days::new(days)))
        .unwrap_or(anchor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_seeds_differ() {
        assert_ne!(hash_seed(7, "dim_product"), hash_seed(7, "dim_customer"));
        assert_ne!(hash_seed(7, "dim_product"), hash_seed(8, "dim_product"));
        assert_eq!(hash_seed(7, "dim_product"), hash_seed(7, "dim_product"));
    }

    #[test]
    fn weighted_buckets_follow_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let buckets = [("A", 0.2), ("B", 0.3), ("C", 0.5)];
        let draws = 20_000;
        let a = (0..draws)
            .filter(|_| pick_weighted(&buckets, &mut rng) == "A")
            .count() as f64
            / draws as f64;
        assert!((0.17..0.23).contains(&a), "segment A share {a}");
    }

    #[test]
    fn past_dates_never_exceed_anchor() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let anchor = NaiveDate::from_ymd_opt(2024, 3, 31).expect("date");
        for _ in 0..1_000 {
            let date = random_past_date(anchor, 5, &mut rng);
            assert!(date <= anchor);
            assert!(date > anchor - Days::new(5 * 366 + 28));
        }
    }
}
