use rand::Rng;

/// Ordered, append-only surrogate keys produced by one dimension populator.
///
/// Keys are opaque: consumers only sample them as foreign-key values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionKeyPool {
    table: &'static str,
    keys: Vec<i64>,
}

impl DimensionKeyPool {
    pub fn with_capacity(table: &'static str, capacity: usize) -> Self {
        Self {
            table,
            keys: Vec::with_capacity(capacity),
        }
    }

    pub fn from_keys(table: &'static str, keys: Vec<i64>) -> Self {
        Self { table, keys }
    }

    pub fn push(&mut self, key: i64) {
        self.keys.push(key);
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn keys(&self) -> &[i64] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: i64) -> bool {
        self.keys.contains(&key)
    }

    /// Uniformly sampled key, `None` only when the pool is empty.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<i64> {
        if self.keys.is_empty() {
            return None;
        }
        Some(self.keys[rng.random_range(0..self.keys.len())])
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn samples_only_pool_members() {
        let pool = DimensionKeyPool::from_keys("dim_branch", vec![10, 20, 30]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let key = pool.sample(&mut rng).expect("non-empty pool");
            assert!(pool.contains(key));
        }
    }

    #[test]
    fn empty_pool_has_no_sample() {
        let pool = DimensionKeyPool::with_capacity("dim_product", 4);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pool.is_empty());
        assert_eq!(pool.sample(&mut rng), None);
    }
}
