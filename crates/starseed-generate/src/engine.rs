use std::time::Instant;

use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use starseed_core::{DimensionKeyPool, GenerationConfig};

use crate::context::PopulateContext;
use crate::dimensions::{branch, channel, customer, employee, order_status, product, time};
use crate::errors::GenerationError;
use crate::facts::{DimensionPools, finance, sales, satisfaction, web_metrics};
use crate::model::GenerationReport;
use crate::store::Store;
use crate::time_index::TimeIndex;

/// Runs the three population phases against a store.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    config: GenerationConfig,
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct GenerationResult {
    pub report: GenerationReport,
    pub pools: DimensionPools,
    pub time_index: TimeIndex,
}

impl GenerationEngine {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    /// Populate every dimension and fact table.
    ///
    /// The first fatal error stops the run. Tables committed before it stay
    /// in the store; the failing table's transaction is rolled back.
    pub async fn run<S: Store>(&self, store: &S) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        self.config.validate()?;
        for window in self.config.windows_exceeding_time_dimension() {
            warn!(
                window,
                time_window_years = self.config.time_window_years,
                "fact window exceeds the time dimension; rows outside it will be dropped"
            );
        }

        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        let anchor = self.config.anchor();
        let run_id = Uuid::new_v4().to_string();
        let ctx = PopulateContext::new(store, &self.config, seed, anchor);
        let mut report = GenerationReport::new(run_id.clone(), seed, anchor);

        info!(
            run_id = %run_id,
            seed,
            anchor = %anchor,
            engine = store.engine(),
            "generation started"
        );

        info!(event = "phase_started", phase = 1, "independent dimensions");
        let index = TimeIndex::new();
        let (products, customers, branches, days) = tokio::try_join!(
            product::populate(&ctx),
            customer::populate(&ctx),
            branch::populate(&ctx),
            time::populate(&ctx, &index),
        )?;
        for pool in [&products.pool, &customers.pool, &branches.pool, &days.pool] {
            ensure_populated(pool)?;
        }
        info!(
            event = "phase_finished",
            phase = 1,
            products = products.pool.len(),
            customers = customers.pool.len(),
            branches = branches.pool.len(),
            days = index.len(),
            "pools verified"
        );
        report.tables.extend([
            products.report,
            customers.report,
            branches.report,
            days.report,
        ]);

        info!(event = "phase_started", phase = 2, "dependent dimensions");
        let channels = channel::populate(&ctx).await?;
        let statuses = order_status::populate(&ctx).await?;
        let employees = employee::populate(&ctx, &branches.pool).await?;
        for pool in [&channels.all, &channels.digital, &statuses.pool, &employees.pool] {
            ensure_populated(pool)?;
        }
        info!(
            event = "phase_finished",
            phase = 2,
            channels = channels.all.len(),
            statuses = statuses.pool.len(),
            employees = employees.pool.len(),
            "pools verified"
        );
        report
            .tables
            .extend([channels.report, statuses.report, employees.report]);

        let pools = DimensionPools {
            products: products.pool,
            customers: customers.pool,
            branches: branches.pool,
            employees: employees.pool,
            channels: channels.all,
            digital_channels: channels.digital,
            statuses: statuses.pool,
        };

        info!(event = "phase_started", phase = 3, "facts");
        report.tables.push(sales::populate(&ctx, &pools, &index).await?);
        report
            .tables
            .push(finance::populate(&ctx, &pools.branches, &index).await?);
        report
            .tables
            .push(satisfaction::populate(&ctx, &pools, &index).await?);
        report
            .tables
            .push(web_metrics::populate(&ctx, &pools.digital_channels, &index).await?);
        info!(event = "phase_finished", phase = 3, "facts populated");

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %run_id,
            tables = report.tables.len(),
            total_rows = report.total_rows(),
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(GenerationResult {
            report,
            pools,
            time_index: index,
        })
    }
}

fn ensure_populated(pool: &DimensionKeyPool) -> Result<(), GenerationError> {
    if pool.is_empty() {
        return Err(GenerationError::Configuration(format!(
            "{} produced no keys; dependent tables cannot be populated",
            pool.table()
        )));
    }
    Ok(())
}
