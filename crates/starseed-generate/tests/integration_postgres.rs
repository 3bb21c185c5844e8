use std::{env, fs};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{PgPool, postgres::PgPoolOptions};

use starseed_core::GenerationConfig;
use starseed_generate::dimensions::employee;
use starseed_generate::facts::{finance, sales};
use starseed_generate::{GenerationEngine, PgStore};

const FIXTURE_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../fixtures/sql/postgres/001_warehouse.sql"
);

fn database_url() -> Option<String> {
    env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .ok()
}

async fn reset_schema(pool: &PgPool) -> Result<()> {
    let script = fs::read_to_string(FIXTURE_PATH)
        .with_context(|| format!("reading fixture {FIXTURE_PATH}"))?;

    for statement in script.split(';') {
        let sql = statement.trim();
        if sql.is_empty() {
            continue;
        }
        sqlx::query(sql)
            .execute(pool)
            .await
            .with_context(|| format!("executing fixture statement: {sql}"))?;
    }
    Ok(())
}

async fn count(pool: &PgPool, table: &str) -> Result<i64> {
    let sql = format!("select count(*) from {table}");
    sqlx::query_scalar::<_, i64>(&sql)
        .fetch_one(pool)
        .await
        .with_context(|| format!("counting {table}"))
}

#[tokio::test]
async fn populates_postgres_warehouse() -> Result<()> {
    let Some(db_url) = database_url() else {
        eprintln!("skipping: set TEST_DATABASE_URL or DATABASE_URL to run against Postgres");
        return Ok(());
    };
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect(&db_url)
        .await
        .context("connecting to Postgres")?;

    reset_schema(&pool).await?;

    let config = GenerationConfig {
        products: 50,
        customers: 80,
        branches: 4,
        employees: 10,
        sales_rows: 300,
        satisfaction_rows: 50,
        satisfaction_years: 1,
        finance_years: 1,
        web_metrics_months: 12,
        time_window_years: 1,
        seed: Some(17),
        anchor_date: NaiveDate::from_ymd_opt(2024, 6, 15),
        ..GenerationConfig::default()
    };
    let result = GenerationEngine::new(config)
        .run(&PgStore::new(pool.clone()))
        .await?;

    let sales_report = result
        .report
        .table(sales::TABLE)
        .context("sales report missing")?;
    assert_eq!(count(&pool, sales::TABLE).await?, sales_report.rows_written as i64);
    assert_eq!(count(&pool, finance::TABLE).await?, 12 * 4);
    assert_eq!(count(&pool, employee::TABLE).await?, 10);
    assert_eq!(result.pools.employees.len(), 10);

    let orphans: i64 = sqlx::query_scalar(
        "select count(*) from fact_sales s \
         left join dim_employee e on e.employee_key = s.employee_key \
         where e.employee_key is null",
    )
    .fetch_one(&pool)
    .await?;
    assert_eq!(orphans, 0);

    let misordered: i64 = sqlx::query_scalar(
        "select count(*) from fact_sales s \
         join dim_time o on o.time_key = s.order_time_key \
         join dim_time t on t.time_key = s.sale_time_key \
         join dim_time d on d.time_key = s.delivery_time_key \
         where not (o.full_date <= t.full_date and t.full_date <= d.full_date)",
    )
    .fetch_one(&pool)
    .await?;
    assert_eq!(misordered, 0);

    Ok(())
}
