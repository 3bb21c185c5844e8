mod registry;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use registry::{RunContext, init_run_logging, start_run, write_report};
use sqlx::postgres::PgPoolOptions;
use starseed_core::{ConfigError, GenerationConfig, load_config, redact_connection_string};
use starseed_generate::{
    GenerationEngine, GenerationError, GenerationReport, MemoryStore, PgStore, Store,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

#[derive(Parser, Debug)]
#[command(name = "starseed", version, about = "Synthetic star-schema warehouse generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Populate every dimension and fact table of the warehouse.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// TOML file with row counts, windows and batching settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Database connection string.
    #[arg(long, value_name = "CONNECTION_STRING", env = "DATABASE_URL")]
    conn: Option<String>,
    /// Seed for every table's generator; drawn at random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Multiply row counts by this factor (0.01 for a 1% dataset).
    #[arg(long)]
    scale: Option<f64>,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Generate into memory without touching a database.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args).await,
    }
}

async fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        config: config_path,
        conn,
        seed,
        scale,
        run_dir,
        dry_run,
    } = args;

    let config = effective_config(config_path.as_deref(), seed, scale)?;

    let (engine, conn) = if dry_run {
        ("memory", None)
    } else {
        let conn = conn.ok_or_else(|| {
            CliError::InvalidConfig(
                "connection string is required (use --conn or DATABASE_URL)".to_string(),
            )
        })?;
        (detect_engine(&conn)?, Some(conn))
    };

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        engine: engine.to_string(),
        dry_run,
        run_dir,
        config_path,
        config: config.clone(),
        connection: conn.as_deref().map(redact_connection_string),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        engine = %engine,
        dry_run,
        path = %run_paths.root.display()
    );
    let timer = Instant::now();

    let generation = GenerationEngine::new(config);
    let outcome = match conn {
        Some(conn) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(10))
                .connect(&conn)
                .await?;
            tracing::info!(event = "connected", engine = %engine);
            generate(&generation, &PgStore::new(pool)).await
        }
        None => generate(&generation, &MemoryStore::for_warehouse()).await,
    };

    let duration_ms = timer.elapsed().as_millis();
    match outcome {
        Ok(report) => {
            write_report(&run_paths, &report)?;
            tracing::info!(
                event = "report_written",
                path = %run_paths.report_path.display()
            );
            tracing::info!(
                event = "run_finished",
                status = "success",
                seed = report.seed,
                total_rows = report.total_rows(),
                duration_ms = duration_ms
            );
            Ok(())
        }
        Err(err) => {
            tracing::error!(
                event = "run_finished",
                status = "failure",
                error = %err,
                duration_ms = duration_ms
            );
            Err(err.into())
        }
    }
}

async fn generate<S: Store>(
    engine: &GenerationEngine,
    store: &S,
) -> Result<GenerationReport, GenerationError> {
    engine.run(store).await.map(|result| result.report)
}

fn effective_config(
    path: Option<&std::path::Path>,
    seed: Option<u64>,
    scale: Option<f64>,
) -> Result<GenerationConfig, CliError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => GenerationConfig::default(),
    };
    if let Some(factor) = scale {
        if !(factor > 0.0 && factor.is_finite()) {
            return Err(CliError::InvalidConfig(format!(
                "scale must be a positive number, got {factor}"
            )));
        }
        config = config.scaled(factor);
    }
    if seed.is_some() {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn detect_engine(conn: &str) -> Result<&'static str, CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(CliError::UnsupportedEngine(
            redact_connection_string(conn).redacted,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_postgres_targets() {
        assert_eq!(detect_engine("postgresql://localhost/dw").ok(), Some("postgres"));
        assert!(matches!(
            detect_engine("mysql://root:pw@localhost/dw"),
            Err(CliError::UnsupportedEngine(target)) if !target.contains("pw@")
        ));
    }

    #[test]
    fn flags_override_file_defaults() {
        let config = effective_config(None, Some(99), Some(0.01)).expect("config");
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.branches, 1);
        assert_eq!(config.sales_rows, 8_941);
    }

    #[test]
    fn rejects_non_positive_scale() {
        assert!(matches!(
            effective_config(None, None, Some(0.0)),
            Err(CliError::InvalidConfig(_))
        ));
    }
}
