use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use starseed_core::{GenerationConfig, RedactedConnection};
use starseed_generate::GenerationReport;

use super::RegistryResult;

/// Metadata captured before generation starts.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub engine: String,
    pub dry_run: bool,
    pub run_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    pub config: GenerationConfig,
    pub connection: Option<RedactedConnection>,
}

/// Contents of `config.json`.
#[derive(Debug, Serialize)]
struct RunConfig<'a> {
    run_id: &'a str,
    started_at: String,
    engine: &'a str,
    dry_run: bool,
    config_path: Option<&'a Path>,
    generation: &'a GenerationConfig,
    connection: Option<&'a RedactedConnection>,
}

#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub logs_path: PathBuf,
    pub report_path: PathBuf,
}

/// Create `<run_dir>/<timestamp>__run_<id>/` and write `config.json`.
pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));
    create_dir_all(&root)?;

    let config = RunConfig {
        run_id: &ctx.run_id,
        started_at: ctx.started_at.to_rfc3339(),
        engine: &ctx.engine,
        dry_run: ctx.dry_run,
        config_path: ctx.config_path.as_deref(),
        generation: &ctx.config,
        connection: ctx.connection.as_ref(),
    };
    write_json(&root.join("config.json"), &config)?;

    let logs_path = root.join("logs.ndjson");
    OpenOptions::new().create(true).append(true).open(&logs_path)?;

    Ok(RunPaths {
        report_path: root.join("report.json"),
        logs_path,
        root,
    })
}

pub fn write_report(paths: &RunPaths, report: &GenerationReport) -> RegistryResult<()> {
    write_json(&paths.report_path, report)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use starseed_core::redact_connection_string;

    #[test]
    fn config_json_never_contains_the_password() {
        let dir = std::env::temp_dir().join(format!("starseed-run-{}", std::process::id()));
        let ctx = RunContext {
            run_id: "test".to_string(),
            started_at: Utc::now(),
            engine: "postgres".to_string(),
            dry_run: false,
            run_dir: dir.clone(),
            config_path: None,
            config: GenerationConfig::default(),
            connection: Some(redact_connection_string("postgres://seed:hunter2@db/dw")),
        };

        let paths = start_run(&ctx).expect("start run");
        let written = std::fs::read_to_string(paths.root.join("config.json")).expect("config");
        assert!(written.contains("seed:***@db"));
        assert!(!written.contains("hunter2"));
        assert!(paths.logs_path.exists());

        std::fs::remove_dir_all(dir).expect("cleanup");
    }
}
