use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::batch::BatchStats;

/// Summary of one populated table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub phase: u8,
    pub rows_requested: u64,
    pub rows_written: u64,
    /// Rows skipped because their anchoring date had no time key.
    pub rows_dropped: u64,
    /// Secondary dates that fell back to the row's primary time key.
    pub date_fallbacks: u64,
    pub batches: u64,
    pub max_params: usize,
    pub duration_ms: u64,
}

impl TableReport {
    pub fn new(table: &str, phase: u8, rows_requested: u64) -> Self {
        Self {
            table: table.to_string(),
            phase,
            rows_requested,
            rows_written: 0,
            rows_dropped: 0,
            date_fallbacks: 0,
            batches: 0,
            max_params: 0,
            duration_ms: 0,
        }
    }

    pub fn record_batches(&mut self, stats: BatchStats) {
        self.rows_written += stats.rows_written;
        self.batches += stats.batches;
        self.max_params = self.max_params.max(stats.max_params);
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub anchor_date: NaiveDate,
    pub tables: Vec<TableReport>,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64, anchor_date: NaiveDate) -> Self {
        Self {
            run_id,
            seed,
            anchor_date,
            tables: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|table| table.table == name)
    }

    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|table| table.rows_written).sum()
    }
}
