use std::time::Instant;

use tracing::info;

use starseed_core::{DimensionKeyPool, Value};

use crate::context::PopulateContext;
use crate::errors::GenerationError;
use crate::model::TableReport;
use crate::store::Store;

pub const TABLE: &str = "dim_sales_channel";

pub const COLUMNS: &[&str] = &["channel_key", "channel_code", "channel_name", "channel_kind"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Physical,
    Digital,
}

impl ChannelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Physical => "Physical",
            ChannelKind::Digital => "Digital",
        }
    }
}

struct ChannelSpec {
    code: &'static str,
    name: &'static str,
    kind: ChannelKind,
}

const CHANNELS: &[ChannelSpec] = &[
    ChannelSpec {
        code: "STORE",
        name: "In-Store Sale",
        kind: ChannelKind::Physical,
    },
    ChannelSpec {
        code: "WEB",
        name: "Website",
        kind: ChannelKind::Digital,
    },
    ChannelSpec {
        code: "MOBILE",
        name: "Mobile App",
        kind: ChannelKind::Digital,
    },
    ChannelSpec {
        code: "WHOLESALE",
        name: "Wholesale",
        kind: ChannelKind::Physical,
    },
];

/// Channel keys, plus the digital subset that web metrics report on.
#[derive(Debug, Clone)]
pub struct ChannelPools {
    pub all: DimensionKeyPool,
    pub digital: DimensionKeyPool,
    pub report: TableReport,
}

pub async fn populate<S: Store>(
    ctx: &PopulateContext<'_, S>,
) -> Result<ChannelPools, GenerationError> {
    let started = Instant::now();
    info!(table = TABLE, rows = CHANNELS.len(), "populating dimension");

    let mut writer = ctx.writer(TABLE, COLUMNS).await?;
    let mut all = DimensionKeyPool::with_capacity(TABLE, CHANNELS.len());
    let mut digital = DimensionKeyPool::with_capacity(TABLE, CHANNELS.len());

    for (idx, channel) in CHANNELS.iter().enumerate() {
        let key = idx as i64 + 1;
        writer
            .add(vec![
                Value::Int(key),
                Value::from(channel.code),
                Value::from(channel.name),
                Value::from(channel.kind.as_str()),
            ])
            .await?;
        all.push(key);
        if channel.kind == ChannelKind::Digital {
            digital.push(key);
        }
    }

    let stats = writer.commit().await?;
    let mut report = TableReport::new(TABLE, 2, CHANNELS.len() as u64);
    report.record_batches(stats);
    report.duration_ms = started.elapsed().as_millis() as u64;
    info!(
        table = TABLE,
        rows = report.rows_written,
        digital = digital.len(),
        "dimension populated"
    );

    Ok(ChannelPools {
        all,
        digital,
        report,
    })
}
