use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;

use hr_insight::config::Cli;
use hr_insight::snapshot::Snapshot;
use hr_insight::{DashboardSession, DatasetCache};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut cache = DatasetCache::new();
    let dataset = cache
        .get_or_load(&cli.source)
        .with_context(|| format!("loading {}", cli.source.display()))?;

    let mut session = DashboardSession::new(dataset);
    for selector in &cli.selections {
        session.select(selector.field, &selector.choice);
    }

    let snapshot = Snapshot::capture(&session);
    log::info!(
        "{} of {} employees selected, turnover {}",
        snapshot.visible_employees,
        snapshot.total_employees,
        snapshot.metric_labels.turnover_rate
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &snapshot).context("writing snapshot")?;
    writeln!(out).context("writing snapshot")?;
    Ok(())
}
