//! `stockfold replay`: load an event log into an in-memory store and run the
//! projection hosts over it.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::json;
use tracing::info;

use stockfold_core::{ExpectedVersion, StreamId};
use stockfold_events::Projection;
use stockfold_infra::HostConfig;
use stockfold_infra::event_store::{EventStore, InMemoryEventStore, UncommittedEvent};
use stockfold_infra::projections::{InMemoryCheckpointStore, ProjectionHost};
use stockfold_inventory::{FlatReadModelProjection, OverviewReadModelProjection};

use crate::input::{InputRecord, read_records};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProjectionChoice {
    Flat,
    Overview,
    All,
}

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// JSON-lines event log (stdin when omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Which projection(s) to run
    #[arg(short, long, value_enum, default_value_t = ProjectionChoice::All)]
    pub projection: ProjectionChoice,

    /// Print final states per partition instead of emitted facts
    #[arg(long)]
    pub states: bool,

    /// Events read per batch (overrides STOCKFOLD_BATCH_SIZE)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: Option<u64>,
}

pub fn execute(args: &ReplayArgs, out: &mut impl Write) -> Result<()> {
    let records = match &args.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
            read_records(BufReader::new(file))
        }
        None => read_records(io::stdin().lock()),
    }
    .context("reading event log")?;

    let mut config = HostConfig::from_env()?;
    if let Some(n) = args.batch_size {
        config.batch_size = usize::try_from(n).context("batch size too large")?;
    }

    replay(&records, args.projection, args.states, config, out)
}

/// Append `records` in order, then run the selected hosts and write the output.
pub fn replay(
    records: &[InputRecord],
    choice: ProjectionChoice,
    states: bool,
    config: HostConfig,
    out: &mut impl Write,
) -> Result<()> {
    let store = InMemoryEventStore::new();
    for record in records {
        store.append(
            &StreamId::new(record.stream_id.as_str()),
            vec![UncommittedEvent::new(record.event_type.as_str(), record.body.clone())],
            ExpectedVersion::Any,
        )?;
    }
    info!(events = records.len(), "event log loaded");

    if matches!(choice, ProjectionChoice::Flat | ProjectionChoice::All) {
        run_host(FlatReadModelProjection::new(), &store, config, states, out)?;
    }
    if matches!(choice, ProjectionChoice::Overview | ProjectionChoice::All) {
        run_host(OverviewReadModelProjection::new(), &store, config, states, out)?;
    }
    Ok(())
}

fn run_host<P: Projection>(
    projection: P,
    store: &InMemoryEventStore,
    config: HostConfig,
    states: bool,
    out: &mut impl Write,
) -> Result<()> {
    let name = projection.name().to_owned();
    let mut host = ProjectionHost::start(projection, store, InMemoryCheckpointStore::new(), config)?;
    let report = host
        .catch_up()
        .with_context(|| format!("running projection {name}"))?;

    if states {
        for (key, state) in host.runner().states() {
            let line = json!({ "projection": name, "key": key, "state": state });
            writeln!(out, "{line}")?;
        }
    } else {
        for fact in &report.emitted {
            writeln!(out, "{}", serde_json::to_string(fact)?)?;
        }
    }
    Ok(())
}
