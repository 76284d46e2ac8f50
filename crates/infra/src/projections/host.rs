//! Projection host: drives a projection from the store and re-emits its facts.
//!
//! The host is the engine side of a projection. It:
//! - restores the runner from the last checkpoint on start
//! - reads the source category after the checkpoint, in global order, in batches
//! - folds every event through the runner (one at a time, single-threaded)
//! - appends each derived fact to its target stream in the same store
//! - saves checkpoints periodically and at the end of a catch-up
//!
//! Derived streams live in their own categories, so a host never consumes
//! its own output. Delivery to derived streams is at-least-once: if a crash
//! happens between an append and the next checkpoint, the facts after the
//! checkpoint are emitted again on restart.

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, info};

use stockfold_core::{ExpectedVersion, StreamId};
use stockfold_events::{
    Applied, EmitError, EmittedEvent, Emitter, Projection, ProjectionError, ProjectionRunner,
    RunnerSnapshot,
};

use crate::config::HostConfig;
use crate::event_store::{EventStore, EventStoreError, UncommittedEvent};
use crate::projections::checkpoint::{CheckpointError, CheckpointStore};

#[derive(Debug, Error)]
pub enum HostError {
    #[error("event store error: {0}")]
    Store(#[from] EventStoreError),

    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("checkpoint (de)serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Outcome of one [`ProjectionHost::catch_up`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatchUpReport {
    /// Events folded (handled or not), excluding redeliveries.
    pub processed: usize,
    /// Facts appended to derived streams, in emission order.
    pub emitted: Vec<EmittedEvent>,
}

/// Appends derived facts to the store and keeps a copy for the report.
struct StoreEmitter<'a, S> {
    store: &'a S,
    emitted: &'a mut Vec<EmittedEvent>,
}

impl<S> Emitter for StoreEmitter<'_, S>
where
    S: EventStore,
{
    fn emit(
        &mut self,
        target_stream_id: &str,
        event_type: &str,
        payload: &JsonValue,
    ) -> Result<(), EmitError> {
        let stream_id = StreamId::new(target_stream_id);
        self.store
            .append(
                &stream_id,
                vec![UncommittedEvent::new(event_type, payload.clone())],
                ExpectedVersion::Any,
            )
            .map_err(|e| EmitError::new(target_stream_id, e.to_string()))?;

        self.emitted
            .push(EmittedEvent::new(target_stream_id, event_type, payload.clone()));
        Ok(())
    }
}

#[derive(Debug)]
pub struct ProjectionHost<P, S, C>
where
    P: Projection,
{
    runner: ProjectionRunner<P>,
    store: S,
    checkpoints: C,
    config: HostConfig,
}

impl<P, S, C> ProjectionHost<P, S, C>
where
    P: Projection,
    S: EventStore,
    C: CheckpointStore,
{
    /// Create a host, resuming from `projection`'s checkpoint when one exists.
    pub fn start(projection: P, store: S, checkpoints: C, config: HostConfig) -> Result<Self, HostError> {
        let runner = match checkpoints.load(projection.name())? {
            Some(raw) => {
                let snapshot: RunnerSnapshot<P::State> = serde_json::from_value(raw)?;
                info!(
                    projection = projection.name(),
                    last_position = ?snapshot.last_position,
                    partitions = snapshot.states.len(),
                    "resuming projection from checkpoint"
                );
                ProjectionRunner::resume(projection, snapshot)
            }
            None => ProjectionRunner::new(projection),
        };

        Ok(Self {
            runner,
            store,
            checkpoints,
            config,
        })
    }

    pub fn runner(&self) -> &ProjectionRunner<P> {
        &self.runner
    }

    pub fn state(&self, key: &str) -> Option<&P::State> {
        self.runner.state(key)
    }

    pub fn last_position(&self) -> Option<u64> {
        self.runner.last_position()
    }

    /// Fold every source event recorded after the checkpoint.
    pub fn catch_up(&mut self) -> Result<CatchUpReport, HostError> {
        let mut report = CatchUpReport::default();
        let mut since_checkpoint = 0usize;
        let limit = self.config.batch_size.max(1);

        loop {
            let batch = self.store.read_category(
                self.runner.projection().source_category(),
                self.runner.last_position(),
                limit,
            )?;
            let exhausted = batch.len() < limit;

            for event in &batch {
                let mut emitter = StoreEmitter {
                    store: &self.store,
                    emitted: &mut report.emitted,
                };
                if self.runner.apply(event, &mut emitter)? != Applied::Duplicate {
                    report.processed += 1;
                    since_checkpoint += 1;
                }

                if since_checkpoint >= self.config.checkpoint_every {
                    self.save_checkpoint()?;
                    since_checkpoint = 0;
                }
            }

            if exhausted {
                break;
            }
        }

        if since_checkpoint > 0 {
            self.save_checkpoint()?;
        }

        info!(
            projection = self.runner.projection().name(),
            processed = report.processed,
            emitted = report.emitted.len(),
            last_position = ?self.runner.last_position(),
            "projection caught up"
        );
        Ok(report)
    }

    /// Drop state and checkpoint; the next catch-up replays from the beginning.
    ///
    /// Facts already appended to derived streams stay there (append-only).
    pub fn reset(&mut self) -> Result<(), HostError> {
        self.checkpoints.clear(self.runner.projection().name())?;
        self.runner.reset();
        info!(projection = self.runner.projection().name(), "projection reset");
        Ok(())
    }

    fn save_checkpoint(&self) -> Result<(), HostError> {
        let snapshot = serde_json::to_value(self.runner.snapshot())?;
        self.checkpoints.save(self.runner.projection().name(), snapshot)?;
        debug!(
            projection = self.runner.projection().name(),
            last_position = ?self.runner.last_position(),
            "checkpoint saved"
        );
        Ok(())
    }
}
