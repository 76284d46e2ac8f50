//! Projection runner (host-side fold).
//!
//! Read models are **disposable**; events are the source of truth.
//! The runner owns one state per partition key, threads it through the
//! projection's pure reducer, hands derived facts to an [`Emitter`] and tracks
//! the last global position applied so redelivered events are skipped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{Emitter, EventEnvelope, Projection, ProjectionError};

/// Persistable runner progress: checkpoint plus every partition's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerSnapshot<S> {
    pub last_position: Option<u64>,
    pub states: BTreeMap<String, S>,
}

impl<S> Default for RunnerSnapshot<S> {
    fn default() -> Self {
        Self {
            last_position: None,
            states: BTreeMap::new(),
        }
    }
}

/// What happened to one event handed to [`ProjectionRunner::apply`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Applied {
    /// At or below the checkpoint; already folded.
    Duplicate,
    /// Folded, but the projection does not handle this event type.
    Ignored,
    /// Folded and one derived fact was emitted.
    Emitted,
}

/// Runs events through a projection, one at a time, in delivery order.
#[derive(Debug)]
pub struct ProjectionRunner<P>
where
    P: Projection,
{
    projection: P,
    states: BTreeMap<String, P::State>,
    last_position: Option<u64>,
}

impl<P> ProjectionRunner<P>
where
    P: Projection,
{
    pub fn new(projection: P) -> Self {
        Self {
            projection,
            states: BTreeMap::new(),
            last_position: None,
        }
    }

    /// Continue from a previously taken snapshot.
    pub fn resume(projection: P, snapshot: RunnerSnapshot<P::State>) -> Self {
        Self {
            projection,
            states: snapshot.states,
            last_position: snapshot.last_position,
        }
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    /// Global position of the last event folded (if any).
    pub fn last_position(&self) -> Option<u64> {
        self.last_position
    }

    /// Current state for one partition key.
    pub fn state(&self, key: &str) -> Option<&P::State> {
        self.states.get(key)
    }

    pub fn states(&self) -> &BTreeMap<String, P::State> {
        &self.states
    }

    pub fn snapshot(&self) -> RunnerSnapshot<P::State> {
        RunnerSnapshot {
            last_position: self.last_position,
            states: self.states.clone(),
        }
    }

    /// Drop all state and the checkpoint.
    pub fn reset(&mut self) {
        self.states.clear();
        self.last_position = None;
    }

    /// Fold a single event.
    ///
    /// - Rejects events from outside the projection's source category
    /// - Skips events at or below the checkpoint (at-least-once delivery)
    /// - Emits before committing: if the emitter fails, neither the state
    ///   nor the checkpoint moves, so the event can be redelivered
    pub fn apply<E>(&mut self, event: &EventEnvelope, emitter: &mut E) -> Result<Applied, ProjectionError>
    where
        E: Emitter + ?Sized,
    {
        let category = self.projection.source_category();
        if !event.stream_id().is_in_category(category) {
            return Err(ProjectionError::CategoryMismatch {
                expected: category.to_owned(),
                stream_id: event.stream_id().to_string(),
            });
        }

        if let Some(last) = self.last_position {
            if event.position() <= last {
                debug!(
                    projection = self.projection.name(),
                    position = event.position(),
                    event_id = %event.event_id(),
                    last,
                    "skipping already folded event"
                );
                return Ok(Applied::Duplicate);
            }
        }

        let key = self.projection.partition_key(event);
        let state = match self.states.get(&key) {
            Some(s) => s.clone(),
            None => self.projection.init(),
        };

        let reduction = self.projection.reduce(state, event)?;
        let applied = match &reduction.emitted {
            Some(fact) => {
                emitter.emit(&fact.stream_id, &fact.event_type, &fact.body)?;
                Applied::Emitted
            }
            None => {
                trace!(
                    projection = self.projection.name(),
                    event_type = event.event_type(),
                    event_id = %event.event_id(),
                    recorded_at = %event.recorded_at(),
                    "event type not handled"
                );
                Applied::Ignored
            }
        };

        self.states.insert(key, reduction.state);
        self.last_position = Some(event.position());
        Ok(applied)
    }

    /// Fold many events in order; returns the number of facts emitted.
    pub fn run<'a, E>(
        &mut self,
        events: impl IntoIterator<Item = &'a EventEnvelope>,
        emitter: &mut E,
    ) -> Result<usize, ProjectionError>
    where
        E: Emitter + ?Sized,
    {
        let mut emitted = 0;
        for event in events {
            if self.apply(event, emitter)? == Applied::Emitted {
                emitted += 1;
            }
        }
        Ok(emitted)
    }

    /// Rebuild a projection from scratch by replaying the full event history.
    pub fn rebuild_from_scratch<'a, E>(
        projection: P,
        events: impl IntoIterator<Item = &'a EventEnvelope>,
        emitter: &mut E,
    ) -> Result<Self, ProjectionError>
    where
        E: Emitter + ?Sized,
    {
        let mut runner = Self::new(projection);
        runner.run(events, emitter)?;
        Ok(runner)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::{Value as JsonValue, json};
    use stockfold_core::StreamId;
    use uuid::Uuid;

    use super::*;
    use crate::{DiscardEmitter, EmitError, EmittedEvent, Partitioning, Reduction};

    /// Counts "Tick" events per key and emits the running count.
    struct TickCounter(Partitioning);

    impl Projection for TickCounter {
        type State = u64;

        fn name(&self) -> &str {
            "ticks"
        }

        fn source_category(&self) -> &str {
            "Clock"
        }

        fn partitioning(&self) -> Partitioning {
            self.0
        }

        fn init(&self) -> u64 {
            0
        }

        fn reduce(&self, state: u64, event: &EventEnvelope) -> Result<Reduction<u64>, ProjectionError> {
            if event.event_type() != "Tick" {
                return Ok(Reduction::ignored(state));
            }
            let next = state + 1;
            let fact = EmittedEvent::snapshot("Ticks", "Tick_Ticks", &next)?;
            Ok(Reduction::emitted(next, fact))
        }
    }

    fn event(stream: &str, event_type: &str, position: u64) -> EventEnvelope {
        EventEnvelope::new(
            Uuid::now_v7(),
            StreamId::new(stream),
            event_type,
            1,
            position,
            Utc::now(),
            json!({}),
        )
    }

    struct FailingEmitter;

    impl Emitter for FailingEmitter {
        fn emit(&mut self, stream_id: &str, _: &str, _: &JsonValue) -> Result<(), EmitError> {
            Err(EmitError::new(stream_id, "sink closed"))
        }
    }

    #[test]
    fn per_stream_partitioning_isolates_state() {
        let mut runner = ProjectionRunner::new(TickCounter(Partitioning::PerStream));
        let mut out = Vec::new();

        runner.apply(&event("Clock-a", "Tick", 1), &mut out).unwrap();
        runner.apply(&event("Clock-b", "Tick", 2), &mut out).unwrap();
        runner.apply(&event("Clock-a", "Tick", 3), &mut out).unwrap();

        assert_eq!(runner.state("Clock-a"), Some(&2));
        assert_eq!(runner.state("Clock-b"), Some(&1));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn category_partitioning_shares_one_state() {
        let mut runner = ProjectionRunner::new(TickCounter(Partitioning::Category));
        let mut out = Vec::new();

        let events = [event("Clock-a", "Tick", 1), event("Clock-b", "Tick", 2)];
        let emitted = runner.run(&events, &mut out).unwrap();

        assert_eq!(emitted, 2);
        assert_eq!(runner.state("Clock"), Some(&2));
        assert_eq!(runner.states().len(), 1);
    }

    #[test]
    fn unhandled_events_advance_checkpoint_without_emitting() {
        let mut runner = ProjectionRunner::new(TickCounter(Partitioning::Category));
        let mut out = Vec::new();

        let applied = runner.apply(&event("Clock-a", "Tock", 7), &mut out).unwrap();

        assert_eq!(applied, Applied::Ignored);
        assert!(out.is_empty());
        assert_eq!(runner.last_position(), Some(7));
        assert_eq!(runner.state("Clock"), Some(&0));
    }

    #[test]
    fn redelivered_events_are_skipped() {
        let mut runner = ProjectionRunner::new(TickCounter(Partitioning::Category));
        let mut out = Vec::new();

        runner.apply(&event("Clock-a", "Tick", 1), &mut out).unwrap();
        runner.apply(&event("Clock-a", "Tick", 2), &mut out).unwrap();
        let again = runner.apply(&event("Clock-a", "Tick", 2), &mut out).unwrap();

        assert_eq!(again, Applied::Duplicate);
        assert_eq!(runner.state("Clock"), Some(&2));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn foreign_category_is_rejected() {
        let mut runner = ProjectionRunner::new(TickCounter(Partitioning::Category));
        let err = runner
            .apply(&event("Calendar-1", "Tick", 1), &mut DiscardEmitter)
            .unwrap_err();

        assert!(matches!(err, ProjectionError::CategoryMismatch { .. }));
        assert_eq!(runner.last_position(), None);
    }

    #[test]
    fn emit_failure_leaves_state_and_checkpoint_untouched() {
        let mut runner = ProjectionRunner::new(TickCounter(Partitioning::Category));
        runner.apply(&event("Clock-a", "Tick", 1), &mut DiscardEmitter).unwrap();

        let err = runner.apply(&event("Clock-a", "Tick", 2), &mut FailingEmitter).unwrap_err();

        assert!(matches!(err, ProjectionError::Emit(_)));
        assert_eq!(runner.state("Clock"), Some(&1));
        assert_eq!(runner.last_position(), Some(1));
    }

    #[test]
    fn resume_continues_from_snapshot() {
        let mut first = ProjectionRunner::new(TickCounter(Partitioning::PerStream));
        first.apply(&event("Clock-a", "Tick", 1), &mut DiscardEmitter).unwrap();
        let snapshot = first.snapshot();

        let mut resumed = ProjectionRunner::resume(TickCounter(Partitioning::PerStream), snapshot);
        let mut out = Vec::new();
        resumed.apply(&event("Clock-a", "Tick", 1), &mut out).unwrap();
        resumed.apply(&event("Clock-a", "Tick", 2), &mut out).unwrap();

        assert_eq!(resumed.state("Clock-a"), Some(&2));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn rebuild_matches_incremental_run() {
        let events: Vec<_> = (1..=5).map(|p| event("Clock-a", "Tick", p)).collect();

        let rebuilt = ProjectionRunner::rebuild_from_scratch(
            TickCounter(Partitioning::PerStream),
            &events,
            &mut DiscardEmitter,
        )
        .unwrap();

        assert_eq!(rebuilt.state("Clock-a"), Some(&5));
        assert_eq!(rebuilt.last_position(), Some(5));
    }
}
