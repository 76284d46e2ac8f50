use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{EmitError, EmittedEvent, EventEnvelope};

/// How a projection keys its state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Partitioning {
    /// One state per source stream.
    PerStream,
    /// One state for the whole source category.
    Category,
}

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("stream '{stream_id}' is not in category '{expected}'")]
    CategoryMismatch { expected: String, stream_id: String },

    #[error("failed to serialize read model state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Result of folding one event: the next state and at most one derived fact.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction<S> {
    pub state: S,
    pub emitted: Option<EmittedEvent>,
}

impl<S> Reduction<S> {
    /// The event was not handled: state is passed through, nothing is emitted.
    pub fn ignored(state: S) -> Self {
        Self { state, emitted: None }
    }

    pub fn emitted(state: S, fact: EmittedEvent) -> Self {
        Self {
            state,
            emitted: Some(fact),
        }
    }
}

/// A projection folds a category's events into read-model state.
///
/// Projections implement the **CQRS read model pattern**: the write side records
/// facts in streams, a projection turns them into query-shaped snapshots and
/// re-emits those snapshots as new streams.
///
/// ## Purity
///
/// [`reduce`](Projection::reduce) is a pure function `(state, event) -> (state, facts)`.
/// It performs no IO and keeps no hidden state; the host owns the per-key state
/// (see [`ProjectionRunner`](crate::ProjectionRunner)) and threads it through.
/// Replaying the same events from [`init`](Projection::init) always yields the
/// same states and the same facts.
///
/// ## Unknown events
///
/// Event types the projection does not handle must be passed through untouched
/// ([`Reduction::ignored`]). Bodies are not validated.
pub trait Projection {
    type State: Clone + core::fmt::Debug + Serialize + DeserializeOwned;

    /// Stable projection name (checkpoint key).
    fn name(&self) -> &str;

    /// Category whose streams feed this projection.
    fn source_category(&self) -> &str;

    fn partitioning(&self) -> Partitioning;

    /// State for a key that has not seen any event yet.
    fn init(&self) -> Self::State;

    /// Fold one event into `state`.
    fn reduce(
        &self,
        state: Self::State,
        event: &EventEnvelope,
    ) -> Result<Reduction<Self::State>, ProjectionError>;

    /// State key for `event` under this projection's partitioning.
    fn partition_key(&self, event: &EventEnvelope) -> String {
        match self.partitioning() {
            Partitioning::PerStream => event.stream_id().to_string(),
            Partitioning::Category => self.source_category().to_owned(),
        }
    }
}
