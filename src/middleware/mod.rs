//! Middleware pipeline in front of the core dispatch.
//!
//! Stages wrap dispatch in onion order: the stage added first sees every
//! dispatch first and its result last. Each stage receives the dispatched
//! value, a [`Next`] continuation for the remainder of the pipeline and a
//! [`StoreHandle`] whose own `dispatch` re-enters the pipeline at the top.
//!
//! ```text
//! dispatch ──→ A ──→ B ──→ C ──→ validate → reduce → notify
//!   result ←── A ←── B ←── C ←──┘
//! ```
//!
//! A stage can forward unchanged, transform before forwarding, consume the
//! dispatch and return its own outcome, or hold the continuation and
//! forward later from a task.

mod delay;
mod logging;
mod thunk;

pub use delay::DelayMiddleware;
pub use logging::LoggingMiddleware;
pub use thunk::ThunkMiddleware;

use std::sync::Arc;

use crate::action::Dispatchable;
use crate::error::DispatchError;
use crate::store::{DispatchOutcome, Store, StoreHandle};

/// One stage of the dispatch pipeline.
pub trait Middleware<S>: Send + Sync {
    /// Handles a single dispatch.
    ///
    /// Forward with `next.dispatch(action)` to keep the dispatch moving
    /// toward the core; return without forwarding to consume it. Dispatches
    /// issued through `store` start over at the first stage, so follow-up
    /// actions get the full pipeline treatment.
    fn handle(
        &self,
        store: &StoreHandle<S>,
        next: Next<S>,
        action: Dispatchable<S>,
    ) -> Result<DispatchOutcome, DispatchError>;
}

/// Continuation for the remainder of the pipeline.
///
/// Owned rather than borrowed so a stage can move it into a spawned task
/// and forward the dispatch later. Forwarding consumes the action but not
/// the continuation; clone it to forward more than once.
#[derive(Clone)]
pub struct Next<S> {
    store: Store<S>,
    stages: Arc<[Arc<dyn Middleware<S>>]>,
    index: usize,
}

impl<S: Clone + Send + Sync + 'static> Next<S> {
    pub(crate) fn entry(store: &Store<S>) -> Self {
        Next {
            store: store.clone(),
            stages: store.stages(),
            index: 0,
        }
    }

    /// Forwards the dispatch to the next stage, or into the core dispatch
    /// once no stages remain.
    pub fn dispatch(&self, action: Dispatchable<S>) -> Result<DispatchOutcome, DispatchError> {
        match self.stages.get(self.index) {
            Some(stage) => {
                let rest = Next {
                    store: self.store.clone(),
                    stages: Arc::clone(&self.stages),
                    index: self.index + 1,
                };
                stage.handle(&StoreHandle::new(self.store.clone()), rest, action)
            }
            None => self.store.core_dispatch(action),
        }
    }
}

/// Ordered stage list, assembled with the builder pattern and handed to
/// `Store::with_pipeline`.
pub struct Pipeline<S> {
    stages: Vec<Arc<dyn Middleware<S>>>,
}

impl<S> Pipeline<S> {
    /// An empty pipeline; dispatches go straight to the core.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage. Stages added earlier sit further out.
    pub fn with(mut self, stage: impl Middleware<S> + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub(crate) fn into_stages(self) -> Arc<[Arc<dyn Middleware<S>>]> {
        self.stages.into()
    }
}

impl<S> Default for Pipeline<S> {
    fn default() -> Self {
        Self::new()
    }
}
