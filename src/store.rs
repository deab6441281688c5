//! The state container.
//!
//! A [`Store`] owns a single state cell and the transition function that
//! advances it. Dispatches enter through the middleware pipeline; whatever
//! reaches the end of the pipeline is validated, reduced and announced to
//! listeners. Clones of a store share the same cell, so a store value works
//! as its own cheap handle.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::action::{Action, Dispatchable};
use crate::error::DispatchError;
use crate::listener::{ListenerRegistry, Subscription};
use crate::middleware::{Middleware, Next, Pipeline};

type Reducer<S> = Box<dyn Fn(Option<S>, &Action) -> S + Send + Sync>;

/// How a dispatch resolved, as seen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The action reached the transition function and listeners ran.
    Applied,
    /// A stage scheduled the dispatch to finish later; no state has
    /// changed by the time this is returned.
    Deferred,
    /// A stage consumed the dispatch and produced a value for the caller
    /// instead of forwarding it.
    Returned(serde_json::Value),
}

struct StoreInner<S> {
    state: RwLock<Option<S>>,
    reducer: Reducer<S>,
    listeners: Arc<ListenerRegistry>,
    stages: Arc<[Arc<dyn Middleware<S>>]>,
}

/// Single-cell state container with a middleware pipeline in front of it.
///
/// The transition function must be pure: next state from previous state and
/// action, no side effects, and no calls back into the container (it runs
/// under the cell's write lock). Side effects belong in middleware stages
/// and thunks. The container never catches a panicking transition; it
/// unwinds to the dispatcher with the previous state still in place.
#[derive(Clone)]
pub struct Store<S> {
    inner: Arc<StoreInner<S>>,
}

impl<S: Clone + Send + Sync + 'static> Store<S> {
    /// Creates a store with an empty pipeline.
    pub fn new(reducer: impl Fn(Option<S>, &Action) -> S + Send + Sync + 'static) -> Self {
        Self::with_pipeline(reducer, Pipeline::new())
    }

    /// Creates a store whose dispatches route through `pipeline`.
    ///
    /// Construction dispatches one bootstrap action, [`Action::INIT`],
    /// through the full pipeline. Its discriminant matches no application
    /// action, so the transition function falls through to its default arm
    /// and seeds the cell with the initial state.
    pub fn with_pipeline(
        reducer: impl Fn(Option<S>, &Action) -> S + Send + Sync + 'static,
        pipeline: Pipeline<S>,
    ) -> Self {
        let store = Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(None),
                reducer: Box::new(reducer),
                listeners: Arc::new(ListenerRegistry::new()),
                stages: pipeline.into_stages(),
            }),
        };
        match store.dispatch(Action::of(Action::INIT)) {
            Ok(DispatchOutcome::Applied) => {}
            Ok(outcome) => {
                tracing::debug!(?outcome, "bootstrap dispatch held up in the pipeline");
            }
            Err(error) => {
                tracing::warn!(%error, "bootstrap dispatch rejected by a stage");
            }
        }
        store
    }

    /// Routes an action or thunk through the pipeline.
    ///
    /// Returns once every synchronous stage has run. Stages that defer
    /// work report [`DispatchOutcome::Deferred`] and apply the action on
    /// their own schedule.
    ///
    /// Listeners may dispatch from inside their notification; the nested
    /// dispatch runs to completion, its own notification pass included,
    /// before the outer pass resumes.
    pub fn dispatch(
        &self,
        action: impl Into<Dispatchable<S>>,
    ) -> Result<DispatchOutcome, DispatchError> {
        Next::entry(self).dispatch(action.into())
    }

    /// Snapshot of the current state.
    ///
    /// Panics if the cell has never been seeded, which only happens when a
    /// pipeline stage deferred or consumed the bootstrap dispatch. Code
    /// running that early reads through [`Store::try_state`] instead.
    pub fn get_state(&self) -> S {
        self.try_state()
            .expect("state cell is empty: a stage deferred or consumed the bootstrap dispatch")
    }

    /// Snapshot of the current state, `None` before the bootstrap action
    /// has been applied.
    pub fn try_state(&self) -> Option<S> {
        self.inner.state.read().clone()
    }

    /// Registers a listener invoked after every applied transition.
    ///
    /// Listeners take no arguments; they read the store they captured. A
    /// listener holding its own clone of the store keeps the store alive
    /// until it is unsubscribed. The returned token removes the listener
    /// again. Dropping the token without calling
    /// [`Subscription::unsubscribe`] leaves the listener registered for
    /// the life of the store.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.inner.listeners.insert(listener);
        Subscription::new(Arc::downgrade(&self.inner.listeners), id)
    }

    pub(crate) fn stages(&self) -> Arc<[Arc<dyn Middleware<S>>]> {
        Arc::clone(&self.inner.stages)
    }

    /// End of the pipeline: validate, reduce, notify.
    pub(crate) fn core_dispatch(
        &self,
        action: Dispatchable<S>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let record = match action {
            Dispatchable::Action(record) => record,
            Dispatchable::Thunk(_) => {
                return Err(DispatchError::MalformedAction { found: "thunk" });
            }
        };
        record.validate()?;
        {
            // The write lock is held across the transition so readers see
            // either the previous or the next state, never a torn cell. A
            // panicking transition unwinds with the guard and leaves the
            // previous state in place.
            let mut cell = self.inner.state.write();
            let next = (self.inner.reducer)(cell.clone(), &record);
            *cell = Some(next);
        }
        self.inner.listeners.notify();
        Ok(DispatchOutcome::Applied)
    }
}

/// Store access granted to middleware stages and thunks.
///
/// Dispatching through the handle re-enters the pipeline at its first
/// stage, exactly like an outside dispatch.
#[derive(Clone)]
pub struct StoreHandle<S> {
    store: Store<S>,
}

impl<S: Clone + Send + Sync + 'static> StoreHandle<S> {
    pub(crate) fn new(store: Store<S>) -> Self {
        Self { store }
    }

    /// See [`Store::dispatch`].
    pub fn dispatch(
        &self,
        action: impl Into<Dispatchable<S>>,
    ) -> Result<DispatchOutcome, DispatchError> {
        self.store.dispatch(action)
    }

    /// See [`Store::get_state`].
    pub fn get_state(&self) -> S {
        self.store.get_state()
    }

    /// See [`Store::try_state`].
    pub fn try_state(&self) -> Option<S> {
        self.store.try_state()
    }
}
