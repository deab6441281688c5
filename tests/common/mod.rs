//! Shared state, transitions and pipeline stages for integration tests.

#![allow(dead_code, unused_imports)]

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use unidux::{
    Action, DispatchError, DispatchOutcome, Dispatchable, Middleware, Next, StoreHandle,
};

pub type Trace = Arc<Mutex<Vec<String>>>;

pub fn new_trace() -> Trace {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn trace_entries(trace: &Trace) -> Vec<String> {
    trace.lock().clone()
}

/// Counter state advanced by `INC` and `ADD {amount}` records.
pub fn counter(state: Option<i64>, action: &Action) -> i64 {
    let count = state.unwrap_or(0);
    match action.kind() {
        Some("INC") => count + 1,
        Some("ADD") => {
            count
                + action
                    .value()
                    .get("amount")
                    .and_then(Value::as_i64)
                    .unwrap_or(0)
        }
        _ => count,
    }
}

/// Stage that records its traversal, optionally consuming one discriminant.
pub struct ProbeStage {
    name: &'static str,
    trace: Trace,
    block_kind: Option<&'static str>,
}

impl ProbeStage {
    pub fn new(name: &'static str, trace: &Trace) -> Self {
        Self {
            name,
            trace: Arc::clone(trace),
            block_kind: None,
        }
    }

    /// Like [`ProbeStage::new`], but records whose kind equals `kind` are
    /// consumed instead of forwarded.
    pub fn blocking(name: &'static str, trace: &Trace, kind: &'static str) -> Self {
        Self {
            name,
            trace: Arc::clone(trace),
            block_kind: Some(kind),
        }
    }
}

impl<S: Clone + Send + Sync + 'static> Middleware<S> for ProbeStage {
    fn handle(
        &self,
        _store: &StoreHandle<S>,
        next: Next<S>,
        action: Dispatchable<S>,
    ) -> Result<DispatchOutcome, DispatchError> {
        if let Dispatchable::Action(record) = &action {
            if let Some(blocked) = self.block_kind {
                if record.kind() == Some(blocked) {
                    self.trace.lock().push(format!("{}:blocked", self.name));
                    return Ok(DispatchOutcome::Returned(Value::Null));
                }
            }
        }
        self.trace.lock().push(format!("{}:before", self.name));
        let result = next.dispatch(action);
        self.trace.lock().push(format!("{}:after", self.name));
        result
    }
}

/// Stage that records the kind of everything passing through it.
pub struct KindRecorder {
    seen: Trace,
}

impl KindRecorder {
    pub fn new(seen: &Trace) -> Self {
        Self {
            seen: Arc::clone(seen),
        }
    }
}

impl<S: Clone + Send + Sync + 'static> Middleware<S> for KindRecorder {
    fn handle(
        &self,
        _store: &StoreHandle<S>,
        next: Next<S>,
        action: Dispatchable<S>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let kind = match &action {
            Dispatchable::Action(record) => record.kind().unwrap_or("<untyped>").to_owned(),
            Dispatchable::Thunk(_) => "<thunk>".to_owned(),
        };
        self.seen.lock().push(kind);
        next.dispatch(action)
    }
}
