//! Delay stage: holds every dispatch for a fixed duration.

use std::time::Duration;

use crate::action::Dispatchable;
use crate::error::DispatchError;
use crate::middleware::{Middleware, Next};
use crate::store::{DispatchOutcome, StoreHandle};

/// Defers every dispatch it sees by a fixed delay.
///
/// The stage moves the continuation into a spawned task, so `dispatch`
/// returns [`DispatchOutcome::Deferred`] immediately and the action reaches
/// the inner stages once the delay elapses. State reads issued in between
/// see the undelayed state. Requires a Tokio runtime; the delay clock
/// follows the runtime's, so paused-time tests control it.
///
/// Errors surfacing after the delay have no caller left to return to and
/// are logged at warn level instead.
#[derive(Debug, Clone, Copy)]
pub struct DelayMiddleware {
    delay: Duration,
}

impl DelayMiddleware {
    /// A stage delaying each dispatch by `delay`.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl<S: Clone + Send + Sync + 'static> Middleware<S> for DelayMiddleware {
    fn handle(
        &self,
        _store: &StoreHandle<S>,
        next: Next<S>,
        action: Dispatchable<S>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(error) = next.dispatch(action) {
                tracing::warn!(%error, "delayed dispatch rejected");
            }
        });
        Ok(DispatchOutcome::Deferred)
    }
}
