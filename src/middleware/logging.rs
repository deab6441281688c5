//! Logging stage: structured before/after records around every dispatch.

use std::fmt;

use crate::action::Dispatchable;
use crate::error::DispatchError;
use crate::middleware::{Middleware, Next};
use crate::store::{DispatchOutcome, StoreHandle};

/// Logs state before and after each dispatch it forwards.
///
/// Emits `tracing` events at info level, so output routing and filtering
/// follow the subscriber the host application installs. The stage reads
/// state through `try_state` because it also observes the bootstrap
/// dispatch, which runs before the cell is seeded.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMiddleware;

impl<S> Middleware<S> for LoggingMiddleware
where
    S: Clone + Send + Sync + fmt::Debug + 'static,
{
    fn handle(
        &self,
        store: &StoreHandle<S>,
        next: Next<S>,
        action: Dispatchable<S>,
    ) -> Result<DispatchOutcome, DispatchError> {
        tracing::info!(before = ?store.try_state(), action = %action, "dispatching");
        match next.dispatch(action) {
            Ok(outcome) => {
                tracing::info!(after = ?store.try_state(), ?outcome, "dispatched");
                Ok(outcome)
            }
            Err(error) => {
                tracing::warn!(%error, "dispatch rejected");
                Err(error)
            }
        }
    }
}
