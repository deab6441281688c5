//! Thunk stage: runs deferred computations dispatched to the store.

use crate::action::Dispatchable;
use crate::error::DispatchError;
use crate::middleware::{Middleware, Next};
use crate::store::{DispatchOutcome, StoreHandle};

/// Intercepts dispatched [`Thunk`](crate::Thunk)s and runs them with a
/// handle to the store.
///
/// The thunk's return value travels back to the dispatcher as
/// [`DispatchOutcome::Returned`]; the thunk itself never reaches the core
/// dispatch. Plain action records pass through untouched. Install this
/// stage ahead of any stage that assumes it only sees records.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThunkMiddleware;

impl<S: Clone + Send + Sync + 'static> Middleware<S> for ThunkMiddleware {
    fn handle(
        &self,
        store: &StoreHandle<S>,
        next: Next<S>,
        action: Dispatchable<S>,
    ) -> Result<DispatchOutcome, DispatchError> {
        match action {
            Dispatchable::Thunk(thunk) => Ok(DispatchOutcome::Returned(thunk.run(store.clone()))),
            record => next.dispatch(record),
        }
    }
}
