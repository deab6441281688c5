//! Minimal unidirectional state container.
//!
//! One state cell per store, pure transition functions, listener-based
//! change notification and a composable middleware pipeline on the
//! dispatch path:
//!
//! ```text
//! ┌─────────┐     ┌──────────┐     ┌────────────┐     ┌───────────┐
//! │ Action  │ ──→ │ Pipeline │ ──→ │ Transition │ ──→ │ Listeners │
//! └─────────┘     └──────────┘     └────────────┘     └───────────┘
//!      ↑                                                    │
//!      └──────────────── follow-up dispatches ←─────────────┘
//! ```
//!
//! Actions are dynamically-typed JSON records carrying a `"type"`
//! discriminant, validated when dispatched. Typed action vocabularies map
//! onto them through serde tagged enums and stay typed everywhere except
//! the wire. Transition functions are pure; side effects live in
//! middleware stages and [`Thunk`]s, which dispatch follow-up actions
//! through the same pipeline.

mod action;
mod error;
mod listener;
pub mod middleware;
mod store;

pub use action::{Action, Dispatchable, Thunk};
pub use error::DispatchError;
pub use listener::Subscription;
pub use middleware::{
    DelayMiddleware, LoggingMiddleware, Middleware, Next, Pipeline, ThunkMiddleware,
};
pub use store::{DispatchOutcome, Store, StoreHandle};
