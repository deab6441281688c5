//! Error types for the dispatch path.
//!
//! Every failure a dispatch can produce is enumerated here; anything not
//! representable as a `DispatchError` (a panicking transition function)
//! unwinds to the caller instead of being caught.

use thiserror::Error;

/// Errors raised while validating or routing a dispatched value.
///
/// Both variants are fatal to the dispatch that produced them: the error
/// propagates synchronously to the caller, the state cell is untouched and
/// no listeners are notified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The dispatched value is not an action-shaped record.
    ///
    /// Raised for JSON null, booleans, numbers, strings and arrays (arrays
    /// are rejected even though they are index-keyed mappings, to force
    /// explicit action objects), and for a thunk that reaches the core
    /// dispatch because no thunk stage is installed.
    #[error("action must be a plain object, got {found}")]
    MalformedAction {
        /// What the dispatched value turned out to be.
        found: &'static str,
    },

    /// The action record has no `"type"` field.
    ///
    /// Only strict absence of the key fails; a present-but-falsy value
    /// (`null`, `""`, `0`, `false`) passes.
    #[error("action is missing its \"type\" field")]
    MissingDiscriminant,
}
