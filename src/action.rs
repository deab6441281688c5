//! Action records and the values a store accepts for dispatch.
//!
//! An [`Action`] is a dynamically-typed JSON record with a mandatory `"type"`
//! discriminant; everything else about its shape is up to the application.
//! Typed action vocabularies stay typed at the edges through [`Action::typed`]
//! and [`Action::decode`], while the store itself only ever enforces the
//! permissive record contract from [`Action::validate`].
//!
//! A [`Thunk`] is the other dispatchable kind: a deferred computation that
//! receives a store handle instead of being reduced. The two are unified by
//! [`Dispatchable`], which is what every dispatch entry point accepts.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DispatchError;
use crate::store::StoreHandle;

/// Key every action record must carry.
const TYPE_FIELD: &str = "type";

/// A dispatchable action record.
///
/// Wraps a [`serde_json::Value`] without constraining it at construction
/// time; validation happens on dispatch so that malformed records can be
/// built, logged and rejected uniformly.
#[derive(Debug, Clone, PartialEq)]
pub struct Action(Value);

impl Action {
    /// Discriminant of the bootstrap action dispatched when a store is
    /// created. Namespaced so application discriminants cannot collide
    /// with it by accident.
    pub const INIT: &'static str = "@@unidux/INIT";

    /// Builds a bare record carrying only the given discriminant.
    pub fn of(kind: impl Into<String>) -> Self {
        let mut record = Map::new();
        record.insert(TYPE_FIELD.to_owned(), Value::String(kind.into()));
        Action(Value::Object(record))
    }

    /// Serializes a typed action into a record.
    ///
    /// Works with internally tagged enums (`#[serde(tag = "type")]`) so a
    /// typed vocabulary produces records that pass [`Action::validate`]
    /// without further ceremony.
    pub fn typed<T: Serialize>(action: &T) -> serde_json::Result<Self> {
        Ok(Action(serde_json::to_value(action)?))
    }

    /// The record's discriminant, when present and a string.
    pub fn kind(&self) -> Option<&str> {
        self.0.get(TYPE_FIELD).and_then(Value::as_str)
    }

    /// Attempts to read the record back into a typed action.
    ///
    /// Returns `None` for records outside the vocabulary `T`, including
    /// discriminant values `T` does not know. Transition functions use this
    /// to ignore foreign actions instead of failing on them.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.0.clone()).ok()
    }

    /// The raw record, for transition functions that inspect payload
    /// fields dynamically.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Checks the record contract: a JSON object with a `"type"` key.
    ///
    /// The discriminant's value is deliberately not inspected. A `null`,
    /// empty-string or even missing-from-vocabulary discriminant dispatches
    /// fine and falls through transition functions unmatched.
    pub fn validate(&self) -> Result<(), DispatchError> {
        let record = match &self.0 {
            Value::Object(record) => record,
            other => {
                return Err(DispatchError::MalformedAction {
                    found: json_kind(other),
                })
            }
        };
        if !record.contains_key(TYPE_FIELD) {
            return Err(DispatchError::MissingDiscriminant);
        }
        Ok(())
    }
}

impl From<Value> for Action {
    fn from(value: Value) -> Self {
        Action(value)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A deferred computation dispatched instead of an action record.
///
/// The thunk stage runs it with a handle to the owning store, so it can
/// read state and dispatch follow-up actions on its own schedule. Without
/// a thunk stage in the pipeline, dispatching one is a [`DispatchError`].
pub struct Thunk<S>(Box<dyn FnOnce(StoreHandle<S>) -> Value + Send>);

impl<S> Thunk<S> {
    /// Wraps a computation for dispatch.
    pub fn new(run: impl FnOnce(StoreHandle<S>) -> Value + Send + 'static) -> Self {
        Thunk(Box::new(run))
    }

    /// Consumes the thunk, running its computation.
    pub(crate) fn run(self, store: StoreHandle<S>) -> Value {
        (self.0)(store)
    }
}

impl<S> fmt::Debug for Thunk<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Thunk(..)")
    }
}

/// Everything a store accepts for dispatch: a record or a thunk.
///
/// Both [`Action`] and [`Thunk`] convert into this via `From`, so call
/// sites pass either directly to `dispatch`.
#[derive(Debug)]
pub enum Dispatchable<S> {
    /// A plain action record, bound for validation and the transition
    /// function.
    Action(Action),
    /// A deferred computation, bound for the thunk stage.
    Thunk(Thunk<S>),
}

impl<S> From<Action> for Dispatchable<S> {
    fn from(action: Action) -> Self {
        Dispatchable::Action(action)
    }
}

impl<S> From<Thunk<S>> for Dispatchable<S> {
    fn from(thunk: Thunk<S>) -> Self {
        Dispatchable::Thunk(thunk)
    }
}

impl<S> From<Value> for Dispatchable<S> {
    fn from(value: Value) -> Self {
        Dispatchable::Action(Action::from(value))
    }
}

impl<S> fmt::Display for Dispatchable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatchable::Action(action) => action.fmt(f),
            Dispatchable::Thunk(_) => f.write_str("<thunk>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;

    #[test]
    fn object_with_type_passes() {
        assert!(Action::from(json!({ "type": "PING" })).validate().is_ok());
    }

    #[test]
    fn null_discriminant_passes() {
        assert!(Action::from(json!({ "type": null })).validate().is_ok());
    }

    #[test]
    fn empty_discriminant_passes() {
        assert!(Action::from(json!({ "type": "" })).validate().is_ok());
    }

    #[test]
    fn non_objects_are_malformed() {
        let cases = [
            (json!(null), "null"),
            (json!(true), "boolean"),
            (json!(42), "number"),
            (json!("CREATE_NOTE"), "string"),
            (json!(["type", "PING"]), "array"),
        ];
        for (value, found) in cases {
            assert_eq!(
                Action::from(value).validate(),
                Err(DispatchError::MalformedAction { found }),
            );
        }
    }

    #[test]
    fn object_without_type_is_missing_discriminant() {
        assert_eq!(
            Action::from(json!({ "kind": "PING" })).validate(),
            Err(DispatchError::MissingDiscriminant),
        );
    }

    #[test]
    fn kind_reads_string_discriminants_only() {
        assert_eq!(Action::of("PING").kind(), Some("PING"));
        assert_eq!(Action::from(json!({ "type": 7 })).kind(), None);
        assert_eq!(Action::from(json!(null)).kind(), None);
    }

    #[test]
    fn bootstrap_record_is_valid() {
        let init = Action::of(Action::INIT);
        assert!(init.validate().is_ok());
        assert_eq!(init.kind(), Some("@@unidux/INIT"));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
    enum TestAction {
        OpenNote { id: u64 },
        CloseNote,
    }

    #[test]
    fn typed_actions_round_trip() {
        let action = Action::typed(&TestAction::OpenNote { id: 3 }).unwrap();
        assert!(action.validate().is_ok());
        assert_eq!(action.kind(), Some("OPEN_NOTE"));
        assert_eq!(action.decode::<TestAction>(), Some(TestAction::OpenNote { id: 3 }));
    }

    #[test]
    fn decode_ignores_foreign_records() {
        let foreign = Action::from(json!({ "type": "DELETE_NOTE", "id": 3 }));
        assert!(foreign.validate().is_ok());
        assert_eq!(foreign.decode::<TestAction>(), None);
    }

    #[test]
    fn raw_value_is_reachable_for_dynamic_payloads() {
        let action = Action::from(json!({ "type": "ADD", "amount": 5 }));
        assert_eq!(action.value()["amount"], json!(5));
    }

    #[test]
    fn display_shows_the_record() {
        let action = Action::of("PING");
        assert_eq!(action.to_string(), r#"{"type":"PING"}"#);
        let thunk: Dispatchable<()> = Thunk::new(|_| Value::Null).into();
        assert_eq!(thunk.to_string(), "<thunk>");
    }
}
