//! The condition gate checked before every live call.

use segment_config::{Condition, Predicate};
use serde_json::Value;

use crate::error::SegmentError;

/// An optional, already-resolved predicate.
#[derive(Clone, Default)]
pub struct ConditionGate {
    predicate: Option<Predicate>,
}

impl ConditionGate {
    /// A gate that lets every call through.
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }

    /// A gate backed by `predicate`.
    #[must_use]
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate: Some(predicate),
        }
    }

    /// Build the gate for a configured condition.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::GateEvaluation`] for `method` if the condition
    /// still has unresolved dependencies.
    pub fn from_condition(condition: Option<&Condition>, method: &str) -> Result<Self, SegmentError> {
        match condition {
            None => Ok(Self::open()),
            Some(Condition::Predicate(predicate)) => Ok(Self::new(predicate.clone())),
            Some(Condition::Injectable(_)) => Err(SegmentError::GateEvaluation {
                method: method.to_string(),
                source: "condition has unresolved dependencies".into(),
            }),
        }
    }

    /// Whether `method` with `arguments` may reach the library.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::GateEvaluation`] if the predicate fails.
    pub fn allows(&self, method: &str, arguments: &[Value]) -> Result<bool, SegmentError> {
        match &self.predicate {
            None => Ok(true),
            Some(predicate) => predicate(method, arguments).map_err(|err| SegmentError::GateEvaluation {
                method: method.to_string(),
                source: err.into(),
            }),
        }
    }
}
