use std::fmt;

/// Runtime value. Only integers exist today, but the tagged representation
/// keeps the evaluator's signatures stable when further numeric kinds are
/// added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Value {
    Integer(i64),
}

impl Value {
    pub(super) fn as_int(self) -> i64 {
        match self {
            Value::Integer(value) => value,
        }
    }

    /// Truthiness of a condition: any non-zero value holds.
    pub(super) fn is_truthy(self) -> bool {
        match self {
            Value::Integer(value) => value != 0,
        }
    }

    /// Comparisons evaluate to integer 1 or 0.
    pub(super) fn from_bool(value: bool) -> Self {
        Value::Integer(if value { 1 } else { 0 })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
        }
    }
}
