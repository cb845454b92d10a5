//! # Queries
//!
//! Predicates and ordering for document queries.
//!
//! The query language is deliberately small - equality and closed/open
//! range bounds on a named top-level field - because that is all the
//! hosted store guarantees without a composite index. Anything richer
//! (matching inside arrays, cross-field conditions) is done in memory by
//! the repositories.

use std::cmp::Ordering;

use serde_json::Value;

use crate::document::Fields;

// =============================================================================
// Predicates
// =============================================================================

/// Comparison operator for a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    /// Greater-or-equal (range lower bound).
    Gte,
    /// Less-or-equal (range upper bound).
    Lte,
}

impl Op {
    /// True for the range operators, which participate in the
    /// composite-index requirement.
    pub const fn is_range(&self) -> bool {
        !matches!(self, Op::Eq)
    }
}

/// One field condition in a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate {
            field: field.into(),
            op: Op::Eq,
            value: value.into(),
        }
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate {
            field: field.into(),
            op: Op::Gte,
            value: value.into(),
        }
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate {
            field: field.into(),
            op: Op::Lte,
            value: value.into(),
        }
    }

    /// Evaluates this predicate against a document's fields.
    ///
    /// Range comparisons across mismatched value types (or on a missing
    /// field) never match - same behavior as the hosted store.
    pub fn matches(&self, fields: &Fields) -> bool {
        let Some(actual) = fields.get(&self.field) else {
            return false;
        };
        match self.op {
            Op::Eq => actual == &self.value,
            Op::Gte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Op::Lte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

// =============================================================================
// Ordering
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Result ordering on a named field. Documents missing the field (or with
/// an incomparable value) sort last regardless of direction.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

/// Compares two JSON values of the same scalar type.
///
/// Numbers compare numerically, strings lexicographically (RFC 3339
/// timestamps order correctly this way), booleans false-before-true.
/// Mixed or non-scalar types are incomparable.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64().partial_cmp(&y.as_f64()),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
