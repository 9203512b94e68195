//! Store-level filters.
//!
//! A [`Filter`] is the conjunction of field constraints built from a
//! request's decoded predicates. Range predicates contribute one constraint
//! per present bound, so `[1980:2008]` becomes `>= 1980` and `< 2008` while
//! `[:2008]` becomes only `< 2008`.

use super::decoder::{Condition, QueryPredicate, Scalar};
use crate::record::LogRecord;
use crate::value::Value;
use std::cmp::Ordering;

/// A comparison against a single operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Value equals the operand.
    Eq(Scalar),
    /// Value is greater than or equal to the operand (inclusive lower bound).
    Gte(Scalar),
    /// Value is strictly less than the operand (exclusive upper bound).
    Lt(Scalar),
}

impl Constraint {
    /// Tests a stored value against this constraint.
    ///
    /// Array values match when any element matches. Values of a kind that
    /// cannot be compared with the operand never match.
    pub fn matches(&self, value: &Value) -> bool {
        if let Value::Array(items) = value {
            return items.iter().any(|item| self.matches(item));
        }
        let (operand, accept): (&Scalar, fn(Ordering) -> bool) = match self {
            Constraint::Eq(operand) => (operand, Ordering::is_eq),
            Constraint::Gte(operand) => (operand, Ordering::is_ge),
            Constraint::Lt(operand) => (operand, Ordering::is_lt),
        };
        compare(value, operand).is_some_and(accept)
    }
}

/// Orders a stored value relative to a query operand.
///
/// Numbers compare numerically across integer and float; text compares
/// lexicographically, with record identifiers taking part through their
/// textual form. Every other pairing is incomparable.
fn compare(value: &Value, operand: &Scalar) -> Option<Ordering> {
    match (value, operand) {
        (Value::Integer(a), Scalar::Int(b)) => Some(a.cmp(b)),
        (Value::Integer(a), Scalar::Float(b)) => compare_int_float(*a, *b),
        (Value::Float(a), Scalar::Int(b)) => compare_int_float(*b, *a).map(Ordering::reverse),
        (Value::Float(a), Scalar::Float(b)) => a.partial_cmp(b),
        (Value::Text(a), Scalar::Text(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Id(id), Scalar::Text(b)) => Some(id.to_string().as_str().cmp(b.as_str())),
        _ => None,
    }
}

/// Orders an integer against a float without rounding the integer.
///
/// Casting to `f64` would merge integers above 2^53, so the float is split
/// into whole and fractional parts instead. NaN is incomparable.
fn compare_int_float(int: i64, float: f64) -> Option<Ordering> {
    // 2^63, the first float past i64::MAX
    const I64_END: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() {
        return None;
    }
    if float >= I64_END {
        return Some(Ordering::Less);
    }
    if float < -I64_END {
        return Some(Ordering::Greater);
    }
    let whole = float.trunc();
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(float - whole)),
        unequal => Some(unequal),
    }
}

/// A constraint on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConstraint {
    /// Field path the constraint applies to.
    pub field: String,
    /// The comparison.
    pub constraint: Constraint,
}

impl FieldConstraint {
    /// Tests a record. A missing field never matches.
    pub fn matches(&self, record: &LogRecord) -> bool {
        record
            .lookup(&self.field)
            .is_some_and(|value| self.constraint.matches(value))
    }
}

/// Conjunction of field constraints. An empty filter matches every record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    constraints: Vec<FieldConstraint>,
}

impl Filter {
    /// A filter that matches every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Returns the constraints in the order they were added.
    pub fn constraints(&self) -> &[FieldConstraint] {
        &self.constraints
    }

    /// Returns true if the filter has no constraints.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Tests whether every constraint holds for the record.
    pub fn matches(&self, record: &LogRecord) -> bool {
        self.constraints.iter().all(|c| c.matches(record))
    }
}

/// Builds a [`Filter`] from decoded predicates.
///
/// Predicates naming the same field are all kept, even when the result is
/// unsatisfiable.
#[derive(Debug, Default)]
pub struct FilterBuilder {
    constraints: Vec<FieldConstraint>,
}

impl FilterBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate.
    pub fn push(&mut self, predicate: QueryPredicate) -> &mut Self {
        let QueryPredicate {
            field, condition, ..
        } = predicate;
        match condition {
            Condition::Exact(operand) => self.add(field, Constraint::Eq(operand)),
            Condition::Range { lower, upper } => {
                if let Some(lower) = lower {
                    self.add(field.clone(), Constraint::Gte(lower));
                }
                if let Some(upper) = upper {
                    self.add(field, Constraint::Lt(upper));
                }
            }
        }
        self
    }

    /// Adds a predicate, builder style.
    #[must_use]
    pub fn with(mut self, predicate: QueryPredicate) -> Self {
        self.push(predicate);
        self
    }

    fn add(&mut self, field: String, constraint: Constraint) {
        self.constraints.push(FieldConstraint { field, constraint });
    }

    /// Finishes the filter.
    #[must_use]
    pub fn build(self) -> Filter {
        Filter {
            constraints: self.constraints,
        }
    }
}

impl FromIterator<QueryPredicate> for Filter {
    fn from_iter<T: IntoIterator<Item = QueryPredicate>>(iter: T) -> Self {
        let mut builder = FilterBuilder::new();
        for predicate in iter {
            builder.push(predicate);
        }
        builder.build()
    }
}
