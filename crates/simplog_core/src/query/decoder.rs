//! Query argument decoding.
//!
//! A query argument is a raw `key=value` pair from the request URL. The key
//! names a field and may carry a type suffix; the value is either a literal
//! or a bracketed half-open range:
//!
//! | argument | predicate |
//! |---|---|
//! | `title=Frozen` | `title == "Frozen"` |
//! | `year:int=1984` | `year == 1984` |
//! | `score:float=[0.5:]` | `score >= 0.5` |
//! | `year:int=[1980:2008]` | `1980 <= year < 2008` |

use crate::error::{CoreError, CoreResult};
use std::collections::HashSet;
use std::fmt;

/// Declared type of a query value, selected by the key suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// No suffix: the value is used as text.
    String,
    /// `:int` suffix.
    Int,
    /// `:float` suffix.
    Float,
}

impl ValueType {
    const SUFFIXES: [(&'static str, ValueType); 2] =
        [(":int", ValueType::Int), (":float", ValueType::Float)];

    /// Splits a raw key into field name and declared type.
    pub fn split_key(key: &str) -> (&str, ValueType) {
        Self::SUFFIXES
            .iter()
            .find_map(|(suffix, ty)| key.strip_suffix(suffix).map(|field| (field, *ty)))
            .unwrap_or((key, ValueType::String))
    }

    /// Converts text to a scalar of this type.
    pub fn convert(self, text: &str) -> Option<Scalar> {
        match self {
            ValueType::String => Some(Scalar::Text(text.to_string())),
            ValueType::Int => text.parse().ok().map(Scalar::Int),
            ValueType::Float => text.parse().ok().map(Scalar::Float),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Float => "float",
        })
    }
}

/// A typed query operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Text operand.
    Text(String),
    /// Integer operand.
    Int(i64),
    /// Float operand.
    Float(f64),
}

/// The condition a predicate places on its field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the operand.
    Exact(Scalar),
    /// Field lies in `[lower, upper)`. At least one bound is present.
    Range {
        /// Inclusive lower bound.
        lower: Option<Scalar>,
        /// Exclusive upper bound.
        upper: Option<Scalar>,
    },
}

/// A single field-level matching condition decoded from one query argument.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPredicate {
    /// Field name, type suffix stripped.
    pub field: String,
    /// Declared operand type.
    pub value_type: ValueType,
    /// What the field must satisfy.
    pub condition: Condition,
}

/// Splits `[A:B]` into its two segments.
///
/// Anything else, including brackets with zero or several colons, is not a
/// range and decodes as an exact value.
fn range_segments(value: &str) -> Option<(&str, &str)> {
    let inner = value.strip_prefix('[')?.strip_suffix(']')?;
    let (lower, upper) = inner.split_once(':')?;
    if upper.contains(':') {
        return None;
    }
    Some((lower, upper))
}

/// Decodes one raw query argument into a predicate.
///
/// # Errors
///
/// Returns [`CoreError::InvalidQueryValue`] when the value (or a non-empty
/// range bound) does not parse as the declared type, or when a range has
/// neither bound.
pub fn decode_argument(key: &str, value: &str) -> CoreResult<QueryPredicate> {
    let (field, value_type) = ValueType::split_key(key);

    let convert = |text: &str| {
        value_type.convert(text).ok_or_else(|| {
            CoreError::invalid_query_value(
                key,
                value,
                format!("{text:?} is not a valid {value_type}"),
            )
        })
    };

    let condition = match range_segments(value) {
        Some((lower, upper)) => {
            let lower = (!lower.is_empty()).then(|| convert(lower)).transpose()?;
            let upper = (!upper.is_empty()).then(|| convert(upper)).transpose()?;
            if lower.is_none() && upper.is_none() {
                return Err(CoreError::invalid_query_value(
                    key,
                    value,
                    "range needs at least one bound",
                ));
            }
            Condition::Range { lower, upper }
        }
        None => Condition::Exact(convert(value)?),
    };

    Ok(QueryPredicate {
        field: field.to_string(),
        value_type,
        condition,
    })
}

/// Decodes every query argument of a request, in order.
///
/// Only the first value of a repeated key is used; later ones are ignored.
/// Keys that differ only in their suffix (`year` and `year:int`) are
/// distinct and both produce predicates.
///
/// # Errors
///
/// Fails on the first argument that does not decode.
pub fn decode_arguments<I, K, V>(pairs: I) -> CoreResult<Vec<QueryPredicate>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut predicates = Vec::new();
    for (key, value) in pairs {
        let key = key.as_ref();
        if !seen.insert(key.to_string()) {
            continue;
        }
        predicates.push(decode_argument(key, value.as_ref())?);
    }
    Ok(predicates)
}
