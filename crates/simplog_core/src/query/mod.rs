//! Query decoding and filtering.
//!
//! Raw query arguments are decoded into [`QueryPredicate`]s, which a
//! [`FilterBuilder`] folds into a single [`Filter`] for the store.

mod decoder;
mod filter;

pub use decoder::{decode_argument, decode_arguments, Condition, QueryPredicate, Scalar, ValueType};
pub use filter::{Constraint, FieldConstraint, Filter, FilterBuilder};

use crate::error::CoreResult;

/// Decodes query arguments and builds the resulting filter in one step.
///
/// # Errors
///
/// Fails if any argument does not decode.
pub fn build_filter<I, K, V>(pairs: I) -> CoreResult<Filter>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    Ok(decode_arguments(pairs)?.into_iter().collect())
}
