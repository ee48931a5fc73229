//! Row filtering (verb module)
//!
//! The filter matcher decides whether one field value satisfies a filter
//! spec; the context filter narrows a row sequence to the rows matching a
//! context, honoring only the fields of a given grain. Both are pure; the
//! context filter is lazy and does no work until the iterator is consumed.

use std::cmp::Ordering;

use crate::context::{FilterContext, FilterSpec, RangeSpec};
use crate::dataset::{Row, Value};

/// Check whether a single field value satisfies a filter spec
///
/// Scalars match by strict equality. Range specs with `from`/`to` are an
/// inclusive range; otherwise every present comparison bound (`gte`, `lte`,
/// `gt`, `lt`) must hold. A bound against an incomparable value (type
/// mismatch, null) fails.
pub fn matches_filter(value: &Value, spec: &FilterSpec) -> bool {
    match spec {
        FilterSpec::Scalar(expected) => value == expected,
        FilterSpec::Range(range) => matches_range(value, range),
    }
}

fn matches_range(value: &Value, range: &RangeSpec) -> bool {
    // from/to take precedence; the comparison bounds are not consulted
    if range.from.is_some() || range.to.is_some() {
        if let Some(from) = &range.from {
            if !cmp(value, from, &[Ordering::Greater, Ordering::Equal]) {
                return false;
            }
        }
        if let Some(to) = &range.to {
            if !cmp(value, to, &[Ordering::Less, Ordering::Equal]) {
                return false;
            }
        }
        return true;
    }

    if let Some(bound) = &range.gte {
        if !cmp(value, bound, &[Ordering::Greater, Ordering::Equal]) {
            return false;
        }
    }
    if let Some(bound) = &range.lte {
        if !cmp(value, bound, &[Ordering::Less, Ordering::Equal]) {
            return false;
        }
    }
    if let Some(bound) = &range.gt {
        if !cmp(value, bound, &[Ordering::Greater]) {
            return false;
        }
    }
    if let Some(bound) = &range.lt {
        if !cmp(value, bound, &[Ordering::Less]) {
            return false;
        }
    }
    true
}

fn cmp(value: &Value, bound: &Value, accept: &[Ordering]) -> bool {
    match value.partial_cmp(bound) {
        Some(ordering) => accept.contains(&ordering),
        None => false,
    }
}

/// Narrow rows to those matching the context, honoring only grain fields
///
/// Context keys absent from the grain are ignored entirely, as are keys
/// whose value is a null scalar. A field missing from a row reads as null.
/// The returned iterator is lazy; an empty input yields an empty sequence.
pub fn filter_rows<'a>(
    rows: &'a [Row],
    context: &'a FilterContext,
    grain: &'a [String],
) -> impl Iterator<Item = &'a Row> + 'a {
    rows.iter().filter(move |row| {
        context.iter().all(|(field, spec)| {
            if spec.is_null() || !grain.iter().any(|g| g == field) {
                return true;
            }
            matches_filter(row.get(field).unwrap_or(&Value::NULL), spec)
        })
    })
}
