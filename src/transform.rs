//! Context transforms (verb module)
//!
//! Pure rewrites of a filter context, the mechanism behind time-intelligence
//! metrics: year-to-date, prior-year, rolling windows. A transform never
//! mutates its input; composition threads the context left to right.
//!
//! Each transform only rewrites fields it can read as a scalar number. A
//! context that lacks the field, or carries it as a range or non-numeric
//! value, passes through unchanged.

use std::sync::Arc;

use crate::context::{FilterContext, FilterSpec, RangeSpec};
use crate::dataset::Value;

/// A pure context rewrite: `FilterContext` in, `FilterContext` out
pub type ContextTransformFn = Arc<dyn Fn(&FilterContext) -> FilterContext + Send + Sync>;

/// Year-to-date: cap `month` at its current value, keeping `year` intact
///
/// Requires both `year` and `month` as scalar numbers; otherwise the context
/// is returned unchanged.
pub fn ytd() -> ContextTransformFn {
    Arc::new(|context| {
        let (Some(_), Some(month)) = (
            scalar_number(context, "year"),
            scalar_number(context, "month"),
        ) else {
            return context.clone();
        };
        let mut out = context.clone();
        out.insert(
            "month".to_string(),
            FilterSpec::Range(RangeSpec::lte(month)),
        );
        out
    })
}

/// Prior year: decrement `year` by one
pub fn last_year() -> ContextTransformFn {
    shift_year(-1)
}

/// Shift `year` by a fixed offset (negative values reach into the past)
pub fn shift_year(offset: i32) -> ContextTransformFn {
    Arc::new(move |context| {
        let Some(year) = scalar_number(context, "year") else {
            return context.clone();
        };
        let mut out = context.clone();
        out.insert(
            "year".to_string(),
            FilterSpec::Scalar(Value::Number(year + f64::from(offset))),
        );
        out
    })
}

/// Shift `month` by a fixed offset. Plain arithmetic; the offset does not
/// roll over year boundaries.
pub fn shift_month(offset: i32) -> ContextTransformFn {
    Arc::new(move |context| {
        let Some(month) = scalar_number(context, "month") else {
            return context.clone();
        };
        let mut out = context.clone();
        out.insert(
            "month".to_string(),
            FilterSpec::Scalar(Value::Number(month + f64::from(offset))),
        );
        out
    })
}

/// Rolling window of `months` months ending at the current month, within the
/// current year: `month` becomes `[month - months + 1, month]` inclusive.
pub fn rolling_months(months: u32) -> ContextTransformFn {
    Arc::new(move |context| {
        let Some(month) = scalar_number(context, "month") else {
            return context.clone();
        };
        let mut out = context.clone();
        out.insert(
            "month".to_string(),
            FilterSpec::Range(RangeSpec::between(
                month - f64::from(months) + 1.0,
                month,
            )),
        );
        out
    })
}

/// Compose transforms into one, applied left to right: the second transform
/// sees the first one's output.
pub fn compose(transforms: Vec<ContextTransformFn>) -> ContextTransformFn {
    Arc::new(move |context| {
        transforms
            .iter()
            .fold(context.clone(), |current, transform| transform(&current))
    })
}

fn scalar_number(context: &FilterContext, field: &str) -> Option<f64> {
    match context.get(field) {
        Some(FilterSpec::Scalar(Value::Number(n))) => Some(*n),
        _ => None,
    }
}
