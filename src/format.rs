//! Display formatting (verb module)

/// Format a metric value for display
///
/// Recognized tags: `currency` ("$" prefix, two decimals), `integer`
/// (rounded, no decimals), `percent` ("%" suffix, two decimals). Any other
/// tag, or no tag, renders the plain numeric string. Null and NaN input
/// always yield null output regardless of tag.
pub fn format_value(value: Option<f64>, format: Option<&str>) -> Option<String> {
    let value = value?;
    if value.is_nan() {
        return None;
    }
    let formatted = match format {
        Some("currency") => format!("${:.2}", value),
        Some("integer") => format!("{:.0}", value),
        Some("percent") => format!("{:.2}%", value),
        _ => format!("{}", value),
    };
    Some(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency() {
        assert_eq!(format_value(Some(2550.0), Some("currency")).as_deref(), Some("$2550.00"));
        assert_eq!(format_value(Some(0.0), Some("currency")).as_deref(), Some("$0.00"));
    }

    #[test]
    fn test_integer_rounds() {
        assert_eq!(format_value(Some(115.909), Some("integer")).as_deref(), Some("116"));
        assert_eq!(format_value(Some(3.0), Some("integer")).as_deref(), Some("3"));
    }

    #[test]
    fn test_percent() {
        assert_eq!(
            format_value(Some(115.90909090909092), Some("percent")).as_deref(),
            Some("115.91%")
        );
    }

    #[test]
    fn test_unrecognized_tag_plain_string() {
        assert_eq!(format_value(Some(2100.0), None).as_deref(), Some("2100"));
        assert_eq!(format_value(Some(2100.0), Some("exotic")).as_deref(), Some("2100"));
        assert_eq!(format_value(Some(2.5), None).as_deref(), Some("2.5"));
    }

    #[test]
    fn test_null_and_nan_yield_null() {
        for tag in [None, Some("currency"), Some("integer"), Some("percent")] {
            assert_eq!(format_value(None, tag), None);
            assert_eq!(format_value(Some(f64::NAN), tag), None);
        }
    }
}
