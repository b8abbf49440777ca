//! Low-level normalization helpers for loosely-typed feed values.
//!
//! Category folding lives on [`menucat_core::Category`]; this module handles
//! the numeric side: tolerant float parsing and THC/CBD unit detection.

use menucat_core::{PotencyUnit, PotencyValue};

use crate::sources::RawNumber;

/// Parse a float out of a loosely-formatted string.
///
/// Strips every byte that is not an ASCII digit or `.`, then parses what
/// remains as `f64`. Tolerates unit and currency decoration: `"22%"` → 22,
/// `"100mg"` → 100, `"$12.50"` → 12.5. Returns `None` for empty input or
/// anything that still fails to parse (e.g. `"N/A"`, `"1.2.3"`).
#[must_use]
pub fn parse_loose_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Numeric value of a raw feed field, whichever form it arrived in.
#[must_use]
pub fn raw_number_value(raw: &RawNumber) -> Option<f64> {
    match raw {
        RawNumber::Num(n) => Some(*n),
        RawNumber::Text(s) => parse_loose_number(s),
    }
}

/// Unit a potency string is denominated in: `mg` anywhere in the original
/// text (case-insensitive) means milligrams, everything else is treated as
/// a percentage. Native numbers carry no unit hint and default to percent.
#[must_use]
pub fn detect_potency_unit(raw: &RawNumber) -> PotencyUnit {
    match raw.as_text() {
        Some(text) if text.to_lowercase().contains("mg") => PotencyUnit::Mg,
        _ => PotencyUnit::Percent,
    }
}

/// Interpret a raw THC/CBD field as a potency measurement.
///
/// Returns `None` when the field is absent or its numeric part is
/// unparseable; unit detection follows [`detect_potency_unit`].
#[must_use]
pub fn normalize_potency(raw: Option<&RawNumber>) -> Option<PotencyValue> {
    let raw = raw?;
    let value = raw_number_value(raw)?;
    Some(PotencyValue {
        value,
        unit: detect_potency_unit(raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_loose_number_plain() {
        assert_eq!(parse_loose_number("22"), Some(22.0));
        assert_eq!(parse_loose_number("22.4"), Some(22.4));
    }

    #[test]
    fn parse_loose_number_strips_percent_suffix() {
        assert_eq!(parse_loose_number("22%"), Some(22.0));
    }

    #[test]
    fn parse_loose_number_strips_mg_suffix() {
        assert_eq!(parse_loose_number("100mg"), Some(100.0));
        assert_eq!(parse_loose_number("100 mg"), Some(100.0));
    }

    #[test]
    fn parse_loose_number_strips_currency() {
        assert_eq!(parse_loose_number("$12.50"), Some(12.5));
    }

    #[test]
    fn parse_loose_number_empty_is_none() {
        assert_eq!(parse_loose_number(""), None);
        assert_eq!(parse_loose_number("   "), None);
    }

    #[test]
    fn parse_loose_number_no_digits_is_none() {
        assert_eq!(parse_loose_number("N/A"), None);
        assert_eq!(parse_loose_number("unknown"), None);
    }

    #[test]
    fn parse_loose_number_multiple_dots_is_none() {
        assert_eq!(parse_loose_number("1.2.3"), None);
    }

    #[test]
    fn raw_number_value_passes_native_numbers_through() {
        assert_eq!(raw_number_value(&RawNumber::Num(22.4)), Some(22.4));
    }

    #[test]
    fn detect_unit_mg_case_insensitive() {
        assert_eq!(
            detect_potency_unit(&RawNumber::Text("100MG".to_string())),
            PotencyUnit::Mg
        );
        assert_eq!(
            detect_potency_unit(&RawNumber::Text("5 mg per piece".to_string())),
            PotencyUnit::Mg
        );
    }

    #[test]
    fn detect_unit_defaults_to_percent() {
        assert_eq!(
            detect_potency_unit(&RawNumber::Text("22%".to_string())),
            PotencyUnit::Percent
        );
        assert_eq!(
            detect_potency_unit(&RawNumber::Num(22.0)),
            PotencyUnit::Percent
        );
    }

    #[test]
    fn normalize_potency_percent_string() {
        let value = normalize_potency(Some(&RawNumber::Text("22%".to_string()))).unwrap();
        assert_eq!(value.value, 22.0);
        assert_eq!(value.unit, PotencyUnit::Percent);
    }

    #[test]
    fn normalize_potency_mg_string() {
        let value = normalize_potency(Some(&RawNumber::Text("100mg".to_string()))).unwrap();
        assert_eq!(value.value, 100.0);
        assert_eq!(value.unit, PotencyUnit::Mg);
    }

    #[test]
    fn normalize_potency_absent_or_garbage_is_none() {
        assert_eq!(normalize_potency(None), None);
        assert_eq!(
            normalize_potency(Some(&RawNumber::Text("N/A".to_string()))),
            None
        );
    }
}
