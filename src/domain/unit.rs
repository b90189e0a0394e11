//! Item labels embed a quantity and unit, e.g. `Cement (1,500 bags)`.
//!
//! The label is built upstream by joining a general name with a
//! parenthesised quantity and unit. Every view that needs the unit back
//! goes through [`extract_unit`].

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::response::parse_decimal;

/// The first digit run (with thousands separators and decimals), followed by
/// the non-digit run that names the unit.
static QUANTITY_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d[\d,]*(?:\.\d+)?)([^\d()]*)").expect("this pattern is valid")
});

/// Recovers the unit from a composite item label.
///
/// Returns `None` when the label holds no digits or nothing follows them.
/// Callers should treat that as "unit unknown".
///
/// ```
/// use formsly::domain::extract_unit;
///
/// assert_eq!(extract_unit("Cement (1,500 bags)").as_deref(), Some("bags"));
/// assert_eq!(extract_unit("No digits here"), None);
/// ```
#[must_use]
pub fn extract_unit(label: &str) -> Option<String> {
    let captures = QUANTITY_UNIT.captures(label)?;
    let unit: String = captures
        .get(2)?
        .as_str()
        .chars()
        .filter(|c| !c.is_ascii_digit() && *c != ',')
        .collect();
    let unit = unit.trim();
    (!unit.is_empty()).then(|| unit.to_string())
}

/// Recovers the quantity from a composite item label.
///
/// Returns `None` when the label holds no digit sequence.
#[must_use]
pub fn extract_quantity(label: &str) -> Option<f64> {
    let captures = QUANTITY_UNIT.captures(label)?;
    parse_decimal(captures.get(1)?.as_str())
}

/// Builds a composite item label from its parts.
///
/// The quantity is written with thousands separators so that the label
/// round-trips through [`extract_quantity`] and [`extract_unit`].
#[must_use]
pub fn format_item_label(name: &str, quantity: f64, unit: Option<&str>) -> String {
    let quantity = format_quantity(quantity);
    match unit.map(str::trim).filter(|unit| !unit.is_empty()) {
        Some(unit) => format!("{name} ({quantity} {unit})"),
        None => format!("{name} ({quantity})"),
    }
}

/// Formats a quantity with comma thousands separators, dropping a zero
/// fractional part.
#[must_use]
pub fn format_quantity(quantity: f64) -> String {
    let text = quantity.to_string();
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let (sign, digits) = integer
        .strip_prefix('-')
        .map_or(("", integer), |digits| ("-", digits));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("Cement (1,500 bags)", Some("bags"))]
    #[test_case("Cement (1,500 bags) (Color: grey)", Some("bags"); "trailing description")]
    #[test_case("Rebar 12mm (40 pcs)", Some("mm"); "first digit run wins")]
    #[test_case("Paint (2.5 liters)", Some("liters"); "decimal quantity")]
    #[test_case("Gravel (3 cubic meters)", Some("cubic meters"); "multi word unit")]
    #[test_case("Nails (100)", None; "no unit")]
    #[test_case("No digits here", None; "no digits")]
    #[test_case("", None; "empty")]
    fn unit(label: &str, expected: Option<&str>) {
        assert_eq!(extract_unit(label).as_deref(), expected);
    }

    #[test_case("Cement (1,500 bags)", Some(1500.0))]
    #[test_case("Paint (2.5 liters)", Some(2.5))]
    #[test_case("No digits here", None)]
    fn quantity(label: &str, expected: Option<f64>) {
        assert_eq!(extract_quantity(label), expected);
    }

    #[test_case(1500.0, "1,500")]
    #[test_case(999.0, "999")]
    #[test_case(1_234_567.0, "1,234,567")]
    #[test_case(2.5, "2.5")]
    #[test_case(-1000.0, "-1,000")]
    fn quantity_format(quantity: f64, expected: &str) {
        assert_eq!(format_quantity(quantity), expected);
    }

    #[test]
    fn formatted_labels_round_trip() {
        let label = format_item_label("Cement", 1500.0, Some("bags"));
        assert_eq!(label, "Cement (1,500 bags)");
        assert_eq!(extract_unit(&label).as_deref(), Some("bags"));
        assert_eq!(extract_quantity(&label), Some(1500.0));
    }
}
