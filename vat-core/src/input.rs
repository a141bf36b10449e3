//! Normalization of raw form text into domain values.
//!
//! Amounts are typed by hand or copied back from display output, so the
//! parser accepts either `.` or `,` as the decimal separator and ignores the
//! space characters used for digit grouping. Anything that still fails to
//! parse is treated as a blank field rather than an error.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::round_half_up;

/// Text shown for "no rate selected".
pub const NO_RATE: &str = "N/A";

/// Separator placed between digit groups by [`format_amount`].
const GROUP_SEPARATOR: char = '\u{a0}';

/// A non-empty date field that does not hold a valid `DD-MM-YYYY` date.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid date '{0}', expected DD-MM-YYYY")]
pub struct InvalidDate(pub String);

/// Strips grouping spaces (regular, no-break and narrow no-break) and turns a
/// decimal comma into a point.
fn normalize_amount_text(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .collect::<String>()
        .trim()
        .replace(',', ".")
}

/// Parses an amount, rounded to cents.
///
/// Returns `None` for blank input and for text that is not a number; the
/// latter is logged at `warn` level.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let normalized = normalize_amount_text(s);
    if normalized.is_empty() {
        return None;
    }
    match normalized.parse::<Decimal>() {
        Ok(value) => Some(round_half_up(value)),
        Err(e) => {
            warn!(input = %s, "ignoring malformed amount: {}", e);
            None
        }
    }
}

/// Parses the tax rate choice. [`NO_RATE`] and blank text mean no rate.
pub fn parse_tax_rate(s: &str) -> Option<Decimal> {
    if s.trim().eq_ignore_ascii_case(NO_RATE) {
        return None;
    }
    parse_amount(s)
}

/// Formats an amount the way it is displayed in the ledger: two decimals,
/// decimal comma, no-break space between thousands (`1 234,56`).
///
/// The output is accepted by [`parse_amount`].
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = round_half_up(value);
    rounded.rescale(2);

    let text = rounded.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{fraction}")
}

/// Formats an optional amount, blank when absent.
pub fn format_optional_amount(value: Option<Decimal>) -> String {
    value.map(format_amount).unwrap_or_default()
}

/// Parses a form date in `DD-MM-YYYY` order.
///
/// Dashes are optional but exactly eight digits must remain. Blank input is
/// an absent date; anything else that is not a real calendar date is an
/// error.
pub fn parse_form_date(s: &str) -> Result<Option<NaiveDate>, InvalidDate> {
    let digits: String = s.trim().chars().filter(|c| *c != '-').collect();
    if digits.is_empty() {
        return Ok(None);
    }
    if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(InvalidDate(s.to_string()));
    }

    let day: u32 = digits[0..2].parse().map_err(|_| InvalidDate(s.to_string()))?;
    let month: u32 = digits[2..4].parse().map_err(|_| InvalidDate(s.to_string()))?;
    let year: i32 = digits[4..8].parse().map_err(|_| InvalidDate(s.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .map(Some)
        .ok_or_else(|| InvalidDate(s.to_string()))
}

/// Formats a date for a form field (`DD-MM-YYYY`).
pub fn format_form_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // parse_amount tests
    // =========================================================================

    #[test]
    fn parse_amount_accepts_point_and_comma() {
        assert_eq!(parse_amount("123.45"), Some(dec!(123.45)));
        assert_eq!(parse_amount("123,45"), Some(dec!(123.45)));
    }

    #[test]
    fn parse_amount_strips_grouping_spaces() {
        assert_eq!(parse_amount("1 234,56"), Some(dec!(1234.56)));
        assert_eq!(parse_amount("1\u{a0}234,56"), Some(dec!(1234.56)));
        assert_eq!(parse_amount("12\u{202f}000"), Some(dec!(12000)));
    }

    #[test]
    fn parse_amount_rounds_to_cents() {
        assert_eq!(parse_amount("10.005"), Some(dec!(10.01)));
        assert_eq!(parse_amount("10.004"), Some(dec!(10.00)));
    }

    #[test]
    fn parse_amount_blank_is_absent() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
    }

    #[test]
    fn parse_amount_malformed_is_absent() {
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("1.234,56"), None);
        assert_eq!(parse_amount("12,3,4"), None);
    }

    #[test]
    fn parse_amount_at_range_limit() {
        assert_eq!(parse_amount("79228162514264337593543950335"), Some(Decimal::MAX));
        assert_eq!(parse_amount("-79228162514264337593543950335"), Some(Decimal::MIN));
    }

    #[test]
    fn parse_amount_beyond_range_is_absent() {
        assert_eq!(parse_amount("79228162514264337593543950336"), None);
        assert_eq!(parse_amount("792281625142643375935439503350"), None);
    }

    #[test]
    fn parse_amount_long_fraction_rounds_to_cents() {
        assert_eq!(parse_amount("0,0000000000000000000000000001"), Some(dec!(0.00)));
        assert_eq!(parse_amount("1.999999999999999999999999999"), Some(dec!(2.00)));
    }

    // =========================================================================
    // parse_tax_rate tests
    // =========================================================================

    #[test]
    fn parse_tax_rate_not_applicable_is_absent() {
        assert_eq!(parse_tax_rate("N/A"), None);
        assert_eq!(parse_tax_rate("n/a"), None);
        assert_eq!(parse_tax_rate(""), None);
    }

    #[test]
    fn parse_tax_rate_accepts_offered_rates() {
        assert_eq!(parse_tax_rate("6"), Some(dec!(6)));
        assert_eq!(parse_tax_rate("13"), Some(dec!(13)));
        assert_eq!(parse_tax_rate("23"), Some(dec!(23)));
    }

    #[test]
    fn parse_tax_rate_just_above_minus_hundred_rounds_onto_it() {
        assert_eq!(parse_tax_rate("-99.9999999999999999999999999"), Some(dec!(-100)));
        assert_eq!(parse_tax_rate("-99,99"), Some(dec!(-99.99)));
    }

    // =========================================================================
    // format_amount tests
    // =========================================================================

    #[test]
    fn format_amount_uses_decimal_comma() {
        assert_eq!(format_amount(dec!(40.65)), "40,65");
        assert_eq!(format_amount(dec!(7)), "7,00");
        assert_eq!(format_amount(dec!(0)), "0,00");
    }

    #[test]
    fn format_amount_groups_thousands() {
        assert_eq!(format_amount(dec!(1234.5)), "1\u{a0}234,50");
        assert_eq!(format_amount(dec!(1234567.891)), "1\u{a0}234\u{a0}567,89");
        assert_eq!(format_amount(dec!(123456)), "123\u{a0}456,00");
    }

    #[test]
    fn format_amount_keeps_sign() {
        assert_eq!(format_amount(dec!(-1500)), "-1\u{a0}500,00");
    }

    #[test]
    fn formatted_amount_parses_back() {
        let value = dec!(98765.43);

        assert_eq!(parse_amount(&format_amount(value)), Some(value));
    }

    // =========================================================================
    // parse_form_date tests
    // =========================================================================

    #[test]
    fn parse_form_date_reads_day_month_year() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);

        assert_eq!(parse_form_date("15-03-2024"), Ok(expected));
        assert_eq!(parse_form_date("15032024"), Ok(expected));
    }

    #[test]
    fn parse_form_date_blank_is_absent() {
        assert_eq!(parse_form_date(""), Ok(None));
        assert_eq!(parse_form_date("  "), Ok(None));
    }

    #[test]
    fn parse_form_date_rejects_impossible_dates() {
        assert_eq!(
            parse_form_date("32-01-2023"),
            Err(InvalidDate("32-01-2023".to_string()))
        );
        assert!(parse_form_date("29-02-2023").is_err());
    }

    #[test]
    fn parse_form_date_rejects_incomplete_input() {
        assert!(parse_form_date("15-03").is_err());
        assert!(parse_form_date("15-03-24ab").is_err());
    }

    #[test]
    fn format_form_date_pads_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        assert_eq!(format_form_date(date), "05-01-2024");
    }
}
