use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{round_half_even, round_half_up};

/// How computed figures are rounded to cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// 0.005 rounds away from zero.
    #[default]
    HalfUp,
    /// 0.005 rounds to the even cent.
    HalfEven,
}

impl RoundingMode {
    pub fn round(
        &self,
        value: Decimal,
    ) -> Decimal {
        match self {
            Self::HalfUp => round_half_up(value),
            Self::HalfEven => round_half_even(value),
        }
    }
}

/// What the margin regime uses as its taxable base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginBase {
    /// The margin already includes VAT: base = margin / (1 + rate/100).
    #[default]
    VatInclusive,
    /// The margin itself is the base.
    Raw,
}

/// Tunables for regime computation and selection.
///
/// ```
/// use vat_core::calculations::{MarginBase, RegimeConfig, RoundingMode};
///
/// let config = RegimeConfig::default();
/// assert_eq!(config.rounding, RoundingMode::HalfUp);
/// assert_eq!(config.margin_base, MarginBase::VatInclusive);
/// assert!(config.auto_restore);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    pub rounding: RoundingMode,
    pub margin_base: MarginBase,
    /// Re-select the last valid regime once its inputs become valid again.
    pub auto_restore: bool,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            rounding: RoundingMode::default(),
            margin_base: MarginBase::default(),
            auto_restore: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn rounding_modes_differ_only_at_midpoint() {
        assert_eq!(RoundingMode::HalfUp.round(dec!(2.345)), dec!(2.35));
        assert_eq!(RoundingMode::HalfEven.round(dec!(2.345)), dec!(2.34));
        assert_eq!(RoundingMode::HalfEven.round(dec!(2.346)), dec!(2.35));
    }
}
