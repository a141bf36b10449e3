use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// VAT rates offered when recording a sale. "N/A" is modelled as the
/// absence of a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxRate {
    Reduced,
    Intermediate,
    Standard,
}

impl TaxRate {
    pub const ALL: [TaxRate; 3] = [TaxRate::Reduced, TaxRate::Intermediate, TaxRate::Standard];

    pub fn percent(&self) -> Decimal {
        match self {
            Self::Reduced => Decimal::from(6),
            Self::Intermediate => Decimal::from(13),
            Self::Standard => Decimal::from(23),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reduced => "6",
            Self::Intermediate => "13",
            Self::Standard => "23",
        }
    }

    /// Maps a stored percentage (`23`, `23.0`) back onto the offered rates.
    pub fn from_percent(percent: Decimal) -> Option<Self> {
        Self::ALL.into_iter().find(|rate| rate.percent() == percent)
    }
}
