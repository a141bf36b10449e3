use std::fmt;

use serde::{Deserialize, Serialize};

/// The two mutually exclusive VAT regimes a sale can be declared under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiscalRegime {
    /// Tax is charged on the full sale value.
    Normal,
    /// Tax is charged on the profit margin only (used-goods resale).
    Margin,
}

impl FiscalRegime {
    pub const ALL: [FiscalRegime; 2] = [FiscalRegime::Normal, FiscalRegime::Margin];

    /// Tag stored alongside a vehicle record.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Regime Normal",
            Self::Margin => "Margem",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Regime Normal" => Some(Self::Normal),
            "Margem" => Some(Self::Margin),
            _ => None,
        }
    }
}

impl fmt::Display for FiscalRegime {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
