use serde::{Deserialize, Serialize};

use super::FiscalRegime;

/// Which regimes may currently be selected for a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeEligibility {
    pub normal: bool,
    pub margin: bool,
}

impl RegimeEligibility {
    pub const NONE: RegimeEligibility = RegimeEligibility {
        normal: false,
        margin: false,
    };

    pub fn allows(
        &self,
        regime: FiscalRegime,
    ) -> bool {
        match regime {
            FiscalRegime::Normal => self.normal,
            FiscalRegime::Margin => self.margin,
        }
    }
}
