//! Regime selection state machine.
//!
//! ```text
//!                select(Normal)                select(Margin)
//!   NoRegimeSelected ───────────► NormalSelected ◄──────────► MarginSelected
//!          ▲                            │                           │
//!          └──── deselect() / inputs no longer eligible ────────────┘
//! ```
//!
//! At most one regime is selected at a time. There is no terminal state.

use thiserror::Error;
use tracing::{debug, warn};

use super::config::RegimeConfig;
use super::regime::{RegimeUpdate, TaxRegimeCalculator};
use crate::{FiscalRegime, RegimeEligibility, TransactionInputs};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    NoRegimeSelected,
    NormalSelected,
    MarginSelected,
}

impl SelectionState {
    pub fn regime(&self) -> Option<FiscalRegime> {
        match self {
            Self::NoRegimeSelected => None,
            Self::NormalSelected => Some(FiscalRegime::Normal),
            Self::MarginSelected => Some(FiscalRegime::Margin),
        }
    }
}

impl From<Option<FiscalRegime>> for SelectionState {
    fn from(regime: Option<FiscalRegime>) -> Self {
        match regime {
            None => Self::NoRegimeSelected,
            Some(FiscalRegime::Normal) => Self::NormalSelected,
            Some(FiscalRegime::Margin) => Self::MarginSelected,
        }
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("{0} is not available for the current values")]
    NotEligible(FiscalRegime),
}

/// Tracks the selected regime across edits to the transaction inputs.
///
/// Every transition returns the resulting [`RegimeUpdate`], so callers can
/// refresh eligibility and tax figures from a single value.
#[derive(Debug, Clone)]
pub struct RegimeSelector {
    calculator: TaxRegimeCalculator,
    inputs: TransactionInputs,
    selected: Option<FiscalRegime>,
    /// Last regime the user picked while it was eligible.
    last_valid: Option<FiscalRegime>,
}

impl RegimeSelector {
    pub fn new(config: RegimeConfig) -> Self {
        Self {
            calculator: TaxRegimeCalculator::new(config),
            inputs: TransactionInputs::default(),
            selected: None,
            last_valid: None,
        }
    }

    /// Loads a stored record for editing.
    ///
    /// `saved` is selected only if the stored inputs still allow it.
    pub fn restore(
        config: RegimeConfig,
        inputs: TransactionInputs,
        saved: Option<FiscalRegime>,
    ) -> Self {
        let mut selector = Self::new(config);
        selector.inputs = inputs;

        if let Some(regime) = saved {
            match selector.select(regime) {
                Ok(_) => debug!(%regime, "restored saved regime"),
                Err(e) => warn!(%regime, "saved regime not restored: {}", e),
            }
        }
        selector
    }

    pub fn calculator(&self) -> &TaxRegimeCalculator {
        &self.calculator
    }

    pub fn inputs(&self) -> &TransactionInputs {
        &self.inputs
    }

    pub fn selected(&self) -> Option<FiscalRegime> {
        self.selected
    }

    pub fn state(&self) -> SelectionState {
        SelectionState::from(self.selected)
    }

    pub fn eligibility(&self) -> RegimeEligibility {
        self.calculator.evaluate_eligibility(&self.inputs)
    }

    /// Current eligibility, selection and tax outcome.
    pub fn update(&self) -> RegimeUpdate {
        self.calculator.assess(&self.inputs, self.selected)
    }

    /// Selects `regime`, replacing any other selection.
    pub fn select(
        &mut self,
        regime: FiscalRegime,
    ) -> Result<RegimeUpdate, SelectionError> {
        if !self.eligibility().allows(regime) {
            return Err(SelectionError::NotEligible(regime));
        }
        self.selected = Some(regime);
        self.last_valid = Some(regime);
        Ok(self.update())
    }

    /// Clears the selection. The cleared regime is not restored later.
    pub fn deselect(&mut self) -> RegimeUpdate {
        self.selected = None;
        self.last_valid = None;
        self.update()
    }

    /// Applies new inputs, dropping a selection they no longer allow.
    ///
    /// With `auto_restore` set, a regime dropped this way is selected again
    /// as soon as the inputs allow it.
    pub fn on_inputs_changed(
        &mut self,
        inputs: TransactionInputs,
    ) -> RegimeUpdate {
        self.inputs = inputs;
        let eligibility = self.eligibility();
        let auto_restore = self.calculator.config().auto_restore;

        match self.selected {
            Some(regime) if !eligibility.allows(regime) => {
                warn!(%regime, "inputs no longer allow the selected regime; deselecting");
                self.selected = None;
                if !auto_restore {
                    self.last_valid = None;
                }
            }
            None if auto_restore => {
                let restorable = self.last_valid.filter(|regime| eligibility.allows(*regime));
                if let Some(regime) = restorable {
                    debug!(%regime, "re-selecting last valid regime");
                    self.selected = Some(regime);
                }
            }
            _ => {}
        }

        self.update()
    }
}

impl Default for RegimeSelector {
    fn default() -> Self {
        Self::new(RegimeConfig::default())
    }
}
