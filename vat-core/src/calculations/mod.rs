//! Regime eligibility, tax computation and the regime selection state
//! machine.
//!
//! [`TaxRegimeCalculator`] is a pure function of its inputs;
//! [`RegimeSelector`] layers the selection rules on top of it for callers
//! that react to one edit at a time.

pub mod common;
pub mod config;
pub mod regime;
pub mod selection;

pub use config::{MarginBase, RegimeConfig, RoundingMode};
pub use regime::{CalculationError, RegimeUpdate, TaxOutcome, TaxRegimeCalculator};
pub use selection::{RegimeSelector, SelectionError, SelectionState};
