//! VAT computation for vehicle sales under the normal and margin regimes.
//!
//! # Formulas
//!
//! | Regime | Requires                          | Taxable base                  |
//! |--------|-----------------------------------|-------------------------------|
//! | Normal | sale > 0, rate                    | sale / (1 + rate/100)         |
//! | Margin | sale > 0, purchase > 0, rate, sale > purchase | (sale − purchase) / (1 + rate/100) |
//!
//! In both regimes the tax is `base × rate/100`, taken from the unrounded
//! base. Both figures are then rounded to cents. With
//! [`MarginBase::Raw`](super::MarginBase::Raw) the margin regime uses the
//! margin itself as the base.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use vat_core::calculations::TaxRegimeCalculator;
//! use vat_core::{FiscalRegime, TransactionInputs};
//!
//! let calculator = TaxRegimeCalculator::default();
//! let inputs = TransactionInputs {
//!     purchase_value: Some(dec!(150.00)),
//!     sale_value: Some(dec!(200.00)),
//!     tax_rate_percent: Some(dec!(23)),
//! };
//!
//! let eligibility = calculator.evaluate_eligibility(&inputs);
//! assert!(eligibility.normal && eligibility.margin);
//!
//! let result = calculator
//!     .compute(&inputs, FiscalRegime::Margin)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(result.taxable_base, dec!(40.65));
//! assert_eq!(result.tax_amount, dec!(9.35));
//! ```

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

use super::config::{MarginBase, RegimeConfig};
use super::selection::SelectionState;
use crate::{FiscalRegime, RegimeEligibility, TaxResult, TransactionInputs};

/// Errors that can occur while computing the tax figures.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CalculationError {
    /// `1 + rate/100` is zero, which only a rate of -100% produces.
    #[error("division by zero (tax rate {rate}%)")]
    DivisionByZero { rate: Decimal },

    /// An intermediate figure does not fit in a `Decimal`.
    #[error("amount out of range (tax rate {rate}%)")]
    Overflow { rate: Decimal },
}

/// What the read-only tax fields should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxOutcome {
    Computed(TaxResult),
    /// No regime selected, or its inputs do not yield a result.
    Cleared,
    Failed(CalculationError),
}

impl TaxOutcome {
    pub fn result(&self) -> Option<TaxResult> {
        match self {
            Self::Computed(result) => Some(*result),
            Self::Cleared | Self::Failed(_) => None,
        }
    }
}

impl fmt::Display for TaxOutcome {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Computed(result) => write!(
                f,
                "taxable base {}, tax {}",
                result.taxable_base, result.tax_amount
            ),
            Self::Cleared => f.write_str("cleared"),
            Self::Failed(error) => write!(f, "{error}"),
        }
    }
}

/// Everything a caller needs to refresh after an edit: which regime
/// controls are enabled, which one is selected, and the tax figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegimeUpdate {
    pub eligibility: RegimeEligibility,
    pub selected: Option<FiscalRegime>,
    pub outcome: TaxOutcome,
}

impl RegimeUpdate {
    pub fn state(&self) -> SelectionState {
        SelectionState::from(self.selected)
    }
}

/// Stateless calculator for regime eligibility and tax figures.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaxRegimeCalculator {
    config: RegimeConfig,
}

impl TaxRegimeCalculator {
    pub fn new(config: RegimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RegimeConfig {
        &self.config
    }

    /// Determines which regimes the inputs allow.
    ///
    /// The normal regime needs a positive sale value and a rate. The margin
    /// regime additionally needs a positive purchase value below the sale
    /// value.
    pub fn evaluate_eligibility(
        &self,
        inputs: &TransactionInputs,
    ) -> RegimeEligibility {
        let normal = inputs.sale_value.is_some_and(|sale| sale > Decimal::ZERO)
            && inputs.tax_rate_percent.is_some();

        let margin = normal
            && inputs
                .purchase_value
                .is_some_and(|purchase| purchase > Decimal::ZERO)
            && inputs.margin().is_some_and(|margin| margin > Decimal::ZERO);

        RegimeEligibility { normal, margin }
    }

    /// Computes the taxable base and tax for `regime`.
    ///
    /// Returns `Ok(None)` when the regime is not eligible for these inputs,
    /// including a margin that is zero or negative.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::DivisionByZero`] when the rate makes the
    /// VAT divisor zero, and [`CalculationError::Overflow`] when a figure
    /// leaves the `Decimal` range.
    pub fn compute(
        &self,
        inputs: &TransactionInputs,
        regime: FiscalRegime,
    ) -> Result<Option<TaxResult>, CalculationError> {
        if !self.evaluate_eligibility(inputs).allows(regime) {
            debug!(%regime, ?inputs, "regime not eligible; no tax result");
            return Ok(None);
        }

        let (Some(sale), Some(rate)) = (inputs.sale_value, inputs.tax_rate_percent) else {
            return Ok(None);
        };

        let result = match regime {
            FiscalRegime::Normal => Some(self.normal_regime(sale, rate)?),
            FiscalRegime::Margin => match inputs.purchase_value {
                Some(purchase) => self.margin_regime(sale, purchase, rate)?,
                None => None,
            },
        };

        if let Some(result) = &result {
            debug!(
                %regime,
                taxable_base = %result.taxable_base,
                tax_amount = %result.tax_amount,
                "computed tax"
            );
        }
        Ok(result)
    }

    /// Pure recomputation after an edit.
    ///
    /// `selected` is dropped when it is no longer eligible, and the outcome
    /// reflects whatever remains selected.
    pub fn assess(
        &self,
        inputs: &TransactionInputs,
        selected: Option<FiscalRegime>,
    ) -> RegimeUpdate {
        let eligibility = self.evaluate_eligibility(inputs);
        let selected = selected.filter(|regime| eligibility.allows(*regime));

        let outcome = match selected {
            None => TaxOutcome::Cleared,
            Some(regime) => match self.compute(inputs, regime) {
                Ok(Some(result)) => TaxOutcome::Computed(result),
                Ok(None) => TaxOutcome::Cleared,
                Err(error) => TaxOutcome::Failed(error),
            },
        };

        RegimeUpdate {
            eligibility,
            selected,
            outcome,
        }
    }

    /// Normal regime: the whole sale value includes VAT.
    fn normal_regime(
        &self,
        sale: Decimal,
        rate: Decimal,
    ) -> Result<TaxResult, CalculationError> {
        let divisor = Self::vat_divisor(rate)?;
        let base = checked(sale.checked_div(divisor), rate)?;
        self.tax_result(base, rate)
    }

    /// Margin regime: only the profit over the purchase value is taxed.
    fn margin_regime(
        &self,
        sale: Decimal,
        purchase: Decimal,
        rate: Decimal,
    ) -> Result<Option<TaxResult>, CalculationError> {
        let margin = sale - purchase;
        if margin <= Decimal::ZERO {
            warn!(
                sale = %sale,
                purchase = %purchase,
                margin = %margin,
                "margin is not positive; no tax under the margin regime"
            );
            return Ok(None);
        }

        let base = match self.config.margin_base {
            MarginBase::VatInclusive => {
                let divisor = Self::vat_divisor(rate)?;
                checked(margin.checked_div(divisor), rate)?
            }
            MarginBase::Raw => margin,
        };
        self.tax_result(base, rate).map(Some)
    }

    /// `1 + rate/100`, rejected when zero.
    fn vat_divisor(rate: Decimal) -> Result<Decimal, CalculationError> {
        let divisor = Decimal::ONE + rate / Decimal::ONE_HUNDRED;
        if divisor.is_zero() {
            warn!(rate = %rate, "tax divisor is zero");
            return Err(CalculationError::DivisionByZero { rate });
        }
        Ok(divisor)
    }

    fn tax_result(
        &self,
        base: Decimal,
        rate: Decimal,
    ) -> Result<TaxResult, CalculationError> {
        let tax = checked(base.checked_mul(rate / Decimal::ONE_HUNDRED), rate)?;
        Ok(TaxResult {
            taxable_base: self.config.rounding.round(base),
            tax_amount: self.config.rounding.round(tax),
        })
    }
}

fn checked(
    value: Option<Decimal>,
    rate: Decimal,
) -> Result<Decimal, CalculationError> {
    value.ok_or_else(|| {
        warn!(rate = %rate, "tax figure out of range");
        CalculationError::Overflow { rate }
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::config::RoundingMode;

    fn inputs(
        purchase: Option<Decimal>,
        sale: Option<Decimal>,
        rate: Option<Decimal>,
    ) -> TransactionInputs {
        TransactionInputs {
            purchase_value: purchase,
            sale_value: sale,
            tax_rate_percent: rate,
        }
    }

    // =========================================================================
    // evaluate_eligibility tests
    // =========================================================================

    #[test]
    fn normal_eligible_with_sale_and_rate() {
        let calculator = TaxRegimeCalculator::default();

        for rate in [dec!(6), dec!(13), dec!(23)] {
            let eligibility =
                calculator.evaluate_eligibility(&inputs(None, Some(dec!(100.00)), Some(rate)));

            assert!(eligibility.normal, "rate {rate} should allow normal regime");
            assert!(!eligibility.margin, "no purchase value, margin must be off");
        }
    }

    #[test]
    fn normal_not_eligible_without_rate() {
        let calculator = TaxRegimeCalculator::default();

        let eligibility =
            calculator.evaluate_eligibility(&inputs(Some(dec!(50)), Some(dec!(100)), None));

        assert_eq!(eligibility, RegimeEligibility::NONE);
    }

    #[test]
    fn normal_not_eligible_without_positive_sale() {
        let calculator = TaxRegimeCalculator::default();

        let missing = calculator.evaluate_eligibility(&inputs(None, None, Some(dec!(23))));
        let zero = calculator.evaluate_eligibility(&inputs(None, Some(dec!(0)), Some(dec!(23))));

        assert_eq!(missing, RegimeEligibility::NONE);
        assert_eq!(zero, RegimeEligibility::NONE);
    }

    #[test]
    fn margin_eligible_when_sale_exceeds_purchase() {
        let calculator = TaxRegimeCalculator::default();

        let eligibility = calculator.evaluate_eligibility(&inputs(
            Some(dec!(150.00)),
            Some(dec!(200.00)),
            Some(dec!(23)),
        ));

        assert_eq!(
            eligibility,
            RegimeEligibility {
                normal: true,
                margin: true,
            }
        );
    }

    #[test]
    fn margin_not_eligible_when_sale_does_not_exceed_purchase() {
        let calculator = TaxRegimeCalculator::default();

        for sale in [dec!(100.00), dec!(150.00)] {
            let eligibility = calculator.evaluate_eligibility(&inputs(
                Some(dec!(150.00)),
                Some(sale),
                Some(dec!(13)),
            ));

            assert!(!eligibility.margin, "sale {sale} must not allow margin");
            assert!(eligibility.normal);
        }
    }

    #[test]
    fn margin_not_eligible_with_zero_purchase() {
        let calculator = TaxRegimeCalculator::default();

        let eligibility =
            calculator.evaluate_eligibility(&inputs(Some(dec!(0)), Some(dec!(200)), Some(dec!(23))));

        assert!(!eligibility.margin);
    }

    // =========================================================================
    // compute tests
    // =========================================================================

    #[test]
    fn compute_normal_regime() {
        let calculator = TaxRegimeCalculator::default();

        let result = calculator
            .compute(&inputs(None, Some(dec!(123.00)), Some(dec!(23))), FiscalRegime::Normal)
            .unwrap();

        assert_eq!(
            result,
            Some(TaxResult {
                taxable_base: dec!(100.00),
                tax_amount: dec!(23.00),
            })
        );
    }

    #[test]
    fn compute_normal_regime_ignores_purchase_value() {
        let calculator = TaxRegimeCalculator::default();
        let regime = FiscalRegime::Normal;

        let without = calculator.compute(&inputs(None, Some(dec!(113)), Some(dec!(13))), regime);
        let with = calculator.compute(
            &inputs(Some(dec!(500)), Some(dec!(113)), Some(dec!(13))),
            regime,
        );

        assert_eq!(without, with);
        assert_eq!(
            with,
            Ok(Some(TaxResult {
                taxable_base: dec!(100.00),
                tax_amount: dec!(13.00),
            }))
        );
    }

    #[test]
    fn compute_margin_regime_divides_margin() {
        let calculator = TaxRegimeCalculator::default();

        let result = calculator.compute(
            &inputs(Some(dec!(150.00)), Some(dec!(200.00)), Some(dec!(23))),
            FiscalRegime::Margin,
        );

        assert_eq!(
            result,
            Ok(Some(TaxResult {
                taxable_base: dec!(40.65),
                tax_amount: dec!(9.35),
            }))
        );
    }

    #[test]
    fn compute_margin_regime_with_raw_base() {
        let calculator = TaxRegimeCalculator::new(RegimeConfig {
            margin_base: MarginBase::Raw,
            ..RegimeConfig::default()
        });

        let result = calculator.compute(
            &inputs(Some(dec!(150.00)), Some(dec!(200.00)), Some(dec!(23))),
            FiscalRegime::Margin,
        );

        assert_eq!(
            result,
            Ok(Some(TaxResult {
                taxable_base: dec!(50.00),
                tax_amount: dec!(11.50),
            }))
        );
    }

    #[test]
    fn compute_margin_regime_negative_margin_is_undefined() {
        let calculator = TaxRegimeCalculator::default();

        let result = calculator.compute(
            &inputs(Some(dec!(150.00)), Some(dec!(100.00)), Some(dec!(13))),
            FiscalRegime::Margin,
        );

        assert_eq!(result, Ok(None));
    }

    #[test]
    fn compute_margin_regime_guards_margin_directly() {
        let calculator = TaxRegimeCalculator::default();

        let result = calculator.margin_regime(dec!(100.00), dec!(100.00), dec!(23));

        assert_eq!(result, Ok(None));
    }

    #[test]
    fn compute_ineligible_regime_is_undefined() {
        let calculator = TaxRegimeCalculator::default();

        let result =
            calculator.compute(&inputs(None, Some(dec!(200.00)), None), FiscalRegime::Normal);

        assert_eq!(result, Ok(None));
    }

    #[test]
    fn compute_reports_division_by_zero() {
        let calculator = TaxRegimeCalculator::default();

        let result = calculator.compute(
            &inputs(None, Some(dec!(100.00)), Some(dec!(-100))),
            FiscalRegime::Normal,
        );

        assert_eq!(
            result,
            Err(CalculationError::DivisionByZero { rate: dec!(-100) })
        );
    }

    #[test]
    fn compute_largest_sale_at_standard_rate() {
        let calculator = TaxRegimeCalculator::default();

        let result = calculator
            .compute(&inputs(None, Some(Decimal::MAX), Some(dec!(23))), FiscalRegime::Normal)
            .unwrap()
            .unwrap();

        assert!(result.tax_amount > Decimal::ZERO);
        assert!(result.tax_amount < result.taxable_base);
    }

    #[test]
    fn compute_reports_overflowing_tax() {
        // A rate of -200% doubles the sale value into the tax.
        let calculator = TaxRegimeCalculator::default();

        let result = calculator.compute(
            &inputs(None, Some(Decimal::MAX), Some(dec!(-200))),
            FiscalRegime::Normal,
        );

        assert_eq!(result, Err(CalculationError::Overflow { rate: dec!(-200) }));
    }

    #[test]
    fn compute_reports_overflowing_base_near_minus_hundred() {
        let calculator = TaxRegimeCalculator::default();
        let near = dec!(-99.99);

        let normal = calculator.compute(
            &inputs(None, Some(Decimal::MAX), Some(near)),
            FiscalRegime::Normal,
        );
        let margin = calculator.compute(
            &inputs(Some(dec!(0.01)), Some(Decimal::MAX), Some(near)),
            FiscalRegime::Margin,
        );

        assert_eq!(normal, Err(CalculationError::Overflow { rate: near }));
        assert_eq!(margin, Err(CalculationError::Overflow { rate: near }));
    }

    #[test]
    fn compute_from_extreme_text_never_panics() {
        let calculator = TaxRegimeCalculator::default();
        let sales = [
            "79228162514264337593543950335",
            "9999999999999999999999999999",
            "0,01",
        ];
        let rates = [
            "23",
            "-99,99",
            "-99.9999999999999999999999999",
            "-200",
            "100000000000000000000000000",
        ];

        for sale in sales {
            for rate in rates {
                let inputs = TransactionInputs::from_text("0,01", sale, rate);
                for regime in FiscalRegime::ALL {
                    let _ = calculator.compute(&inputs, regime);
                }
            }
        }
    }

    #[test]
    fn compute_is_idempotent() {
        let calculator = TaxRegimeCalculator::default();
        let inputs = inputs(Some(dec!(8150.00)), Some(dec!(9990.00)), Some(dec!(23)));

        for regime in FiscalRegime::ALL {
            assert_eq!(
                calculator.compute(&inputs, regime),
                calculator.compute(&inputs, regime)
            );
        }
    }

    #[test]
    fn compute_rounds_with_configured_mode() {
        // Raw margin 0.75 at 6% gives a tax of exactly 0.045.
        let sample = inputs(Some(dec!(100.00)), Some(dec!(100.75)), Some(dec!(6)));
        let half_up = TaxRegimeCalculator::new(RegimeConfig {
            margin_base: MarginBase::Raw,
            rounding: RoundingMode::HalfUp,
            ..RegimeConfig::default()
        });
        let half_even = TaxRegimeCalculator::new(RegimeConfig {
            margin_base: MarginBase::Raw,
            rounding: RoundingMode::HalfEven,
            ..RegimeConfig::default()
        });

        let up = half_up.compute(&sample, FiscalRegime::Margin).unwrap().unwrap();
        let even = half_even.compute(&sample, FiscalRegime::Margin).unwrap().unwrap();

        assert_eq!(up.tax_amount, dec!(0.05));
        assert_eq!(even.tax_amount, dec!(0.04));
    }

    // =========================================================================
    // assess tests
    // =========================================================================

    #[test]
    fn assess_without_selection_is_cleared() {
        let calculator = TaxRegimeCalculator::default();

        let update = calculator.assess(&inputs(None, Some(dec!(123)), Some(dec!(23))), None);

        assert_eq!(update.outcome, TaxOutcome::Cleared);
        assert_eq!(update.state(), SelectionState::NoRegimeSelected);
        assert!(update.eligibility.normal);
    }

    #[test]
    fn assess_drops_ineligible_selection() {
        let calculator = TaxRegimeCalculator::default();

        let update = calculator.assess(
            &inputs(Some(dec!(150)), Some(dec!(100)), Some(dec!(13))),
            Some(FiscalRegime::Margin),
        );

        assert_eq!(update.selected, None);
        assert_eq!(update.outcome, TaxOutcome::Cleared);
    }

    #[test]
    fn assess_surfaces_calculation_errors() {
        let calculator = TaxRegimeCalculator::default();

        let update = calculator.assess(
            &inputs(None, Some(dec!(100)), Some(dec!(-100))),
            Some(FiscalRegime::Normal),
        );

        assert_eq!(
            update.outcome,
            TaxOutcome::Failed(CalculationError::DivisionByZero { rate: dec!(-100) })
        );
        assert_eq!(update.outcome.result(), None);
        assert!(update.outcome.to_string().starts_with("division by zero"));
    }

    #[test]
    fn assess_surfaces_overflow() {
        let calculator = TaxRegimeCalculator::default();

        let update = calculator.assess(
            &inputs(None, Some(Decimal::MAX), Some(dec!(-200))),
            Some(FiscalRegime::Normal),
        );

        assert_eq!(update.selected, Some(FiscalRegime::Normal));
        assert_eq!(
            update.outcome,
            TaxOutcome::Failed(CalculationError::Overflow { rate: dec!(-200) })
        );
        assert!(update.outcome.to_string().starts_with("amount out of range"));
    }
}
