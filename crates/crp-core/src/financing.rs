//! Financing impact: translate ratings or expected losses into debt
//! spreads, equity premiums, WACC, and the climate risk premium.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CrpError;
use crate::rating::Rating;
use crate::types::{BasisPoints, Money, Rate};
use crate::CrpResult;

const BPS_PER_UNIT: Decimal = dec!(10000);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// How the CRP reference point is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceMode {
    /// Compare each scenario against the run's own "baseline" scenario
    PeerBaseline,
    /// Compare every scenario against a fixed no-climate-risk rating
    Counterfactual(Rating),
}

impl Default for ReferenceMode {
    /// Investment-grade counterfactual: what a large baseload plant would
    /// rate in a world without climate risk.
    fn default() -> Self {
        ReferenceMode::Counterfactual(Rating::A)
    }
}

/// Financing cost model parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingParams {
    pub risk_free_rate: Rate,
    /// Debt spread for the baseline in the legacy linear model
    pub baseline_spread_bps: BasisPoints,
    /// Spread increase per 1% of expected loss (linear model)
    pub spread_slope_bps_per_pct: Decimal,
    /// Equity premium (pct points) per 1% of expected loss
    pub equity_slope_pct_per_pct: Decimal,
    pub debt_fraction: Rate,
    pub equity_fraction: Rate,
    pub baseline_equity_rate: Rate,
    /// Equity premium in percentage points per rating notch
    pub equity_premium_pct_per_notch: Decimal,
}

impl Default for FinancingParams {
    fn default() -> Self {
        Self {
            risk_free_rate: dec!(0.03),
            baseline_spread_bps: dec!(150),
            spread_slope_bps_per_pct: dec!(50),
            equity_slope_pct_per_pct: dec!(0.8),
            debt_fraction: dec!(0.70),
            equity_fraction: dec!(0.30),
            baseline_equity_rate: dec!(0.12),
            equity_premium_pct_per_notch: dec!(0.5),
        }
    }
}

impl FinancingParams {
    pub fn validate(&self) -> CrpResult<()> {
        let funding = self.debt_fraction + self.equity_fraction;
        if (funding - Decimal::ONE).abs() > dec!(0.01) {
            return Err(CrpError::InvalidInput {
                field: "debt_fraction + equity_fraction".into(),
                reason: "Funding fractions must sum to 100%".into(),
            });
        }
        if self.risk_free_rate < Decimal::ZERO {
            return Err(CrpError::InvalidInput {
                field: "risk_free_rate".into(),
                reason: "Risk-free rate cannot be negative".into(),
            });
        }
        if self.baseline_spread_bps < Decimal::ZERO {
            return Err(CrpError::InvalidInput {
                field: "baseline_spread_bps".into(),
                reason: "Baseline spread cannot be negative".into(),
            });
        }
        Ok(())
    }

    fn wacc(&self, debt_rate: Rate, equity_rate: Rate) -> Rate {
        self.debt_fraction * debt_rate + self.equity_fraction * equity_rate
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingImpact {
    pub expected_loss_pct: Decimal,
    pub npv_loss: Money,
    pub debt_spread_bps: BasisPoints,
    /// Equity premium over the baseline equity rate, percentage points
    pub equity_premium_pct: Decimal,
    /// Climate risk premium: WACC differential in basis points
    pub crp_bps: BasisPoints,
    pub wacc_reference: Rate,
    pub wacc_scenario: Rate,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Expected loss as a percentage of capital at risk, floored at zero.
pub fn expected_loss_pct(
    baseline_npv: Money,
    scenario_npv: Money,
    total_capex: Money,
) -> Decimal {
    if total_capex <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let loss_pct = (baseline_npv - scenario_npv) / total_capex * dec!(100);
    loss_pct.max(Decimal::ZERO)
}

/// Legacy reduced-form model: both the debt spread and the equity premium
/// are linear in the expected-loss percentage.
pub fn impact_from_expected_loss(
    el_pct: Decimal,
    npv_loss: Money,
    params: &FinancingParams,
) -> FinancingImpact {
    let baseline_debt_rate = params.risk_free_rate + params.baseline_spread_bps / BPS_PER_UNIT;

    let debt_spread = params.baseline_spread_bps + el_pct * params.spread_slope_bps_per_pct;
    let adjusted_debt_rate = params.risk_free_rate + debt_spread / BPS_PER_UNIT;

    let equity_premium_pct = el_pct * params.equity_slope_pct_per_pct;
    let adjusted_equity_rate = params.baseline_equity_rate + equity_premium_pct / dec!(100);

    let wacc_reference = params.wacc(baseline_debt_rate, params.baseline_equity_rate);
    let wacc_scenario = params.wacc(adjusted_debt_rate, adjusted_equity_rate);

    FinancingImpact {
        expected_loss_pct: el_pct,
        npv_loss,
        debt_spread_bps: debt_spread,
        equity_premium_pct,
        crp_bps: (wacc_scenario - wacc_reference) * BPS_PER_UNIT,
        wacc_reference,
        wacc_scenario,
    }
}

/// Structural model: the scenario's rating spread drives the debt cost;
/// equity still follows the linear expected-loss slope.
pub fn impact_from_rating(
    scenario_spread_bps: BasisPoints,
    baseline_spread_bps: BasisPoints,
    npv_loss: Money,
    total_capex: Money,
    params: &FinancingParams,
) -> FinancingImpact {
    let el_pct = if total_capex > Decimal::ZERO {
        (npv_loss / total_capex * dec!(100)).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    let baseline_debt_rate = params.risk_free_rate + baseline_spread_bps / BPS_PER_UNIT;
    let scenario_debt_rate = params.risk_free_rate + scenario_spread_bps / BPS_PER_UNIT;

    let equity_premium_pct = el_pct * params.equity_slope_pct_per_pct;
    let scenario_equity_rate = params.baseline_equity_rate + equity_premium_pct / dec!(100);

    let wacc_reference = params.wacc(baseline_debt_rate, params.baseline_equity_rate);
    let wacc_scenario = params.wacc(scenario_debt_rate, scenario_equity_rate);

    FinancingImpact {
        expected_loss_pct: el_pct,
        npv_loss,
        debt_spread_bps: scenario_spread_bps,
        equity_premium_pct,
        crp_bps: (wacc_scenario - wacc_reference) * BPS_PER_UNIT,
        wacc_reference,
        wacc_scenario,
    }
}

/// Counterfactual model: CRP against a fixed no-climate-risk reference.
/// The equity premium scales with rating-notch distance from the
/// counterfactual rather than expected loss.
pub fn impact_with_counterfactual(
    scenario_rating: Rating,
    scenario_spread_bps: BasisPoints,
    counterfactual_rating: Rating,
    counterfactual_spread_bps: BasisPoints,
    npv_loss: Money,
    total_capex: Money,
    params: &FinancingParams,
) -> FinancingImpact {
    let el_pct = if total_capex > Decimal::ZERO {
        (npv_loss / total_capex * dec!(100)).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    let counterfactual_debt_rate =
        params.risk_free_rate + counterfactual_spread_bps / BPS_PER_UNIT;
    let scenario_debt_rate = params.risk_free_rate + scenario_spread_bps / BPS_PER_UNIT;

    let notch_diff = Decimal::from(scenario_rating.score() as i64)
        - Decimal::from(counterfactual_rating.score() as i64);
    let equity_premium_pct = notch_diff * params.equity_premium_pct_per_notch;
    let scenario_equity_rate = params.baseline_equity_rate + equity_premium_pct / dec!(100);

    let wacc_reference =
        params.wacc(counterfactual_debt_rate, params.baseline_equity_rate);
    let wacc_scenario = params.wacc(scenario_debt_rate, scenario_equity_rate);

    FinancingImpact {
        expected_loss_pct: el_pct,
        npv_loss,
        debt_spread_bps: scenario_spread_bps,
        equity_premium_pct,
        crp_bps: (wacc_scenario - wacc_reference) * BPS_PER_UNIT,
        wacc_reference,
        wacc_scenario,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::RatingGrid;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expected_loss_floor() {
        // Scenario outperforms baseline: loss floors at zero
        let el = expected_loss_pct(dec!(100), dec!(150), dec!(1000));
        assert_eq!(el, Decimal::ZERO);
    }

    #[test]
    fn test_expected_loss_pct_of_capex() {
        let el = expected_loss_pct(dec!(500_000_000), dec!(300_000_000), dec!(1_000_000_000));
        assert_eq!(el, dec!(20));
    }

    #[test]
    fn test_linear_model_spreads() {
        let params = FinancingParams::default();
        let impact = impact_from_expected_loss(dec!(10), dec!(100_000_000), &params);

        // 150 baseline + 10% × 50 bps/% = 650 bps
        assert_eq!(impact.debt_spread_bps, dec!(650));
        // 10% × 0.8 = 8 percentage points of equity premium
        assert_eq!(impact.equity_premium_pct, dec!(8));
        assert!(impact.crp_bps > Decimal::ZERO);
    }

    #[test]
    fn test_zero_loss_means_zero_crp() {
        let params = FinancingParams::default();
        let impact = impact_from_expected_loss(Decimal::ZERO, Decimal::ZERO, &params);
        assert_eq!(impact.crp_bps, Decimal::ZERO);
        assert_eq!(impact.wacc_scenario, impact.wacc_reference);
    }

    #[test]
    fn test_rating_model_uses_spread_table() {
        let params = FinancingParams::default();
        let grid = RatingGrid::kis_ipp_2023();
        let impact = impact_from_rating(
            grid.spread_bps(Rating::B),
            grid.spread_bps(Rating::A),
            Decimal::ZERO,
            dec!(1_000_000_000),
            &params,
        );
        assert_eq!(impact.debt_spread_bps, dec!(600));
        // Debt fraction 0.70 × (600-150 bps)/10000 spread widening
        // with no equity premium: CRP = 0.70 × 450 = 315 bps
        assert_eq!(impact.crp_bps, dec!(315.0000));
    }

    #[test]
    fn test_counterfactual_equity_premium_per_notch() {
        let params = FinancingParams::default();
        let grid = RatingGrid::kis_ipp_2023();
        let impact = impact_with_counterfactual(
            Rating::B,
            grid.spread_bps(Rating::B),
            Rating::A,
            grid.spread_bps(Rating::A),
            dec!(200_000_000),
            dec!(1_000_000_000),
            &params,
        );
        // B is 3 notches below A: 3 × 0.5pp = 1.5pp equity premium
        assert_eq!(impact.equity_premium_pct, dec!(1.5));
        // CRP = 0.70 × 450bps + 0.30 × 150bps = 315 + 45 = 360 bps
        assert_eq!(impact.crp_bps, dec!(360.0000));
    }

    #[test]
    fn test_counterfactual_same_rating_zero_crp() {
        let params = FinancingParams::default();
        let grid = RatingGrid::kis_ipp_2023();
        let impact = impact_with_counterfactual(
            Rating::A,
            grid.spread_bps(Rating::A),
            Rating::A,
            grid.spread_bps(Rating::A),
            Decimal::ZERO,
            dec!(1_000_000_000),
            &params,
        );
        assert_eq!(impact.crp_bps, Decimal::ZERO);
    }

    #[test]
    fn test_params_validation() {
        let mut params = FinancingParams::default();
        params.debt_fraction = dec!(0.5);
        assert!(params.validate().is_err());
    }
}
