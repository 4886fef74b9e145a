//! Multi-factor credit rating assessment with distress overrides.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::rating::grid::RatingGrid;
use crate::rating::scale::Rating;
use crate::types::{BasisPoints, Money, Multiple};
use crate::CrpResult;

/// Sentinel for ratios that are undefined but credit-positive
const UNDEFINED_STRONG: Decimal = dec!(999);
/// Sentinel for ratios that are undefined and credit-negative
const UNDEFINED_WEAK: Decimal = dec!(-999);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Balance sheet and income items for one assessment period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub capacity_mw: Decimal,
    pub ebitda: Money,
    pub fixed_assets: Money,
    pub interest_expense: Money,
    pub total_debt: Money,
    pub cash_and_equivalents: Money,
    pub total_equity: Money,
    pub total_assets: Money,
    /// Debt service coverage ratio from the metrics calculator
    pub dscr: Multiple,
}

/// The seven factor metrics the assessor consumes, plus the distress flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingMetrics {
    pub capacity_mw: Decimal,
    /// EBITDA / fixed assets, percent
    pub ebitda_to_fixed_assets_pct: Decimal,
    /// EBITDA / interest expense, times
    pub ebitda_to_interest: Multiple,
    pub dscr: Multiple,
    pub net_debt_to_ebitda: Multiple,
    /// Total debt / equity, percent
    pub debt_to_equity_pct: Decimal,
    /// Total debt / assets, percent
    pub debt_to_assets_pct: Decimal,
    pub is_ebitda_negative: bool,
}

impl RatingMetrics {
    /// Derive factor ratios from raw financials. Undefined ratios get the
    /// 999 / -999 sentinels; negative values are preserved so the grids
    /// can route them to distressed bands.
    pub fn from_financials(snapshot: &FinancialSnapshot) -> Self {
        let is_ebitda_negative = snapshot.ebitda < Decimal::ZERO;

        let ebitda_to_fixed_assets_pct = if snapshot.fixed_assets > Decimal::ZERO {
            snapshot.ebitda / snapshot.fixed_assets * dec!(100)
        } else {
            Decimal::ZERO
        };

        let ebitda_to_interest = if snapshot.interest_expense > Decimal::ZERO {
            snapshot.ebitda / snapshot.interest_expense
        } else if snapshot.ebitda >= Decimal::ZERO {
            UNDEFINED_STRONG
        } else {
            UNDEFINED_WEAK
        };

        let net_debt = snapshot.total_debt - snapshot.cash_and_equivalents;
        let net_debt_to_ebitda = if is_ebitda_negative {
            if net_debt > Decimal::ZERO {
                UNDEFINED_STRONG
            } else {
                UNDEFINED_WEAK
            }
        } else if snapshot.ebitda > Decimal::ZERO {
            net_debt / snapshot.ebitda
        } else {
            UNDEFINED_STRONG
        };

        let debt_to_equity_pct = if snapshot.total_equity > Decimal::ZERO {
            snapshot.total_debt / snapshot.total_equity * dec!(100)
        } else {
            UNDEFINED_STRONG
        };

        let debt_to_assets_pct = if snapshot.total_assets > Decimal::ZERO {
            snapshot.total_debt / snapshot.total_assets * dec!(100)
        } else {
            dec!(100)
        };

        Self {
            capacity_mw: snapshot.capacity_mw,
            ebitda_to_fixed_assets_pct,
            ebitda_to_interest,
            dscr: snapshot.dscr,
            net_debt_to_ebitda,
            debt_to_equity_pct,
            debt_to_assets_pct,
            is_ebitda_negative,
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorRatings {
    pub capacity: Rating,
    pub profitability: Rating,
    pub coverage: Rating,
    pub dscr: Rating,
    pub net_debt_leverage: Rating,
    pub equity_leverage: Rating,
    pub asset_leverage: Rating,
}

impl FactorRatings {
    fn named(&self) -> [(&'static str, Rating); 7] {
        [
            ("capacity", self.capacity),
            ("profitability", self.profitability),
            ("coverage", self.coverage),
            ("dscr", self.dscr),
            ("net_debt_leverage", self.net_debt_leverage),
            ("equity_leverage", self.equity_leverage),
            ("asset_leverage", self.asset_leverage),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingAssessment {
    pub overall: Rating,
    pub spread_bps: BasisPoints,
    pub factors: FactorRatings,
    pub metrics: RatingMetrics,
    pub rationale: String,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

fn rate_net_debt_leverage(metrics: &RatingMetrics, grid: &RatingGrid) -> Rating {
    if metrics.is_ebitda_negative {
        return grid.negative_ebitda_leverage_rating;
    }
    if metrics.net_debt_to_ebitda < Decimal::ZERO {
        return grid.net_cash_rating;
    }
    if metrics.net_debt_to_ebitda > grid.net_debt_extreme_above {
        return grid.net_debt_extreme_rating;
    }
    grid.net_debt_to_ebitda.rate(metrics.net_debt_to_ebitda)
}

/// Rate each factor against the grid, combine by weighted average, then
/// apply the distress override.
///
/// The override: the overall rating can never be better than the worst
/// distressed critical factor (DSCR, coverage, profitability). A strong
/// balance sheet does not rescue an asset that cannot service its debt.
pub fn assess_credit_rating(
    metrics: &RatingMetrics,
    grid: &RatingGrid,
) -> CrpResult<RatingAssessment> {
    let profitability = if metrics.is_ebitda_negative
        && metrics.ebitda_to_fixed_assets_pct >= dec!(-20)
    {
        // Negative EBITDA with a small ratio still signals severe loss
        Rating::Cc
    } else {
        grid.profitability_pct.rate(metrics.ebitda_to_fixed_assets_pct)
    };

    let factors = FactorRatings {
        capacity: grid.capacity_mw.rate(metrics.capacity_mw),
        profitability,
        coverage: grid.coverage_x.rate(metrics.ebitda_to_interest),
        dscr: grid.dscr_x.rate(metrics.dscr),
        net_debt_leverage: rate_net_debt_leverage(metrics, grid),
        equity_leverage: grid.debt_to_equity_pct.rate(metrics.debt_to_equity_pct),
        asset_leverage: grid.debt_to_assets_pct.rate(metrics.debt_to_assets_pct),
    };

    let w = &grid.weights;
    let weighted_score = Decimal::from(factors.capacity.score()) * w.capacity
        + Decimal::from(factors.profitability.score()) * w.profitability
        + Decimal::from(factors.coverage.score()) * w.coverage
        + Decimal::from(factors.dscr.score()) * w.dscr
        + Decimal::from(factors.net_debt_leverage.score()) * w.net_debt_leverage
        + Decimal::from(factors.equity_leverage.score()) * w.equity_leverage
        + Decimal::from(factors.asset_leverage.score()) * w.asset_leverage;

    let mut rounded = weighted_score.round().to_u32().unwrap_or(10).clamp(1, 10);

    let critical = [
        ("dscr", factors.dscr),
        ("coverage", factors.coverage),
        ("profitability", factors.profitability),
    ];
    let worst_distressed = critical
        .iter()
        .filter(|(_, r)| r.is_distressed())
        .max_by_key(|(_, r)| r.score());

    let (overall, rationale) = match worst_distressed {
        Some((name, worst)) => {
            rounded = rounded.max(worst.score());
            let overall = Rating::from_score(rounded)?;
            (
                overall,
                format!(
                    "Overall {overall}: distress-driven rating (critical factor in distress: {name} at {worst})"
                ),
            )
        }
        None => {
            let overall = Rating::from_score(rounded)?;
            (
                overall,
                format!(
                    "Overall {overall}: weighted average (DSCR={}, coverage={})",
                    factors.dscr, factors.coverage
                ),
            )
        }
    };

    Ok(RatingAssessment {
        overall,
        spread_bps: grid.spread_bps(overall),
        factors,
        metrics: metrics.clone(),
        rationale,
    })
}

// ---------------------------------------------------------------------------
// Migration
// ---------------------------------------------------------------------------

/// Rating movement between a baseline and a risk scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingMigration {
    pub baseline: Rating,
    pub scenario: Rating,
    /// Positive = downgrade
    pub notch_change: i32,
    pub spread_change_bps: BasisPoints,
    pub worst_deteriorating_factor: String,
    pub worst_deterioration_notches: i32,
    pub description: String,
}

pub fn rating_migration(
    baseline: &RatingAssessment,
    scenario: &RatingAssessment,
    grid: &RatingGrid,
) -> RatingMigration {
    let notch_change = scenario.overall.score() as i32 - baseline.overall.score() as i32;
    let spread_change_bps =
        grid.spread_bps(scenario.overall) - grid.spread_bps(baseline.overall);

    let description = match notch_change {
        0 => "No change".to_string(),
        n if n > 0 => format!("Downgrade by {n} notch(es)"),
        n => format!("Upgrade by {} notch(es)", -n),
    };

    let baseline_factors = baseline.factors.named();
    let scenario_factors = scenario.factors.named();
    let mut worst_name = "";
    let mut worst_delta = i32::MIN;
    for ((name, base), (_, scen)) in baseline_factors.iter().zip(scenario_factors.iter()) {
        let delta = scen.score() as i32 - base.score() as i32;
        if delta > worst_delta {
            worst_delta = delta;
            worst_name = name;
        }
    }

    RatingMigration {
        baseline: baseline.overall,
        scenario: scenario.overall,
        notch_change,
        spread_change_bps,
        worst_deteriorating_factor: worst_name.to_string(),
        worst_deterioration_notches: worst_delta,
        description,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn strong_metrics() -> RatingMetrics {
        RatingMetrics {
            capacity_mw: dec!(2100),
            ebitda_to_fixed_assets_pct: dec!(16),
            ebitda_to_interest: dec!(13),
            dscr: dec!(2.6),
            net_debt_to_ebitda: dec!(0.8),
            debt_to_equity_pct: dec!(70),
            debt_to_assets_pct: dec!(18),
            is_ebitda_negative: false,
        }
    }

    #[test]
    fn test_strong_plant_rates_aaa() {
        let grid = RatingGrid::kis_ipp_2023();
        let assessment = assess_credit_rating(&strong_metrics(), &grid).unwrap();
        assert_eq!(assessment.overall, Rating::Aaa);
        assert!(assessment.overall.is_investment_grade());
        assert_eq!(assessment.spread_bps, dec!(50));
    }

    #[test]
    fn test_distress_override_dominates_weighted_average() {
        let grid = RatingGrid::kis_ipp_2023();
        let mut metrics = strong_metrics();
        metrics.dscr = dec!(0.7);
        let assessment = assess_credit_rating(&metrics, &grid).unwrap();

        // Weighted average alone would land around A, but the DSCR factor
        // is CC and the overall can never be better than that
        assert_eq!(assessment.factors.dscr, Rating::Cc);
        assert_eq!(assessment.overall, Rating::Cc);
        assert!(assessment.rationale.contains("distress"));
        assert!(assessment.rationale.contains("dscr"));
    }

    #[test]
    fn test_weighted_average_rationale_when_healthy() {
        let grid = RatingGrid::kis_ipp_2023();
        let mut metrics = strong_metrics();
        metrics.dscr = dec!(1.4);
        metrics.ebitda_to_interest = dec!(3);
        let assessment = assess_credit_rating(&metrics, &grid).unwrap();
        assert!(!assessment.overall.is_distressed());
        assert!(assessment.rationale.contains("weighted average"));
    }

    #[test]
    fn test_lower_dscr_never_improves_rating() {
        let grid = RatingGrid::kis_ipp_2023();
        let dscr_values = [
            dec!(2.6),
            dec!(2.1),
            dec!(1.7),
            dec!(1.4),
            dec!(1.15),
            dec!(1.02),
            dec!(0.9),
            dec!(0.6),
            dec!(0.3),
            dec!(-0.5),
        ];
        let mut previous = 0u32;
        for dscr in dscr_values {
            let mut metrics = strong_metrics();
            metrics.dscr = dscr;
            let assessment = assess_credit_rating(&metrics, &grid).unwrap();
            assert!(
                assessment.overall.score() >= previous,
                "DSCR {dscr} improved the rating to {}",
                assessment.overall
            );
            previous = assessment.overall.score();
        }
    }

    #[test]
    fn test_negative_ebitda_snapshot_routes_to_distress() {
        let grid = RatingGrid::kis_ipp_2023();
        let snapshot = FinancialSnapshot {
            capacity_mw: dec!(2100),
            ebitda: dec!(-200_000_000),
            fixed_assets: dec!(3_200_000_000),
            interest_expense: dec!(110_000_000),
            total_debt: dec!(2_240_000_000),
            cash_and_equivalents: dec!(100_000_000),
            total_equity: dec!(960_000_000),
            total_assets: dec!(3_500_000_000),
            dscr: dec!(-0.8),
        };
        let metrics = RatingMetrics::from_financials(&snapshot);
        assert!(metrics.is_ebitda_negative);

        let assessment = assess_credit_rating(&metrics, &grid).unwrap();
        assert!(assessment.overall.is_distressed());
        assert_eq!(assessment.factors.dscr, Rating::D);
    }

    #[test]
    fn test_from_financials_sentinels() {
        let snapshot = FinancialSnapshot {
            capacity_mw: dec!(500),
            ebitda: dec!(100_000_000),
            fixed_assets: dec!(1_000_000_000),
            interest_expense: Decimal::ZERO,
            total_debt: Decimal::ZERO,
            cash_and_equivalents: dec!(50_000_000),
            total_equity: Decimal::ZERO,
            total_assets: dec!(1_100_000_000),
            dscr: dec!(2.0),
        };
        let metrics = RatingMetrics::from_financials(&snapshot);
        // No interest expense with positive EBITDA: infinitely covered
        assert_eq!(metrics.ebitda_to_interest, dec!(999));
        // No equity on the books is credit-negative
        assert_eq!(metrics.debt_to_equity_pct, dec!(999));
        // Net cash position
        assert!(metrics.net_debt_to_ebitda < Decimal::ZERO);
    }

    #[test]
    fn test_migration_downgrade() {
        let grid = RatingGrid::kis_ipp_2023();
        let baseline = assess_credit_rating(&strong_metrics(), &grid).unwrap();

        let mut stressed = strong_metrics();
        stressed.dscr = dec!(1.2);
        stressed.ebitda_to_interest = dec!(2.5);
        stressed.ebitda_to_fixed_assets_pct = dec!(5);
        let scenario = assess_credit_rating(&stressed, &grid).unwrap();

        let migration = rating_migration(&baseline, &scenario, &grid);
        assert!(migration.notch_change > 0);
        assert!(migration.spread_change_bps > Decimal::ZERO);
        assert!(migration.description.contains("Downgrade"));
        assert_eq!(migration.worst_deteriorating_factor, "dscr");
    }
}
