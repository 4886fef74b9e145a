//! Project finance metrics: NPV, IRR, DSCR, LLCR, payback.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::cashflow::CashFlowStatement;
use crate::error::CrpError;
use crate::time_value;
use crate::types::{Money, Multiple, PlantParameters, Rate};
use crate::CrpResult;

/// Sentinel for ratios with no debt service due (effectively infinite)
pub const INFINITE_RATIO: Decimal = dec!(999);

const IRR_INITIAL_GUESS: Rate = dec!(0.10);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialMetrics {
    /// NPV of free cash flows at the plant discount rate
    pub npv: Money,
    /// IRR of free cash flows; 0 when no root exists
    pub irr: Rate,
    /// DSCR per year while debt is outstanding
    pub dscr_by_year: Vec<Multiple>,
    pub avg_dscr: Multiple,
    pub min_dscr: Multiple,
    /// Loan life coverage ratio
    pub llcr: Multiple,
    /// First 1-based year where cumulative FCF turns positive
    pub payback_year: Option<u32>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Compute project finance metrics from a projected statement.
///
/// CFADS = EBITDA - tax (net income + interest + depreciation collapses to
/// exactly this). DSCR and LLCR only consider years where debt is
/// outstanding.
pub fn calculate_metrics(
    statement: &CashFlowStatement,
    plant: &PlantParameters,
) -> CrpResult<FinancialMetrics> {
    let fcf = statement.free_cash_flows();
    if fcf.is_empty() {
        return Err(CrpError::InsufficientData(
            "Cash flow statement has no operating years".into(),
        ));
    }

    let npv = time_value::npv(plant.discount_rate, &fcf)?;

    // All-positive or all-negative flows have no IRR root; the engine
    // substitutes zero rather than failing the scenario.
    let irr = time_value::irr(&fcf, IRR_INITIAL_GUESS).unwrap_or(Decimal::ZERO);

    let n_debt_years = (plant.debt_tenor_years as usize).min(statement.years.len());
    let mut dscr_by_year = Vec::with_capacity(n_debt_years);
    let mut cfads = Vec::with_capacity(n_debt_years);

    for year in statement.years.iter().take(n_debt_years) {
        let available = year.ebitda - year.tax;
        cfads.push(available);
        if year.debt_service > Decimal::ZERO {
            dscr_by_year.push(available / year.debt_service);
        } else {
            dscr_by_year.push(INFINITE_RATIO);
        }
    }

    let (avg_dscr, min_dscr) = if dscr_by_year.is_empty() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let sum: Decimal = dscr_by_year.iter().sum();
        let avg = sum / Decimal::from(dscr_by_year.len() as u64);
        let min = dscr_by_year.iter().copied().fold(INFINITE_RATIO, Decimal::min);
        (avg, min)
    };

    let debt_amount = statement.debt_schedule.debt_amount;
    let llcr = if debt_amount > Decimal::ZERO && !cfads.is_empty() {
        time_value::npv(plant.debt_interest_rate, &cfads)? / debt_amount
    } else {
        Decimal::ZERO
    };

    let mut cumulative = Decimal::ZERO;
    let mut payback_year = None;
    for (i, flow) in fcf.iter().enumerate() {
        cumulative += flow;
        if cumulative > Decimal::ZERO {
            payback_year = Some(i as u32 + 1);
            break;
        }
    }

    Ok(FinancialMetrics {
        npv,
        irr,
        dscr_by_year,
        avg_dscr,
        min_dscr,
        llcr,
        payback_year,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflow::tests::{no_constraint_statement, textbook_plant};

    #[test]
    fn test_textbook_dscr() {
        let plant = textbook_plant();
        let statement = no_constraint_statement(&plant);
        let metrics = calculate_metrics(&statement, &plant).unwrap();

        // Year 1: CFADS = 438M - 90.75M = 347.25M, level debt service
        // on $500M at 5% over 10y is ~64.75M, so DSCR ~ 5.36
        assert_eq!(metrics.dscr_by_year.len(), 10);
        assert!(metrics.dscr_by_year[0] > dec!(5.3) && metrics.dscr_by_year[0] < dec!(5.4));
        assert!(metrics.min_dscr <= metrics.avg_dscr);
        assert!(metrics.min_dscr > Decimal::ZERO);
    }

    #[test]
    fn test_textbook_npv() {
        let plant = textbook_plant();
        let statement = no_constraint_statement(&plant);
        let metrics = calculate_metrics(&statement, &plant).unwrap();

        // Constant FCF of 341M over 20 years at 8%, first flow undiscounted
        assert!(metrics.npv > dec!(3_500_000_000));
        assert!(metrics.npv < dec!(3_700_000_000));
    }

    #[test]
    fn test_irr_sentinel_when_no_root() {
        let plant = textbook_plant();
        let statement = no_constraint_statement(&plant);
        let metrics = calculate_metrics(&statement, &plant).unwrap();
        // Post-construction FCF is all positive: no IRR root exists
        assert_eq!(metrics.irr, Decimal::ZERO);
    }

    #[test]
    fn test_payback_immediate_for_profitable_plant() {
        let plant = textbook_plant();
        let statement = no_constraint_statement(&plant);
        let metrics = calculate_metrics(&statement, &plant).unwrap();
        assert_eq!(metrics.payback_year, Some(1));
    }

    #[test]
    fn test_payback_none_when_never_positive() {
        let mut plant = textbook_plant();
        plant.power_price_per_mwh = dec!(1);
        plant.fixed_opex_per_kw_year = dec!(200);
        let statement = no_constraint_statement(&plant);
        let metrics = calculate_metrics(&statement, &plant).unwrap();
        assert_eq!(metrics.payback_year, None);
        assert!(metrics.npv < Decimal::ZERO);
    }

    #[test]
    fn test_llcr_positive_and_sized() {
        let plant = textbook_plant();
        let statement = no_constraint_statement(&plant);
        let metrics = calculate_metrics(&statement, &plant).unwrap();
        // ~347M CFADS for 10 years at 5% vs $500M of debt
        assert!(metrics.llcr > dec!(5), "llcr = {}", metrics.llcr);
        assert!(metrics.llcr < dec!(6), "llcr = {}", metrics.llcr);
    }

    #[test]
    fn test_distressed_plant_low_dscr() {
        let mut plant = textbook_plant();
        plant.power_price_per_mwh = dec!(20);
        let statement = no_constraint_statement(&plant);
        let metrics = calculate_metrics(&statement, &plant).unwrap();
        // Revenue 87.6M vs ~64.75M debt service
        assert!(metrics.avg_dscr < dec!(1.5));
    }
}
