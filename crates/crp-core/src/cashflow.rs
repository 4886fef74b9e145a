//! Cash-flow engine: annual operating projections from plant parameters
//! and risk-adjusted operating constraints.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::adjustments::{PhysicalAdjustment, TransitionAdjustment};
use crate::scenarios::market::MarketScenario;
use crate::scenarios::transition::TransitionScenario;
use crate::time_value::annuity_payment;
use crate::types::{Money, PlantParameters, Rate};
use crate::CrpResult;

const HOURS_PER_YEAR: Decimal = dec!(8760);
const KW_PER_MW: Decimal = dec!(1000);

// ---------------------------------------------------------------------------
// Debt amortization
// ---------------------------------------------------------------------------

/// One year of a level-payment amortization schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtYear {
    pub opening_balance: Money,
    pub interest: Money,
    pub principal: Money,
    pub payment: Money,
    pub closing_balance: Money,
}

/// Level-payment amortization over the debt tenor.
///
/// The final period repays the remaining balance exactly, so principal
/// repayments always sum to the original debt amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtSchedule {
    pub debt_amount: Money,
    pub annual_payment: Money,
    pub years: Vec<DebtYear>,
}

impl DebtSchedule {
    pub fn level_payment(debt_amount: Money, rate: Rate, tenor_years: u32) -> Self {
        if debt_amount <= Decimal::ZERO || tenor_years == 0 {
            return Self {
                debt_amount: Decimal::ZERO,
                annual_payment: Decimal::ZERO,
                years: Vec::new(),
            };
        }

        let payment = annuity_payment(debt_amount, rate, tenor_years);
        let mut years = Vec::with_capacity(tenor_years as usize);
        let mut balance = debt_amount;

        for t in 0..tenor_years {
            let interest = balance * rate;
            let principal = if t == tenor_years - 1 {
                balance
            } else {
                payment - interest
            };
            let closing = balance - principal;
            years.push(DebtYear {
                opening_balance: balance,
                interest,
                principal,
                payment: interest + principal,
                closing_balance: closing,
            });
            balance = closing;
        }

        Self {
            debt_amount,
            annual_payment: payment,
            years,
        }
    }

    /// Debt service components for a 0-based operating year. Zero once the
    /// tenor is exceeded.
    pub fn service(&self, year_index: u32) -> (Money, Money) {
        match self.years.get(year_index as usize) {
            Some(dy) => (dy.interest, dy.principal),
            None => (Decimal::ZERO, Decimal::ZERO),
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One operating year of the projected income and cash-flow statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowYear {
    pub year: i32,
    pub capacity_factor: Rate,
    pub generation_mwh: Decimal,
    pub revenue: Money,
    pub fuel_costs: Money,
    pub variable_opex: Money,
    pub fixed_opex: Money,
    pub carbon_costs: Money,
    pub outage_costs: Money,
    pub total_costs: Money,
    pub ebitda: Money,
    pub depreciation: Money,
    pub interest: Money,
    pub principal: Money,
    pub debt_service: Money,
    pub tax: Money,
    pub net_income: Money,
    pub free_cash_flow: Money,
}

/// Full projection spanning the adjusted operating life.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub years: Vec<CashFlowYear>,
    pub debt_schedule: DebtSchedule,
}

impl CashFlowStatement {
    pub fn free_cash_flows(&self) -> Vec<Money> {
        self.years.iter().map(|y| y.free_cash_flow).collect()
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Project annual cash flows over `transition_adj.operating_years` years.
///
/// EBITDA is never floored: deeply negative operating results propagate to
/// the metrics and rating layers, which route them to distressed bands.
pub fn project_cashflows(
    plant: &PlantParameters,
    transition_scenario: &TransitionScenario,
    transition_adj: &TransitionAdjustment,
    physical_adj: &PhysicalAdjustment,
    market: Option<&MarketScenario>,
    start_year: i32,
) -> CrpResult<CashFlowStatement> {
    plant.validate()?;

    let debt_schedule = DebtSchedule::level_payment(
        plant.debt_amount(),
        plant.debt_interest_rate,
        plant.debt_tenor_years,
    );

    // Straight-line over the design life, not the adjusted life
    let depreciation = plant.total_capex / Decimal::from(plant.operating_years);
    let fixed_opex = plant.capacity_mw * KW_PER_MW * plant.fixed_opex_per_kw_year;

    let mut years = Vec::with_capacity(transition_adj.operating_years as usize);

    for t in 0..transition_adj.operating_years {
        let year = start_year + t as i32;

        let demand_factor = market
            .map(|m| m.demand_factor(year, start_year))
            .unwrap_or(Decimal::ONE);
        let price = market
            .map(|m| m.power_price(year, start_year))
            .unwrap_or(plant.power_price_per_mwh);

        let cf = (transition_adj.capacity_factor
            * demand_factor
            * (Decimal::ONE - physical_adj.capacity_derate))
            .min(physical_adj.water_constrained_capacity)
            .max(Decimal::ZERO);

        let generation = plant.capacity_mw * HOURS_PER_YEAR * cf;
        let revenue = generation * price;

        let fuel_costs =
            generation * plant.heat_rate_mmbtu_per_mwh * plant.fuel_price_per_mmbtu;
        let variable_opex = generation * plant.variable_opex_per_mwh;
        let carbon_costs = generation
            * plant.emissions_tco2_per_mwh
            * transition_scenario.carbon_price(year);
        let outage_costs = generation * physical_adj.outage_rate * price;

        let total_costs =
            fuel_costs + variable_opex + fixed_opex + carbon_costs + outage_costs;
        let ebitda = revenue - total_costs;

        let (interest, principal) = debt_schedule.service(t);

        let ebit = ebitda - depreciation;
        let taxable_income = ebit - interest;
        let tax = (taxable_income * plant.tax_rate).max(Decimal::ZERO);
        let net_income = ebit - interest - tax;
        let free_cash_flow = ebit * (Decimal::ONE - plant.tax_rate) + depreciation;

        years.push(CashFlowYear {
            year,
            capacity_factor: cf,
            generation_mwh: generation,
            revenue,
            fuel_costs,
            variable_opex,
            fixed_opex,
            carbon_costs,
            outage_costs,
            total_costs,
            ebitda,
            depreciation,
            interest,
            principal,
            debt_service: interest + principal,
            tax,
            net_income,
            free_cash_flow,
        });
    }

    Ok(CashFlowStatement {
        years,
        debt_schedule,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
