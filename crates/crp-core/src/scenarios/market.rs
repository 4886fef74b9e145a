use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Market conditions: power demand growth and its effect on price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketScenario {
    pub name: String,
    /// Annual growth (or decline) in power demand, percent per year
    pub demand_growth_pct: Rate,
    /// Percent change in price per 1% change in demand
    pub price_sensitivity: Decimal,
    /// Power price in the base year, $/MWh
    pub base_power_price: Money,
}

impl MarketScenario {
    /// Demand multiplier relative to the base year (compound growth).
    pub fn demand_factor(&self, year: i32, base_year: i32) -> Decimal {
        let elapsed = year - base_year;
        if elapsed <= 0 {
            return Decimal::ONE;
        }
        let growth = Decimal::ONE + self.demand_growth_pct / dec!(100);
        let mut factor = Decimal::ONE;
        for _ in 0..elapsed {
            factor *= growth;
        }
        factor
    }

    /// Power price for a year: base price scaled by demand-driven change.
    pub fn power_price(&self, year: i32, base_year: i32) -> Money {
        let demand_change_pct = (self.demand_factor(year, base_year) - Decimal::ONE) * dec!(100);
        let price_change_pct = demand_change_pct * self.price_sensitivity;
        self.base_power_price * (Decimal::ONE + price_change_pct / dec!(100))
    }
}
