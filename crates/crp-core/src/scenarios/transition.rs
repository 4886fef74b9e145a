use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CrpError;
use crate::scenarios::carbon::CarbonPriceCurve;
use crate::types::{Money, Rate};
use crate::CrpResult;

/// Transition policy scenario: dispatch constraints, enforced retirement,
/// and the carbon price path the plant faces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionScenario {
    pub name: String,
    /// Percentage-point reduction to the design capacity factor (0-1)
    pub dispatch_penalty: Rate,
    /// Years until enforced retirement, counted from start of operations
    pub retirement_years: u32,
    pub carbon: CarbonPriceCurve,
}

impl TransitionScenario {
    pub fn new(
        name: &str,
        dispatch_penalty: Rate,
        retirement_years: u32,
        carbon: CarbonPriceCurve,
    ) -> CrpResult<Self> {
        if dispatch_penalty < Decimal::ZERO || dispatch_penalty > Decimal::ONE {
            return Err(CrpError::InvalidInput {
                field: "dispatch_penalty".into(),
                reason: "Dispatch penalty must be between 0 and 1".into(),
            });
        }
        if retirement_years == 0 {
            return Err(CrpError::InvalidInput {
                field: "retirement_years".into(),
                reason: "Retirement horizon must be at least 1 year".into(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            dispatch_penalty,
            retirement_years,
            carbon,
        })
    }

    /// Carbon price the plant pays in a given calendar year, USD/tCO2.
    pub fn carbon_price(&self, year: i32) -> Money {
        self.carbon.price(year)
    }
}
