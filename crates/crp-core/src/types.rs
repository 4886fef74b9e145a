use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CrpError;
use crate::CrpResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Multiples (e.g., 1.4x DSCR)
pub type Multiple = Decimal;

/// Spread or premium in basis points
pub type BasisPoints = Decimal;

/// Design and financing parameters for a single generation asset.
///
/// Loaded once per run and read-only thereafter. Every scenario pipeline
/// shares the same instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantParameters {
    /// Plant name / identifier
    pub name: String,
    /// Installed capacity in MW
    pub capacity_mw: Decimal,
    /// Design capacity factor (0-1)
    pub capacity_factor: Rate,
    /// Design operating life in years (also the depreciation life)
    pub operating_years: u32,
    /// Heat rate in MMBtu per MWh
    pub heat_rate_mmbtu_per_mwh: Decimal,
    /// Fuel price in $/MMBtu
    pub fuel_price_per_mmbtu: Money,
    /// Baseline power price in $/MWh (used when no market scenario applies)
    pub power_price_per_mwh: Money,
    /// Emissions intensity in tCO2 per MWh
    pub emissions_tco2_per_mwh: Decimal,
    /// Fixed O&M in $/kW-year
    pub fixed_opex_per_kw_year: Money,
    /// Variable O&M in $/MWh
    pub variable_opex_per_mwh: Money,
    /// Total construction cost (construction assumed complete at start)
    pub total_capex: Money,
    /// Share of capex funded by debt (0-1)
    pub debt_fraction: Rate,
    /// Share of capex funded by equity (0-1)
    pub equity_fraction: Rate,
    /// Interest rate on project debt
    pub debt_interest_rate: Rate,
    /// Debt maturity in years
    pub debt_tenor_years: u32,
    /// Corporate tax rate (0-1)
    pub tax_rate: Rate,
    /// Discount rate for NPV calculations
    pub discount_rate: Rate,
    /// Baseline forced outage rate before climate hazards (0-1)
    pub base_outage_rate: Rate,
    /// Commercial operation date (first operating year)
    pub start_year: i32,
}

impl PlantParameters {
    /// Validate parameter ranges once at load time.
    pub fn validate(&self) -> CrpResult<()> {
        if self.capacity_mw <= Decimal::ZERO {
            return Err(CrpError::InvalidInput {
                field: "capacity_mw".into(),
                reason: "Capacity must be positive".into(),
            });
        }
        if self.capacity_factor < Decimal::ZERO || self.capacity_factor > Decimal::ONE {
            return Err(CrpError::InvalidInput {
                field: "capacity_factor".into(),
                reason: "Capacity factor must be between 0 and 1".into(),
            });
        }
        if self.operating_years == 0 {
            return Err(CrpError::InvalidInput {
                field: "operating_years".into(),
                reason: "Operating life must be at least 1 year".into(),
            });
        }
        if self.total_capex <= Decimal::ZERO {
            return Err(CrpError::InvalidInput {
                field: "total_capex".into(),
                reason: "Total capex must be positive".into(),
            });
        }
        let funding = self.debt_fraction + self.equity_fraction;
        if (funding - Decimal::ONE).abs() > dec!(0.01) {
            return Err(CrpError::InvalidInput {
                field: "debt_fraction + equity_fraction".into(),
                reason: format!("Funding fractions must sum to 100%, got {}%", funding * dec!(100)),
            });
        }
        if self.debt_interest_rate < Decimal::ZERO {
            return Err(CrpError::InvalidInput {
                field: "debt_interest_rate".into(),
                reason: "Debt interest rate cannot be negative".into(),
            });
        }
        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE {
            return Err(CrpError::InvalidInput {
                field: "tax_rate".into(),
                reason: "Tax rate must be between 0 and 1".into(),
            });
        }
        if self.discount_rate <= dec!(-1) {
            return Err(CrpError::InvalidInput {
                field: "discount_rate".into(),
                reason: "Discount rate must be greater than -100%".into(),
            });
        }
        if self.base_outage_rate < Decimal::ZERO || self.base_outage_rate > Decimal::ONE {
            return Err(CrpError::InvalidInput {
                field: "base_outage_rate".into(),
                reason: "Base outage rate must be between 0 and 1".into(),
            });
        }
        Ok(())
    }

    /// Debt principal at financial close.
    pub fn debt_amount(&self) -> Money {
        self.total_capex * self.debt_fraction
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_plant() -> PlantParameters {
        PlantParameters {
            name: "Coastal Unit 1".into(),
            capacity_mw: dec!(2000),
            capacity_factor: dec!(0.60),
            operating_years: 30,
            heat_rate_mmbtu_per_mwh: dec!(9.5),
            fuel_price_per_mmbtu: dec!(3.2),
            power_price_per_mwh: dec!(80),
            emissions_tco2_per_mwh: dec!(0.95),
            fixed_opex_per_kw_year: dec!(42),
            variable_opex_per_mwh: dec!(4.5),
            total_capex: dec!(3_200_000_000),
            debt_fraction: dec!(0.70),
            equity_fraction: dec!(0.30),
            debt_interest_rate: dec!(0.05),
            debt_tenor_years: 20,
            tax_rate: dec!(0.25),
            discount_rate: dec!(0.08),
            base_outage_rate: dec!(0.05),
            start_year: 2025,
        }
    }

    #[test]
    fn test_valid_plant_passes() {
        assert!(sample_plant().validate().is_ok());
    }

    #[test]
    fn test_funding_mismatch_rejected() {
        let mut plant = sample_plant();
        plant.debt_fraction = dec!(0.50);
        let err = plant.validate().unwrap_err();
        match err {
            CrpError::InvalidInput { field, .. } => {
                assert!(field.contains("debt_fraction"));
            }
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_zero_capex_rejected() {
        let mut plant = sample_plant();
        plant.total_capex = Decimal::ZERO;
        assert!(plant.validate().is_err());
    }

    #[test]
    fn test_invalid_tax_rate_rejected() {
        let mut plant = sample_plant();
        plant.tax_rate = dec!(1.5);
        assert!(plant.validate().is_err());
    }

    #[test]
    fn test_debt_amount() {
        let plant = sample_plant();
        assert_eq!(plant.debt_amount(), dec!(2_240_000_000));
    }
}
