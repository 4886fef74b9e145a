use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CrpError;
use crate::types::Rate;
use crate::CrpResult;

/// Physical hazard parameters for a plant location.
///
/// The raw indices (fire weather index, sea level rise in meters) are
/// carried for traceability; the engine consumes the derived rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalHazardData {
    pub name: String,
    /// Annual outage probability from wildfire (transmission loss)
    pub wildfire_outage_rate: Rate,
    /// Annual outage probability from flooding
    pub flood_outage_rate: Rate,
    /// Capacity derate from sea level rise (cooling water intake)
    pub slr_capacity_derate: Rate,
    /// Compound event amplification, >= 1
    pub compound_multiplier: Decimal,
    /// Cooling water availability as % of normal supply
    pub water_availability_pct: Decimal,
    /// Raw fire weather index, if sourced from hazard data
    pub fire_weather_index: Option<Decimal>,
    /// Raw sea level rise in meters, if sourced from hazard data
    pub sea_level_rise_m: Option<Decimal>,
}

impl PhysicalHazardData {
    pub fn validate(&self) -> CrpResult<()> {
        for (field, value) in [
            ("wildfire_outage_rate", self.wildfire_outage_rate),
            ("flood_outage_rate", self.flood_outage_rate),
            ("slr_capacity_derate", self.slr_capacity_derate),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(CrpError::InvalidInput {
                    field: field.into(),
                    reason: "Hazard rate must be between 0 and 1".into(),
                });
            }
        }
        if self.compound_multiplier < Decimal::ONE {
            return Err(CrpError::InvalidInput {
                field: "compound_multiplier".into(),
                reason: "Compound multiplier cannot be below 1".into(),
            });
        }
        if self.water_availability_pct < Decimal::ZERO
            || self.water_availability_pct > dec!(100)
        {
            return Err(CrpError::InvalidInput {
                field: "water_availability_pct".into(),
                reason: "Water availability must be between 0 and 100%".into(),
            });
        }
        Ok(())
    }

    /// Combined annual outage rate with compound amplification, capped at 1.
    pub fn total_outage_rate(&self) -> Rate {
        let combined =
            (self.wildfire_outage_rate + self.flood_outage_rate) * self.compound_multiplier;
        combined.min(Decimal::ONE)
    }

    /// Combined capacity derate with compound amplification, capped at 1.
    pub fn total_capacity_derate(&self) -> Rate {
        (self.slr_capacity_derate * self.compound_multiplier).min(Decimal::ONE)
    }

    /// A benign scenario with no climate hazards.
    pub fn none(name: &str) -> Self {
        Self {
            name: name.to_string(),
            wildfire_outage_rate: Decimal::ZERO,
            flood_outage_rate: Decimal::ZERO,
            slr_capacity_derate: Decimal::ZERO,
            compound_multiplier: Decimal::ONE,
            water_availability_pct: dec!(100),
            fire_weather_index: None,
            sea_level_rise_m: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn coastal_hazard() -> PhysicalHazardData {
        PhysicalHazardData {
            name: "coastal_rcp85".into(),
            wildfire_outage_rate: dec!(0.02),
            flood_outage_rate: dec!(0.03),
            slr_capacity_derate: dec!(0.04),
            compound_multiplier: dec!(1.5),
            water_availability_pct: dec!(85),
            fire_weather_index: Some(dec!(32)),
            sea_level_rise_m: Some(dec!(0.4)),
        }
    }

    #[test]
    fn test_total_outage_rate() {
        let hazard = coastal_hazard();
        // (0.02 + 0.03) * 1.5 = 0.075
        assert_eq!(hazard.total_outage_rate(), dec!(0.075));
    }

    #[test]
    fn test_total_capacity_derate() {
        let hazard = coastal_hazard();
        assert_eq!(hazard.total_capacity_derate(), dec!(0.060));
    }

    #[test]
    fn test_rates_capped_at_one() {
        let mut hazard = coastal_hazard();
        hazard.wildfire_outage_rate = dec!(0.8);
        hazard.flood_outage_rate = dec!(0.6);
        assert_eq!(hazard.total_outage_rate(), Decimal::ONE);
    }

    #[test]
    fn test_compound_below_one_rejected() {
        let mut hazard = coastal_hazard();
        hazard.compound_multiplier = dec!(0.9);
        assert!(hazard.validate().is_err());
    }

    #[test]
    fn test_none_scenario_is_benign() {
        let hazard = PhysicalHazardData::none("benign");
        assert!(hazard.validate().is_ok());
        assert_eq!(hazard.total_outage_rate(), Decimal::ZERO);
        assert_eq!(hazard.total_capacity_derate(), Decimal::ZERO);
    }
}
