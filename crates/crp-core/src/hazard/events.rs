use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::metrics::INFINITE_RATIO;

/// Baseline year for climate intensity scaling
pub const CLIMATE_BASELINE_YEAR: i32 = 2024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    Wildfire,
    Flood,
    HeatWave,
    SeaLevelRise,
}

/// A discrete hazard event: an intensity that occurs with some annual
/// probability. Intensity units depend on the hazard (flood depth in
/// meters, fire weather index, temperature anomaly, SLR in meters).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardEvent {
    pub kind: HazardKind,
    pub intensity: Decimal,
    pub annual_probability: Decimal,
    pub duration_days: Decimal,
}

impl HazardEvent {
    pub fn new(
        kind: HazardKind,
        intensity: Decimal,
        annual_probability: Decimal,
        duration_days: Decimal,
    ) -> Self {
        Self {
            kind,
            intensity,
            annual_probability,
            duration_days,
        }
    }

    /// Return period in years; 999 sentinel for zero-probability events.
    pub fn return_period(&self) -> Decimal {
        if self.annual_probability > Decimal::ZERO {
            Decimal::ONE / self.annual_probability
        } else {
            INFINITE_RATIO
        }
    }
}

/// Climate scenario severity for intensity scaling.
///
/// Moderate tracks RCP4.5-style projections, High tracks RCP8.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClimateSeverity {
    Moderate,
    High,
}

impl ClimateSeverity {
    /// Annual hazard intensity growth rate, from IPCC AR6 projections.
    pub fn intensity_growth(self, kind: HazardKind) -> Decimal {
        match (self, kind) {
            (ClimateSeverity::High, HazardKind::Flood) => dec!(0.02),
            (ClimateSeverity::High, HazardKind::Wildfire) => dec!(0.025),
            (ClimateSeverity::High, HazardKind::HeatWave) => dec!(0.03),
            (ClimateSeverity::High, HazardKind::SeaLevelRise) => dec!(0.01),
            (ClimateSeverity::Moderate, HazardKind::Flood) => dec!(0.01),
            (ClimateSeverity::Moderate, HazardKind::Wildfire) => dec!(0.015),
            (ClimateSeverity::Moderate, HazardKind::HeatWave) => dec!(0.015),
            (ClimateSeverity::Moderate, HazardKind::SeaLevelRise) => dec!(0.005),
        }
    }

    /// Intensity multiplier for a projection year: linear growth from the
    /// baseline year.
    pub fn climate_factor(self, kind: HazardKind, year: i32) -> Decimal {
        let elapsed = Decimal::from((year - CLIMATE_BASELINE_YEAR).max(0));
        Decimal::ONE + self.intensity_growth(kind) * elapsed
    }
}
