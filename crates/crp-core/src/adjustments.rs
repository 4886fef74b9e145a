//! Risk adjustment layer: reduces a scenario to the small set of operating
//! constraints the cash-flow engine consumes. Created fresh per scenario
//! run, never mutated afterward.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::scenarios::physical::PhysicalHazardData;
use crate::scenarios::transition::TransitionScenario;
use crate::types::{PlantParameters, Rate};

/// Transition constraints applied to baseline plant operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionAdjustment {
    /// Capacity factor after dispatch constraints (0-1)
    pub capacity_factor: Rate,
    /// Operating life after enforced retirement (years)
    pub operating_years: u32,
    pub notes: String,
}

/// Physical hazard constraints applied to baseline plant operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalAdjustment {
    /// Annual forced outage rate including climate hazards (0-1)
    pub outage_rate: Rate,
    /// Capacity derating factor (0-1)
    pub capacity_derate: Rate,
    /// Maximum capacity factor allowed by cooling water supply (0-1)
    pub water_constrained_capacity: Rate,
    pub notes: String,
}

/// Reduce a transition scenario to effective capacity factor and life.
pub fn apply_transition(
    plant: &PlantParameters,
    scenario: &TransitionScenario,
) -> TransitionAdjustment {
    let capacity_factor = (plant.capacity_factor - scenario.dispatch_penalty).max(Decimal::ZERO);
    let operating_years = plant.operating_years.min(scenario.retirement_years);

    TransitionAdjustment {
        capacity_factor,
        operating_years,
        notes: format!(
            "{}: dispatch penalty {}, retirement at year {}",
            scenario.name, scenario.dispatch_penalty, scenario.retirement_years
        ),
    }
}

/// Reduce physical hazard data to outage, derate, and water constraints.
///
/// The water constraint is linear: 80% water availability allows at most
/// an 80% capacity factor (load tracks cooling water use).
pub fn apply_physical(
    plant: &PlantParameters,
    hazard: &PhysicalHazardData,
) -> PhysicalAdjustment {
    let outage_rate = (plant.base_outage_rate + hazard.total_outage_rate()).min(Decimal::ONE);
    let water_constrained_capacity = (hazard.water_availability_pct / dec!(100)).min(Decimal::ONE);

    PhysicalAdjustment {
        outage_rate,
        capacity_derate: hazard.total_capacity_derate(),
        water_constrained_capacity,
        notes: format!("{}: compound multiplier {}", hazard.name, hazard.compound_multiplier),
    }
}
