use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CrpError;
use crate::scenarios::market::MarketScenario;
use crate::scenarios::physical::PhysicalHazardData;
use crate::scenarios::transition::TransitionScenario;
use crate::CrpResult;

/// Name-keyed registry of loaded scenarios.
///
/// Populated once at startup and read-only thereafter. Lookups fail fast
/// with the scenario kind and the missing name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioCatalog {
    transition: BTreeMap<String, TransitionScenario>,
    physical: BTreeMap<String, PhysicalHazardData>,
    market: BTreeMap<String, MarketScenario>,
}

impl ScenarioCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transition(&mut self, scenario: TransitionScenario) {
        self.transition.insert(scenario.name.clone(), scenario);
    }

    pub fn add_physical(&mut self, scenario: PhysicalHazardData) {
        self.physical.insert(scenario.name.clone(), scenario);
    }

    pub fn add_market(&mut self, scenario: MarketScenario) {
        self.market.insert(scenario.name.clone(), scenario);
    }

    pub fn transition(&self, name: &str) -> CrpResult<&TransitionScenario> {
        self.transition.get(name).ok_or_else(|| CrpError::UnknownScenario {
            kind: "transition".into(),
            name: name.to_string(),
        })
    }

    pub fn physical(&self, name: &str) -> CrpResult<&PhysicalHazardData> {
        self.physical.get(name).ok_or_else(|| CrpError::UnknownScenario {
            kind: "physical".into(),
            name: name.to_string(),
        })
    }

    pub fn market(&self, name: &str) -> CrpResult<&MarketScenario> {
        self.market.get(name).ok_or_else(|| CrpError::UnknownScenario {
            kind: "market".into(),
            name: name.to_string(),
        })
    }
}
