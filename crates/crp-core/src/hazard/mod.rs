//! Probabilistic physical hazard engine.
//!
//! Follows the standard risk chain: discrete hazard event sets with annual
//! probabilities, literature-backed damage curves, expected annual loss,
//! loss exceedance curves with PML, compound-risk amplification, and a
//! translation into credit metrics.

pub mod damage;
pub mod engine;
pub mod events;

pub use damage::DamageCurve;
pub use engine::{
    AnnualRisk, CompoundRisk, CreditRiskImpact, Exposure, HazardRiskEngine,
};
pub use events::{ClimateSeverity, HazardEvent, HazardKind};
