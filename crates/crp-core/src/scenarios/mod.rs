//! Scenario definitions: carbon price trajectories, transition policy,
//! physical hazards, and market conditions.

pub mod carbon;
pub mod catalog;
pub mod market;
pub mod physical;
pub mod transition;

pub use carbon::CarbonPriceCurve;
pub use catalog::ScenarioCatalog;
pub use market::MarketScenario;
pub use physical::PhysicalHazardData;
pub use transition::TransitionScenario;
