//! Climate-financial risk engine for thermal generation assets.
//!
//! Turns climate scenario definitions (carbon price paths, transition
//! constraints, physical hazards, market conditions) into annual cash-flow
//! projections, project-finance metrics, a credit rating, and a financing
//! cost differential (the climate risk premium).
//!
//! All arithmetic uses `rust_decimal::Decimal` for exact precision.

pub mod adjustments;
pub mod cashflow;
pub mod error;
pub mod financing;
#[cfg(feature = "hazard")]
pub mod hazard;
pub mod metrics;
pub mod pipeline;
pub mod rating;
pub mod scenarios;
pub mod time_value;
pub mod types;

pub use error::CrpError;
pub use pipeline::{ScenarioRunner, ScenarioSpec};
pub use types::{BasisPoints, ComputationMetadata, ComputationOutput, Money, Multiple, PlantParameters, Rate};

/// Standard result type for all engine computations
pub type CrpResult<T> = Result<T, CrpError>;
