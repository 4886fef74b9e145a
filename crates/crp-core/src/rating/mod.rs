//! Credit rating assessment: ordinal scale, threshold grids, and the
//! weighted multi-factor assessor with distress overrides.

pub mod assessor;
pub mod grid;
pub mod scale;

pub use assessor::{
    assess_credit_rating, rating_migration, FactorRatings, RatingAssessment, RatingMetrics,
    RatingMigration,
};
pub use grid::{FactorGrid, FactorWeights, InverseFactorGrid, RatingGrid};
pub use scale::Rating;
