//! Threshold grids for the multi-factor rating assessment.
//!
//! All cutoffs, weights, and spread tables live in named, versioned grid
//! values rather than being scattered through the rating functions.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::rating::scale::Rating;
use crate::types::BasisPoints;

/// Grid for a higher-is-better factor.
///
/// Distress cutoffs are checked first (value strictly below the bound),
/// then floors best-first (value at or above the floor), then the
/// fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorGrid {
    /// Ordered ascending by bound; first match wins
    pub distress_below: Vec<(Decimal, Rating)>,
    /// Ordered descending by floor; first match wins
    pub floors: Vec<(Decimal, Rating)>,
    pub fallback: Rating,
}

impl FactorGrid {
    pub fn rate(&self, value: Decimal) -> Rating {
        for (bound, rating) in &self.distress_below {
            if value < *bound {
                return *rating;
            }
        }
        for (floor, rating) in &self.floors {
            if value >= *floor {
                return *rating;
            }
        }
        self.fallback
    }
}

/// Grid for a lower-is-better factor (leverage ratios).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InverseFactorGrid {
    /// Ordered ascending by ceiling; first match wins (value <= ceiling)
    pub ceilings: Vec<(Decimal, Rating)>,
    pub fallback: Rating,
}

impl InverseFactorGrid {
    pub fn rate(&self, value: Decimal) -> Rating {
        for (ceiling, rating) in &self.ceilings {
            if value <= *ceiling {
                return *rating;
            }
        }
        self.fallback
    }
}

/// Factor weights for the overall weighted-average rating. DSCR carries
/// the largest weight, standard project finance practice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorWeights {
    pub capacity: Decimal,
    pub profitability: Decimal,
    pub coverage: Decimal,
    pub dscr: Decimal,
    pub net_debt_leverage: Decimal,
    pub equity_leverage: Decimal,
    pub asset_leverage: Decimal,
}

impl FactorWeights {
    pub fn total(&self) -> Decimal {
        self.capacity
            + self.profitability
            + self.coverage
            + self.dscr
            + self.net_debt_leverage
            + self.equity_leverage
            + self.asset_leverage
    }
}

/// A complete, named rating methodology: per-factor threshold grids,
/// factor weights, and the rating-to-spread table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingGrid {
    pub name: String,
    pub capacity_mw: FactorGrid,
    pub profitability_pct: FactorGrid,
    pub coverage_x: FactorGrid,
    pub dscr_x: FactorGrid,
    pub net_debt_to_ebitda: InverseFactorGrid,
    /// Above this, leverage is extreme regardless of the ceilings
    pub net_debt_extreme_above: Decimal,
    pub net_debt_extreme_rating: Rating,
    /// Negative net debt is a net cash position
    pub net_cash_rating: Rating,
    /// EBITDA below zero makes the leverage ratio meaningless
    pub negative_ebitda_leverage_rating: Rating,
    pub debt_to_equity_pct: InverseFactorGrid,
    pub debt_to_assets_pct: InverseFactorGrid,
    pub weights: FactorWeights,
    spreads: Vec<(Rating, BasisPoints)>,
}

impl RatingGrid {
    /// Power generation methodology grid, 2023 vintage.
    ///
    /// Thresholds follow published infrastructure and project finance
    /// rating criteria; spreads reflect 2020-2024 corporate bond index
    /// averages, with distressed levels from distressed-debt trading.
    pub fn kis_ipp_2023() -> Self {
        Self {
            name: "kis_ipp_2023".into(),
            capacity_mw: FactorGrid {
                distress_below: vec![],
                floors: vec![
                    (dec!(2000), Rating::Aaa),
                    (dec!(800), Rating::Aa),
                    (dec!(400), Rating::A),
                    (dec!(100), Rating::Bbb),
                    (dec!(20), Rating::Bb),
                ],
                fallback: Rating::B,
            },
            profitability_pct: FactorGrid {
                distress_below: vec![
                    (dec!(-20), Rating::Cc),
                    (dec!(-10), Rating::Ccc),
                    (Decimal::ZERO, Rating::B),
                ],
                floors: vec![
                    (dec!(15), Rating::Aaa),
                    (dec!(11), Rating::Aa),
                    (dec!(8), Rating::A),
                    (dec!(4), Rating::Bbb),
                    (dec!(1), Rating::Bb),
                ],
                fallback: Rating::B,
            },
            coverage_x: FactorGrid {
                distress_below: vec![
                    (dec!(-5), Rating::D),
                    (dec!(-2), Rating::C),
                    (Decimal::ZERO, Rating::Cc),
                    (dec!(0.5), Rating::Ccc),
                ],
                floors: vec![
                    (dec!(12), Rating::Aaa),
                    (dec!(6), Rating::Aa),
                    (dec!(4), Rating::A),
                    (dec!(2), Rating::Bbb),
                    (dec!(1), Rating::Bb),
                ],
                fallback: Rating::B,
            },
            dscr_x: FactorGrid {
                distress_below: vec![
                    (Decimal::ZERO, Rating::D),
                    (dec!(0.5), Rating::C),
                    (dec!(0.8), Rating::Cc),
                    (Decimal::ONE, Rating::Ccc),
                ],
                floors: vec![
                    (dec!(2.5), Rating::Aaa),
                    (dec!(2.0), Rating::Aa),
                    (dec!(1.6), Rating::A),
                    (dec!(1.3), Rating::Bbb),
                    (dec!(1.1), Rating::Bb),
                ],
                fallback: Rating::B,
            },
            net_debt_to_ebitda: InverseFactorGrid {
                ceilings: vec![
                    (Decimal::ONE, Rating::Aaa),
                    (dec!(4), Rating::Aa),
                    (dec!(7), Rating::A),
                    (dec!(10), Rating::Bbb),
                    (dec!(12), Rating::Bb),
                ],
                fallback: Rating::B,
            },
            net_debt_extreme_above: dec!(20),
            net_debt_extreme_rating: Rating::Ccc,
            net_cash_rating: Rating::Aaa,
            negative_ebitda_leverage_rating: Rating::Cc,
            debt_to_equity_pct: InverseFactorGrid {
                ceilings: vec![
                    (dec!(80), Rating::Aaa),
                    (dec!(150), Rating::Aa),
                    (dec!(250), Rating::A),
                    (dec!(300), Rating::Bbb),
                    (dec!(400), Rating::Bb),
                ],
                fallback: Rating::B,
            },
            debt_to_assets_pct: InverseFactorGrid {
                ceilings: vec![
                    (dec!(20), Rating::Aaa),
                    (dec!(40), Rating::Aa),
                    (dec!(60), Rating::A),
                    (dec!(80), Rating::Bbb),
                    (dec!(90), Rating::Bb),
                ],
                fallback: Rating::B,
            },
            weights: FactorWeights {
                capacity: dec!(0.05),
                profitability: dec!(0.10),
                coverage: dec!(0.15),
                dscr: dec!(0.35),
                net_debt_leverage: dec!(0.15),
                equity_leverage: dec!(0.10),
                asset_leverage: dec!(0.10),
            },
            spreads: vec![
                (Rating::Aaa, dec!(50)),
                (Rating::Aa, dec!(100)),
                (Rating::A, dec!(150)),
                (Rating::Bbb, dec!(250)),
                (Rating::Bb, dec!(400)),
                (Rating::B, dec!(600)),
                (Rating::Ccc, dec!(900)),
                (Rating::Cc, dec!(1500)),
                (Rating::C, dec!(2500)),
                (Rating::D, dec!(5000)),
            ],
        }
    }

    /// Spread over risk-free for a rating, in basis points.
    pub fn spread_bps(&self, rating: Rating) -> BasisPoints {
        self.spreads
            .iter()
            .find(|(r, _)| *r == rating)
            .map(|(_, s)| *s)
            .unwrap_or(dec!(5000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_weights_sum_to_one() {
        let grid = RatingGrid::kis_ipp_2023();
        assert_eq!(grid.weights.total(), Decimal::ONE);
    }

    #[test]
    fn test_dscr_grid_boundaries() {
        let grid = RatingGrid::kis_ipp_2023();
        assert_eq!(grid.dscr_x.rate(dec!(2.5)), Rating::Aaa);
        assert_eq!(grid.dscr_x.rate(dec!(1.3)), Rating::Bbb);
        assert_eq!(grid.dscr_x.rate(dec!(1.05)), Rating::B);
        assert_eq!(grid.dscr_x.rate(dec!(0.9)), Rating::Ccc);
        assert_eq!(grid.dscr_x.rate(dec!(0.6)), Rating::Cc);
        assert_eq!(grid.dscr_x.rate(dec!(0.3)), Rating::C);
        assert_eq!(grid.dscr_x.rate(dec!(-1)), Rating::D);
    }

    #[test]
    fn test_coverage_negative_routes_to_distress() {
        let grid = RatingGrid::kis_ipp_2023();
        assert_eq!(grid.coverage_x.rate(dec!(-10)), Rating::D);
        assert_eq!(grid.coverage_x.rate(dec!(-3)), Rating::C);
        assert_eq!(grid.coverage_x.rate(dec!(-0.5)), Rating::Cc);
        assert_eq!(grid.coverage_x.rate(dec!(0.2)), Rating::Ccc);
        assert_eq!(grid.coverage_x.rate(dec!(12)), Rating::Aaa);
    }

    #[test]
    fn test_leverage_grid_lower_is_better() {
        let grid = RatingGrid::kis_ipp_2023();
        assert_eq!(grid.debt_to_equity_pct.rate(dec!(80)), Rating::Aaa);
        assert_eq!(grid.debt_to_equity_pct.rate(dec!(233)), Rating::A);
        assert_eq!(grid.debt_to_equity_pct.rate(dec!(500)), Rating::B);
    }

    #[test]
    fn test_spread_table() {
        let grid = RatingGrid::kis_ipp_2023();
        assert_eq!(grid.spread_bps(Rating::Aaa), dec!(50));
        assert_eq!(grid.spread_bps(Rating::Bbb), dec!(250));
        assert_eq!(grid.spread_bps(Rating::D), dec!(5000));
        // Spreads widen monotonically as credit quality falls
        for score in 1..10 {
            let better = Rating::from_score(score).unwrap();
            let worse = Rating::from_score(score + 1).unwrap();
            assert!(grid.spread_bps(worse) > grid.spread_bps(better));
        }
    }
}
