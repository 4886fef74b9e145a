use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CrpError;
use crate::types::Money;
use crate::CrpResult;

// ---------------------------------------------------------------------------
// Carbon price trajectory
// ---------------------------------------------------------------------------

/// A carbon price trajectory: sorted (year, USD/tCO2) anchor points.
///
/// Prices are queryable for any integer year: flat before the first anchor,
/// piecewise-linear between anchors, geometric extrapolation past the last
/// anchor using the growth rate implied by the final two points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonPriceCurve {
    pub name: String,
    /// Anchor points sorted ascending by year
    points: Vec<(i32, Money)>,
    pub description: String,
    pub source: String,
}

impl CarbonPriceCurve {
    pub fn new(
        name: &str,
        mut points: Vec<(i32, Money)>,
        description: &str,
        source: &str,
    ) -> CrpResult<Self> {
        if points.is_empty() {
            return Err(CrpError::InvalidInput {
                field: "points".into(),
                reason: format!("Carbon price curve '{name}' has no anchor points"),
            });
        }
        points.sort_by_key(|(year, _)| *year);
        for window in points.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(CrpError::InvalidInput {
                    field: "points".into(),
                    reason: format!(
                        "Carbon price curve '{name}' has duplicate anchor year {}",
                        window[0].0
                    ),
                });
            }
        }
        for (year, price) in &points {
            if *price < Decimal::ZERO {
                return Err(CrpError::InvalidInput {
                    field: "points".into(),
                    reason: format!("Carbon price for year {year} is negative"),
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            points,
            description: description.to_string(),
            source: source.to_string(),
        })
    }

    /// Build a curve from the standard four anchor prices.
    pub fn from_anchors(
        name: &str,
        price_2025: Money,
        price_2030: Money,
        price_2040: Money,
        price_2050: Money,
    ) -> CrpResult<Self> {
        Self::new(
            name,
            vec![
                (2025, price_2025),
                (2030, price_2030),
                (2040, price_2040),
                (2050, price_2050),
            ],
            "Four-anchor carbon price trajectory",
            "User-supplied anchors",
        )
    }

    /// Carbon price for a given year in USD/tCO2.
    pub fn price(&self, year: i32) -> Money {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];

        if year <= first.0 {
            return first.1;
        }

        if year >= last.0 {
            return self.extrapolate_beyond(year, last);
        }

        // Linear interpolation between the bracketing anchors
        for window in self.points.windows(2) {
            let (y0, p0) = window[0];
            let (y1, p1) = window[1];
            if y0 <= year && year <= y1 {
                let weight = Decimal::from(year - y0) / Decimal::from(y1 - y0);
                return p0 + weight * (p1 - p0);
            }
        }

        last.1
    }

    /// Geometric extrapolation past the last anchor, growth rate implied
    /// by the final two points. Flat if the penultimate price is zero or
    /// only one anchor exists.
    fn extrapolate_beyond(&self, year: i32, last: (i32, Money)) -> Money {
        if year == last.0 || self.points.len() < 2 {
            return last.1;
        }
        let (y1, p1) = self.points[self.points.len() - 2];
        if p1 <= Decimal::ZERO {
            return last.1;
        }

        let span = Decimal::from(last.0 - y1);
        let ratio = last.1 / p1;
        let growth_factor = ratio.powd(Decimal::ONE / span);

        let mut price = last.1;
        for _ in 0..(year - last.0) {
            price *= growth_factor;
        }
        price
    }

    pub fn first_year(&self) -> i32 {
        self.points[0].0
    }
}

// ---------------------------------------------------------------------------
// Literature scenario families
// ---------------------------------------------------------------------------

/// Conservative ETS baseline: policy inertia, market oversupply persists.
pub fn current_policy() -> CarbonPriceCurve {
    CarbonPriceCurve {
        name: "current_policy".into(),
        points: vec![
            (2024, dec!(8)),
            (2025, dec!(8)),
            (2026, dec!(10)),
            (2027, dec!(12)),
            (2028, dec!(14)),
            (2029, dec!(16)),
            (2030, dec!(20)),
            (2032, dec!(25)),
            (2035, dec!(35)),
            (2040, dec!(50)),
            (2045, dec!(60)),
            (2050, dec!(75)),
        ],
        description: "Conservative ETS baseline (policy inertia, no major changes)".into(),
        source: "ETS market data + conservative extrapolation".into(),
    }
}

/// Enhanced ambition to meet the 2030 NDC (40% reduction).
pub fn ndc_aligned() -> CarbonPriceCurve {
    CarbonPriceCurve {
        name: "ndc_aligned".into(),
        points: vec![
            (2024, dec!(8)),
            (2025, dec!(15)),
            (2026, dec!(25)),
            (2027, dec!(35)),
            (2028, dec!(48)),
            (2029, dec!(62)),
            (2030, dec!(80)),
            (2032, dec!(100)),
            (2035, dec!(130)),
            (2040, dec!(180)),
            (2045, dec!(230)),
            (2050, dec!(280)),
        ],
        description: "Enhanced ambition to meet 40% NDC reduction by 2030".into(),
        source: "IEA analysis of NDC-consistent carbon prices".into(),
    }
}

/// Aggressive pricing for 2050 carbon neutrality (IEA NZE-aligned).
pub fn net_zero_2050() -> CarbonPriceCurve {
    CarbonPriceCurve {
        name: "net_zero_2050".into(),
        points: vec![
            (2024, dec!(8)),
            (2025, dec!(20)),
            (2026, dec!(35)),
            (2027, dec!(50)),
            (2028, dec!(68)),
            (2029, dec!(88)),
            (2030, dec!(110)),
            (2032, dec!(140)),
            (2035, dec!(190)),
            (2040, dec!(260)),
            (2045, dec!(350)),
            (2050, dec!(450)),
        ],
        description: "Aggressive carbon pricing for 2050 carbon neutrality".into(),
        source: "National carbon neutrality scenario + IEA WEO 2023 NZE".into(),
    }
}

/// Policy paralysis until 2029 followed by aggressive catch-up.
pub fn delayed_action() -> CarbonPriceCurve {
    CarbonPriceCurve {
        name: "delayed_action".into(),
        points: vec![
            (2024, dec!(8)),
            (2025, dec!(8)),
            (2026, dec!(10)),
            (2027, dec!(12)),
            (2028, dec!(15)),
            (2029, dec!(25)),
            (2030, dec!(50)),
            (2032, dec!(90)),
            (2035, dec!(160)),
            (2040, dec!(280)),
            (2045, dec!(400)),
            (2050, dec!(500)),
        ],
        description: "Delayed policy action until 2029 then aggressive catch-up".into(),
        source: "NGFS Delayed Transition scenario".into(),
    }
}

/// 1.5°C aligned pricing (IPCC high-ambition pathway).
pub fn high_ambition() -> CarbonPriceCurve {
    CarbonPriceCurve {
        name: "high_ambition".into(),
        points: vec![
            (2024, dec!(15)),
            (2025, dec!(40)),
            (2026, dec!(65)),
            (2027, dec!(90)),
            (2028, dec!(120)),
            (2029, dec!(150)),
            (2030, dec!(185)),
            (2032, dec!(230)),
            (2035, dec!(320)),
            (2040, dec!(420)),
            (2045, dec!(520)),
            (2050, dec!(600)),
        ],
        description: "1.5°C aligned carbon pricing (IPCC high ambition pathway)".into(),
        source: "IPCC SR1.5 + IEA WEO 2023 NZE high estimate".into(),
    }
}

/// Hypothetical counterfactual with no carbon pricing at all.
pub fn no_policy() -> CarbonPriceCurve {
    CarbonPriceCurve {
        name: "no_policy".into(),
        points: vec![(2024, Decimal::ZERO), (2060, Decimal::ZERO)],
        description: "Hypothetical no carbon pricing (counterfactual only)".into(),
        source: "Hypothetical baseline".into(),
    }
}

/// Look up a literature scenario family by name.
pub fn builtin(name: &str) -> CrpResult<CarbonPriceCurve> {
    match name {
        "current_policy" => Ok(current_policy()),
        "ndc_aligned" => Ok(ndc_aligned()),
        "net_zero_2050" => Ok(net_zero_2050()),
        "delayed_action" => Ok(delayed_action()),
        "high_ambition" => Ok(high_ambition()),
        "no_policy" => Ok(no_policy()),
        other => Err(CrpError::UnknownScenario {
            kind: "carbon price".into(),
            name: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flat_before_first_anchor() {
        let curve = net_zero_2050();
        assert_eq!(curve.price(2020), dec!(8));
        assert_eq!(curve.price(2024), dec!(8));
    }

    #[test]
    fn test_anchor_years_exact() {
        let curve = net_zero_2050();
        assert_eq!(curve.price(2030), dec!(110));
        assert_eq!(curve.price(2050), dec!(450));
    }

    #[test]
    fn test_linear_interpolation_between_anchors() {
        let curve = net_zero_2050();
        // Midpoint of 2030 (110) and 2032 (140)
        assert_eq!(curve.price(2031), dec!(125));
    }

    #[test]
    fn test_geometric_extrapolation_beyond_last() {
        let curve = net_zero_2050();
        // 2045→2050 implies ~5.15%/yr growth, so 2051 > 450
        let p2051 = curve.price(2051);
        assert!(p2051 > dec!(450), "extrapolated price = {}", p2051);
        assert!(p2051 < dec!(500));
        // Monotone beyond the last anchor
        assert!(curve.price(2055) > p2051);
    }

    #[test]
    fn test_no_policy_is_zero_everywhere() {
        let curve = no_policy();
        for year in [2020, 2024, 2035, 2050, 2070] {
            assert_eq!(curve.price(year), Decimal::ZERO);
        }
    }

    #[test]
    fn test_high_ambition_exceeds_current_policy_from_2030() {
        let high = high_ambition();
        let current = current_policy();
        for year in 2030..=2055 {
            assert!(
                high.price(year) > current.price(year),
                "year {year}: {} vs {}",
                high.price(year),
                current.price(year)
            );
        }
    }

    #[test]
    fn test_net_zero_monotonic() {
        let curve = net_zero_2050();
        assert!(curve.price(2050) > curve.price(2030));
        assert!(curve.price(2030) > curve.price(2024));
    }

    #[test]
    fn test_from_anchors() {
        let curve =
            CarbonPriceCurve::from_anchors("custom", dec!(10), dec!(50), dec!(100), dec!(200))
                .unwrap();
        assert_eq!(curve.price(2025), dec!(10));
        assert_eq!(curve.price(2030), dec!(50));
        // Halfway between 2030 ($50) and 2040 ($100)
        assert_eq!(curve.price(2035), dec!(75));
    }

    #[test]
    fn test_empty_curve_rejected() {
        assert!(CarbonPriceCurve::new("empty", vec![], "", "").is_err());
    }

    #[test]
    fn test_duplicate_year_rejected() {
        let result = CarbonPriceCurve::new(
            "dup",
            vec![(2025, dec!(10)), (2025, dec!(20))],
            "",
            "",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_builtin_lookup_unknown_name() {
        let err = builtin("warm_policy").unwrap_err();
        match err {
            CrpError::UnknownScenario { kind, name } => {
                assert_eq!(kind, "carbon price");
                assert_eq!(name, "warm_policy");
            }
            other => panic!("Expected UnknownScenario, got: {other:?}"),
        }
    }
}
