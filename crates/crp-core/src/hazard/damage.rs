use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::hazard::events::HazardKind;

/// Piecewise-linear vulnerability curve mapping hazard intensity to a
/// mean damage ratio (fraction of exposure). Flat beyond the endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageCurve {
    pub kind: HazardKind,
    pub intensity_unit: String,
    /// Curve points sorted ascending by intensity
    points: Vec<(Decimal, Decimal)>,
    pub source: String,
}

impl DamageCurve {
    pub fn new(
        kind: HazardKind,
        intensity_unit: &str,
        mut points: Vec<(Decimal, Decimal)>,
        source: &str,
    ) -> Self {
        points.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            kind,
            intensity_unit: intensity_unit.to_string(),
            points,
            source: source.to_string(),
        }
    }

    /// Damage fraction at an intensity, linearly interpolated.
    pub fn damage(&self, intensity: Decimal) -> Decimal {
        if self.points.is_empty() {
            return Decimal::ZERO;
        }
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];

        if intensity <= first.0 {
            return first.1;
        }
        if intensity >= last.0 {
            return last.1;
        }
        for window in self.points.windows(2) {
            let (x0, y0) = window[0];
            let (x1, y1) = window[1];
            if x0 <= intensity && intensity <= x1 {
                let weight = (intensity - x0) / (x1 - x0);
                return y0 + weight * (y1 - y0);
            }
        }
        Decimal::ZERO
    }

    /// Largest damage fraction on the curve.
    pub fn max_damage(&self) -> Decimal {
        self.points
            .iter()
            .map(|(_, d)| *d)
            .fold(Decimal::ZERO, Decimal::max)
    }
}

// ---------------------------------------------------------------------------
// Literature curves
// ---------------------------------------------------------------------------

/// HAZUS-style flood depth-damage curve for industrial facilities.
pub fn flood_depth_damage() -> DamageCurve {
    DamageCurve::new(
        HazardKind::Flood,
        "meters",
        vec![
            (dec!(0.0), dec!(0.00)),
            (dec!(0.3), dec!(0.05)),
            (dec!(0.6), dec!(0.15)),
            (dec!(1.0), dec!(0.30)),
            (dec!(1.5), dec!(0.50)),
            (dec!(2.0), dec!(0.70)),
            (dec!(3.0), dec!(0.90)),
            (dec!(4.5), dec!(1.00)),
        ],
        "FEMA HAZUS-MH Technical Manual (2022)",
    )
}

/// Wildfire transmission-outage curve indexed by fire weather index.
pub fn wildfire_fwi_damage() -> DamageCurve {
    DamageCurve::new(
        HazardKind::Wildfire,
        "FWI",
        vec![
            (dec!(0), dec!(0.00)),
            (dec!(20), dec!(0.01)),
            (dec!(30), dec!(0.03)),
            (dec!(40), dec!(0.06)),
            (dec!(50), dec!(0.10)),
            (dec!(60), dec!(0.15)),
            (dec!(80), dec!(0.25)),
        ],
        "Derived from CAISO wildfire statistics (2003-2016)",
    )
}

/// Thermal efficiency loss per degree of temperature anomaly.
pub fn heat_wave_damage() -> DamageCurve {
    DamageCurve::new(
        HazardKind::HeatWave,
        "degC above normal",
        vec![
            (dec!(0), dec!(0.000)),
            (dec!(5), dec!(0.015)),
            (dec!(10), dec!(0.035)),
            (dec!(15), dec!(0.060)),
            (dec!(20), dec!(0.100)),
        ],
        "S&P Global/ES&T (2017) thermal efficiency study",
    )
}

/// Cooling water intake derate from sea level rise.
pub fn sea_level_rise_damage() -> DamageCurve {
    DamageCurve::new(
        HazardKind::SeaLevelRise,
        "meters SLR",
        vec![
            (dec!(0.0), dec!(0.000)),
            (dec!(0.1), dec!(0.005)),
            (dec!(0.3), dec!(0.015)),
            (dec!(0.5), dec!(0.030)),
            (dec!(1.0), dec!(0.060)),
            (dec!(1.5), dec!(0.100)),
        ],
        "IPCC AR6 + coastal power plant studies",
    )
}
