//! Expected annual loss, loss exceedance, compound amplification, and the
//! credit translation of physical hazards.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::hazard::damage::{
    self, DamageCurve,
};
use crate::hazard::events::{ClimateSeverity, HazardEvent, HazardKind};
use crate::scenarios::physical::PhysicalHazardData;
use crate::types::{BasisPoints, Money, Multiple};

const DAYS_PER_YEAR: Decimal = dec!(365);
/// Amplification bounds from compound-event literature
const BASE_COMPOUND_MULTIPLIER: Decimal = dec!(1.2);
const MAX_COMPOUND_MULTIPLIER: Decimal = dec!(2.0);
/// Spread impact per rating notch, investment-grade rule of thumb
const SPREAD_BPS_PER_NOTCH: Decimal = dec!(50);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// The exposed asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exposure {
    pub name: String,
    pub asset_value: Money,
    pub capacity_mw: Decimal,
    pub annual_revenue: Money,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Annual risk for a single hazard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualRisk {
    pub kind: HazardKind,
    pub expected_annual_loss: Money,
    pub expected_outage_days: Decimal,
    /// (annual probability, loss) pairs sorted ascending by loss
    pub loss_distribution: Vec<(Decimal, Money)>,
    pub pml_100yr: Money,
    pub pml_250yr: Money,
}

impl AnnualRisk {
    fn empty(kind: HazardKind) -> Self {
        Self {
            kind,
            expected_annual_loss: Decimal::ZERO,
            expected_outage_days: Decimal::ZERO,
            loss_distribution: Vec::new(),
            pml_100yr: Decimal::ZERO,
            pml_250yr: Decimal::ZERO,
        }
    }

    /// EAL as a fraction of the worst loss on the curve; feeds the
    /// compound stress measure.
    pub fn eal_rate(&self) -> Decimal {
        let max_loss = self
            .loss_distribution
            .iter()
            .map(|(_, loss)| *loss)
            .fold(Decimal::ZERO, Decimal::max);
        if max_loss > Decimal::ZERO {
            self.expected_annual_loss / max_loss
        } else {
            Decimal::ZERO
        }
    }
}

/// Aggregate risk across concurrent hazards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundRisk {
    pub total_eal_individual: Money,
    pub total_eal_compound: Money,
    pub compound_multiplier: Decimal,
    pub outage_days_individual: Decimal,
    pub outage_days_compound: Decimal,
    pub flood_eal: Money,
    pub wildfire_eal: Money,
    pub heat_wave_eal: Money,
    pub flood_pml_100yr: Money,
    pub wildfire_pml_100yr: Money,
}

/// Physical risk translated into credit metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditRiskImpact {
    pub pd_increase_bps: BasisPoints,
    pub lgd_increase_pct: Decimal,
    pub expected_loss_annual: Money,
    pub dscr_reduction: Multiple,
    pub rating_notches_down: i32,
}

impl CreditRiskImpact {
    /// Estimated credit spread impact in basis points.
    pub fn spread_impact_bps(&self) -> BasisPoints {
        self.pd_increase_bps + Decimal::from(self.rating_notches_down) * SPREAD_BPS_PER_NOTCH
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Deterministic probabilistic-risk engine over discrete event sets.
#[derive(Debug, Clone)]
pub struct HazardRiskEngine {
    pub exposure: Exposure,
    flood_curve: DamageCurve,
    wildfire_curve: DamageCurve,
    heat_curve: DamageCurve,
    slr_curve: DamageCurve,
    flood_events: Vec<HazardEvent>,
    wildfire_events: Vec<HazardEvent>,
    heat_events: Vec<HazardEvent>,
}

impl HazardRiskEngine {
    /// Build an engine with the literature default curves and event sets.
    pub fn new(exposure: Exposure) -> Self {
        Self {
            exposure,
            flood_curve: damage::flood_depth_damage(),
            wildfire_curve: damage::wildfire_fwi_damage(),
            heat_curve: damage::heat_wave_damage(),
            slr_curve: damage::sea_level_rise_damage(),
            flood_events: default_flood_events(),
            wildfire_events: default_wildfire_events(),
            heat_events: default_heat_events(),
        }
    }

    fn curve(&self, kind: HazardKind) -> &DamageCurve {
        match kind {
            HazardKind::Flood => &self.flood_curve,
            HazardKind::Wildfire => &self.wildfire_curve,
            HazardKind::HeatWave => &self.heat_curve,
            HazardKind::SeaLevelRise => &self.slr_curve,
        }
    }

    fn events(&self, kind: HazardKind) -> &[HazardEvent] {
        match kind {
            HazardKind::Flood => &self.flood_events,
            HazardKind::Wildfire => &self.wildfire_events,
            HazardKind::HeatWave => &self.heat_events,
            // Sea level rise is chronic, not event-based; it enters the
            // engine through the capacity derate path instead
            HazardKind::SeaLevelRise => &[],
        }
    }

    /// Expected annual loss and exceedance curve for one hazard.
    pub fn annual_risk(
        &self,
        kind: HazardKind,
        year: i32,
        severity: ClimateSeverity,
    ) -> AnnualRisk {
        let events = self.events(kind);
        if events.is_empty() {
            return AnnualRisk::empty(kind);
        }
        let curve = self.curve(kind);
        let climate_factor = severity.climate_factor(kind, year);

        let mut eal = Decimal::ZERO;
        let mut outage_days = Decimal::ZERO;
        let mut distribution = Vec::with_capacity(events.len());

        for event in events {
            let adjusted_intensity = event.intensity * climate_factor;
            let damage_fraction = curve.damage(adjusted_intensity);

            // Losses are revenue losses, not asset destruction
            let loss = damage_fraction * self.exposure.annual_revenue;
            let days = event.duration_days * damage_fraction * DAYS_PER_YEAR / dec!(100);

            eal += event.annual_probability * loss;
            outage_days += event.annual_probability * days;
            distribution.push((event.annual_probability, loss));
        }

        distribution.sort_by(|a, b| a.1.cmp(&b.1));

        let pml_100yr = pml(&distribution, dec!(0.01));
        let pml_250yr = pml(&distribution, dec!(0.004));

        AnnualRisk {
            kind,
            expected_annual_loss: eal,
            expected_outage_days: outage_days,
            loss_distribution: distribution,
            pml_100yr,
            pml_250yr,
        }
    }

    /// Aggregate risk across flood, wildfire, and heat with compound
    /// amplification: the multiplier grows with total system stress and
    /// is bounded by the literature range.
    pub fn compound_risk(&self, year: i32, severity: ClimateSeverity) -> CompoundRisk {
        let flood = self.annual_risk(HazardKind::Flood, year, severity);
        let wildfire = self.annual_risk(HazardKind::Wildfire, year, severity);
        let heat = self.annual_risk(HazardKind::HeatWave, year, severity);

        let total_eal = flood.expected_annual_loss
            + wildfire.expected_annual_loss
            + heat.expected_annual_loss;
        let total_days =
            flood.expected_outage_days + wildfire.expected_outage_days + heat.expected_outage_days;

        let stress = flood.eal_rate() + wildfire.eal_rate() + heat.eal_rate();
        let stress_factor = (stress * dec!(10)).min(Decimal::ONE);
        let multiplier = BASE_COMPOUND_MULTIPLIER
            + (MAX_COMPOUND_MULTIPLIER - BASE_COMPOUND_MULTIPLIER) * stress_factor;

        CompoundRisk {
            total_eal_individual: total_eal,
            total_eal_compound: total_eal * multiplier,
            compound_multiplier: multiplier,
            outage_days_individual: total_days,
            outage_days_compound: total_days * multiplier,
            flood_eal: flood.expected_annual_loss,
            wildfire_eal: wildfire.expected_annual_loss,
            heat_wave_eal: heat.expected_annual_loss,
            flood_pml_100yr: flood.pml_100yr,
            wildfire_pml_100yr: wildfire.pml_100yr,
        }
    }

    /// Translate compound physical risk into credit metric deltas.
    pub fn credit_impact(
        &self,
        year: i32,
        severity: ClimateSeverity,
        baseline_dscr: Multiple,
    ) -> CreditRiskImpact {
        let compound = self.compound_risk(year, severity);
        let eal = compound.total_eal_compound;

        let eal_rate = if self.exposure.annual_revenue > Decimal::ZERO {
            eal / self.exposure.annual_revenue
        } else {
            Decimal::ZERO
        };

        let dscr_reduction = baseline_dscr * eal_rate;
        let pd_increase_bps = eal_rate * dec!(1000);

        let pml_100yr = compound.flood_pml_100yr + compound.wildfire_pml_100yr;
        let lgd_increase_pct = if self.exposure.asset_value > Decimal::ZERO {
            pml_100yr / self.exposure.asset_value * dec!(100)
        } else {
            Decimal::ZERO
        };

        let rating_notches_down = (dscr_reduction / dec!(0.2))
            .floor()
            .to_i32()
            .unwrap_or(0);

        CreditRiskImpact {
            pd_increase_bps,
            lgd_increase_pct,
            expected_loss_annual: eal,
            dscr_reduction,
            rating_notches_down,
        }
    }

    /// Reduce the probabilistic outputs to the deterministic hazard bundle
    /// the risk adjustment layer consumes. Expected outage days become
    /// annual outage rates; sea level rise stays on the chronic derate
    /// path and is not populated here.
    pub fn physical_hazard_data(
        &self,
        name: &str,
        year: i32,
        severity: ClimateSeverity,
    ) -> PhysicalHazardData {
        let flood = self.annual_risk(HazardKind::Flood, year, severity);
        let wildfire = self.annual_risk(HazardKind::Wildfire, year, severity);
        let compound = self.compound_risk(year, severity);

        let mut data = PhysicalHazardData::none(name);
        data.flood_outage_rate =
            (flood.expected_outage_days / DAYS_PER_YEAR).min(Decimal::ONE);
        data.wildfire_outage_rate =
            (wildfire.expected_outage_days / DAYS_PER_YEAR).min(Decimal::ONE);
        data.compound_multiplier = compound.compound_multiplier;
        data
    }
}

/// PML at an exceedance probability: the smallest loss on the curve whose
/// cumulative probability mass reaches 1 - p.
fn pml(distribution: &[(Decimal, Money)], exceedance_prob: Decimal) -> Money {
    let mut cumulative = Decimal::ZERO;
    for (prob, loss) in distribution {
        cumulative += prob;
        if cumulative >= Decimal::ONE - exceedance_prob {
            return *loss;
        }
    }
    distribution.last().map(|(_, loss)| *loss).unwrap_or(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Default event sets
// ---------------------------------------------------------------------------

/// Riverine/coastal flood events by return period.
fn default_flood_events() -> Vec<HazardEvent> {
    vec![
        HazardEvent::new(HazardKind::Flood, dec!(0.0), dec!(0.50), dec!(0)),
        HazardEvent::new(HazardKind::Flood, dec!(0.3), dec!(0.20), dec!(3)),
        HazardEvent::new(HazardKind::Flood, dec!(0.6), dec!(0.10), dec!(5)),
        HazardEvent::new(HazardKind::Flood, dec!(1.0), dec!(0.04), dec!(7)),
        HazardEvent::new(HazardKind::Flood, dec!(1.5), dec!(0.02), dec!(10)),
        HazardEvent::new(HazardKind::Flood, dec!(2.0), dec!(0.01), dec!(14)),
        HazardEvent::new(HazardKind::Flood, dec!(3.0), dec!(0.004), dec!(21)),
        HazardEvent::new(HazardKind::Flood, dec!(4.0), dec!(0.002), dec!(30)),
    ]
}

/// Wildfire events indexed by fire weather index.
fn default_wildfire_events() -> Vec<HazardEvent> {
    vec![
        HazardEvent::new(HazardKind::Wildfire, dec!(20), dec!(0.60), dec!(0)),
        HazardEvent::new(HazardKind::Wildfire, dec!(30), dec!(0.20), dec!(3)),
        HazardEvent::new(HazardKind::Wildfire, dec!(40), dec!(0.10), dec!(5)),
        HazardEvent::new(HazardKind::Wildfire, dec!(50), dec!(0.05), dec!(7)),
        HazardEvent::new(HazardKind::Wildfire, dec!(60), dec!(0.03), dec!(10)),
        HazardEvent::new(HazardKind::Wildfire, dec!(80), dec!(0.01), dec!(14)),
    ]
}

/// Heat wave events as temperature anomalies above normal.
fn default_heat_events() -> Vec<HazardEvent> {
    vec![
        HazardEvent::new(HazardKind::HeatWave, dec!(0), dec!(0.50), dec!(0)),
        HazardEvent::new(HazardKind::HeatWave, dec!(5), dec!(0.25), dec!(14)),
        HazardEvent::new(HazardKind::HeatWave, dec!(10), dec!(0.15), dec!(7)),
        HazardEvent::new(HazardKind::HeatWave, dec!(15), dec!(0.07), dec!(5)),
        HazardEvent::new(HazardKind::HeatWave, dec!(20), dec!(0.03), dec!(3)),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
