//! Scenario orchestrator: runs the full risk-to-financing pipeline once
//! per named scenario and computes cross-scenario deltas.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::adjustments::{apply_physical, apply_transition, PhysicalAdjustment, TransitionAdjustment};
use crate::cashflow::{project_cashflows, CashFlowStatement};
use crate::error::CrpError;
use crate::financing::{
    impact_from_rating, impact_with_counterfactual, FinancingImpact, FinancingParams,
    ReferenceMode,
};
use crate::metrics::{calculate_metrics, FinancialMetrics};
use crate::rating::assessor::FinancialSnapshot;
use crate::rating::{
    assess_credit_rating, rating_migration, RatingAssessment, RatingGrid, RatingMetrics,
    RatingMigration,
};
use crate::scenarios::ScenarioCatalog;
use crate::types::{with_metadata, ComputationOutput, PlantParameters};
use crate::CrpResult;

/// Reserved scenario name for the peer-baseline reference
pub const BASELINE_SCENARIO: &str = "baseline";

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// One named scenario to run: references into the loaded catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,
    pub transition: String,
    pub physical: String,
    pub market: Option<String>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Everything produced for one scenario. Financing and migration are
/// filled in the second (cross-scenario) pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub transition_adjustment: TransitionAdjustment,
    pub physical_adjustment: PhysicalAdjustment,
    pub cashflow: CashFlowStatement,
    pub metrics: FinancialMetrics,
    pub rating: RatingAssessment,
    pub financing: Option<FinancingImpact>,
    pub migration: Option<RatingMigration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub reference: ReferenceMode,
    pub results: BTreeMap<String, ScenarioResult>,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Owns the process-wide read-only inputs and runs scenarios against them.
pub struct ScenarioRunner {
    plant: PlantParameters,
    catalog: ScenarioCatalog,
    grid: RatingGrid,
    financing_params: FinancingParams,
    reference: ReferenceMode,
}

impl ScenarioRunner {
    pub fn new(
        plant: PlantParameters,
        catalog: ScenarioCatalog,
        grid: RatingGrid,
        financing_params: FinancingParams,
        reference: ReferenceMode,
    ) -> CrpResult<Self> {
        plant.validate()?;
        financing_params.validate()?;
        Ok(Self {
            plant,
            catalog,
            grid,
            financing_params,
            reference,
        })
    }

    /// Run one scenario end to end (adjustments, cash flows, metrics,
    /// rating). Fails fast on unknown scenario names.
    pub fn run_scenario(&self, spec: &ScenarioSpec) -> CrpResult<ScenarioResult> {
        let transition = self.catalog.transition(&spec.transition)?;
        let physical = self.catalog.physical(&spec.physical)?;
        physical.validate()?;
        let market = match &spec.market {
            Some(name) => Some(self.catalog.market(name)?),
            None => None,
        };

        let transition_adjustment = apply_transition(&self.plant, transition);
        let physical_adjustment = apply_physical(&self.plant, physical);

        let cashflow = project_cashflows(
            &self.plant,
            transition,
            &transition_adjustment,
            &physical_adjustment,
            market,
            self.plant.start_year,
        )?;

        let metrics = calculate_metrics(&cashflow, &self.plant)?;
        let rating = self.assess_rating(&cashflow, &metrics)?;

        Ok(ScenarioResult {
            name: spec.name.clone(),
            transition_adjustment,
            physical_adjustment,
            cashflow,
            metrics,
            rating,
            financing: None,
            migration: None,
        })
    }

    /// Run every scenario, then a second pass computing financing impact
    /// and rating migration against the configured reference.
    pub fn run_all(
        &self,
        specs: &[ScenarioSpec],
    ) -> CrpResult<ComputationOutput<ScenarioComparison>> {
        let mut results = BTreeMap::new();
        for spec in specs {
            let result = self.run_scenario(spec)?;
            results.insert(spec.name.clone(), result);
        }

        match self.reference {
            ReferenceMode::PeerBaseline => self.apply_peer_baseline(&mut results)?,
            ReferenceMode::Counterfactual(rating) => {
                self.apply_counterfactual(&mut results, rating)
            }
        }

        let mut warnings = Vec::new();
        for result in results.values() {
            if result.rating.overall.is_distressed() {
                warnings.push(format!(
                    "Scenario '{}' is distressed (rating {})",
                    result.name, result.rating.overall
                ));
            }
            if result.metrics.payback_year.is_none() {
                warnings.push(format!(
                    "Scenario '{}' never recovers its invested capital",
                    result.name
                ));
            }
        }

        Ok(with_metadata(
            "Scenario pipeline: risk adjustments, cash flows, metrics, rating, financing",
            &self.financing_params,
            warnings,
            ScenarioComparison {
                reference: self.reference,
                results,
            },
        ))
    }

    /// Build the rating inputs from the projection: first-year balance
    /// sheet, average operating performance, average DSCR.
    fn assess_rating(
        &self,
        cashflow: &CashFlowStatement,
        metrics: &FinancialMetrics,
    ) -> CrpResult<RatingAssessment> {
        let n_years = Decimal::from(cashflow.years.len() as u64);
        let total_ebitda: Decimal = cashflow.years.iter().map(|y| y.ebitda).sum();
        let avg_ebitda = if n_years > Decimal::ZERO {
            total_ebitda / n_years
        } else {
            Decimal::ZERO
        };
        let first_year_interest = cashflow
            .years
            .first()
            .map(|y| y.interest)
            .unwrap_or(Decimal::ZERO);

        let snapshot = FinancialSnapshot {
            capacity_mw: self.plant.capacity_mw,
            ebitda: avg_ebitda,
            fixed_assets: self.plant.total_capex,
            interest_expense: first_year_interest,
            total_debt: self.plant.debt_amount(),
            cash_and_equivalents: Decimal::ZERO,
            total_equity: self.plant.total_capex * self.plant.equity_fraction,
            total_assets: self.plant.total_capex,
            dscr: metrics.avg_dscr,
        };

        let rating_metrics = RatingMetrics::from_financials(&snapshot);
        assess_credit_rating(&rating_metrics, &self.grid)
    }

    fn apply_peer_baseline(
        &self,
        results: &mut BTreeMap<String, ScenarioResult>,
    ) -> CrpResult<()> {
        let baseline = results
            .get(BASELINE_SCENARIO)
            .ok_or_else(|| CrpError::UnknownScenario {
                kind: "reference".into(),
                name: BASELINE_SCENARIO.into(),
            })?
            .clone();

        for result in results.values_mut() {
            if result.name == BASELINE_SCENARIO {
                continue;
            }
            let npv_loss = baseline.metrics.npv - result.metrics.npv;
            result.financing = Some(impact_from_rating(
                result.rating.spread_bps,
                baseline.rating.spread_bps,
                npv_loss,
                self.plant.total_capex,
                &self.financing_params,
            ));
            result.migration = Some(rating_migration(
                &baseline.rating,
                &result.rating,
                &self.grid,
            ));
        }
        Ok(())
    }

    fn apply_counterfactual(
        &self,
        results: &mut BTreeMap<String, ScenarioResult>,
        counterfactual: crate::rating::Rating,
    ) {
        // EL% reporting uses the peer baseline when one was run
        let baseline_npv = results
            .get(BASELINE_SCENARIO)
            .map(|r| r.metrics.npv);

        for result in results.values_mut() {
            let npv_loss = baseline_npv
                .map(|b| b - result.metrics.npv)
                .unwrap_or(Decimal::ZERO);
            result.financing = Some(impact_with_counterfactual(
                result.rating.overall,
                result.rating.spread_bps,
                counterfactual,
                self.grid.spread_bps(counterfactual),
                npv_loss,
                self.plant.total_capex,
                &self.financing_params,
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::Rating;
    use crate::scenarios::{carbon, MarketScenario, PhysicalHazardData, TransitionScenario};
    use crate::types::tests::sample_plant;
    use rust_decimal_macros::dec;

    fn standard_catalog(plant: &PlantParameters) -> ScenarioCatalog {
        let mut catalog = ScenarioCatalog::new();
        catalog.add_transition(
            TransitionScenario::new(
                "baseline",
                Decimal::ZERO,
                plant.operating_years,
                carbon::no_policy(),
            )
            .unwrap(),
        );
        catalog.add_transition(
            TransitionScenario::new("net_zero", dec!(0.10), 22, carbon::net_zero_2050())
                .unwrap(),
        );
        catalog.add_physical(PhysicalHazardData::none("benign"));
        let mut coastal = PhysicalHazardData::none("coastal_high");
        coastal.wildfire_outage_rate = dec!(0.02);
        coastal.flood_outage_rate = dec!(0.03);
        coastal.slr_capacity_derate = dec!(0.03);
        coastal.compound_multiplier = dec!(1.4);
        catalog.add_physical(coastal);
        catalog.add_market(MarketScenario {
            name: "flat".into(),
            demand_growth_pct: Decimal::ZERO,
            price_sensitivity: dec!(0.5),
            base_power_price: dec!(80),
        });
        catalog
    }

    fn standard_specs() -> Vec<ScenarioSpec> {
        vec![
            ScenarioSpec {
                name: "baseline".into(),
                transition: "baseline".into(),
                physical: "benign".into(),
                market: None,
            },
            ScenarioSpec {
                name: "net_zero_coastal".into(),
                transition: "net_zero".into(),
                physical: "coastal_high".into(),
                market: None,
            },
        ]
    }

    fn peer_runner(plant: PlantParameters) -> ScenarioRunner {
        let catalog = standard_catalog(&plant);
        ScenarioRunner::new(
            plant,
            catalog,
            RatingGrid::kis_ipp_2023(),
            FinancingParams::default(),
            ReferenceMode::PeerBaseline,
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_scenario_fails_fast() {
        let runner = peer_runner(sample_plant());
        let spec = ScenarioSpec {
            name: "bad".into(),
            transition: "does_not_exist".into(),
            physical: "benign".into(),
            market: None,
        };
        let err = runner.run_scenario(&spec).unwrap_err();
        match err {
            CrpError::UnknownScenario { kind, name } => {
                assert_eq!(kind, "transition");
                assert_eq!(name, "does_not_exist");
            }
            other => panic!("Expected UnknownScenario, got: {other:?}"),
        }
    }

    #[test]
    fn test_peer_baseline_second_pass() {
        let runner = peer_runner(sample_plant());
        let output = runner.run_all(&standard_specs()).unwrap();
        let comparison = output.result;

        let baseline = &comparison.results["baseline"];
        assert!(baseline.financing.is_none());
        assert!(baseline.migration.is_none());

        let risk = &comparison.results["net_zero_coastal"];
        let financing = risk.financing.as_ref().unwrap();
        let migration = risk.migration.as_ref().unwrap();

        // Carbon costs and hazards destroy value relative to baseline
        assert!(risk.metrics.npv < baseline.metrics.npv);
        assert!(financing.expected_loss_pct > Decimal::ZERO);
        assert!(migration.notch_change >= 0);
        // Worse scenario can never carry a tighter spread
        assert!(financing.debt_spread_bps >= baseline.rating.spread_bps);
    }

    #[test]
    fn test_peer_baseline_requires_baseline_entry() {
        let runner = peer_runner(sample_plant());
        let specs = vec![ScenarioSpec {
            name: "net_zero_coastal".into(),
            transition: "net_zero".into(),
            physical: "coastal_high".into(),
            market: None,
        }];
        let err = runner.run_all(&specs).unwrap_err();
        assert!(matches!(err, CrpError::UnknownScenario { .. }));
    }

    #[test]
    fn test_counterfactual_mode_covers_every_scenario() {
        let plant = sample_plant();
        let catalog = standard_catalog(&plant);
        let runner = ScenarioRunner::new(
            plant,
            catalog,
            RatingGrid::kis_ipp_2023(),
            FinancingParams::default(),
            ReferenceMode::Counterfactual(Rating::A),
        )
        .unwrap();

        let output = runner.run_all(&standard_specs()).unwrap();
        for result in output.result.results.values() {
            let financing = result.financing.as_ref().unwrap();
            // CRP sign follows the WACC differential
            if financing.wacc_scenario > financing.wacc_reference {
                assert!(financing.crp_bps > Decimal::ZERO);
            }
            if financing.wacc_scenario == financing.wacc_reference {
                assert_eq!(financing.crp_bps, Decimal::ZERO);
            }
        }
    }

    #[test]
    fn test_market_scenario_is_optional_and_looked_up() {
        let runner = peer_runner(sample_plant());
        let spec = ScenarioSpec {
            name: "with_market".into(),
            transition: "baseline".into(),
            physical: "benign".into(),
            market: Some("flat".into()),
        };
        assert!(runner.run_scenario(&spec).is_ok());

        let missing = ScenarioSpec {
            name: "with_market".into(),
            transition: "baseline".into(),
            physical: "benign".into(),
            market: Some("boom".into()),
        };
        assert!(runner.run_scenario(&missing).is_err());
    }

    #[test]
    fn test_output_envelope_carries_metadata() {
        let runner = peer_runner(sample_plant());
        let output = runner.run_all(&standard_specs()).unwrap();
        assert_eq!(output.metadata.precision, "rust_decimal_128bit");
        assert!(!output.methodology.is_empty());
    }
}
