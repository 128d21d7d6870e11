//! Serializable summary of a finished accumulation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use nufatx_types::{NuclearId, UnitSystem};

use crate::accumulator::Accumulator;
use crate::factory::Convention;

/// One target species' share of the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetRow {
    /// PDG number of the target.
    pub target: NuclearId,
    /// Atomic number.
    pub z: u32,
    /// Mass number.
    pub a: u32,
    /// Accumulated weight (event count for the count-only strategy).
    pub weight: f64,
    /// Share of the total weight.
    pub fraction: f64,
}

/// Target composition of the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composition {
    /// Sum of `A` over distinct species.
    pub total_nucleons: u64,
    /// Sum of `Z` over distinct species.
    pub total_protons: u64,
    /// Sum of `N` over distinct species.
    pub total_neutrons: u64,
    /// Weight-averaged `A`.
    pub average_a: Option<f64>,
    /// Weight-averaged `Z`.
    pub average_z: Option<f64>,
    /// Weight-averaged `N`.
    pub average_n: Option<f64>,
}

/// The estimate in one requested unit, or why it is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The estimate.
    Value(f64),
    /// The error message.
    Error(String),
}

/// One requested unit and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateRow {
    /// The requested unit.
    pub units: String,
    /// The estimate or error.
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Serializable summary of an accumulator's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FatxReport {
    /// Identifier for this report.
    pub run_id: Uuid,
    /// When the report was built.
    pub generated_at: DateTime<Utc>,
    /// The strategy in use, by convention token.
    pub convention: Convention,
    /// Number of events processed.
    pub events: usize,
    /// Total accumulated weight.
    pub sum_weights: f64,
    /// Native units of the estimate.
    pub native_units: String,
    /// Per-species weights, ascending by PDG number.
    pub targets: Vec<TargetRow>,
    /// Target composition summary.
    pub composition: Composition,
    /// One row per requested unit.
    pub estimates: Vec<EstimateRow>,
}

impl FatxReport {
    /// Snapshot `acc`, evaluating the estimate in each of `units`.
    pub fn from_accumulator(acc: &Accumulator, units: &[UnitSystem]) -> Self {
        let ledger = acc.target_weights();
        let total = acc.sumweights();

        let targets = ledger
            .iter()
            .map(|(target, weight)| TargetRow {
                target,
                z: target.atomic_number(),
                a: target.mass_number(),
                weight,
                fraction: ledger.fraction(target, total),
            })
            .collect();

        let estimates = units
            .iter()
            .map(|u| EstimateRow {
                units: u.to_string(),
                outcome: match acc.fatx(*u) {
                    Ok(v) => Outcome::Value(v),
                    Err(e) => Outcome::Error(e.to_string()),
                },
            })
            .collect();

        Self {
            run_id: Uuid::now_v7(),
            generated_at: Utc::now(),
            convention: acc.convention(),
            events: acc.events(),
            sum_weights: total,
            native_units: acc.native_units().to_string(),
            targets,
            composition: Composition {
                total_nucleons: acc.target_total_nucleons(),
                total_protons: acc.target_total_protons(),
                total_neutrons: acc.target_total_neutrons(),
                average_a: acc.target_average_a(),
                average_z: acc.target_average_z(),
                average_n: acc.target_average_n(),
            },
            estimates,
        }
    }

    /// Pretty-printed JSON rendering.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader;
    use nufatx_types::{Event, RunInfo, Scale, TargetNorm};

    const CARBON: NuclearId = NuclearId(1_000_060_120);
    const LEAD: NuclearId = NuclearId(1_000_822_080);

    fn filled() -> Accumulator {
        let run = RunInfo::new()
            .with_weight_names(&["CV"])
            .with_attribute(reader::FLUX_AVERAGED_TOTAL_CROSS_SECTION, 100.0);
        let mut acc = Accumulator::new(Convention::DeclaredFatx, Some(0));
        for (target, n) in [(CARBON, 3), (LEAD, 7)] {
            for _ in 0..n {
                let event = Event::new(0).with_weights(vec![10.0]).with_target(target);
                assert!(acc.process(&run, &event).is_ok());
            }
        }
        acc
    }

    #[test]
    fn report_carries_targets_and_estimates() {
        let units = [
            UnitSystem::PB_PER_TARGET,
            UnitSystem::new(Scale::Custom, TargetNorm::PerTarget),
        ];
        let report = FatxReport::from_accumulator(&filled(), &units);

        assert_eq!(report.convention, Convention::DeclaredFatx);
        assert_eq!(report.events, 10);
        assert_eq!(report.targets.len(), 2);
        assert_eq!(report.targets.first().map(|r| r.a), Some(12));
        assert!(
            report
                .targets
                .first()
                .is_some_and(|r| (r.fraction - 0.3).abs() < 1e-12)
        );
        assert_eq!(report.composition.total_nucleons, 220);
        assert_eq!(report.estimates.first().map(|e| &e.outcome), Some(&Outcome::Value(100.0)));
        assert!(matches!(
            report.estimates.get(1).map(|e| &e.outcome),
            Some(Outcome::Error(_))
        ));
    }

    #[test]
    fn report_serializes_flat_outcomes() {
        let report = FatxReport::from_accumulator(&filled(), &[UnitSystem::PB_PER_TARGET]);
        let json = report.to_json_pretty().unwrap_or_default();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap_or_default();

        assert_eq!(value["convention"], "G.C.5");
        assert_eq!(value["estimates"][0]["value"], 100.0);
        assert_eq!(value["targets"][1]["target"], 1_000_822_080);
        assert!(value["run_id"].is_string());
    }
}
