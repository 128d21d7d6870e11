//! Accumulation strategy selection.
//!
//! A run advertises which conventions its producer follows. Three of them
//! carry enough information to compute a flux-averaged total cross
//! section; when a run declares more than one, a directly declared
//! aggregate is trusted over a per-event best estimate, and both over a
//! per-event reconstruction.

use tracing::info;

use nufatx_types::RunInfo;

use crate::accumulator::Accumulator;
use crate::config::AccumulatorConfig;
use crate::error::{FatxError, Result};
use crate::reader;

/// The accumulation strategies, named after the convention that enables
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum Convention {
    /// The run declares the flux-averaged total cross section (`G.C.5`).
    #[serde(rename = "G.C.5")]
    DeclaredFatx,
    /// Each event carries the best estimate so far (`E.C.4`).
    #[serde(rename = "E.C.4")]
    LastEventBestEstimate,
    /// Each event carries its process's total cross section (`E.C.2`).
    #[serde(rename = "E.C.2")]
    PerEventRatio,
    /// Counting only; the cross section is fixed at one.
    Dummy,
}

impl Convention {
    /// Detection order for metadata-driven selection.
    pub const DETECTION_ORDER: [Self; 3] = [
        Self::DeclaredFatx,
        Self::LastEventBestEstimate,
        Self::PerEventRatio,
    ];

    /// The convention token as it appears in run metadata.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeclaredFatx => "G.C.5",
            Self::LastEventBestEstimate => "E.C.4",
            Self::PerEventRatio => "E.C.2",
            Self::Dummy => "Dummy",
        }
    }

    /// Parse a convention token or strategy name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "G.C.5" => Some(Self::DeclaredFatx),
            "E.C.4" => Some(Self::LastEventBestEstimate),
            "E.C.2" => Some(Self::PerEventRatio),
            "Dummy" => Some(Self::Dummy),
            _ => None,
        }
    }
}

impl core::fmt::Display for Convention {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds accumulators from run metadata or from an explicit strategy name.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccumulatorFactory;

impl AccumulatorFactory {
    /// Pick a strategy from the conventions `run` declares.
    ///
    /// `cv_weight_name` names the central-value weight stream; if the run
    /// has no stream of that name every event counts with weight one.
    ///
    /// Runs written with an older format are matched under the current
    /// convention numbering (see [`reader::read_conventions`]).
    pub fn from_run(run: &RunInfo, cv_weight_name: &str) -> Result<Accumulator> {
        let declared = reader::read_conventions(run)?;
        let convention = Convention::DETECTION_ORDER
            .into_iter()
            .find(|c| declared.contains(c.as_str()))
            .ok_or_else(|| FatxError::NoMethodToCalculateFatx {
                declared: declared.iter().cloned().collect(),
            })?;

        let cv_weight_index = reader::resolve_weight_index(run, cv_weight_name);
        info!(
            convention = %convention,
            cv_weight = cv_weight_name,
            cv_weight_index = ?cv_weight_index,
            "selected FATX accumulator from declared conventions"
        );
        Ok(Accumulator::new(convention, cv_weight_index))
    }

    /// Build the accumulator for an explicitly named strategy.
    ///
    /// Accepts `"G.C.5"`, `"E.C.4"`, `"E.C.2"` and `"Dummy"`. The result
    /// uses an implicit weight of one per event.
    pub fn from_convention(name: &str) -> Result<Accumulator> {
        let convention = named(name)?;
        info!(convention = %convention, "selected FATX accumulator by name");
        Ok(Accumulator::new(convention, None))
    }

    /// Honor a configured strategy override, otherwise detect from `run`.
    ///
    /// An overridden strategy still weights events by the configured
    /// central-value stream when `run` declares it.
    pub fn from_config(run: &RunInfo, config: &AccumulatorConfig) -> Result<Accumulator> {
        let Some(name) = config.convention_override.as_deref() else {
            return Self::from_run(run, &config.cv_weight_name);
        };
        let convention = named(name)?;
        let cv_weight_index = reader::resolve_weight_index(run, &config.cv_weight_name);
        info!(
            convention = %convention,
            cv_weight = config.cv_weight_name,
            cv_weight_index = ?cv_weight_index,
            "selected FATX accumulator from configuration override"
        );
        Ok(Accumulator::new(convention, cv_weight_index))
    }
}

fn named(name: &str) -> Result<Convention> {
    Convention::from_name(name).ok_or_else(|| FatxError::NoMethodToCalculateFatx {
        declared: vec![name.to_owned()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_declaring(conventions: &[&str]) -> RunInfo {
        RunInfo::new()
            .with_weight_names(&["CV"])
            .with_attribute(reader::CONVENTIONS, conventions.to_vec())
    }

    #[test]
    fn names_round_trip() {
        for c in [
            Convention::DeclaredFatx,
            Convention::LastEventBestEstimate,
            Convention::PerEventRatio,
            Convention::Dummy,
        ] {
            assert_eq!(Convention::from_name(c.as_str()), Some(c));
        }
        assert_eq!(Convention::from_name("G.C.4"), None);
    }

    #[test]
    fn declared_fatx_wins_over_ratio() {
        let acc = AccumulatorFactory::from_run(&run_declaring(&["E.C.2", "G.C.5"]), "CV");
        assert_eq!(acc.map(|a| a.convention()), Ok(Convention::DeclaredFatx));
    }

    #[test]
    fn best_estimate_wins_over_ratio() {
        let acc = AccumulatorFactory::from_run(&run_declaring(&["E.C.2", "E.C.4"]), "CV");
        assert_eq!(
            acc.map(|a| a.convention()),
            Ok(Convention::LastEventBestEstimate)
        );
    }

    #[test]
    fn ratio_selected_alone() {
        let acc = AccumulatorFactory::from_run(&run_declaring(&["G.C.1", "E.C.2"]), "CV");
        assert_eq!(acc.map(|a| a.convention()), Ok(Convention::PerEventRatio));
    }

    #[test]
    fn cv_weight_resolves_to_index() {
        let run = RunInfo::new()
            .with_weight_names(&["alt", "CV"])
            .with_attribute(reader::CONVENTIONS, vec!["G.C.5"]);
        let acc = AccumulatorFactory::from_run(&run, "CV");
        assert_eq!(acc.map(|a| a.cv_weight_index()), Ok(Some(1)));

        let acc = AccumulatorFactory::from_run(&run, "nominal");
        assert_eq!(acc.map(|a| a.cv_weight_index()), Ok(None));
    }

    #[test]
    fn no_convention_lists_declared_set() {
        let err = AccumulatorFactory::from_run(&run_declaring(&["G.C.1", "E.C.1"]), "CV")
            .err();
        assert_eq!(
            err,
            Some(FatxError::NoMethodToCalculateFatx {
                declared: vec!["E.C.1".to_owned(), "G.C.1".to_owned()],
            })
        );

        let err = AccumulatorFactory::from_run(&RunInfo::new(), "CV").err();
        assert_eq!(
            err,
            Some(FatxError::NoMethodToCalculateFatx {
                declared: Vec::new()
            })
        );
    }

    fn legacy_run_declaring(conventions: &[&str]) -> RunInfo {
        run_declaring(conventions)
            .with_attribute(reader::VERSION_MAJOR, 0_i64)
            .with_attribute(reader::VERSION_MINOR, 9_i64)
            .with_attribute(reader::VERSION_PATCH, 0_i64)
    }

    #[test]
    fn legacy_declared_fatx_is_detected_under_old_number() {
        let acc = AccumulatorFactory::from_run(&legacy_run_declaring(&["G.C.1", "G.C.8"]), "CV");
        assert_eq!(acc.map(|a| a.convention()), Ok(Convention::DeclaredFatx));
    }

    #[test]
    fn legacy_g_c_5_is_not_declared_fatx() {
        let err = AccumulatorFactory::from_run(&legacy_run_declaring(&["G.C.5"]), "CV").err();
        assert_eq!(
            err,
            Some(FatxError::NoMethodToCalculateFatx {
                declared: vec!["G.C.2".to_owned()],
            })
        );
    }

    #[test]
    fn explicit_names() {
        assert_eq!(
            AccumulatorFactory::from_convention("Dummy").map(|a| a.convention()),
            Ok(Convention::Dummy)
        );
        assert_eq!(
            AccumulatorFactory::from_convention("E.C.4").map(|a| a.cv_weight_index()),
            Ok(None)
        );
        assert_eq!(
            AccumulatorFactory::from_convention("bogus").err(),
            Some(FatxError::NoMethodToCalculateFatx {
                declared: vec!["bogus".to_owned()],
            })
        );
    }

    #[test]
    fn config_override_bypasses_detection() {
        let config = AccumulatorConfig {
            convention_override: Some("Dummy".to_owned()),
            ..AccumulatorConfig::default()
        };
        let acc = AccumulatorFactory::from_config(&RunInfo::new(), &config);
        assert_eq!(acc.map(|a| a.convention()), Ok(Convention::Dummy));

        let config = AccumulatorConfig {
            convention_override: Some("E.C.4".to_owned()),
            ..AccumulatorConfig::default()
        };
        let acc = AccumulatorFactory::from_config(&run_declaring(&["G.C.5"]), &config);
        assert_eq!(
            acc.map(|a| (a.convention(), a.cv_weight_index())),
            Ok((Convention::LastEventBestEstimate, Some(0)))
        );

        let detected = AccumulatorFactory::from_config(
            &run_declaring(&["E.C.2"]),
            &AccumulatorConfig::default(),
        );
        assert_eq!(
            detected.map(|a| a.convention()),
            Ok(Convention::PerEventRatio)
        );
    }
}
