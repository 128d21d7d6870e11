//! Event-by-event accumulation of the flux-averaged total cross section.
//!
//! An [`Accumulator`] consumes the events of one run in stream order and
//! can be asked for its current best estimate at any point. All strategies
//! share the same bookkeeping (event count, total weight, per-target
//! weight ledger, native units); what differs is where the point estimate
//! comes from:
//!
//! | Strategy | Point estimate |
//! |----------|----------------|
//! | `G.C.5` | declared on the run, read once |
//! | `E.C.4` | the last event's best-estimate record |
//! | `E.C.2` | `sum(w) / sum(w / xs)` over events with nonzero `TotXS` |
//! | `Dummy` | always one |
//!
//! Estimates are stored in the run's native units and converted on
//! request; see [`crate::rescale`].

use tracing::{debug, trace};

use nufatx_ledger::{BalanceResult, StableSum, TargetLedger};
use nufatx_types::{Event, NuclearId, RunInfo, UnitSystem};

use crate::error::{FatxError, Result};
use crate::factory::Convention;
use crate::reader;
use crate::rescale;

/// Strategy-specific state.
#[derive(Debug, Clone, PartialEq)]
enum Strategy {
    DeclaredFatx {
        fatx: Option<f64>,
    },
    LastEventBestEstimate {
        best_estimate: Option<f64>,
    },
    PerEventRatio {
        /// Weight of the events with a nonzero cross section.
        weight: StableSum,
        /// The same weight split by target species.
        weights: TargetLedger,
        /// Sum of `w / xs` over those events.
        reciprocal: StableSum,
        /// The same sum split by target species.
        reciprocals: TargetLedger,
    },
    Count,
}

impl Strategy {
    const fn for_convention(convention: Convention) -> Self {
        match convention {
            Convention::DeclaredFatx => Self::DeclaredFatx { fatx: None },
            Convention::LastEventBestEstimate => Self::LastEventBestEstimate {
                best_estimate: None,
            },
            Convention::PerEventRatio => Self::PerEventRatio {
                weight: StableSum::new(),
                weights: TargetLedger::new(),
                reciprocal: StableSum::new(),
                reciprocals: TargetLedger::new(),
            },
            Convention::Dummy => Self::Count,
        }
    }
}

/// Running flux-averaged total cross-section estimate for one run.
///
/// Construct through [`AccumulatorFactory`](crate::AccumulatorFactory),
/// feed every event to [`process`](Self::process), and read the estimate
/// with [`fatx`](Self::fatx).
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    convention: Convention,
    cv_weight_index: Option<usize>,
    events: usize,
    sum_weights: StableSum,
    weights: TargetLedger,
    native_units: UnitSystem,
    strategy: Strategy,
}

impl Accumulator {
    /// A fresh accumulator for `convention`.
    ///
    /// `cv_weight_index` selects the central-value weight stream; `None`
    /// counts every event with weight one.
    pub const fn new(convention: Convention, cv_weight_index: Option<usize>) -> Self {
        Self {
            convention,
            cv_weight_index,
            events: 0,
            sum_weights: StableSum::new(),
            weights: TargetLedger::new(),
            native_units: UnitSystem::AUTOMATIC,
            strategy: Strategy::for_convention(convention),
        }
    }

    // -----------------------------------------------------------------------
    // Processing
    // -----------------------------------------------------------------------

    /// Fold one event into the estimate and return the weight it counted
    /// with.
    ///
    /// The weight and target are extracted before anything is recorded,
    /// so a malformed event leaves the accumulator untouched. Failures
    /// after that point (non-standard units, missing cross-section
    /// attributes) leave the event counted in the weight sums.
    pub fn process(&mut self, run: &RunInfo, event: &Event) -> Result<f64> {
        if matches!(self.strategy, Strategy::Count) {
            let target = reader::target_species(event)?;
            self.record(target, 1.0);
            return Ok(1.0);
        }

        let weight = self.central_value_weight(event)?;
        let target = reader::target_species(event)?;
        self.record(target, weight);

        if self.native_units.is_automatic() {
            self.native_units = reader::read_native_units(run)?;
            debug!(
                convention = %self.convention,
                units = %self.native_units,
                "resolved native cross-section units"
            );
        }

        let slot = self.cv_weight_index.unwrap_or(0);
        match &mut self.strategy {
            Strategy::DeclaredFatx { fatx } => {
                if fatx.is_none() {
                    let declared = reader::read_declared_fatx(run)?;
                    debug!(fatx = declared, units = %self.native_units, "cached declared FATX");
                    *fatx = Some(declared);
                }
            }
            Strategy::LastEventBestEstimate { best_estimate } => {
                *best_estimate = Some(reader::read_best_estimate_cross_section(event, slot)?);
            }
            Strategy::PerEventRatio {
                weight: ratio_weight,
                weights: ratio_weights,
                reciprocal,
                reciprocals,
            } => {
                let xs = reader::read_total_cross_section(event)?;
                if xs == 0.0 {
                    trace!(
                        event = event.number,
                        target = %target,
                        "zero total cross section; event skipped for reciprocal sum"
                    );
                } else {
                    let r = weight / xs;
                    ratio_weight.add(weight);
                    ratio_weights.record(target, weight);
                    reciprocal.add(r);
                    reciprocals.record(target, r);
                }
            }
            Strategy::Count => {}
        }

        Ok(weight)
    }

    fn central_value_weight(&self, event: &Event) -> Result<f64> {
        match self.cv_weight_index {
            None => Ok(1.0),
            Some(index) => {
                event
                    .weights
                    .get(index)
                    .copied()
                    .ok_or(FatxError::MissingWeight {
                        index,
                        available: event.weights.len(),
                    })
            }
        }
    }

    fn record(&mut self, target: NuclearId, weight: f64) {
        self.sum_weights.add(weight);
        self.weights.record(target, weight);
        self.events = self.events.saturating_add(1);
    }

    // -----------------------------------------------------------------------
    // Estimates
    // -----------------------------------------------------------------------

    /// The estimate in native units, before any conversion.
    fn point_estimate(&self) -> Result<f64> {
        match &self.strategy {
            Strategy::DeclaredFatx { fatx } => fatx.ok_or(FatxError::NotYetInitialized {
                what: "declared flux-averaged total cross section",
            }),
            Strategy::LastEventBestEstimate { best_estimate } => {
                best_estimate.ok_or(FatxError::NotYetInitialized {
                    what: "best-estimate cross section",
                })
            }
            Strategy::PerEventRatio {
                weight,
                reciprocal,
                reciprocals,
                ..
            } => {
                if reciprocals.is_empty() {
                    return Err(FatxError::NotYetInitialized {
                        what: "reciprocal cross-section sum",
                    });
                }
                Ok(weight.value() / reciprocal.value())
            }
            Strategy::Count => Ok(1.0),
        }
    }

    /// The flux-averaged total cross section in `units`.
    ///
    /// In native units the stored estimate is returned as is. The count-only
    /// strategy returns one for any `units`, valid or not.
    pub fn fatx(&self, units: UnitSystem) -> Result<f64> {
        if matches!(self.strategy, Strategy::Count) {
            return Ok(1.0);
        }
        if self.native_units.is_automatic() {
            return Err(FatxError::NotYetInitialized {
                what: "native cross-section units",
            });
        }

        let estimate = self.point_estimate()?;
        if units == self.native_units {
            return Ok(estimate);
        }
        if !units.is_concrete() {
            return Err(FatxError::InvalidUnits {
                message: format!("fatx requested in {units}, which cannot be converted to"),
            });
        }

        match &self.strategy {
            Strategy::PerEventRatio {
                weight,
                weights,
                reciprocals,
                ..
            } => rescale::rescale_per_target(
                self.native_units,
                units,
                estimate,
                weights,
                weight.value(),
                reciprocals,
            ),
            _ => Ok(estimate
                * rescale::rescale_factor(
                    self.native_units,
                    units,
                    &self.weights,
                    self.sum_weights.value(),
                )?),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Sum of the weights of all processed events.
    pub const fn sumweights(&self) -> f64 {
        self.sum_weights.value()
    }

    /// Number of events processed.
    pub const fn events(&self) -> usize {
        self.events
    }

    /// The strategy in use.
    pub const fn convention(&self) -> Convention {
        self.convention
    }

    /// The central-value weight slot, if one is configured.
    pub const fn cv_weight_index(&self) -> Option<usize> {
        self.cv_weight_index
    }

    /// Units of the stored estimate; `Automatic` until the first event.
    pub const fn native_units(&self) -> UnitSystem {
        self.native_units
    }

    /// Accumulated weight per target species.
    pub const fn target_weights(&self) -> &TargetLedger {
        &self.weights
    }

    /// Per-species reciprocal cross-section sums, for the ratio strategy.
    ///
    /// Events with a zero total cross section are not part of these sums
    /// (nor of the weights the ratio is formed with), though they still
    /// count in [`sumweights`](Self::sumweights) and
    /// [`events`](Self::events).
    pub const fn reciprocal_cross_sections(&self) -> Option<&TargetLedger> {
        match &self.strategy {
            Strategy::PerEventRatio { reciprocals, .. } => Some(reciprocals),
            _ => None,
        }
    }

    /// Check the per-species weights against the total weight.
    pub fn verify_balance(&self, relative_tolerance: f64) -> BalanceResult {
        self.weights
            .verify_balance(self.sum_weights.value(), relative_tolerance)
    }

    /// Sum of `A` over target species seen.
    pub fn target_total_nucleons(&self) -> u64 {
        self.weights.total_nucleons()
    }

    /// Sum of `Z` over target species seen.
    pub fn target_total_protons(&self) -> u64 {
        self.weights.total_protons()
    }

    /// Sum of `N` over target species seen.
    pub fn target_total_neutrons(&self) -> u64 {
        self.weights.total_neutrons()
    }

    /// Weight-averaged `A` of the targets seen.
    pub fn target_average_a(&self) -> Option<f64> {
        self.weights.average_a()
    }

    /// Weight-averaged `Z` of the targets seen.
    pub fn target_average_z(&self) -> Option<f64> {
        self.weights.average_z()
    }

    /// Weight-averaged `N` of the targets seen.
    pub fn target_average_n(&self) -> Option<f64> {
        self.weights.average_n()
    }
}

// ---------------------------------------------------------------------------
// Diagnostic rendering
// ---------------------------------------------------------------------------

fn write_estimate(
    f: &mut core::fmt::Formatter<'_>,
    acc: &Accumulator,
    units: UnitSystem,
    label: &str,
) -> core::fmt::Result {
    match acc.fatx(units) {
        Ok(v) => write!(f, "{v} {label}"),
        Err(e) => write!(f, "unavailable in {label} ({e})"),
    }
}

impl core::fmt::Display for Accumulator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "accumulator: {}", self.convention)?;
        writeln!(f, "events: {}", self.events)?;

        if let Strategy::Count = self.strategy {
            writeln!(f, "target events:")?;
            for (target, n) in self.weights.iter() {
                writeln!(f, "  {target}  {n}")?;
            }
            return Ok(());
        }

        writeln!(f, "sumweights: {}", self.sum_weights.value())?;
        if self.weights.len() > 1 {
            writeln!(f, "target weights:")?;
            writeln!(f, "  Target PDG  sumw")?;
            writeln!(f, "  ----------------")?;
            for (target, w) in self.weights.iter() {
                writeln!(f, "  {target}  {w}")?;
            }
        }
        writeln!(f, "native units: {}", self.native_units)?;

        write!(f, "fatx: ")?;
        write_estimate(f, self, UnitSystem::PB_PER_TARGET, "pb/Target")?;
        write!(f, ", ")?;
        write_estimate(f, self, UnitSystem::CM2E38_PER_NUCLEON, "1e-38 cm2/Nucleon")?;
        writeln!(f)?;

        match &self.strategy {
            Strategy::DeclaredFatx { fatx } => match fatx {
                Some(v) => writeln!(f, "declared fatx: {v}"),
                None => writeln!(f, "declared fatx: not yet read"),
            },
            Strategy::LastEventBestEstimate { best_estimate } => match best_estimate {
                Some(v) => writeln!(f, "best estimate: {v}"),
                None => writeln!(f, "best estimate: not yet read"),
            },
            Strategy::PerEventRatio {
                weights,
                reciprocals,
                ..
            } => {
                if reciprocals.len() > 1 {
                    writeln!(f, "target sumw / reciprocal xs:")?;
                    writeln!(f, "  Target PDG  sumw/rxs")?;
                    writeln!(f, "  --------------------")?;
                    for (target, r) in reciprocals.iter() {
                        let w = weights.get(target).unwrap_or(0.0);
                        writeln!(f, "  {target}  {}", w / r)?;
                    }
                }
                Ok(())
            }
            Strategy::Count => Ok(()),
        }
    }
}
