//! Conversion of cross-section estimates between unit systems.
//!
//! Scale conversion is a constant factor. Target-normalization conversion
//! is not: a per-target cross section for a mixture of nuclei maps to a
//! per-nucleon one through a weighted combination over the species in the
//! mixture, with each species contributing its share of the accumulated
//! weight divided by (or multiplied through) its nucleon count.
//!
//! Two styles exist. [`rescale_factor`] converts a single declared scalar
//! using the weight ledger alone. [`rescale_per_target`] uses a separate
//! point estimate for every species, derived from per-species weight and
//! reciprocal cross-section ledgers.

use nufatx_ledger::{StableSum, TargetLedger};
use nufatx_types::{NuclearId, Scale, TargetNorm, UnitSystem};

use crate::error::{FatxError, Result};

/// How a pair of units is bridged.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Conversion {
    /// Same normalization; only the scale factor applies.
    SameNorm(f64),
    /// Per-target to per-nucleon, with the scale factor.
    TargetToNucleon(f64),
    /// Per-nucleon to per-target, with the scale factor.
    NucleonToTarget(f64),
}

/// The factor converting an amount in `from` into `to`.
///
/// Fails for scales with no defined size.
pub fn scale_factor(from: Scale, to: Scale) -> Result<f64> {
    if from == to {
        return Ok(1.0);
    }
    match (from.picobarns(), to.picobarns()) {
        (Some(f), Some(t)) => Ok(f / t),
        _ => Err(FatxError::InvalidUnits {
            message: format!("no conversion factor between scales {from} and {to}"),
        }),
    }
}

fn classify(from: UnitSystem, to: UnitSystem) -> Result<Conversion> {
    if !from.is_concrete() || !to.is_concrete() {
        return Err(FatxError::InvalidUnits {
            message: format!("cannot convert {from} to {to}: custom or undetermined units"),
        });
    }
    let sf = scale_factor(from.scale, to.scale)?;
    match (from.target_norm, to.target_norm) {
        (a, b) if a == b => Ok(Conversion::SameNorm(sf)),
        (TargetNorm::PerTarget, TargetNorm::PerNucleon) => Ok(Conversion::TargetToNucleon(sf)),
        (TargetNorm::PerNucleon, TargetNorm::PerTarget) => Ok(Conversion::NucleonToTarget(sf)),
        _ => Err(FatxError::InvalidUnits {
            message: format!(
                "only /Target and /Nucleon conversions are supported; native unit {from}, \
                 requested {to}"
            ),
        }),
    }
}

/// Mass number of `target` as a divisor, rejecting species with no nucleons.
fn nucleons(target: NuclearId) -> Result<f64> {
    match target.mass_number() {
        0 => Err(FatxError::InvalidUnits {
            message: format!("target {target} has no nucleons; cannot normalize per nucleon"),
        }),
        a => Ok(f64::from(a)),
    }
}

/// Sum of mass numbers over the distinct species of `ledger`.
fn total_nucleons(ledger: &TargetLedger) -> f64 {
    ledger
        .targets()
        .map(|t| f64::from(t.mass_number()))
        .collect::<StableSum>()
        .value()
}

fn check_weights(weights: &TargetLedger, total_weight: f64) -> Result<()> {
    if weights.is_empty() || total_weight.abs() <= 0.0 {
        return Err(FatxError::NotYetInitialized {
            what: "target weight ledger",
        });
    }
    Ok(())
}

/// The factor converting a declared scalar cross section from `from` to
/// `to`, given the per-species weights accumulated so far.
///
/// - Same normalization: the scale factor `sf`.
/// - Per target to per nucleon: `sum_t sf * (w_t / W) / A_t`.
/// - Per nucleon to per target: `sum_t sf * N * (w_t / W)` with `N` the sum
///   of `A_t` over distinct species.
///
/// `W` is `total_weight`; `w_t` comes from `weights`.
pub fn rescale_factor(
    from: UnitSystem,
    to: UnitSystem,
    weights: &TargetLedger,
    total_weight: f64,
) -> Result<f64> {
    match classify(from, to)? {
        Conversion::SameNorm(sf) => Ok(sf),
        Conversion::TargetToNucleon(sf) => {
            check_weights(weights, total_weight)?;
            let mut factor = StableSum::new();
            for (target, w) in weights.iter() {
                factor.add(sf * (w / total_weight) / nucleons(target)?);
            }
            Ok(factor.value())
        }
        Conversion::NucleonToTarget(sf) => {
            check_weights(weights, total_weight)?;
            let n = total_nucleons(weights);
            let mut factor = StableSum::new();
            for (_, w) in weights.iter() {
                factor.add(sf * n * (w / total_weight));
            }
            Ok(factor.value())
        }
    }
}

/// Rescale a ratio estimate species by species.
///
/// `estimate` is the global point estimate in `from`, used as-is (times the
/// scale factor) when only the scale changes. For a normalization change
/// each species `t` in `reciprocals` contributes its own estimate
/// `F_t = w_t / r_t`:
///
/// - Per target to per nucleon: `sum_t F_t * sf * (w_t / W) / A_t`.
/// - Per nucleon to per target: `sum_t F_t * sf * N * (w_t / W)` with `N`
///   the sum of `A_t` over the species in `reciprocals`.
pub fn rescale_per_target(
    from: UnitSystem,
    to: UnitSystem,
    estimate: f64,
    weights: &TargetLedger,
    total_weight: f64,
    reciprocals: &TargetLedger,
) -> Result<f64> {
    let (sf, to_nucleon) = match classify(from, to)? {
        Conversion::SameNorm(sf) => return Ok(estimate * sf),
        Conversion::TargetToNucleon(sf) => (sf, true),
        Conversion::NucleonToTarget(sf) => (sf, false),
    };

    check_weights(weights, total_weight)?;
    if reciprocals.is_empty() {
        return Err(FatxError::NotYetInitialized {
            what: "reciprocal cross-section ledger",
        });
    }

    let n = total_nucleons(reciprocals);
    let mut rescaled = StableSum::new();
    for (target, r) in reciprocals.iter() {
        let w = weights.get(target).unwrap_or(0.0);
        let share = (w / r) * sf * (w / total_weight);
        if to_nucleon {
            rescaled.add(share / nucleons(target)?);
        } else {
            rescaled.add(share * n);
        }
    }
    Ok(rescaled.value())
}
