//! Per-target-species weight ledger.
//!
//! A [`TargetLedger`] keeps one [`StableSum`] per nuclear target species.
//! Entries are created lazily on the first contribution and are never
//! removed, so the set of species only grows over a run.
//!
//! The ledger's entries must add up to the owning accumulator's global
//! total. [`TargetLedger::verify_balance`] checks that, within a relative
//! tolerance, and produces a [`BalanceAnomaly`] when it does not hold.

use std::collections::BTreeMap;

use serde::Serialize;

use nufatx_types::NuclearId;

use crate::stable_sum::StableSum;

// ---------------------------------------------------------------------------
// Balance check results
// ---------------------------------------------------------------------------

/// The result of comparing a ledger's total with an independent total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BalanceResult {
    /// The ledger total agrees with the expected total.
    Balanced,
    /// The ledger total disagrees beyond the tolerance.
    Anomaly(BalanceAnomaly),
}

impl BalanceResult {
    /// Whether the check passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Details of a failed balance check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceAnomaly {
    /// The independently tracked total.
    pub expected: f64,
    /// The sum of the ledger's entries.
    pub recorded: f64,
    /// `|recorded - expected| / max(|recorded|, |expected|)`.
    pub relative_difference: f64,
    /// Per-species contributions at the time of the check.
    pub entries: BTreeMap<NuclearId, f64>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for BalanceAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}

// ---------------------------------------------------------------------------
// TargetLedger
// ---------------------------------------------------------------------------

/// Compensated running sums keyed by target species.
///
/// Iteration is in ascending PDG-number order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TargetLedger {
    entries: BTreeMap<NuclearId, StableSum>,
}

impl TargetLedger {
    /// Create an empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add `x` to the entry for `target`, creating it if needed.
    pub fn record(&mut self, target: NuclearId, x: f64) {
        self.entries.entry(target).or_default().add(x);
    }

    /// The running sum for `target`, if it has ever contributed.
    pub fn get(&self, target: NuclearId) -> Option<f64> {
        self.entries.get(&target).map(StableSum::value)
    }

    /// Whether `target` has ever contributed.
    pub fn contains(&self, target: NuclearId) -> bool {
        self.entries.contains_key(&target)
    }

    /// Compensated sum of all entries.
    pub fn total(&self) -> f64 {
        self.entries
            .values()
            .map(StableSum::value)
            .collect::<StableSum>()
            .value()
    }

    /// Number of distinct species recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no species has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(species, running sum)` pairs in ascending species order.
    pub fn iter(&self) -> impl Iterator<Item = (NuclearId, f64)> + '_ {
        self.entries.iter().map(|(id, sum)| (*id, sum.value()))
    }

    /// Recorded species in ascending order.
    pub fn targets(&self) -> impl Iterator<Item = NuclearId> + '_ {
        self.entries.keys().copied()
    }

    /// Share of `total` carried by `target`.
    ///
    /// Zero when the species is absent or `total` is zero.
    pub fn fraction(&self, target: NuclearId, total: f64) -> f64 {
        match self.get(target) {
            Some(w) if total.abs() > 0.0 => w / total,
            _ => 0.0,
        }
    }

    // -----------------------------------------------------------------------
    // Composition summaries
    // -----------------------------------------------------------------------

    /// Sum of mass numbers over distinct species.
    pub fn total_nucleons(&self) -> u64 {
        self.sum_over_species(NuclearId::mass_number)
    }

    /// Sum of atomic numbers over distinct species.
    pub fn total_protons(&self) -> u64 {
        self.sum_over_species(NuclearId::atomic_number)
    }

    /// Sum of neutron numbers over distinct species.
    pub fn total_neutrons(&self) -> u64 {
        self.sum_over_species(NuclearId::neutron_number)
    }

    /// Entry-weighted mean mass number, `None` while the ledger total is zero.
    pub fn average_a(&self) -> Option<f64> {
        self.weighted_mean(NuclearId::mass_number)
    }

    /// Entry-weighted mean atomic number, `None` while the ledger total is zero.
    pub fn average_z(&self) -> Option<f64> {
        self.weighted_mean(NuclearId::atomic_number)
    }

    /// Entry-weighted mean neutron number, `None` while the ledger total is
    /// zero.
    pub fn average_n(&self) -> Option<f64> {
        self.weighted_mean(NuclearId::neutron_number)
    }

    fn sum_over_species(&self, f: fn(NuclearId) -> u32) -> u64 {
        self.entries
            .keys()
            .map(|id| u64::from(f(*id)))
            .fold(0_u64, u64::saturating_add)
    }

    fn weighted_mean(&self, f: fn(NuclearId) -> u32) -> Option<f64> {
        let total = self.total();
        if total.abs() <= 0.0 {
            return None;
        }
        let numerator: StableSum = self
            .iter()
            .map(|(id, w)| w * f64::from(f(id)))
            .collect();
        Some(numerator.value() / total)
    }

    // -----------------------------------------------------------------------
    // Balance verification
    // -----------------------------------------------------------------------

    /// Compare the ledger total with an independently accumulated total.
    ///
    /// Balanced when `|recorded - expected| <= relative_tolerance *
    /// max(|recorded|, |expected|)`. Two zero totals are balanced.
    pub fn verify_balance(&self, expected: f64, relative_tolerance: f64) -> BalanceResult {
        let recorded = self.total();
        let diff = (recorded - expected).abs();
        let scale = recorded.abs().max(expected.abs());

        if diff <= relative_tolerance * scale {
            return BalanceResult::Balanced;
        }

        let relative_difference = if scale > 0.0 { diff / scale } else { diff };
        let species = self.len();
        let message = format!(
            "TARGET_LEDGER_IMBALANCE: {species} species sum to {recorded}, expected {expected} \
             (relative difference {relative_difference:e})",
        );
        tracing::warn!(
            expected,
            recorded,
            relative_difference,
            species,
            "target ledger does not balance"
        );

        BalanceResult::Anomaly(BalanceAnomaly {
            expected,
            recorded,
            relative_difference,
            entries: self.iter().collect(),
            message,
        })
    }
}
