//! Nuclear target identifiers.
//!
//! Targets are identified by their PDG Monte Carlo particle number. Nuclei
//! use the ten-digit form `10LZZZAAAI`: `ZZZ` is the atomic number, `AAA`
//! the mass number, `L` the strangeness and `I` the isomer level. Free
//! protons and neutrons keep their ordinary particle numbers.

use serde::{Deserialize, Serialize};

/// Lowest PDG number in the nuclear range.
const NUCLEAR_BASE: i32 = 1_000_000_000;

/// Upper bound (exclusive) of the non-strange nuclear range.
const NUCLEAR_LIMIT: i32 = 1_010_000_000;

/// A target species, identified by its PDG particle number.
///
/// Ordering follows the particle number, so ledgers keyed by `NuclearId`
/// iterate in a stable, reproducible order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NuclearId(pub i32);

impl NuclearId {
    /// A free proton (hydrogen target).
    pub const PROTON: Self = Self(2212);
    /// A free neutron.
    pub const NEUTRON: Self = Self(2112);

    /// Wrap a PDG particle number.
    pub const fn from_pdg(code: i32) -> Self {
        Self(code)
    }

    /// Build the nuclear code for a nucleus with `z` protons and `a`
    /// nucleons.
    ///
    /// Returns `None` when `z > a` or `a` does not fit the three-digit
    /// mass field.
    pub fn from_za(z: u32, a: u32) -> Option<Self> {
        if z > a || a == 0 || a >= 1000 {
            return None;
        }
        let z = i32::try_from(z).ok()?;
        let a = i32::try_from(a).ok()?;
        let code = NUCLEAR_BASE
            .checked_add(z.checked_mul(10_000)?)?
            .checked_add(a.checked_mul(10)?)?;
        Some(Self(code))
    }

    /// The raw PDG particle number.
    pub const fn pdg(self) -> i32 {
        self.0
    }

    /// Whether the code lies in the (non-strange) nuclear range.
    pub const fn is_nucleus(self) -> bool {
        self.0 >= NUCLEAR_BASE && self.0 < NUCLEAR_LIMIT
    }

    /// Mass number `A`; zero for non-nuclear, non-nucleon targets.
    pub const fn mass_number(self) -> u32 {
        if self.is_nucleus() {
            (self.0.unsigned_abs() / 10) % 1000
        } else if self.0 == Self::PROTON.0 || self.0 == Self::NEUTRON.0 {
            1
        } else {
            0
        }
    }

    /// Atomic number `Z`; zero for non-nuclear targets other than the proton.
    pub const fn atomic_number(self) -> u32 {
        if self.is_nucleus() {
            (self.0.unsigned_abs() / 10_000) % 1000
        } else if self.0 == Self::PROTON.0 {
            1
        } else {
            0
        }
    }

    /// Neutron number `N = A - Z`.
    pub const fn neutron_number(self) -> u32 {
        self.mass_number().saturating_sub(self.atomic_number())
    }
}

impl core::fmt::Display for NuclearId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for NuclearId {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carbon_decodes() {
        let carbon = NuclearId::from_pdg(1_000_060_120);
        assert!(carbon.is_nucleus());
        assert_eq!(carbon.atomic_number(), 6);
        assert_eq!(carbon.mass_number(), 12);
        assert_eq!(carbon.neutron_number(), 6);
    }

    #[test]
    fn lead_decodes() {
        let lead = NuclearId::from_pdg(1_000_822_080);
        assert_eq!(lead.atomic_number(), 82);
        assert_eq!(lead.mass_number(), 208);
        assert_eq!(lead.neutron_number(), 126);
    }

    #[test]
    fn free_nucleons_have_unit_mass() {
        assert_eq!(NuclearId::PROTON.mass_number(), 1);
        assert_eq!(NuclearId::PROTON.atomic_number(), 1);
        assert_eq!(NuclearId::NEUTRON.mass_number(), 1);
        assert_eq!(NuclearId::NEUTRON.atomic_number(), 0);
        assert_eq!(NuclearId::NEUTRON.neutron_number(), 1);
    }

    #[test]
    fn electron_target_has_no_nucleons() {
        let electron = NuclearId::from_pdg(11);
        assert!(!electron.is_nucleus());
        assert_eq!(electron.mass_number(), 0);
        assert_eq!(electron.atomic_number(), 0);
    }

    #[test]
    fn from_za_builds_standard_codes() {
        assert_eq!(NuclearId::from_za(6, 12), Some(NuclearId(1_000_060_120)));
        assert_eq!(NuclearId::from_za(18, 40), Some(NuclearId(1_000_180_400)));
        assert_eq!(NuclearId::from_za(7, 6), None);
        assert_eq!(NuclearId::from_za(0, 0), None);
        assert_eq!(NuclearId::from_za(1, 1000), None);
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_string(&NuclearId(1_000_080_160)).ok();
        assert_eq!(json.as_deref(), Some("1000080160"));
    }
}
