//! Cross-section unit vocabulary.
//!
//! A cross section is reported in a [`UnitSystem`]: a [`Scale`] (the area
//! unit) paired with a [`TargetNorm`] (whether the area is per whole target
//! or per target nucleon). Conversion factors between scales are expressed
//! relative to the picobarn and live in process-wide constants.
//!
//! Producers declare their units as free-form strings. Strings outside the
//! standard vocabulary parse to the `Custom` variants, which can be carried
//! around but never converted.

use serde::{Deserialize, Serialize};

/// Picobarns per picobarn.
pub const PICOBARN: f64 = 1.0;

/// Picobarns per nanobarn.
pub const NANOBARN: f64 = 1e3;

/// Picobarns per square centimetre.
#[allow(clippy::lossy_float_literal)]
pub const CM2: f64 = 1e36;

/// Picobarns per 10^-38 square centimetres.
pub const CM2_E38: f64 = 1e-2;

// ---------------------------------------------------------------------------
// Scale
// ---------------------------------------------------------------------------

/// The area unit of a cross section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scale {
    /// A unit string outside the standard vocabulary.
    Custom,
    /// Picobarn (`pb`).
    Picobarn,
    /// Nanobarn (`nb`).
    Nanobarn,
    /// Square centimetre (`cm2`).
    Cm2,
    /// 10^-38 square centimetres (`1e-38 cm2`).
    Cm2E38,
    /// Not yet determined.
    Automatic,
}

impl Scale {
    /// Map a declared unit string onto the vocabulary.
    ///
    /// Unrecognized strings map to [`Scale::Custom`].
    pub fn from_declared(declared: &str) -> Self {
        match declared {
            "pb" => Self::Picobarn,
            "nb" => Self::Nanobarn,
            "cm2" => Self::Cm2,
            "1e-38 cm2" => Self::Cm2E38,
            _ => Self::Custom,
        }
    }

    /// The number of picobarns in one unit of this scale.
    ///
    /// `None` for [`Scale::Custom`] and [`Scale::Automatic`], which have no
    /// defined size.
    pub const fn picobarns(self) -> Option<f64> {
        match self {
            Self::Picobarn => Some(PICOBARN),
            Self::Nanobarn => Some(NANOBARN),
            Self::Cm2 => Some(CM2),
            Self::Cm2E38 => Some(CM2_E38),
            Self::Custom | Self::Automatic => None,
        }
    }

    /// The canonical declared string for this scale.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Custom => "CustomXSUnit",
            Self::Picobarn => "pb",
            Self::Nanobarn => "nb",
            Self::Cm2 => "cm2",
            Self::Cm2E38 => "1e-38 cm2",
            Self::Automatic => "Automatic",
        }
    }
}

impl core::fmt::Display for Scale {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TargetNorm
// ---------------------------------------------------------------------------

/// What a cross section is normalized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetNorm {
    /// A target-scale string outside the standard vocabulary.
    Custom,
    /// Per whole target (atom / nucleus).
    PerTarget,
    /// Per nucleon in the target.
    PerNucleon,
    /// Not yet determined.
    Automatic,
}

impl TargetNorm {
    /// Map a declared target-scale string onto the vocabulary.
    ///
    /// Both the current (`PerTargetAtom`, `PerTargetNucleon`) and the short
    /// (`PerAtom`, `PerNucleon`) spellings are accepted. Unrecognized
    /// strings map to [`TargetNorm::Custom`].
    pub fn from_declared(declared: &str) -> Self {
        match declared {
            "PerTargetAtom" | "PerAtom" | "PerTarget" => Self::PerTarget,
            "PerTargetNucleon" | "PerNucleon" => Self::PerNucleon,
            _ => Self::Custom,
        }
    }

    /// The canonical declared string for this normalization.
    pub const fn declared_name(self) -> &'static str {
        match self {
            Self::Custom => "CustomTargetScale",
            Self::PerTarget => "PerTargetAtom",
            Self::PerNucleon => "PerTargetNucleon",
            Self::Automatic => "Automatic",
        }
    }
}

impl core::fmt::Display for TargetNorm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Custom => "CustomTargetScale",
            Self::PerTarget => "PerTarget",
            Self::PerNucleon => "PerTargetNucleon",
            Self::Automatic => "Automatic",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// UnitSystem
// ---------------------------------------------------------------------------

/// A complete cross-section unit: scale and target normalization.
///
/// Equality is structural on both fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitSystem {
    /// The area unit.
    pub scale: Scale,
    /// The target normalization.
    pub target_norm: TargetNorm,
}

impl UnitSystem {
    /// Placeholder for "not yet determined".
    pub const AUTOMATIC: Self = Self::new(Scale::Automatic, TargetNorm::Automatic);
    /// Picobarn per target.
    pub const PB_PER_TARGET: Self = Self::new(Scale::Picobarn, TargetNorm::PerTarget);
    /// Picobarn per nucleon.
    pub const PB_PER_NUCLEON: Self = Self::new(Scale::Picobarn, TargetNorm::PerNucleon);
    /// Nanobarn per target.
    pub const NB_PER_TARGET: Self = Self::new(Scale::Nanobarn, TargetNorm::PerTarget);
    /// Square centimetre per target.
    pub const CM2_PER_TARGET: Self = Self::new(Scale::Cm2, TargetNorm::PerTarget);
    /// Square centimetre per nucleon.
    pub const CM2_PER_NUCLEON: Self = Self::new(Scale::Cm2, TargetNorm::PerNucleon);
    /// 10^-38 square centimetres per target.
    pub const CM2E38_PER_TARGET: Self = Self::new(Scale::Cm2E38, TargetNorm::PerTarget);
    /// 10^-38 square centimetres per nucleon.
    pub const CM2E38_PER_NUCLEON: Self = Self::new(Scale::Cm2E38, TargetNorm::PerNucleon);

    /// Create a unit system from its two axes.
    pub const fn new(scale: Scale, target_norm: TargetNorm) -> Self {
        Self { scale, target_norm }
    }

    /// Parse a declared `(scale, target scale)` string pair.
    pub fn from_declared(scale: &str, target_norm: &str) -> Self {
        Self::new(Scale::from_declared(scale), TargetNorm::from_declared(target_norm))
    }

    /// Whether either axis is `Custom`.
    pub const fn is_custom(self) -> bool {
        matches!(self.scale, Scale::Custom) || matches!(self.target_norm, TargetNorm::Custom)
    }

    /// Whether either axis is still `Automatic`.
    pub const fn is_automatic(self) -> bool {
        matches!(self.scale, Scale::Automatic)
            || matches!(self.target_norm, TargetNorm::Automatic)
    }

    /// Whether both axes name a real, convertible unit.
    pub const fn is_concrete(self) -> bool {
        !self.is_custom() && !self.is_automatic()
    }
}

impl Default for UnitSystem {
    fn default() -> Self {
        Self::AUTOMATIC
    }
}

impl core::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}, {}]", self.scale, self.target_norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_scale_strings_parse() {
        assert_eq!(Scale::from_declared("pb"), Scale::Picobarn);
        assert_eq!(Scale::from_declared("nb"), Scale::Nanobarn);
        assert_eq!(Scale::from_declared("cm2"), Scale::Cm2);
        assert_eq!(Scale::from_declared("1e-38 cm2"), Scale::Cm2E38);
        assert_eq!(Scale::from_declared("barn"), Scale::Custom);
        assert_eq!(Scale::from_declared(""), Scale::Custom);
    }

    #[test]
    fn declared_target_strings_parse_with_aliases() {
        assert_eq!(TargetNorm::from_declared("PerTargetAtom"), TargetNorm::PerTarget);
        assert_eq!(TargetNorm::from_declared("PerAtom"), TargetNorm::PerTarget);
        assert_eq!(TargetNorm::from_declared("PerTargetNucleon"), TargetNorm::PerNucleon);
        assert_eq!(TargetNorm::from_declared("PerNucleon"), TargetNorm::PerNucleon);
        assert_eq!(TargetNorm::from_declared("PerTargetMolecule"), TargetNorm::Custom);
    }

    #[test]
    fn custom_and_automatic_are_not_concrete() {
        assert!(UnitSystem::PB_PER_TARGET.is_concrete());
        assert!(!UnitSystem::AUTOMATIC.is_concrete());
        assert!(UnitSystem::AUTOMATIC.is_automatic());

        let half_custom = UnitSystem::new(Scale::Picobarn, TargetNorm::Custom);
        assert!(half_custom.is_custom());
        assert!(!half_custom.is_concrete());
    }

    #[test]
    fn picobarn_factors() {
        assert_eq!(Scale::Picobarn.picobarns(), Some(PICOBARN));
        assert_eq!(Scale::Cm2E38.picobarns(), Some(CM2_E38));
        assert!(Scale::Custom.picobarns().is_none());
        assert!(Scale::Automatic.picobarns().is_none());
    }

    #[test]
    fn display_matches_declared_vocabulary() {
        assert_eq!(UnitSystem::PB_PER_TARGET.to_string(), "[pb, PerTarget]");
        assert_eq!(
            UnitSystem::CM2E38_PER_NUCLEON.to_string(),
            "[1e-38 cm2, PerTargetNucleon]"
        );
    }

    #[test]
    fn declared_names_parse_back() {
        for unit in [
            UnitSystem::PB_PER_TARGET,
            UnitSystem::CM2_PER_NUCLEON,
            UnitSystem::CM2E38_PER_TARGET,
            UnitSystem::NB_PER_TARGET,
        ] {
            let parsed =
                UnitSystem::from_declared(unit.scale.as_str(), unit.target_norm.declared_name());
            assert_eq!(parsed, unit);
        }
    }
}
