//! Typed, checked reads of run and event metadata.
//!
//! Every lookup either returns a value of the requested type or fails with
//! [`FatxError::MissingAttribute`] / [`FatxError::TypeMismatch`]. Lookups
//! with a default only fall back when the attribute is absent; a value of
//! the wrong type is still an error.
//!
//! Some producers predate the current attribute names. Where an older
//! spelling is still in circulation (the `ProcID` process attribute, the
//! status-11 target particle) the reader consults both. Runs written with a
//! format older than [`CURRENT_FORMAT`] number their generator conventions
//! differently; [`read_conventions`] renumbers them and [`migrate_run`]
//! rewrites such a run header in place.

use std::collections::BTreeSet;

use nufatx_types::{
    AttributeValue, Attributes, Event, NuclearId, RunInfo, UnitSystem, particle_status,
};

use tracing::debug;

use crate::error::{FatxError, Result};

// ---------------------------------------------------------------------------
// Attribute names
// ---------------------------------------------------------------------------

/// Run attribute listing the conventions a producer follows.
pub const CONVENTIONS: &str = "NuHepMC.Conventions";
/// Run attribute carrying the declared flux-averaged total cross section.
pub const FLUX_AVERAGED_TOTAL_CROSS_SECTION: &str = "NuHepMC.FluxAveragedTotalCrossSection";
/// Run attribute naming the cross-section scale.
pub const CROSS_SECTION_UNIT: &str = "NuHepMC.Units.CrossSection.Unit";
/// Run attribute naming the cross-section target normalization.
pub const CROSS_SECTION_TARGET_SCALE: &str = "NuHepMC.Units.CrossSection.TargetScale";
/// Run attribute with the number of events in the exposure.
pub const EXPOSURE_N_EVENTS: &str = "NuHepMC.Exposure.NEvents";
/// Run attribute with the exposure in protons on target.
pub const EXPOSURE_POT: &str = "NuHepMC.Exposure.POT";
/// Run attribute with the exposure livetime in seconds.
pub const EXPOSURE_LIVETIME: &str = "NuHepMC.Exposure.Livetime";
/// Run attribute with the format major version.
pub const VERSION_MAJOR: &str = "NuHepMC.Version.Major";
/// Run attribute with the format minor version.
pub const VERSION_MINOR: &str = "NuHepMC.Version.Minor";
/// Run attribute with the format patch version.
pub const VERSION_PATCH: &str = "NuHepMC.Version.Patch";
/// Run attribute naming the unit of the beam flux.
pub const BEAM_FLUX_UNIT: &str = "NuHepMC.Beam.FluxUnit";
/// Pre-1.0 spelling of [`BEAM_FLUX_UNIT`].
pub const LEGACY_BEAM_RATE_UNIT: &str = "NuHepMC.Beam.RateUnit";
/// Event attribute with the total cross section of the event's process.
pub const TOTAL_CROSS_SECTION: &str = "TotXS";
/// Event attribute identifying the interaction process.
pub const SIGNAL_PROCESS_ID: &str = "signal_process_id";
/// Older spelling of [`SIGNAL_PROCESS_ID`].
pub const LEGACY_PROCESS_ID: &str = "ProcID";

/// Scale assumed when a run does not declare one.
pub const DEFAULT_CROSS_SECTION_UNIT: &str = "pb";
/// Target scale assumed when a run does not declare one.
pub const DEFAULT_CROSS_SECTION_TARGET_SCALE: &str = "PerTargetAtom";

// ---------------------------------------------------------------------------
// Typed extraction
// ---------------------------------------------------------------------------

/// A Rust type that can be read out of an [`AttributeValue`].
pub trait FromAttribute: Sized {
    /// Name of the expected stored type, for error messages.
    const TYPE_NAME: &'static str;

    /// Extract the value, or `None` if the stored type differs.
    fn from_attribute(value: &AttributeValue) -> Option<Self>;
}

impl FromAttribute for bool {
    const TYPE_NAME: &'static str = "bool";
    fn from_attribute(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromAttribute for i64 {
    const TYPE_NAME: &'static str = "int";
    fn from_attribute(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromAttribute for f64 {
    const TYPE_NAME: &'static str = "double";
    fn from_attribute(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromAttribute for String {
    const TYPE_NAME: &'static str = "string";
    fn from_attribute(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromAttribute for Vec<i64> {
    const TYPE_NAME: &'static str = "vector<int>";
    fn from_attribute(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::IntVec(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromAttribute for Vec<f64> {
    const TYPE_NAME: &'static str = "vector<double>";
    fn from_attribute(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::DoubleVec(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromAttribute for Vec<String> {
    const TYPE_NAME: &'static str = "vector<string>";
    fn from_attribute(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::StringVec(v) => Some(v.clone()),
            _ => None,
        }
    }
}

fn missing(attrs: &Attributes, name: &str) -> FatxError {
    FatxError::MissingAttribute {
        name: name.to_owned(),
        known: attrs.names().map(str::to_owned).collect(),
    }
}

fn convert<T: FromAttribute>(name: &str, value: &AttributeValue) -> Result<T> {
    T::from_attribute(value).ok_or_else(|| FatxError::TypeMismatch {
        name: name.to_owned(),
        expected: T::TYPE_NAME,
        found: value.type_name(),
    })
}

/// Read a required attribute of type `T`.
pub fn checked_attribute<T: FromAttribute>(attrs: &Attributes, name: &str) -> Result<T> {
    let value = attrs.get(name).ok_or_else(|| missing(attrs, name))?;
    convert(name, value)
}

/// Read an optional attribute of type `T`, falling back to `default` only
/// when it is absent.
pub fn checked_attribute_or<T: FromAttribute>(
    attrs: &Attributes,
    name: &str,
    default: T,
) -> Result<T> {
    attrs
        .get(name)
        .map_or(Ok(default), |value| convert(name, value))
}

// ---------------------------------------------------------------------------
// Event readers
// ---------------------------------------------------------------------------

/// The event's target species.
///
/// The first particle with the target status wins; events from producers
/// that predate that status are searched for the legacy status instead.
pub fn target_species(event: &Event) -> Result<NuclearId> {
    event
        .first_with_status(particle_status::TARGET)
        .or_else(|| event.first_with_status(particle_status::LEGACY_TARGET))
        .map(|p| NuclearId::from_pdg(p.pid))
        .ok_or(FatxError::MissingTargetParticle)
}

/// The total cross section declared on the event.
pub fn read_total_cross_section(event: &Event) -> Result<f64> {
    checked_attribute(&event.attributes, TOTAL_CROSS_SECTION)
}

/// The best-estimate cross section stored in the event's cross-section
/// record at `slot`.
pub fn read_best_estimate_cross_section(event: &Event, slot: usize) -> Result<f64> {
    let record = event
        .cross_section
        .as_ref()
        .ok_or_else(|| FatxError::MissingAttribute {
            name: "cross_section".to_owned(),
            known: event.attributes.names().map(str::to_owned).collect(),
        })?;

    record
        .values
        .get(slot)
        .copied()
        .ok_or_else(|| FatxError::MissingAttribute {
            name: format!("cross_section[{slot}]"),
            known: (0..record.values.len())
                .map(|i| format!("cross_section[{i}]"))
                .collect(),
        })
}

/// The event's process identifier, preferring the legacy attribute when a
/// producer still writes it.
pub fn read_process_id(event: &Event) -> Result<i64> {
    if event.attributes.contains(LEGACY_PROCESS_ID) {
        return checked_attribute(&event.attributes, LEGACY_PROCESS_ID);
    }
    checked_attribute(&event.attributes, SIGNAL_PROCESS_ID)
}

// ---------------------------------------------------------------------------
// Run readers
// ---------------------------------------------------------------------------

/// The set of conventions the run declares; empty when none are declared.
///
/// Conventions of runs older than [`CURRENT_FORMAT`] are reported under
/// their current names, and withdrawn ones are dropped.
pub fn read_conventions(run: &RunInfo) -> Result<BTreeSet<String>> {
    let declared: Vec<String> = checked_attribute_or(&run.attributes, CONVENTIONS, Vec::new())?;
    if !predates_current_format(run)? {
        return Ok(declared.into_iter().collect());
    }
    Ok(declared
        .iter()
        .map(String::as_str)
        .filter_map(renumber_legacy_convention)
        .map(str::to_owned)
        .collect())
}

/// Whether the run declares `convention`.
pub fn signals_convention(run: &RunInfo, convention: &str) -> Result<bool> {
    Ok(read_conventions(run)?.contains(convention))
}

/// Whether the run declares every one of `conventions`.
pub fn signals_conventions(run: &RunInfo, conventions: &[&str]) -> Result<bool> {
    let declared = read_conventions(run)?;
    Ok(conventions.iter().all(|c| declared.contains(*c)))
}

/// The declared `(scale, target scale)` strings, with defaults for
/// producers that do not declare them.
pub fn read_cross_section_units(run: &RunInfo) -> Result<(String, String)> {
    let scale = checked_attribute_or(
        &run.attributes,
        CROSS_SECTION_UNIT,
        DEFAULT_CROSS_SECTION_UNIT.to_owned(),
    )?;
    let target = checked_attribute_or(
        &run.attributes,
        CROSS_SECTION_TARGET_SCALE,
        DEFAULT_CROSS_SECTION_TARGET_SCALE.to_owned(),
    )?;
    Ok((scale, target))
}

/// Map declared unit strings onto the unit vocabulary.
pub fn parse_cross_section_units(scale: &str, target_norm: &str) -> UnitSystem {
    UnitSystem::from_declared(scale, target_norm)
}

/// The run's declared native units.
///
/// Fails with [`FatxError::NonStandardUnits`] when either axis is outside
/// the standard vocabulary.
pub fn read_native_units(run: &RunInfo) -> Result<UnitSystem> {
    let (scale, target_norm) = read_cross_section_units(run)?;
    let units = parse_cross_section_units(&scale, &target_norm);
    if units.is_custom() {
        return Err(FatxError::NonStandardUnits { scale, target_norm });
    }
    Ok(units)
}

/// The flux-averaged total cross section declared on the run.
pub fn read_declared_fatx(run: &RunInfo) -> Result<f64> {
    checked_attribute(&run.attributes, FLUX_AVERAGED_TOTAL_CROSS_SECTION)
}

/// Index of the named weight stream, if the run declares it.
pub fn resolve_weight_index(run: &RunInfo, name: &str) -> Option<usize> {
    run.weight_index(name)
}

/// Number of events the run's exposure corresponds to.
pub fn read_exposure_n_events(run: &RunInfo) -> Result<i64> {
    checked_attribute(&run.attributes, EXPOSURE_N_EVENTS)
}

/// Exposure in protons on target.
pub fn read_exposure_pot(run: &RunInfo) -> Result<f64> {
    checked_attribute(&run.attributes, EXPOSURE_POT)
}

/// Exposure livetime in seconds.
pub fn read_exposure_livetime(run: &RunInfo) -> Result<f64> {
    checked_attribute(&run.attributes, EXPOSURE_LIVETIME)
}

/// Event format version declared by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormatVersion {
    /// Major version.
    pub major: i64,
    /// Minor version.
    pub minor: i64,
    /// Patch version.
    pub patch: i64,
}

impl core::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The event format version the run was written with.
pub fn read_version(run: &RunInfo) -> Result<FormatVersion> {
    Ok(FormatVersion {
        major: checked_attribute(&run.attributes, VERSION_MAJOR)?,
        minor: checked_attribute(&run.attributes, VERSION_MINOR)?,
        patch: checked_attribute(&run.attributes, VERSION_PATCH)?,
    })
}

// ---------------------------------------------------------------------------
// Format migration
// ---------------------------------------------------------------------------

/// The format version whose attribute names and convention numbering this
/// reader expects.
pub const CURRENT_FORMAT: FormatVersion = FormatVersion {
    major: 1,
    minor: 0,
    patch: 0,
};

/// The declared format version, or `None` when the run declares none.
pub fn declared_version(run: &RunInfo) -> Result<Option<FormatVersion>> {
    if !run.attributes.contains(VERSION_MAJOR) {
        return Ok(None);
    }
    read_version(run).map(Some)
}

/// Whether the run declares a format older than [`CURRENT_FORMAT`].
///
/// Runs without a version are read as current.
pub fn predates_current_format(run: &RunInfo) -> Result<bool> {
    Ok(declared_version(run)?.is_some_and(|v| v < CURRENT_FORMAT))
}

/// The current name of a convention declared by a pre-1.0 run, or `None`
/// when the convention was withdrawn.
pub fn renumber_legacy_convention(name: &str) -> Option<&str> {
    match name {
        "G.C.1" | "G.C.2" | "G.C.4" => None,
        "G.C.3" => Some("G.C.1"),
        "G.C.5" => Some("G.C.2"),
        "G.C.6" => Some("G.C.3"),
        "G.C.7" => Some("G.C.4"),
        "G.C.8" => Some("G.C.5"),
        other => Some(other),
    }
}

fn legacy_target_scale(declared: &str) -> Option<&'static str> {
    match declared {
        "PerTarget" | "PerAtom" => Some("PerTargetAtom"),
        "PerNucleon" => Some("PerTargetNucleon"),
        _ => None,
    }
}

/// Bring a run header written with an older format up to
/// [`CURRENT_FORMAT`].
///
/// Renumbers the conventions, renames the beam rate unit, spells the
/// target scale the current way, and stamps the current version, so a
/// second call is a no-op. Returns whether anything was migrated.
pub fn migrate_run(run: &mut RunInfo) -> Result<bool> {
    let Some(version) = declared_version(run)?.filter(|v| *v < CURRENT_FORMAT) else {
        return Ok(false);
    };

    if run.attributes.contains(CONVENTIONS) {
        let conventions: Vec<String> = read_conventions(run)?.into_iter().collect();
        run.attributes.insert(CONVENTIONS, conventions);
    }
    if let Some(unit) = run.attributes.remove(LEGACY_BEAM_RATE_UNIT) {
        run.attributes.insert(BEAM_FLUX_UNIT, unit);
    }
    let target_scale = match run.attributes.get(CROSS_SECTION_TARGET_SCALE) {
        Some(AttributeValue::String(declared)) => legacy_target_scale(declared),
        _ => None,
    };
    if let Some(current) = target_scale {
        run.attributes.insert(CROSS_SECTION_TARGET_SCALE, current);
    }

    run.attributes.insert(VERSION_MAJOR, CURRENT_FORMAT.major);
    run.attributes.insert(VERSION_MINOR, CURRENT_FORMAT.minor);
    run.attributes.insert(VERSION_PATCH, CURRENT_FORMAT.patch);
    debug!(from = %version, to = %CURRENT_FORMAT, "migrated run header");
    Ok(true)
}
