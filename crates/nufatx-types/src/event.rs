//! Event records as seen by the accumulators.
//!
//! This is a deliberately small projection of a full event record: the
//! per-event weights, the particle list (only PDG number and status are
//! needed to find the target), event-level attributes, and the optional
//! cross-section record carried alongside the event.

use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeValue, Attributes};
use crate::nuclear::NuclearId;

/// Particle status codes used when searching an event for particles.
pub mod particle_status {
    /// The incoming beam particle.
    pub const INCOMING_BEAM: i32 = 4;
    /// The target particle.
    pub const TARGET: i32 = 20;
    /// Status used for the target by producers predating [`TARGET`].
    pub const LEGACY_TARGET: i32 = 11;
}

/// A particle in an event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Particle {
    /// PDG particle number.
    pub pid: i32,
    /// Status code (see [`particle_status`]).
    pub status: i32,
}

/// The cross-section record attached to an event, one value per weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionRecord {
    /// Best-estimate cross sections, indexed like the event weights.
    pub values: Vec<f64>,
}

/// A single simulated interaction event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event number within the run.
    #[serde(default)]
    pub number: u64,
    /// Named weight stream values, indexed like `RunInfo::weight_names`.
    #[serde(default)]
    pub weights: Vec<f64>,
    /// Particles in the event record.
    #[serde(default)]
    pub particles: Vec<Particle>,
    /// Event-level attributes.
    #[serde(default)]
    pub attributes: Attributes,
    /// Optional cross-section record.
    #[serde(default)]
    pub cross_section: Option<CrossSectionRecord>,
}

impl Event {
    /// Create an empty event with the given number.
    pub fn new(number: u64) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    /// Set the weight vector.
    #[must_use]
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = weights;
        self
    }

    /// Append a particle.
    #[must_use]
    pub fn with_particle(mut self, pid: i32, status: i32) -> Self {
        self.particles.push(Particle { pid, status });
        self
    }

    /// Append a target particle for the given species.
    #[must_use]
    pub fn with_target(self, target: NuclearId) -> Self {
        self.with_particle(target.pdg(), particle_status::TARGET)
    }

    /// Set an event attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    /// Attach a cross-section record with the given best estimates.
    #[must_use]
    pub fn with_cross_section(mut self, values: Vec<f64>) -> Self {
        self.cross_section = Some(CrossSectionRecord { values });
        self
    }

    /// The first particle with the given status, in record order.
    pub fn first_with_status(&self, status: i32) -> Option<&Particle> {
        self.particles.iter().find(|p| p.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_assembles_event() {
        let carbon = NuclearId::from_pdg(1_000_060_120);
        let event = Event::new(7)
            .with_weights(vec![1.0, 0.5])
            .with_particle(14, particle_status::INCOMING_BEAM)
            .with_target(carbon)
            .with_attribute("TotXS", 12.5)
            .with_cross_section(vec![3.0, 4.0]);

        assert_eq!(event.number, 7);
        assert_eq!(event.weights.len(), 2);
        assert_eq!(
            event.first_with_status(particle_status::TARGET).map(|p| p.pid),
            Some(carbon.pdg())
        );
        assert!(event.attributes.contains("TotXS"));
        assert_eq!(event.cross_section.map(|xs| xs.values.len()), Some(2));
    }

    #[test]
    fn minimal_json_deserializes_with_defaults() {
        let event: Result<Event, _> =
            serde_json::from_str(r#"{"particles":[{"pid":2212,"status":20}]}"#);
        assert!(event.is_ok());
        let event = event.unwrap_or_default();
        assert!(event.weights.is_empty());
        assert!(event.cross_section.is_none());
        assert_eq!(event.particles.len(), 1);
    }
}
