//! Shared type definitions for the nufatx workspace.
//!
//! This crate is the single source of truth for the value types passed
//! between the ledger, the accumulators, and the driver binary.
//!
//! # Modules
//!
//! - [`units`] -- Cross-section scales, target normalizations and the
//!   [`UnitSystem`] pair, with picobarn conversion constants.
//! - [`nuclear`] -- [`NuclearId`], a PDG-number target identifier with
//!   `Z`/`A`/`N` decoding.
//! - [`attributes`] -- The typed key/value store used for run and event
//!   metadata.
//! - [`event`] -- [`Event`] records and particle status codes.
//! - [`run`] -- [`RunInfo`] run-level metadata.

pub mod attributes;
pub mod event;
pub mod nuclear;
pub mod run;
pub mod units;

// Re-export all public types at crate root for convenience.
pub use attributes::{AttributeValue, Attributes};
pub use event::{CrossSectionRecord, Event, Particle, particle_status};
pub use nuclear::NuclearId;
pub use run::RunInfo;
pub use units::{Scale, TargetNorm, UnitSystem};
