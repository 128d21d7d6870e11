//! Flux-averaged total cross section accumulation for simulated event
//! streams.
//!
//! The caller reads a run's metadata, lets [`AccumulatorFactory`] pick an
//! accumulation strategy from the conventions the run declares, feeds
//! every event through [`Accumulator::process`], and asks for the estimate
//! in any supported unit with [`Accumulator::fatx`].
//!
//! # Modules
//!
//! - [`accumulator`] -- The [`Accumulator`] and its four strategies.
//! - [`factory`] -- [`Convention`] and [`AccumulatorFactory`].
//! - [`rescale`] -- Scale and target-normalization conversion.
//! - [`reader`] -- Typed, checked reads of run and event metadata.
//! - [`config`] -- YAML configuration into strongly-typed structs.
//! - [`report`] -- Serializable [`FatxReport`] summaries.
//! - [`error`] -- The [`FatxError`] taxonomy.
//!
//! # Usage
//!
//! ```
//! use nufatx_core::{AccumulatorFactory, reader};
//! use nufatx_types::{Event, NuclearId, RunInfo, UnitSystem};
//!
//! let run = RunInfo::new()
//!     .with_weight_names(&["CV"])
//!     .with_attribute(reader::CONVENTIONS, vec!["G.C.5"])
//!     .with_attribute(reader::FLUX_AVERAGED_TOTAL_CROSS_SECTION, 36.0);
//!
//! let mut acc = AccumulatorFactory::from_run(&run, "CV").ok();
//! let carbon = NuclearId::from_pdg(1_000_060_120);
//! if let Some(acc) = acc.as_mut() {
//!     let event = Event::new(0).with_weights(vec![1.0]).with_target(carbon);
//!     acc.process(&run, &event).ok();
//!     assert_eq!(acc.fatx(UnitSystem::PB_PER_TARGET).ok(), Some(36.0));
//!     let per_nucleon = acc.fatx(UnitSystem::PB_PER_NUCLEON).unwrap_or_default();
//!     assert!((per_nucleon - 3.0).abs() < 1e-12);
//! }
//! ```

pub mod accumulator;
pub mod config;
pub mod error;
pub mod factory;
pub mod reader;
pub mod report;
pub mod rescale;

pub use accumulator::Accumulator;
pub use config::{ConfigError, FatxConfig};
pub use error::{FatxError, Result};
pub use factory::{AccumulatorFactory, Convention};
pub use report::FatxReport;
