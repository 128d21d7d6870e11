//! Compensated summation and per-target weight bookkeeping for nufatx.
//!
//! Every event weight that reaches an accumulator is added twice: once to
//! a global running total and once to the entry for the event's target
//! species. Both are compensated sums, and the two must agree at all
//! times.
//!
//! # Architecture
//!
//! - [`stable_sum`] -- The [`StableSum`] Kahan accumulator.
//! - [`target_ledger`] -- The [`TargetLedger`] per-species map, composition
//!   summaries, and the balance check.
//!
//! # Balance Law
//!
//! For every accumulator with global total `W` and weight ledger `L`:
//!
//! ```text
//! sum(L[t] for every species t) == W   (within floating-point tolerance)
//! ```
//!
//! A violation produces a [`BalanceAnomaly`]. The ledger never panics.
//!
//! # Usage
//!
//! ```
//! use nufatx_ledger::{StableSum, TargetLedger};
//! use nufatx_types::NuclearId;
//!
//! let carbon = NuclearId::from_pdg(1_000_060_120);
//! let mut total = StableSum::new();
//! let mut ledger = TargetLedger::new();
//!
//! for w in [0.5, 1.5, 2.0] {
//!     total.add(w);
//!     ledger.record(carbon, w);
//! }
//!
//! assert!(ledger.verify_balance(total.value(), 1e-12).is_balanced());
//! assert_eq!(ledger.average_a(), Some(12.0));
//! ```

pub mod stable_sum;
pub mod target_ledger;

// Re-export primary types at crate root.
pub use stable_sum::StableSum;
pub use target_ledger::{BalanceAnomaly, BalanceResult, TargetLedger};
