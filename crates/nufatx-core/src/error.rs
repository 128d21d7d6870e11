//! Error taxonomy for cross-section accumulation.
//!
//! Every failure is surfaced to the caller as soon as it happens. Nothing
//! is retried and no default is substituted for a missing or malformed
//! value: a cross section computed in guessed units is worse than none.

/// Errors raised by the readers, the rescale algebra, and the accumulators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FatxError {
    /// The run declares cross-section units outside the standard vocabulary.
    #[error("non-standard cross-section units declared: {scale} {target_norm}")]
    NonStandardUnits {
        /// The declared scale string.
        scale: String,
        /// The declared target-scale string.
        target_norm: String,
    },

    /// A requested unit is not convertible.
    #[error("invalid units: {message}")]
    InvalidUnits {
        /// What was requested and why it cannot be provided.
        message: String,
    },

    /// No supported accumulation strategy applies.
    #[error(
        "no method to calculate the flux-averaged total cross section \
         (supported: G.C.5, E.C.4, E.C.2); declared: [{}]",
        .declared.join(", ")
    )]
    NoMethodToCalculateFatx {
        /// The conventions the run declared, or the rejected strategy name.
        declared: Vec<String>,
    },

    /// A required attribute is absent.
    #[error("missing attribute `{name}`; known attributes: [{}]", .known.join(", "))]
    MissingAttribute {
        /// The attribute that was looked up.
        name: String,
        /// The attribute names that do exist on the record.
        known: Vec<String>,
    },

    /// An attribute exists but holds a value of the wrong type.
    #[error("attribute `{name}` has type {found}, expected {expected}")]
    TypeMismatch {
        /// The attribute that was looked up.
        name: String,
        /// The type the caller asked for.
        expected: &'static str,
        /// The type actually stored.
        found: &'static str,
    },

    /// A quantity was requested before enough events were processed.
    #[error("not yet initialized: {what}")]
    NotYetInitialized {
        /// Which piece of state is still missing.
        what: &'static str,
    },

    /// The event carries no target particle.
    #[error("event has no target particle (status 20, or legacy status 11)")]
    MissingTargetParticle,

    /// The configured central-value weight slot does not exist on the event.
    #[error("central-value weight index {index} out of range; event carries {available} weight(s)")]
    MissingWeight {
        /// The configured weight index.
        index: usize,
        /// Number of weights the event carries.
        available: usize,
    },
}

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, FatxError>;
