use thiserror::Error;

use crate::components::types::{ProtoKey, RevisionStatus};

/// Errors that can arise while loading, storing or promoting component prototypes.
///
/// Bad author input is not an error at this level: building commands report it
/// through [`crate::components::CommandOutcome::Rejected`] and leave state untouched.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted `<Definition>` could not be parsed, or held a value of the wrong shape.
    #[error("malformed definition: {0}")]
    MalformedDefinition(String),

    /// Returned when fetching a record that is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// No loader is registered for the requested keyword or type name.
    #[error("unknown component type: {0}")]
    UnknownComponentType(String),

    /// A status change that the revision lifecycle does not permit.
    #[error("cannot move {key} from {from} to {to}")]
    InvalidTransition {
        key: ProtoKey,
        from: RevisionStatus,
        to: RevisionStatus,
    },

    /// A draft failed its completeness check.
    #[error("cannot submit {key}: {reason}")]
    SubmissionBlocked { key: ProtoKey, reason: String },

    /// System-generated component types never get new revisions.
    #[error("{0} components do not support revisions")]
    RevisionNotSupported(&'static str),

    /// Building commands were aimed at a revision that is no longer a draft.
    #[error("component {0} is not an editable draft")]
    NotEditable(ProtoKey),

    /// A live item tried to use a prototype that is not the current revision.
    #[error("component prototype {key} is {status}, not current")]
    NotApproved { key: ProtoKey, status: RevisionStatus },

    /// A broken system invariant, never caused by author input.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl From<quick_xml::Error> for ComponentError {
    fn from(err: quick_xml::Error) -> Self {
        ComponentError::MalformedDefinition(err.to_string())
    }
}
