//! Error types for fontext

use thiserror::Error;

use crate::events::Event;
use crate::owner::{OwnerId, OwnerKind};

pub type Result<T> = std::result::Result<T, ExtError>;

/// Main error type for fontext
#[derive(Debug, Error)]
pub enum ExtError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Re-entrant read of `{extension}` on owner {owner} while it is being computed")]
    Reentrant { extension: String, owner: OwnerId },

    #[error("Cache slot for `{extension}` holds a different value type")]
    SlotTypeMismatch { extension: String },

    #[error("Computation of `{extension}` failed: {message}")]
    Compute { extension: String, message: String },

    #[error("Host error: {0}")]
    Host(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl ExtError {
    /// Wrap a failure raised inside an extension body
    pub fn compute(extension: impl Into<String>, message: impl ToString) -> Self {
        ExtError::Compute {
            extension: extension.into(),
            message: message.to_string(),
        }
    }

    /// True for errors raised at declaration or registration time
    pub fn is_config(&self) -> bool {
        matches!(self, ExtError::Config(_))
    }
}

/// Declaration and registration errors
///
/// These surface when an extension is declared or first wired to an owner,
/// never later on a read path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unknown event name: {0}")]
    UnknownEvent(String),

    #[error("Event {event} is not emitted by {target} owners; declare it as a related dependency")]
    EventNotEmitted { event: Event, target: OwnerKind },

    #[error("Cached extension `{0}` declares no invalidation events")]
    NoDependencies(String),

    #[error("Extension `{name}` is already declared for {target}")]
    DuplicateExtension { name: String, target: OwnerKind },

    #[error("Extension `{extension}` is already registered on owner {owner} with different events")]
    ConflictingRegistration { extension: String, owner: OwnerId },

    #[error("Related owner `{via}` for extension `{extension}` could not be resolved on owner {owner}")]
    UnresolvedRelated {
        extension: String,
        via: &'static str,
        owner: OwnerId,
    },

    #[error("Extension handle `{0}` belongs to a different registry")]
    ForeignExtension(String),
}
