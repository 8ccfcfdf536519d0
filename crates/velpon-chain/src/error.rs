//! Error type for chain resolution and facility lifecycle.
//!
//! Every variant maps onto `velpon_core::error::AppError` so callers at
//! the application boundary see one error type.

use std::path::PathBuf;

use thiserror::Error;
use velpon_core::error::{AppError, ErrorKind};

/// Errors raised by the resolver, the facility and the composer.
#[derive(Debug, Error)]
pub enum ChainError {
    /// `register` was called while another activation is installed.
    #[error("Resolution facility is already active (activation {activation})")]
    AlreadyActive {
        /// Identifier of the activation that owns the slot.
        activation: String,
    },

    /// `unregister` was called with nothing installed.
    #[error("Resolution facility is not active")]
    NotActive,

    /// No registration claims the override a link belongs to.
    #[error("No registration provides override '{override_id}' (link '{link}')")]
    UndefinedLinkTarget {
        /// The link name that was queried.
        link: String,
        /// The override id obtained by stripping the link suffix.
        override_id: String,
    },

    /// A link query was made for a name without the link suffix.
    #[error("'{name}' does not end with link suffix '{suffix}'")]
    NotALink {
        /// The offending name.
        name: String,
        /// The configured link suffix.
        suffix: String,
    },

    /// The host already binds `name` to a different implementation.
    #[error("'{name}' is already bound to '{existing}', cannot alias it to '{target}'")]
    AliasConflict {
        /// Name being bound.
        name: String,
        /// Its current binding.
        existing: String,
        /// The rejected target.
        target: String,
    },

    /// A chain names an identifier that has no registered factory.
    #[error("No implementation registered for '{id}' in chain of '{hook_point}'")]
    MissingImplementation {
        /// Hook point whose chain was being composed.
        hook_point: String,
        /// Identifier without a factory.
        id: String,
    },

    /// A stack file could not be parsed.
    #[error("Invalid stack file {path}: {reason}")]
    StackFormat {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ChainError> for AppError {
    fn from(err: ChainError) -> Self {
        let kind = match &err {
            ChainError::AlreadyActive { .. } | ChainError::AliasConflict { .. } => {
                ErrorKind::Conflict
            }
            ChainError::NotActive => ErrorKind::InvalidState,
            ChainError::UndefinedLinkTarget { .. } | ChainError::MissingImplementation { .. } => {
                ErrorKind::NotFound
            }
            ChainError::NotALink { .. } => ErrorKind::Validation,
            ChainError::StackFormat { .. } => ErrorKind::Serialization,
            ChainError::Io(_) => ErrorKind::Io,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
