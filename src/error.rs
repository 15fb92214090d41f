//! Tagged error kinds for the scaffolding core.
//!
//! Configuration loading, registry loading, and generation are fail-fast: the
//! first invalid field aborts the whole operation with one of these kinds.
//! Callers (the CLI) decide how to surface them; the core never exits the
//! process itself.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("{label} must be a relative path without '..', got {raw:?}")]
    InvalidPath { label: String, raw: String },

    #[error("{label} uses unsupported placeholder {{{name}}} (allowed: {allowed})")]
    UnsupportedPlaceholder {
        label: String,
        name: String,
        allowed: String,
    },

    #[error("{label} left unresolved placeholder {{{name}}} after substitution")]
    UnresolvedPlaceholder { label: String, name: String },

    #[error("configuration id is required")]
    MissingIdentifier,

    #[error("duplicate file rule id {id:?}")]
    DuplicateRuleId { id: String },

    #[error("file rule {rule_id:?} renders target {target:?} already produced by an earlier rule")]
    DuplicateTarget { rule_id: String, target: String },

    #[error("duplicate configuration id {id:?} in registry index")]
    DuplicateIdentifier { id: String },

    #[error("configuration path escapes the configurations root: {path:?}")]
    PathEscape { path: String },

    #[error("configuration id mismatch: index has {expected:?}, file has {found:?}")]
    IdentifierMismatch { expected: String, found: String },

    #[error("configuration id {id:?} already belongs to an owner configuration")]
    OwnerConflict { id: String },

    #[error("file rule {rule_id:?} resolves to missing artifact {artifact:?}")]
    MissingArtifact { rule_id: String, artifact: String },

    #[error("{0}")]
    Schema(String),

    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse {label}: {source}")]
    Json {
        label: String,
        source: serde_json::Error,
    },
}

impl SetupError {
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SetupError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        SetupError::Schema(message.into())
    }
}

pub type Result<T, E = SetupError> = std::result::Result<T, E>;
