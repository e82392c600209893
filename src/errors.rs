//! Typed error definitions for bulk_rename.
//! Pre-flight problems are data (`DiagnosticKind`); execution failures are
//! captured per entry (`RenameError`); engine-level refusals use `EngineError`.

use std::path::PathBuf;
use thiserror::Error;

use crate::check::Severity;

/// Problems the checker can attach to an entry before anything is renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DiagnosticKind {
    #[error("empty target name")]
    EmptyTarget,

    #[error("separator in target name")]
    SeparatorInTarget,

    #[error("duplicate output path")]
    DuplicateTarget,

    #[error("target already exists")]
    AlreadyExists,
}

impl DiagnosticKind {
    /// Severity this kind always carries.
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::AlreadyExists => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::EmptyTarget => "empty_target",
            DiagnosticKind::SeparatorInTarget => "separator_in_target",
            DiagnosticKind::DuplicateTarget => "duplicate_target",
            DiagnosticKind::AlreadyExists => "already_exists",
        }
    }
}

/// A single rename that did not happen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameError {
    #[error("target already exists: {0}")]
    TargetExists(PathBuf),

    #[error("source not found: {0}")]
    NotFound(PathBuf),

    #[error("permission denied renaming {0}")]
    PermissionDenied(PathBuf),

    #[error("rename cancelled")]
    Cancelled,

    #[error("rename of {path} failed: {reason}")]
    Failed { path: PathBuf, reason: String },
}

impl RenameError {
    /// Stable machine-readable code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            RenameError::TargetExists(_) => "target_exists",
            RenameError::NotFound(_) => "not_found",
            RenameError::PermissionDenied(_) => "permission_denied",
            RenameError::Cancelled => "cancelled",
            RenameError::Failed { .. } => "rename_failed",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RenameError::Cancelled)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("refusing to rename: checks reported {highest} severity problems")]
    Blocked { highest: Severity },

    #[error("rename task aborted: {0}")]
    Aborted(String),
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Blocked { .. } => "blocked",
            EngineError::Aborted(_) => "aborted",
        }
    }
}
