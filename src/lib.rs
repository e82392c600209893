//! Core library for `bulk_rename`.
//!
//! A batch-rename engine: validate a list of planned renames, order them so
//! nested directories stay reachable, run them concurrently in batches
//! (optionally through temporary names to break cycles), and keep an undo/redo
//! history of what happened.
//!
//! ```no_run
//! use std::sync::Arc;
//! use bulk_rename::{Entry, LocalFs, Orchestrator};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), bulk_rename::EngineError> {
//! let orch = Orchestrator::new(Arc::new(LocalFs::new()));
//! let entries = vec![Entry::new("/tmp/photos", "a.jpg", "b.jpg"), Entry::new("/tmp/photos", "b.jpg", "a.jpg")];
//! let (_checked, results) = orch.rename_all(entries, &CancellationToken::new()).await?;
//! assert!(results.used_two_pass);
//! # Ok(())
//! # }
//! ```

pub mod check;
pub mod cli;
pub mod config;
pub mod entry;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod platform;
pub mod rename;
pub mod shutdown;
pub mod undo;

pub use check::{CheckResult, Diagnostic, Severity, check};
pub use config::{Config, LogLevel, default_config_path, default_log_path, path_has_symlink_ancestor};
pub use entry::{Entry, FileHandle};
pub use errors::{DiagnosticKind, EngineError, RenameError};
pub use fs_ops::{FileSystem, LocalFs};
pub use rename::{
    BatchResult, CancelHandle, Executor, Failure, FailureStage, Orchestrator, RenameHandle,
    RenameOutcome, RenameResults, Success, schedule,
};
pub use undo::{HistoryState, UndoAction, UndoStack};
