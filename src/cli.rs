//! CLI definition and parsing.
//! Defines Args and turns the command line into planned renames.
//!
//! Notes:
//! - Pairs are positional: `OLD NEW [OLD NEW]...`, relative to `--directory`.
//! - `OLD` may name something in a sub-directory (`sub/file.txt`); `NEW` is
//!   always a bare name in that same directory.
//! - --debug is a shorthand for --log-level debug.

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueHint};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::types::{Config, LogLevel};
use crate::entry::Entry;

/// CLI wrapper for the bulk_rename library.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Rename many files at once, safely (cycles, collisions and nested directories handled)"
)]
pub struct Args {
    /// Rename pairs: OLD NEW [OLD NEW]...
    #[arg(value_name = "OLD NEW")]
    pub pairs: Vec<String>,

    /// Read additional pairs from a file, one `OLD<TAB>NEW` per line.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub from_file: Option<PathBuf>,

    /// Directory the pairs are relative to (default: current directory).
    #[arg(short = 'C', long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub directory: Option<PathBuf>,

    /// Always go through temporary names, even without circular renames.
    #[arg(long, help = "Force two-pass mode (rename through temporary names)")]
    pub two_pass: bool,

    /// Dry-run: check and print the plan but do not modify the filesystem.
    #[arg(
        long,
        help = "Show diagnostics and the batch plan, but do not rename anything"
    )]
    pub dry_run: bool,

    /// Undo right after renaming (round-trip check).
    #[arg(long, help = "Undo the renames immediately after applying them")]
    pub undo: bool,

    /// Cap on renames issued at once per batch (0 = unlimited).
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Append logs to this file.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Print where bulk_rename will look for the config file, then exit.
    #[arg(
        long,
        help = "Print the config file location used by bulk_rename and exit"
    )]
    pub print_config: bool,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(file) = &self.log_file {
            cfg.log_file = Some(file.clone());
        }
        if let Some(jobs) = self.jobs {
            cfg.max_in_flight = jobs;
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
    }

    /// Planned renames from the positional pairs followed by `--from-file`.
    /// Each entry's row id is its position in that combined list.
    pub fn entries(&self, base: &Path) -> Result<Vec<Entry>> {
        if self.pairs.len() % 2 != 0 {
            bail!(
                "rename pairs must come as OLD NEW; '{}' has no new name",
                self.pairs[self.pairs.len() - 1]
            );
        }

        let mut raw: Vec<(String, String)> = self
            .pairs
            .chunks_exact(2)
            .map(|p| (p[0].clone(), p[1].clone()))
            .collect();
        if let Some(path) = &self.from_file {
            raw.extend(read_pairs_file(path)?);
        }

        raw.into_iter()
            .enumerate()
            .map(|(row, (old, new))| Ok(pair_to_entry(base, &old, new)?.with_row(row as u64)))
            .collect()
    }
}

fn pair_to_entry(base: &Path, old: &str, new: String) -> Result<Entry> {
    let old_path = Path::new(old);
    let Some(name) = old_path.file_name() else {
        bail!("'{old}' does not name a file or directory");
    };
    let directory = match old_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => base.join(parent),
        _ => base.to_path_buf(),
    };
    Ok(Entry::new(directory, name.to_string_lossy(), new))
}

/// Tab-separated pairs; blank lines and `#` comments are skipped.
fn read_pairs_file(path: &Path) -> Result<Vec<(String, String)>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read rename list '{}'", path.display()))?;
    let mut pairs = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let Some((old, new)) = line.split_once('\t') else {
            bail!(
                "{}:{}: expected OLD<TAB>NEW",
                path.display(),
                lineno + 1
            );
        };
        pairs.push((old.to_string(), new.to_string()));
    }
    Ok(pairs)
}

pub fn parse() -> Args {
    Args::parse()
}
