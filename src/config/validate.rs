//! Config validation logic.
//! Checks the temporary-name tag and the log file location before anything runs.

use anyhow::{Result, bail};
use tracing::{debug, error};

use super::types::Config;
use super::TEMP_PREFIX_MAX_LEN;

impl Config {
    /// Reject settings that would make a run misbehave.
    pub fn validate(&self) -> Result<()> {
        ensure_temp_tag(&self.temp_prefix)?;

        if let Some(log) = &self.log_file {
            if log.is_dir() {
                error!("log_file is a directory: {}", log.display());
                bail!("log_file '{}' is a directory", log.display());
            }
        }

        debug!(
            temp_prefix = %self.temp_prefix,
            max_in_flight = self.max_in_flight,
            log_file = %self
                .log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<none>".into()),
            "config validated"
        );
        Ok(())
    }
}

/// The tag ends up inside file names, so it must be a plain, short name fragment.
fn ensure_temp_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        bail!("temp_prefix must not be empty");
    }
    if tag.chars().count() > TEMP_PREFIX_MAX_LEN {
        bail!("temp_prefix '{tag}' is longer than {TEMP_PREFIX_MAX_LEN} characters");
    }
    if tag.chars().any(|c| std::path::is_separator(c) || c == '\0') {
        bail!("temp_prefix '{tag}' must not contain path separators or NUL");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn bad_tags_are_rejected() {
        let long = "x".repeat(TEMP_PREFIX_MAX_LEN + 1);
        for tag in ["", "a/b", "nul\0", long.as_str()] {
            let cfg = Config {
                temp_prefix: tag.to_string(),
                ..Config::default()
            };
            assert!(cfg.validate().is_err(), "accepted {tag:?}");
        }
    }

    #[test]
    fn log_file_must_not_be_a_directory() {
        let td = tempfile::tempdir().unwrap();
        let cfg = Config {
            log_file: Some(td.path().to_path_buf()),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }
}
