//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Renders a commented template for `--print-config`.
//!
//! Notes:
//! - Every element is optional; absent or empty elements keep the default.
//! - Unknown elements are rejected so typos surface instead of being ignored.

use anyhow::{Context, Result, anyhow};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{Config, LogLevel};
use super::TEMP_PREFIX_DEFAULT;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    log_file: Option<String>,
    #[serde(default)]
    temp_prefix: Option<String>,
    #[serde(default)]
    max_in_flight: Option<String>,
}

/// Values read from a config file; `None` keeps whatever the target already has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub log_level: Option<LogLevel>,
    pub log_file: Option<PathBuf>,
    pub temp_prefix: Option<String>,
    pub max_in_flight: Option<usize>,
}

impl Settings {
    pub fn apply_to(self, cfg: &mut Config) {
        if let Some(level) = self.log_level {
            cfg.log_level = level;
        }
        if let Some(file) = self.log_file {
            cfg.log_file = Some(file);
        }
        if let Some(tag) = self.temp_prefix {
            cfg.temp_prefix = tag;
        }
        if let Some(max) = self.max_in_flight {
            cfg.max_in_flight = max;
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_settings(contents: &str) -> Result<Settings> {
    let parsed: XmlConfig = from_xml_str(contents)?;

    let log_level = non_empty(parsed.log_level)
        .map(|s| s.parse::<LogLevel>().map_err(|e| anyhow!(e)))
        .transpose()?;
    let max_in_flight = non_empty(parsed.max_in_flight)
        .map(|s| {
            s.parse::<usize>()
                .with_context(|| format!("max_in_flight must be a non-negative integer, got '{s}'"))
        })
        .transpose()?;

    Ok(Settings {
        log_level,
        log_file: non_empty(parsed.log_file).map(PathBuf::from),
        temp_prefix: non_empty(parsed.temp_prefix),
        max_in_flight,
    })
}

/// Load settings from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Settings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    parse_settings(&contents).with_context(|| format!("parse config xml '{}'", path.display()))
}

/// Commented config file listing every supported element with its default.
pub fn template_config() -> String {
    let defaults = Config::default();
    format!(
        "<!--\n  bulk_rename configuration (XML)\n\n    log_level      -> quiet | normal | info | debug\n    log_file       -> append logs to this file (optional)\n    temp_prefix    -> tag used for two-pass temporary names\n    max_in_flight  -> renames issued at once per batch (0 = unlimited)\n\n  CLI flags override XML values.\n-->\n<config>\n  <log_level>{}</log_level>\n  <log_file></log_file>\n  <temp_prefix>{}</temp_prefix>\n  <max_in_flight>{}</max_in_flight>\n</config>\n",
        defaults.log_level, TEMP_PREFIX_DEFAULT, defaults.max_in_flight
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_file_is_read() {
        let s = parse_settings(
            "<config><log_level> debug </log_level><log_file>/tmp/br.log</log_file>\
             <temp_prefix>tmp</temp_prefix><max_in_flight> 4 </max_in_flight></config>",
        )
        .unwrap();
        assert_eq!(s.log_level, Some(LogLevel::Debug));
        assert_eq!(s.log_file, Some(PathBuf::from("/tmp/br.log")));
        assert_eq!(s.temp_prefix.as_deref(), Some("tmp"));
        assert_eq!(s.max_in_flight, Some(4));
    }

    #[test]
    fn missing_and_blank_elements_keep_defaults() {
        let s = parse_settings("<config><log_file>   </log_file></config>").unwrap();
        assert_eq!(s, Settings::default());
        let mut cfg = Config::default();
        s.apply_to(&mut cfg);
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn unknown_element_is_rejected() {
        assert!(parse_settings("<config><colour>red</colour></config>").is_err());
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(parse_settings("<config><max_in_flight>many</max_in_flight></config>").is_err());
        assert!(parse_settings("<config><log_level>loud</log_level></config>").is_err());
    }

    #[test]
    fn template_round_trips() {
        let s = parse_settings(&template_config()).unwrap();
        let mut cfg = Config::default();
        s.apply_to(&mut cfg);
        assert_eq!(cfg, Config::default());
    }
}
