//! Config module.
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{CONFIG_ENV, default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use xml::{Settings, load_config_from_xml_path, template_config};

/// Tag embedded in two-pass temporary names.
pub const TEMP_PREFIX_DEFAULT: &str = "gbr";
/// Longest accepted temporary-name tag.
pub const TEMP_PREFIX_MAX_LEN: usize = 32;
