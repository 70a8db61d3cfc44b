use clause_core::{RunOptions, TaggerOptions};
use serde::Deserialize;

/// Flattened tool configuration; deserializable from TOML.
#[derive(Debug, Clone, PartialEq, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_container_tags")]
    pub container_tags: Vec<String>,
    #[serde(default = "crate::config::defaults::default_wrapper_tag")]
    pub wrapper_tag: String,
    #[serde(default = "crate::config::defaults::default_id_attribute")]
    pub id_attribute: String,
    #[serde(default = "crate::config::defaults::default_id_prefix")]
    pub id_prefix: String,
    #[serde(default = "crate::config::defaults::default_id_width")]
    pub id_width: usize,
    #[serde(default = "crate::config::defaults::default_first_id")]
    pub first_id: u32,
    #[serde(default = "crate::config::defaults::default_output_suffix")]
    pub output_suffix: String,
    #[serde(default)]
    pub write_manifest: bool,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            container_tags: crate::config::defaults::default_container_tags(),
            wrapper_tag: crate::config::defaults::default_wrapper_tag(),
            id_attribute: crate::config::defaults::default_id_attribute(),
            id_prefix: crate::config::defaults::default_id_prefix(),
            id_width: crate::config::defaults::default_id_width(),
            first_id: crate::config::defaults::default_first_id(),
            output_suffix: crate::config::defaults::default_output_suffix(),
            write_manifest: false,
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            tagger: TaggerOptions {
                container_tags: self.container_tags.clone(),
                wrapper_tag: self.wrapper_tag.clone(),
                id_attribute: self.id_attribute.clone(),
                id_prefix: self.id_prefix.clone(),
                id_width: self.id_width,
                first_id: self.first_id,
            },
            output_suffix: self.output_suffix.clone(),
            write_manifest: self.write_manifest,
        }
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
