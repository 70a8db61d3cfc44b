use super::defaults;
use super::models::{AppConfig, LogLevel};
use serde::Deserialize;

/// On-disk layout of `conf/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    tagging: TaggingConfig,
    #[serde(default)]
    output: OutputConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            container_tags: tables.tagging.container_tags,
            wrapper_tag: tables.tagging.wrapper_tag,
            id_attribute: tables.tagging.id_attribute,
            id_prefix: tables.tagging.id_prefix,
            id_width: tables.tagging.id_width,
            first_id: tables.tagging.first_id,
            output_suffix: tables.output.suffix,
            write_manifest: tables.output.write_manifest,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            tagging: TaggingConfig {
                container_tags: config.container_tags.clone(),
                wrapper_tag: config.wrapper_tag.clone(),
                id_attribute: config.id_attribute.clone(),
                id_prefix: config.id_prefix.clone(),
                id_width: config.id_width,
                first_id: config.first_id,
            },
            output: OutputConfig {
                suffix: config.output_suffix.clone(),
                write_manifest: config.write_manifest,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct TaggingConfig {
    #[serde(default = "defaults::default_container_tags")]
    container_tags: Vec<String>,
    #[serde(default = "defaults::default_wrapper_tag")]
    wrapper_tag: String,
    #[serde(default = "defaults::default_id_attribute")]
    id_attribute: String,
    #[serde(default = "defaults::default_id_prefix")]
    id_prefix: String,
    #[serde(default = "defaults::default_id_width")]
    id_width: usize,
    #[serde(default = "defaults::default_first_id")]
    first_id: u32,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        TaggingConfig {
            container_tags: defaults::default_container_tags(),
            wrapper_tag: defaults::default_wrapper_tag(),
            id_attribute: defaults::default_id_attribute(),
            id_prefix: defaults::default_id_prefix(),
            id_width: defaults::default_id_width(),
            first_id: defaults::default_first_id(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct OutputConfig {
    #[serde(default = "defaults::default_output_suffix")]
    suffix: String,
    #[serde(default)]
    write_manifest: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            suffix: defaults::default_output_suffix(),
            write_manifest: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}
