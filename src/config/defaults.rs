pub(crate) fn default_container_tags() -> Vec<String> {
    vec!["p".to_string()]
}

pub(crate) fn default_wrapper_tag() -> String {
    "span".to_string()
}

pub(crate) fn default_id_attribute() -> String {
    "id".to_string()
}

pub(crate) fn default_id_prefix() -> String {
    "f".to_string()
}

pub(crate) fn default_id_width() -> usize {
    3
}

pub(crate) fn default_first_id() -> u32 {
    1
}

pub(crate) fn default_output_suffix() -> String {
    clause_core::options::DEFAULT_OUTPUT_SUFFIX.to_string()
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}
