use serde::{Deserialize, Serialize};

pub const DEFAULT_OUTPUT_SUFFIX: &str = "_processed.xhtml";
pub const MANIFEST_EXTENSION: &str = "json";

/// Knobs for the tree walk and the generated tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggerOptions {
    /// Element names treated as paragraph-type containers.
    pub container_tags: Vec<String>,
    pub wrapper_tag: String,
    pub id_attribute: String,
    pub id_prefix: String,
    /// Minimum number of digits in an identifier.
    pub id_width: usize,
    pub first_id: u32,
}

impl Default for TaggerOptions {
    fn default() -> Self {
        Self {
            container_tags: vec!["p".to_string()],
            wrapper_tag: "span".to_string(),
            id_attribute: "id".to_string(),
            id_prefix: "f".to_string(),
            id_width: 3,
            first_id: 1,
        }
    }
}

impl TaggerOptions {
    pub fn is_container(&self, name: &str) -> bool {
        self.container_tags
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(name))
    }
}

/// Options for a whole file run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    pub tagger: TaggerOptions,
    /// Appended to the input path once its extension is stripped.
    pub output_suffix: String,
    pub write_manifest: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            tagger: TaggerOptions::default(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            write_manifest: false,
        }
    }
}
