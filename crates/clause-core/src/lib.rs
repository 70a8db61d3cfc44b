//! Clause tagging for HTML/XHTML paragraphs.
//!
//! Every sentence-like clause inside a paragraph is wrapped in a `span` with a
//! sequential identifier (`f001`, `f002`, ...) so audio-sync and highlighting
//! tools can address it.

pub mod dom;
pub mod ids;
pub mod options;
pub mod pipeline;
pub mod segment;
pub mod tagger;
pub mod walker;
pub mod xhtml;

pub use options::{RunOptions, TaggerOptions};
pub use pipeline::{
    MarkupFormat, RunResult, annotate_source, annotate_str, output_path, run_file,
};
pub use tagger::{AnnotationReport, TagRecord, annotate};
