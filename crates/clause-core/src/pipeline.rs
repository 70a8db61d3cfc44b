//! File-level run: read, parse, tag, serialize, write.

use crate::dom;
use crate::options::{MANIFEST_EXTENSION, RunOptions};
use crate::tagger::{self, AnnotationReport};
use crate::xhtml;
use anyhow::{Context, Result};
use markup5ever_rcdom::RcDom;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct RunResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub manifest: Option<PathBuf>,
    pub report: AnnotationReport,
}

/// `input` with its extension stripped and `suffix` appended to the name.
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}"))
}

/// Manifest path sitting next to `output`.
pub fn manifest_path(output: &Path) -> PathBuf {
    output.with_extension(MANIFEST_EXTENSION)
}

/// Which parser and serializer a document goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupFormat {
    Html,
    Xhtml,
}

impl MarkupFormat {
    /// XML extensions, or an XML declaration at the top of `source`, select
    /// XHTML. Everything else is read as HTML.
    pub fn detect(path: &Path, source: &str) -> Self {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if matches!(extension.as_str(), "xhtml" | "xht" | "xml") {
            return Self::Xhtml;
        }
        if xhtml::xml_declaration(source).is_some() {
            Self::Xhtml
        } else {
            Self::Html
        }
    }
}

pub fn parse_document(source: &str, format: MarkupFormat) -> Result<RcDom> {
    match format {
        MarkupFormat::Html => dom::parse_html(source),
        MarkupFormat::Xhtml => xhtml::parse_xhtml(source),
    }
}

/// Serialize `dom` in `format`. For XHTML the declaration of `source`, if
/// any, is written back unchanged.
pub fn serialize_document(dom: &RcDom, format: MarkupFormat, source: &str) -> Result<String> {
    match format {
        MarkupFormat::Html => dom::serialize_html(dom),
        MarkupFormat::Xhtml => Ok(xhtml::serialize_xhtml(dom, xhtml::xml_declaration(source))),
    }
}

/// Tag an in-memory document and return the serialized result.
pub fn annotate_source(
    source: &str,
    format: MarkupFormat,
    options: &RunOptions,
) -> Result<(String, AnnotationReport)> {
    let dom = parse_document(source, format)?;
    let report = tagger::annotate(&dom, &options.tagger);
    let out = serialize_document(&dom, format, source)?;
    Ok((out, report))
}

/// [`annotate_source`] for HTML.
pub fn annotate_str(html: &str, options: &RunOptions) -> Result<(String, AnnotationReport)> {
    annotate_source(html, MarkupFormat::Html, options)
}

/// Process one file. Nothing is written unless the whole document was tagged
/// and serialized.
pub fn run_file(input: &Path, options: &RunOptions) -> Result<RunResult> {
    let started = Instant::now();
    info!(path = %input.display(), "Processing document");

    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input {}", input.display()))?;
    let format = MarkupFormat::detect(input, &source);
    debug!(bytes = source.len(), ?format, "Read input");

    let (html, report) = annotate_source(&source, format, options)
        .with_context(|| format!("Failed to process {}", input.display()))?;

    let output = output_path(input, &options.output_suffix);
    fs::write(&output, html)
        .with_context(|| format!("Failed to write output {}", output.display()))?;

    let manifest = if options.write_manifest {
        let path = manifest_path(&output);
        let json = serde_json::to_string_pretty(&report.tags)
            .context("Failed to serialize tag manifest")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write manifest {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    info!(
        output = %output.display(),
        tags = report.tags_created,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Finished document"
    );
    Ok(RunResult {
        input: input.to_path_buf(),
        output,
        manifest,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::TagRecord;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(label: &str) -> PathBuf {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("clause-tagger-{label}-{nonce}"));
        fs::create_dir_all(&dir).expect("scratch dir should be creatable");
        dir
    }

    #[test]
    fn output_path_replaces_the_extension() {
        assert_eq!(
            output_path(Path::new("book/Ch0002.xhtml"), "_processed.xhtml"),
            PathBuf::from("book/Ch0002_processed.xhtml")
        );
        assert_eq!(
            output_path(Path::new("notes.v2.html"), "_processed.xhtml"),
            PathBuf::from("notes.v2_processed.xhtml")
        );
        assert_eq!(
            output_path(Path::new("README"), "_processed.xhtml"),
            PathBuf::from("README_processed.xhtml")
        );
    }

    #[test]
    fn manifest_sits_next_to_output() {
        assert_eq!(
            manifest_path(Path::new("a/Ch1_processed.xhtml")),
            PathBuf::from("a/Ch1_processed.json")
        );
    }

    #[test]
    fn run_file_writes_tagged_sibling() {
        let dir = scratch_dir("run");
        let input = dir.join("Ch0001.html");
        fs::write(
            &input,
            "<html><head><title>T</title></head><body><h1>Head, line</h1><p>No punctuation here</p></body></html>",
        )
        .expect("write input");

        let options = RunOptions {
            write_manifest: true,
            ..RunOptions::default()
        };
        let result = run_file(&input, &options).expect("run should succeed");

        assert_eq!(result.output, dir.join("Ch0001_processed.xhtml"));
        let written = fs::read_to_string(&result.output).expect("output exists");
        assert!(written.contains(r#"<p><span id="f001">No punctuation here</span></p>"#));
        assert!(written.contains("<h1>Head, line</h1>"));
        assert!(written.contains("<title>T</title>"));
        assert_eq!(result.report.next_id, 2);

        let manifest_file = result.manifest.expect("manifest requested");
        let manifest: Vec<TagRecord> =
            serde_json::from_str(&fs::read_to_string(manifest_file).expect("manifest exists"))
                .expect("manifest is JSON");
        assert_eq!(
            manifest,
            vec![TagRecord {
                id: "f001".to_string(),
                text: "No punctuation here".to_string(),
            }]
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn xhtml_chapter_keeps_its_xml_form() {
        let dir = scratch_dir("xhtml");
        let input = dir.join("Ch0002.xhtml");
        let before = concat!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
            "<!DOCTYPE html>\n",
            "<html xmlns=\"http://www.w3.org/1999/xhtml\" lang=\"en\" xml:lang=\"en\">\n",
            "<head>\n<title>Chapter 2</title>\n",
            "<link href=\"style.css\" rel=\"stylesheet\" type=\"text/css\"/>\n</head>\n",
            "<body>\n<div>A<br/>B&#160;C</div>\n",
            "<p>No punctuation here</p>\n</body>\n</html>"
        );
        fs::write(&input, before).expect("write input");

        let result = run_file(&input, &RunOptions::default()).expect("run should succeed");
        let written = fs::read_to_string(&result.output).expect("output exists");

        let expected = before
            .replace("B&#160;C", "B\u{a0}C")
            .replace(
                "<p>No punctuation here</p>",
                r#"<p><span id="f001">No punctuation here</span></p>"#,
            );
        assert_eq!(written, expected);
        assert!(!written.contains("&nbsp;"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn format_follows_extension_then_declaration() {
        assert_eq!(
            MarkupFormat::detect(Path::new("a/Ch1.XHTML"), "<p>x</p>"),
            MarkupFormat::Xhtml
        );
        assert_eq!(
            MarkupFormat::detect(Path::new("page.htm"), "<?xml version=\"1.0\"?>\n<p>x</p>"),
            MarkupFormat::Xhtml
        );
        assert_eq!(
            MarkupFormat::detect(Path::new("page.html"), "<!DOCTYPE html><p>x</p>"),
            MarkupFormat::Html
        );
    }

    #[test]
    fn missing_input_fails_without_output() {
        let dir = scratch_dir("missing");
        let input = dir.join("absent.xhtml");
        let err = run_file(&input, &RunOptions::default()).expect_err("should fail");
        assert!(format!("{err:#}").contains("Failed to read input"));
        assert!(!dir.join("absent_processed.xhtml").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unwritable_output_is_reported() {
        let dir = scratch_dir("blocked");
        let input = dir.join("page.html");
        fs::write(&input, "<p>Hi</p>").expect("write input");
        fs::create_dir_all(dir.join("page_processed.xhtml")).expect("block output path");

        let err = run_file(&input, &RunOptions::default()).expect_err("should fail");
        assert!(format!("{err:#}").contains("Failed to write output"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn letterless_paragraphs_round_trip_unchanged() {
        let (html, report) =
            annotate_str("<p>... !!</p><p>  </p>", &RunOptions::default()).expect("annotate");
        assert!(html.contains("<p>... !!</p><p>  </p>"), "{html}");
        assert_eq!(report.tags_created, 0);
        assert_eq!(report.untouched_leaves, 2);
    }
}
