//! XHTML input and output.
//!
//! EPUB chapters are XML, so they are parsed with `xml5ever` into the same
//! `RcDom` the tagger works on and written back as XML: the declaration is
//! kept, empty void elements stay self-closing, and text is escaped with the
//! three entities XML always defines.

use anyhow::{Context, Result};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::fmt::Write as _;
use xml5ever::QualName;
use xml5ever::driver::{XmlParseOpts, parse_document};
use xml5ever::tendril::TendrilSink;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";

// Written as `<name/>` when they have no children.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Parse an XML/XHTML document.
pub fn parse_xhtml(source: &str) -> Result<RcDom> {
    parse_document(RcDom::default(), XmlParseOpts::default())
        .from_utf8()
        .read_from(&mut source.as_bytes())
        .context("XML parser rejected the input")
}

/// The `<?xml ...?>` declaration at the start of `source`, verbatim.
pub fn xml_declaration(source: &str) -> Option<&str> {
    let trimmed = source.trim_start_matches('\u{feff}').trim_start();
    let rest = trimmed.strip_prefix("<?xml")?;
    if !rest.starts_with(|c: char| c.is_whitespace() || c == '?') {
        return None;
    }
    let end = trimmed.find("?>")?;
    Some(&trimmed[..end + 2])
}

/// Serialize `dom` as XML, starting with `declaration` when one is given.
pub fn serialize_xhtml(dom: &RcDom, declaration: Option<&str>) -> String {
    let mut writer = XmlWriter::default();
    if let Some(decl) = declaration {
        writer.out.push_str(decl);
        writer.out.push('\n');
    }
    for child in dom.document.children.borrow().iter() {
        match &child.data {
            // Replaced by the verbatim declaration above.
            NodeData::ProcessingInstruction { target, .. } if &**target == "xml" => {}
            // Prolog layout is rewritten as one node per line.
            NodeData::Text { contents } if contents.borrow().trim().is_empty() => {}
            NodeData::Element { .. } => writer.node(child),
            _ => {
                writer.node(child);
                writer.out.push('\n');
            }
        }
    }
    writer.out
}

#[derive(Default)]
struct XmlWriter {
    out: String,
    /// Namespace bindings per open element: `(prefix, uri)`, `""` is the
    /// default namespace.
    scopes: Vec<Vec<(String, String)>>,
}

impl XmlWriter {
    fn node(&mut self, node: &Handle) {
        match &node.data {
            NodeData::Element { .. } => self.element(node),
            NodeData::Text { contents } => escape_into(&mut self.out, &contents.borrow(), false),
            NodeData::Comment { contents } => {
                let _ = write!(self.out, "<!--{contents}-->");
            }
            NodeData::ProcessingInstruction { target, contents } => {
                if contents.is_empty() {
                    let _ = write!(self.out, "<?{target}?>");
                } else {
                    let _ = write!(self.out, "<?{target} {contents}?>");
                }
            }
            NodeData::Doctype {
                name,
                public_id,
                system_id,
            } => {
                let _ = write!(self.out, "<!DOCTYPE {name}");
                if !public_id.is_empty() {
                    let _ = write!(self.out, " PUBLIC \"{public_id}\" \"{system_id}\"");
                } else if !system_id.is_empty() {
                    let _ = write!(self.out, " SYSTEM \"{system_id}\"");
                }
                self.out.push('>');
            }
            NodeData::Document => {
                for child in node.children.borrow().iter() {
                    self.node(child);
                }
            }
        }
    }

    fn element(&mut self, node: &Handle) {
        let NodeData::Element { name, attrs, .. } = &node.data else {
            return;
        };
        let attrs = attrs.borrow();

        let mut scope: Vec<(String, String)> = attrs
            .iter()
            .filter_map(|attr| declared_prefix(&attr.name).map(|p| (p, attr.value.to_string())))
            .collect();
        let mut missing: Vec<(String, String)> = Vec::new();
        let element_prefix = name.prefix.as_ref().map(|p| p.to_string()).unwrap_or_default();
        self.require(&mut scope, &mut missing, element_prefix, name.ns.to_string());
        for attr in attrs.iter() {
            if declared_prefix(&attr.name).is_some() {
                continue;
            }
            if let Some(prefix) = &attr.name.prefix {
                if &**prefix != "xml" {
                    let uri = attr.name.ns.to_string();
                    self.require(&mut scope, &mut missing, prefix.to_string(), uri);
                }
            }
        }

        let tag = qualified_name(name);
        self.out.push('<');
        self.out.push_str(&tag);
        for (prefix, uri) in &missing {
            if prefix.is_empty() {
                self.out.push_str(" xmlns=\"");
            } else {
                let _ = write!(self.out, " xmlns:{prefix}=\"");
            }
            escape_into(&mut self.out, uri, true);
            self.out.push('"');
        }
        for attr in attrs.iter() {
            let _ = write!(self.out, " {}=\"", attribute_name(&attr.name));
            escape_into(&mut self.out, &attr.value, true);
            self.out.push('"');
        }

        let children = node.children.borrow();
        if children.is_empty() && VOID_ELEMENTS.contains(&&*name.local) {
            self.out.push_str("/>");
            return;
        }
        self.out.push('>');
        self.scopes.push(scope);
        for child in children.iter() {
            self.node(child);
        }
        self.scopes.pop();
        let _ = write!(self.out, "</{tag}>");
    }

    /// Record a binding for `prefix` unless it already resolves to `uri`.
    fn require(
        &self,
        scope: &mut Vec<(String, String)>,
        missing: &mut Vec<(String, String)>,
        prefix: String,
        uri: String,
    ) {
        let bound = scope
            .iter()
            .rev()
            .chain(self.scopes.iter().rev().flat_map(|s| s.iter().rev()))
            .find(|(p, _)| *p == prefix)
            .map(|(_, u)| u.as_str())
            .unwrap_or("");
        if bound == uri {
            return;
        }
        scope.push((prefix.clone(), uri.clone()));
        missing.push((prefix, uri));
    }
}

/// Prefix declared by an `xmlns` / `xmlns:p` attribute.
fn declared_prefix(name: &QualName) -> Option<String> {
    match &name.prefix {
        Some(prefix) if &**prefix == "xmlns" => Some(name.local.to_string()),
        Some(_) => None,
        None if &*name.local == "xmlns" => Some(String::new()),
        None if &*name.ns == XMLNS_NS => Some(name.local.to_string()),
        None => None,
    }
}

fn qualified_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{prefix}:{}", name.local),
        None => name.local.to_string(),
    }
}

fn attribute_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{prefix}:{}", name.local),
        None if &*name.local == "xmlns" => "xmlns".to_string(),
        None if &*name.ns == XML_NS => format!("xml:{}", name.local),
        None if &*name.ns == XMLNS_NS => format!("xmlns:{}", name.local),
        None => name.local.to_string(),
    }
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
