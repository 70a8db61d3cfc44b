//! Clause tagging over a parsed document.
//!
//! Tagging happens in two passes. [`plan`] walks every container, classifies
//! each text leaf and assigns identifiers; [`apply`] then performs the tree
//! edits in plan order. The tree is never edited while it is being walked.

use crate::dom;
use crate::ids::IdSequence;
use crate::options::TaggerOptions;
use crate::segment::{self, LeafClass};
use crate::walker::{self, TextLeaf};
use html5ever::ns;
use markup5ever_rcdom::{Handle, RcDom};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, info, trace, warn};

/// One generated tag: its identifier and the text it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafAction {
    /// Create a new shared tag with `id` and wrap the leaf in it.
    OpenGroup { group: usize, id: String },
    /// Pull the leaf, and everything since the previous member, into the open
    /// shared tag.
    JoinGroup { group: usize },
    /// Replace the leaf's text with one tag per clause.
    Split { clauses: Vec<TagRecord> },
    Untouched,
}

#[derive(Debug, Clone)]
pub struct PlannedLeaf {
    pub leaf: TextLeaf,
    pub action: LeafAction,
}

#[derive(Debug, Default)]
pub struct TagPlan {
    pub leaves: Vec<PlannedLeaf>,
    pub containers: usize,
    pub groups: usize,
}

/// Whether delimiter-free leaves are currently being gathered into one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupState {
    NoOpenGroup,
    OpenGroup(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationReport {
    pub containers: usize,
    pub leaves: usize,
    pub grouped_leaves: usize,
    pub split_leaves: usize,
    pub untouched_leaves: usize,
    pub tags_created: usize,
    /// Counter value the next tag would have received.
    pub next_id: u64,
    /// One entry per generated tag, in creation order.
    pub tags: Vec<TagRecord>,
}

/// Tag every container of `dom` and report what was created.
pub fn annotate(dom: &RcDom, options: &TaggerOptions) -> AnnotationReport {
    let mut ids = IdSequence::from_options(options);
    let plan = plan(&dom.document, options, &mut ids);
    let mut report = apply(&plan, options);
    report.next_id = ids.peek();
    info!(
        containers = report.containers,
        leaves = report.leaves,
        tags = report.tags_created,
        next_id = report.next_id,
        "Annotated document"
    );
    report
}

/// Classify every text leaf below `root` and assign identifiers, without
/// touching the tree.
pub fn plan(root: &Handle, options: &TaggerOptions, ids: &mut IdSequence) -> TagPlan {
    let mut plan = TagPlan::default();
    for container in walker::containers(root, options) {
        plan.containers += 1;
        let mut state = GroupState::NoOpenGroup;
        for node in walker::descendants(&container) {
            let Some(leaf) = walker::text_leaf(&node, &container) else {
                continue;
            };
            let action = match segment::classify(&leaf.text) {
                LeafClass::DelimiterFree => match state {
                    GroupState::OpenGroup(group) => LeafAction::JoinGroup { group },
                    GroupState::NoOpenGroup => {
                        let group = plan.groups;
                        plan.groups += 1;
                        state = GroupState::OpenGroup(group);
                        LeafAction::OpenGroup {
                            group,
                            id: ids.next_id(),
                        }
                    }
                },
                LeafClass::Splittable => {
                    state = GroupState::NoOpenGroup;
                    let clauses = segment::split_clauses(&leaf.text)
                        .into_iter()
                        .map(|clause| TagRecord {
                            id: ids.next_id(),
                            text: format!("{clause} "),
                        })
                        .collect();
                    LeafAction::Split { clauses }
                }
                LeafClass::NoLetters => {
                    state = GroupState::NoOpenGroup;
                    debug!(text = ?leaf.text, "Leaf has no letters; left untagged");
                    LeafAction::Untouched
                }
            };
            trace!(text = ?leaf.text, ?action, "Planned leaf");
            plan.leaves.push(PlannedLeaf { leaf, action });
        }
    }
    plan
}

/// Perform the edits described by `plan`, in order.
pub fn apply(plan: &TagPlan, options: &TaggerOptions) -> AnnotationReport {
    let mut report = AnnotationReport {
        containers: plan.containers,
        ..AnnotationReport::default()
    };
    // Indexed by group number: the shared tag and its entry in `report.tags`.
    let mut groups: Vec<Option<(Handle, usize)>> = vec![None; plan.groups];

    for planned in &plan.leaves {
        report.leaves += 1;
        let leaf = &planned.leaf;
        match &planned.action {
            LeafAction::OpenGroup { group, id } => {
                let tag = new_tag(options, id, &leaf.target);
                if !dom::wrap(&leaf.target, &tag) {
                    warn!(
                        %id,
                        text = ?leaf.text,
                        "Leaf target is detached; identifier left unused"
                    );
                    continue;
                }
                debug!(%id, text = ?leaf.text, "Wrapped delimiter-free leaf");
                groups[*group] = Some((tag, report.tags.len()));
                report.tags.push(TagRecord {
                    id: id.clone(),
                    text: leaf.text.clone(),
                });
                report.grouped_leaves += 1;
                report.tags_created += 1;
            }
            LeafAction::JoinGroup { group } => {
                let Some((tag, record)) = groups.get(*group).cloned().flatten() else {
                    continue;
                };
                if !join_group(&tag, &leaf.target) {
                    warn!(text = ?leaf.text, "Leaf could not join the shared tag");
                    continue;
                }
                report.tags[record].text.push_str(&leaf.text);
                report.grouped_leaves += 1;
                debug!(id = %report.tags[record].id, text = ?leaf.text, "Joined shared tag");
            }
            LeafAction::Split { clauses } => {
                for clause in clauses {
                    let tag = new_tag(options, &clause.id, &leaf.text_node);
                    dom::append(&tag, &dom::create_text(&clause.text));
                    dom::insert_before(&leaf.text_node, &tag);
                    report.tags.push(clause.clone());
                    report.tags_created += 1;
                }
                dom::detach(&leaf.text_node);
                report.split_leaves += 1;
                debug!(clauses = clauses.len(), "Split leaf into clauses");
            }
            LeafAction::Untouched => report.untouched_leaves += 1,
        }
    }
    report
}

/// New wrapper in the namespace of the element it will sit in.
fn new_tag(options: &TaggerOptions, id: &str, near: &Handle) -> Handle {
    let namespace = dom::parent(near)
        .and_then(|parent| dom::element_namespace(&parent))
        .unwrap_or(ns!(html));
    dom::create_element_ns(
        namespace,
        &options.wrapper_tag,
        &[(options.id_attribute.as_str(), id)],
    )
}

/// Extend the shared `tag` so it also covers `target`.
///
/// Let `common` be the nearest ancestor holding both. The tag is first moved
/// up to be a child of `common` (its contents stay where they were), then
/// every child of `common` after the tag, through the one holding `target`,
/// is moved into it. Nothing between two group members can be a leaf, so no
/// other tag is disturbed.
fn join_group(tag: &Handle, target: &Handle) -> bool {
    let tag_chain = dom::ancestors_or_self(tag);
    let target_chain = dom::ancestors_or_self(target);
    let Some((common, tag_depth, target_depth)) =
        target_chain.iter().enumerate().find_map(|(target_depth, node)| {
            tag_chain
                .iter()
                .position(|ancestor| Rc::ptr_eq(ancestor, node))
                .map(|tag_depth| (node.clone(), tag_depth, target_depth))
        })
    else {
        return false;
    };
    if tag_depth == 0 || target_depth == 0 {
        return false;
    }
    let first = &tag_chain[tag_depth - 1];
    let last = &target_chain[target_depth - 1];

    if !Rc::ptr_eq(first, tag) {
        let inner: Vec<Handle> = tag.children.borrow().clone();
        for child in &inner {
            dom::insert_before(tag, child);
        }
        dom::insert_before(first, tag);
    }

    let moving: Vec<Handle> = {
        let children = common.children.borrow();
        let Some(start) = children.iter().position(|child| Rc::ptr_eq(child, tag)) else {
            return false;
        };
        let Some(end) = children.iter().position(|child| Rc::ptr_eq(child, last)) else {
            return false;
        };
        if end <= start {
            return false;
        }
        children[start + 1..=end].to_vec()
    };
    for node in &moving {
        dom::append(tag, node);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{attribute, find_element, parse_html, serialize_html, text_content};
    use crate::walker::descendants;

    fn body_html(html: &str) -> (String, AnnotationReport) {
        let dom = parse_html(html).expect("parse");
        let report = annotate(&dom, &TaggerOptions::default());
        let out = serialize_html(&dom).expect("serialize");
        let start = out.find("<body>").expect("body open") + "<body>".len();
        let end = out.find("</body>").expect("body close");
        (out[start..end].to_string(), report)
    }

    fn tag_ids(root: &Handle) -> Vec<String> {
        descendants(root)
            .iter()
            .filter_map(|node| attribute(node, "id"))
            .collect()
    }

    #[test]
    fn delimiter_free_paragraph_is_wrapped_whole() {
        let (body, report) = body_html("<p>No punctuation here</p>");
        assert_eq!(body, r#"<p><span id="f001">No punctuation here</span></p>"#);
        assert_eq!(report.next_id, 2);
        assert_eq!(report.tags_created, 1);
    }

    #[test]
    fn splittable_leaf_becomes_one_tag_per_clause() {
        let (body, report) = body_html("<p>Hello, world. Goodbye!</p>");
        assert_eq!(
            body,
            concat!(
                r#"<p><span id="f001">Hello, </span>"#,
                r#"<span id="f002">world. </span>"#,
                r#"<span id="f003">Goodbye! </span></p>"#
            )
        );
        assert_eq!(report.split_leaves, 1);
        assert_eq!(report.next_id, 4);
    }

    #[test]
    fn split_inside_inline_element_keeps_the_element() {
        let (body, _) = body_html("<p><em>Yes. No</em></p>");
        assert_eq!(
            body,
            r#"<p><em><span id="f001">Yes. </span><span id="f002">No </span></em></p>"#
        );
    }

    #[test]
    fn adjacent_delimiter_free_leaves_share_a_tag() {
        let (body, report) =
            body_html("<p><i>Hello</i><b>there</b></p><p><i>Next, one</i></p>");
        assert_eq!(
            body,
            concat!(
                r#"<p><span id="f001"><i>Hello</i><b>there</b></span></p>"#,
                r#"<p><i><span id="f002">Next, </span><span id="f003">one </span></i></p>"#
            )
        );
        assert_eq!(report.tags[0].text, "Hellothere");
        assert_eq!(report.grouped_leaves, 2);
    }

    #[test]
    fn whitespace_between_grouped_leaves_moves_with_them() {
        let (body, _) = body_html("<p><i>Hello</i> <i>there</i> tail</p>");
        assert_eq!(
            body,
            r#"<p><span id="f001"><i>Hello</i> <i>there</i></span> tail</p>"#
        );
    }

    #[test]
    fn text_between_grouped_leaves_joins_the_shared_tag() {
        let (body, report) = body_html("<p><i>Hello</i> and, well, <b>there</b> end.</p>");
        assert_eq!(
            body,
            r#"<p><span id="f001"><i>Hello</i> and, well, <b>there</b></span> end.</p>"#
        );
        assert_eq!(report.tags_created, 1);
        assert_eq!(report.next_id, 2);
    }

    #[test]
    fn later_member_in_a_deeper_element_joins_at_the_common_ancestor() {
        let (body, report) = body_html("<p><b>Hello</b><span><i>there</i></span></p>");
        assert_eq!(
            body,
            r#"<p><span id="f001"><b>Hello</b><span><i>there</i></span></span></p>"#
        );
        assert_eq!(report.tags[0].text, "Hellothere");
    }

    #[test]
    fn shared_tag_is_lifted_out_of_a_deeper_first_member() {
        let (body, report) =
            body_html("<p><span><i>Hello</i></span> <b>there</b> <u>friend</u></p>");
        assert_eq!(
            body,
            concat!(
                r#"<p><span id="f001"><span><i>Hello</i></span> <b>there</b> "#,
                r#"<u>friend</u></span></p>"#
            )
        );
        assert_eq!(report.tags_created, 1);
        assert_eq!(report.grouped_leaves, 3);
        assert_eq!(report.tags[0].text, "Hellotherefriend");
    }

    #[test]
    fn nested_containers_tag_each_leaf_once() {
        let options = TaggerOptions {
            container_tags: vec!["li".to_string(), "p".to_string()],
            ..TaggerOptions::default()
        };
        let dom = parse_html("<ul><li><p>Hello there</p></li></ul>").expect("parse");
        let report = annotate(&dom, &options);
        let out = serialize_html(&dom).expect("serialize");
        assert!(
            out.contains(r#"<li><span id="f001"><p>Hello there</p></span></li>"#),
            "{out}"
        );
        assert_eq!(report.tags_created, 1);
        assert_eq!(report.next_id, 2);
    }

    #[test]
    fn split_leaf_closes_the_open_group() {
        let (body, _) = body_html("<p><i>one</i><i>Two, three</i><i>four</i></p>");
        assert_eq!(
            body,
            concat!(
                r#"<p><span id="f001"><i>one</i></span>"#,
                r#"<i><span id="f002">Two, </span><span id="f003">three </span></i>"#,
                r#"<span id="f004"><i>four</i></span></p>"#
            )
        );
    }

    #[test]
    fn letterless_leaf_closes_the_group_and_stays_untouched() {
        let (body, report) = body_html("<p><i>one</i><b>--</b><i>two</i></p>");
        assert_eq!(
            body,
            concat!(
                r#"<p><span id="f001"><i>one</i></span><b>--</b>"#,
                r#"<span id="f002"><i>two</i></span></p>"#
            )
        );
        assert_eq!(report.untouched_leaves, 1);
    }

    #[test]
    fn groups_do_not_cross_containers() {
        let (body, _) = body_html("<p>first</p><p>second</p>");
        assert_eq!(
            body,
            r#"<p><span id="f001">first</span></p><p><span id="f002">second</span></p>"#
        );
    }

    #[test]
    fn text_with_siblings_is_not_a_leaf() {
        let (body, report) = body_html("<p>Hello <i>there</i> friend</p>");
        assert_eq!(body, r#"<p>Hello <span id="f001"><i>there</i></span> friend</p>"#);
        assert_eq!(report.leaves, 1);
    }

    #[test]
    fn markup_outside_containers_is_untouched() {
        let (body, report) = body_html("<h1>Title, here</h1><div class=\"x\">Plain</div>");
        assert_eq!(body, r#"<h1>Title, here</h1><div class="x">Plain</div>"#);
        assert_eq!(report.tags_created, 0);
        assert_eq!(report.next_id, 1);
    }

    #[test]
    fn identifiers_are_gapless_in_document_order() {
        let dom = parse_html(
            "<p>A, b. C</p><p><i>d</i><i>e</i></p><p>... </p><p><em>f; g</em> <b>h</b></p>",
        )
        .expect("parse");
        let report = annotate(&dom, &TaggerOptions::default());

        let ids = tag_ids(&dom.document);
        let expected: Vec<String> = (1..=ids.len()).map(|n| format!("f{n:03}")).collect();
        assert_eq!(ids, expected);
        let recorded: Vec<String> = report.tags.iter().map(|t| t.id.clone()).collect();
        assert_eq!(recorded, expected);
        assert_eq!(report.next_id, ids.len() as u64 + 1);
    }

    #[test]
    fn every_lettered_leaf_lands_in_exactly_one_tag() {
        let dom = parse_html("<p><i>a</i> <b>b, c</b> <u>?!</u> <s>d</s></p>").expect("parse");
        annotate(&dom, &TaggerOptions::default());
        let p = find_element(&dom.document, "p").expect("p element");

        for node in descendants(&p) {
            let Some(text) = dom::text_of(&node) else {
                continue;
            };
            let mut tagged_ancestors = 0;
            let mut cursor = dom::parent(&node);
            while let Some(ancestor) = cursor {
                if attribute(&ancestor, "id").is_some() {
                    tagged_ancestors += 1;
                }
                cursor = dom::parent(&ancestor);
            }
            let expected = if segment::has_letter(&text) { 1 } else { 0 };
            assert_eq!(tagged_ancestors, expected, "text {text:?}");
        }
        assert_eq!(text_content(&p), "a b, c  ?! d");
    }

    #[test]
    fn custom_options_shape_the_tags() {
        let options = TaggerOptions {
            container_tags: vec!["li".to_string()],
            wrapper_tag: "mark".to_string(),
            id_attribute: "data-clause".to_string(),
            id_prefix: "c".to_string(),
            id_width: 5,
            first_id: 7,
        };
        let dom = parse_html("<ul><li>item</li></ul><p>skipped</p>").expect("parse");
        let report = annotate(&dom, &options);
        let out = serialize_html(&dom).expect("serialize");
        assert!(out.contains(r#"<li><mark data-clause="c00007">item</mark></li>"#), "{out}");
        assert!(out.contains("<p>skipped</p>"), "{out}");
        assert_eq!(report.next_id, 8);
    }
}
