//! Structural HTML front-end using tree-sitter-html.
//!
//! tree-sitter-html parses the text as written and never synthesizes
//! `html`/`head`/`body`, so the body contents are recovered here: the
//! document wrappers are transparent, head metadata is skipped, and every
//! remaining element becomes a [`TreeNode`]. Rows written directly inside
//! a `<table>` get the `<tbody>` a browser would imply. Text and comments
//! are dropped.

use std::collections::BTreeMap;

use tree_sitter::Node;

use crate::error::{AnalyzeError, Result};
use crate::markup::common::{
    check_nesting, decode_entities, get_node_text, IdGenerator, SYNTHETIC_ROOT_TAG,
};
use crate::markup::Dialect;
use crate::types::TreeNode;

/// Elements the HTML tree builder places in `<head>` when they come before
/// any body content.
const HEAD_CONTENT_TAGS: &[&str] = &[
    "base", "link", "meta", "title", "style", "script", "noscript", "template",
];

/// Parse markup into the unified tree.
pub fn parse_html(markup: &str) -> Result<TreeNode> {
    let mut parser = Dialect::Html.parser()?;
    let tree = parser
        .parse(markup, None)
        .ok_or(AnalyzeError::NoElementsFound)?;

    let root = tree.root_node();
    let source = markup.as_bytes();
    if root.has_error() {
        tracing::debug!("HTML grammar flagged error nodes; keeping best-effort structure");
    }

    let mut body = BodyCollector::default();
    body.collect(root, source);

    let mut ids = IdGenerator::new("node");
    match body.elements.as_slice() {
        [] => Err(AnalyzeError::NoElementsFound),
        [single] => element_to_tree_node(*single, source, 0, &mut ids),
        many => {
            let id = ids.next_id();
            let children = many
                .iter()
                .map(|element| element_to_tree_node(*element, source, 1, &mut ids))
                .collect::<Result<Vec<_>>>()?;
            Ok(TreeNode {
                id,
                tag: SYNTHETIC_ROOT_TAG.to_string(),
                children,
                depth: Some(0),
                attributes: None,
            })
        }
    }
}

// ============ Document Body ============

/// Gathers the top-level elements the document body would hold.
#[derive(Default)]
struct BodyCollector<'a> {
    elements: Vec<Node<'a>>,
    in_body: bool,
}

impl<'a> BodyCollector<'a> {
    fn collect(&mut self, parent: Node<'a>, source: &[u8]) {
        let mut cursor = parent.walk();
        for child in parent.children(&mut cursor) {
            match child.kind() {
                "ERROR" => self.collect(child, source),
                "text" => {
                    if !get_node_text(child, source).trim().is_empty() {
                        self.in_body = true;
                    }
                }
                kind if is_element_kind(kind) => {
                    let tag = element_tag_name(child, source);
                    match tag.as_str() {
                        "html" => self.collect(child, source),
                        "body" => {
                            self.in_body = true;
                            self.collect(child, source);
                        }
                        // Metadata stays in the head; anything else moves to the body.
                        "head" => self.collect(child, source),
                        t if !self.in_body && HEAD_CONTENT_TAGS.contains(&t) => {}
                        _ => {
                            self.in_body = true;
                            self.elements.push(child);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

// ============ Element Conversion ============

fn is_element_kind(kind: &str) -> bool {
    matches!(kind, "element" | "script_element" | "style_element")
}

/// The start or self-closing tag of an element node
fn element_open_tag(node: Node) -> Option<Node> {
    (0..node.child_count())
        .filter_map(|i| node.child(i))
        .find(|child| matches!(child.kind(), "start_tag" | "self_closing_tag"))
}

fn element_tag_name(node: Node, source: &[u8]) -> String {
    element_open_tag(node)
        .and_then(|open_tag| open_tag.named_child(0))
        .filter(|name| name.kind() == "tag_name")
        .map(|name| get_node_text(name, source).to_ascii_lowercase())
        .unwrap_or_default()
}

fn element_attributes(node: Node, source: &[u8]) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();
    let Some(open_tag) = element_open_tag(node) else {
        return attributes;
    };

    let mut cursor = open_tag.walk();
    for attr in open_tag.children(&mut cursor) {
        if attr.kind() != "attribute" {
            continue;
        }
        let mut name = None;
        let mut value = String::new();
        let mut attr_cursor = attr.walk();
        for part in attr.children(&mut attr_cursor) {
            match part.kind() {
                "attribute_name" => name = Some(get_node_text(part, source).to_ascii_lowercase()),
                "attribute_value" => value = decode_entities(get_node_text(part, source)).into_owned(),
                "quoted_attribute_value" => {
                    let mut quoted_cursor = part.walk();
                    value = part
                        .children(&mut quoted_cursor)
                        .find(|inner| inner.kind() == "attribute_value")
                        .map(|inner| decode_entities(get_node_text(inner, source)).into_owned())
                        .unwrap_or_default();
                }
                _ => {}
            }
        }
        if let Some(name) = name {
            // First occurrence wins, as in the DOM.
            attributes.entry(name).or_insert(value);
        }
    }
    attributes
}

fn element_to_tree_node(
    node: Node,
    source: &[u8],
    depth: usize,
    ids: &mut IdGenerator,
) -> Result<TreeNode> {
    check_nesting(depth)?;

    let tag = element_tag_name(node, source);
    let attributes = element_attributes(node, source);

    let is_table = tag == "table";
    let mut children = Vec::new();
    let mut rows = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if !is_element_kind(child.kind()) {
            continue;
        }
        if is_table && element_tag_name(child, source) == "tr" {
            rows.push(child);
            continue;
        }
        if !rows.is_empty() {
            children.push(implied_tbody(&rows, source, depth + 1, ids)?);
            rows.clear();
        }
        children.push(element_to_tree_node(child, source, depth + 1, ids)?);
    }
    if !rows.is_empty() {
        children.push(implied_tbody(&rows, source, depth + 1, ids)?);
    }

    Ok(TreeNode {
        id: ids.next_id(),
        tag,
        children,
        depth: Some(depth),
        attributes: (!attributes.is_empty()).then_some(attributes),
    })
}

/// Wrap a run of `<tr>` found directly under `<table>` in a synthetic `<tbody>`.
fn implied_tbody(
    rows: &[Node],
    source: &[u8],
    depth: usize,
    ids: &mut IdGenerator,
) -> Result<TreeNode> {
    check_nesting(depth)?;
    let children = rows
        .iter()
        .map(|row| element_to_tree_node(*row, source, depth + 1, ids))
        .collect::<Result<Vec<_>>>()?;

    Ok(TreeNode {
        id: ids.next_id(),
        tag: "tbody".to_string(),
        children,
        depth: Some(depth),
        attributes: None,
    })
}
