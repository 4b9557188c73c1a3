//! JSX / TSX front-end.
//!
//! The whole module is scanned for JSX expressions. Each expression found is
//! converted in full and the scan does not look inside it again, but it
//! keeps going through the rest of the module so every top-level JSX
//! expression becomes a root.

use tree_sitter::Node;

use crate::error::{AnalyzeError, Result};
use crate::markup::common::{
    check_nesting, describe_syntax_error, get_node_text, IdGenerator, SYNTHETIC_ROOT_TAG,
};
use crate::markup::Dialect;
use crate::types::TreeNode;

const FRAGMENT_TAG: &str = "Fragment";
const UNKNOWN_TAG: &str = "unknown";

/// Parse a module and build the tree from the JSX it contains.
///
/// `is_typed` selects the TSX grammar so type annotations parse cleanly.
pub fn parse_jsx(source_text: &str, is_typed: bool) -> Result<TreeNode> {
    let dialect = if is_typed { Dialect::Tsx } else { Dialect::Jsx };
    let mut parser = dialect.parser()?;
    let tree = parser
        .parse(source_text, None)
        .ok_or_else(|| AnalyzeError::ParseSyntax("parser produced no syntax tree".to_string()))?;

    let root = tree.root_node();
    let source = source_text.as_bytes();
    let mut ids = IdGenerator::new("node");
    let mut roots = collect_jsx_roots(root, source, &mut ids)?;

    if roots.is_empty() {
        if root.has_error() {
            return Err(AnalyzeError::ParseSyntax(describe_syntax_error(root)));
        }
        return Err(AnalyzeError::NoJsxFound);
    }
    if root.has_error() {
        tracing::warn!(
            dialect = %dialect,
            error = %describe_syntax_error(root),
            "recovered from syntax errors; tree may be partial"
        );
    }

    if roots.len() == 1 {
        return Ok(roots.remove(0));
    }

    // Each root keeps the depths from its own conversion, which started at 0.
    Ok(TreeNode {
        id: ids.next_id(),
        tag: SYNTHETIC_ROOT_TAG.to_string(),
        children: roots,
        depth: Some(0),
        attributes: None,
    })
}

// ============ Module Scan ============

fn is_jsx_kind(kind: &str) -> bool {
    matches!(kind, "jsx_element" | "jsx_self_closing_element" | "jsx_fragment")
}

/// Pre-order scan of the module with a cursor. JSX nodes are converted and
/// their subtrees skipped.
fn collect_jsx_roots(root: Node, source: &[u8], ids: &mut IdGenerator) -> Result<Vec<TreeNode>> {
    let mut roots = Vec::new();
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if is_jsx_kind(node.kind()) {
            roots.push(jsx_to_tree_node(node, source, 0, ids)?);
        } else if cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return Ok(roots);
            }
        }
    }
}

// ============ Node Conversion ============

fn jsx_to_tree_node(
    node: Node,
    source: &[u8],
    depth: usize,
    ids: &mut IdGenerator,
) -> Result<TreeNode> {
    check_nesting(depth)?;

    let tag = jsx_tag_name(node, source);
    let mut children = Vec::new();

    if node.kind() != "jsx_self_closing_element" {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if is_jsx_kind(child.kind()) {
                children.push(jsx_to_tree_node(child, source, depth + 1, ids)?);
            } else if child.kind() == "jsx_expression" {
                if let Some(inner) = jsx_in_expression(child) {
                    children.push(jsx_to_tree_node(inner, source, depth + 1, ids)?);
                }
            }
        }
    }

    Ok(TreeNode {
        id: ids.next_id(),
        tag,
        children,
        depth: Some(depth),
        attributes: None,
    })
}

/// The JSX node held directly by a `{...}` container, looking through
/// parentheses. Anything else in the container is not part of the tree.
fn jsx_in_expression(container: Node) -> Option<Node> {
    let mut cursor = container.walk();
    let mut expr = container
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;
    while expr.kind() == "parenthesized_expression" {
        let mut inner_cursor = expr.walk();
        let inner = expr
            .named_children(&mut inner_cursor)
            .find(|child| child.kind() != "comment")?;
        expr = inner;
    }
    is_jsx_kind(expr.kind()).then_some(expr)
}

// ============ Tag Names ============

fn jsx_tag_name(node: Node, source: &[u8]) -> String {
    let name = match node.kind() {
        "jsx_fragment" => return FRAGMENT_TAG.to_string(),
        "jsx_self_closing_element" => node.child_by_field_name("name"),
        _ => {
            let mut cursor = node.walk();
            let opening = node
                .named_children(&mut cursor)
                .find(|child| child.kind() == "jsx_opening_element");
            match opening {
                Some(opening) => opening.child_by_field_name("name"),
                None => return UNKNOWN_TAG.to_string(),
            }
        }
    };

    match name {
        Some(name) => resolve_name(name, source),
        // `<>...</>` parses as an element whose opening tag has no name.
        None => FRAGMENT_TAG.to_string(),
    }
}

fn resolve_name(name: Node, source: &[u8]) -> String {
    match name.kind() {
        "identifier" | "jsx_identifier" | "property_identifier" | "jsx_namespace_name" => {
            non_empty_or_unknown(get_node_text(name, source))
        }
        "member_expression" | "nested_identifier" => {
            let object = name.child_by_field_name("object");
            let property = name.child_by_field_name("property");
            match (object, property) {
                (None, None) => {
                    let text = get_node_text(name, source);
                    match text.rsplit_once('.') {
                        Some((object, property)) => format!(
                            "{}.{}",
                            non_empty_or_unknown(object.trim()),
                            non_empty_or_unknown(property.trim())
                        ),
                        None => non_empty_or_unknown(text),
                    }
                }
                (object, property) => format!(
                    "{}.{}",
                    object.map_or_else(|| UNKNOWN_TAG.to_string(), |o| resolve_name(o, source)),
                    property.map_or_else(|| UNKNOWN_TAG.to_string(), |p| resolve_name(p, source)),
                ),
            }
        }
        _ => UNKNOWN_TAG.to_string(),
    }
}

fn non_empty_or_unknown(text: &str) -> String {
    if text.is_empty() {
        UNKNOWN_TAG.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(node: &TreeNode) -> Vec<&str> {
        node.children.iter().map(|c| c.tag.as_str()).collect()
    }

    #[test]
    fn test_component_tree() {
        let code = r#"
export function App() {
    return (
        <main>
            <Header title="x" />
            <section>
                <p>text</p>
            </section>
        </main>
    );
}
"#;
        let tree = parse_jsx(code, false).unwrap();
        assert_eq!(tree.tag, "main");
        assert_eq!(tree.depth, Some(0));
        assert_eq!(tags(&tree), ["Header", "section"]);
        assert_eq!(tree.children[1].children[0].tag, "p");
        assert_eq!(tree.children[1].children[0].depth, Some(2));
        // JSX attributes are not recorded
        assert!(tree.children[0].attributes.is_none());
    }

    #[test]
    fn test_fragment_and_member_names() {
        let code = "const a = <><Foo.Bar /><UI.Menu.Item /></>;";
        let tree = parse_jsx(code, false).unwrap();
        assert_eq!(tree.tag, "Fragment");
        assert_eq!(tags(&tree), ["Foo.Bar", "UI.Menu.Item"]);
    }

    #[test]
    fn test_expression_containers() {
        let code = r#"
const view = (
    <ul>
        {<li />}
        {(<li />)}
        {items.map((item) => <li key={item} />)}
        {"text"}
    </ul>
);
"#;
        let tree = parse_jsx(code, false).unwrap();
        assert_eq!(tags(&tree), ["li", "li"]);
    }

    #[test]
    fn test_multiple_roots_keep_own_depths() {
        let code = "const a = <A><B /></A>;\nconst b = <C />;";
        let tree = parse_jsx(code, false).unwrap();
        assert_eq!(tree.tag, "root");
        assert_eq!(tree.depth, Some(0));
        assert_eq!(tags(&tree), ["A", "C"]);
        assert_eq!(tree.children[0].depth, Some(0));
        assert_eq!(tree.children[0].children[0].depth, Some(1));
        assert_eq!(tree.children[1].depth, Some(0));
        // Synthetic root takes the last id
        assert_eq!(tree.children[0].children[0].id, "node-0");
        assert_eq!(tree.children[0].id, "node-1");
        assert_eq!(tree.children[1].id, "node-2");
        assert_eq!(tree.id, "node-3");
    }

    #[test]
    fn test_tsx_type_annotations() {
        let code = r#"
interface Props { items: string[] }
export const List = ({ items }: Props): JSX.Element => (
    <ul>{items.length > 0 && <li />}</ul>
);
"#;
        let tree = parse_jsx(code, true).unwrap();
        assert_eq!(tree.tag, "ul");
    }

    #[test]
    fn test_no_jsx() {
        assert_eq!(
            parse_jsx("const x = 1 + 2;", false),
            Err(AnalyzeError::NoJsxFound)
        );
    }

    #[test]
    fn test_hard_syntax_error() {
        let result = parse_jsx("let = ;;; {", false);
        assert!(matches!(result, Err(AnalyzeError::ParseSyntax(_))));
    }

    #[test]
    fn test_recovers_partial_tree() {
        let code = "const a = <div><p /></div>;\nconst b = ;";
        let tree = parse_jsx(code, false).unwrap();
        assert_eq!(tree.tag, "div");
        assert_eq!(tags(&tree), ["p"]);
    }

    #[test]
    fn test_unterminated_element_is_syntax_error() {
        // Without a closing tag no jsx_element is completed, so nothing is recovered.
        let detail = match parse_jsx("const a = <div>", false) {
            Err(AnalyzeError::ParseSyntax(detail)) => detail,
            other => panic!("expected a syntax error, got {other:?}"),
        };
        assert!(detail.contains("(1:"), "error should point at line 1: {detail}");
    }
}
