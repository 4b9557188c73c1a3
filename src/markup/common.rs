//! Helpers shared by the HTML and JSX front-ends.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tree_sitter::Node;

use crate::error::{AnalyzeError, Result};

// ============ Limits ============

/// Deepest element nesting either front-end will convert. Keeps the
/// recursive conversions (and the binary encoding built from them) well
/// inside a worker thread's stack.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Tag given to the synthetic node that wraps multiple top-level elements.
pub const SYNTHETIC_ROOT_TAG: &str = "root";

pub fn check_nesting(depth: usize) -> Result<()> {
    if depth > MAX_NESTING_DEPTH {
        return Err(AnalyzeError::NestingTooDeep {
            limit: MAX_NESTING_DEPTH,
        });
    }
    Ok(())
}

// ============ Id Assignment ============

/// Monotonic id source scoped to a single parse or conversion call.
///
/// Each call creates its own generator, so ids restart at zero per run and
/// concurrent runs never share a counter.
#[derive(Debug)]
pub struct IdGenerator {
    prefix: &'static str,
    next: usize,
}

impl IdGenerator {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, next: 0 }
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

// ============ Text Utilities ============

/// Get text content of a tree-sitter node
pub fn get_node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_else(|e| {
        tracing::debug!(
            "UTF-8 extraction failed at {}:{}: {}",
            node.start_position().row + 1,
            node.start_position().column,
            e
        );
        ""
    })
}

/// Describe the first ERROR or MISSING node under `root`, in source order.
pub fn describe_syntax_error(root: Node) -> String {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let pos = node.start_position();
        if node.is_missing() {
            return format!("Missing {} ({}:{})", node.kind(), pos.row + 1, pos.column);
        }
        if node.is_error() {
            return format!("Unexpected token ({}:{})", pos.row + 1, pos.column);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return "Unexpected token".to_string();
            }
        }
    }
}

// ============ Character References ============

static CHAR_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z]+);")
        .expect("character reference pattern is valid")
});

/// Decode the common named and all numeric character references.
/// Unknown names are left untouched.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    CHAR_REF.replace_all(text, |caps: &Captures| {
        let body = &caps[1];
        let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        } else if let Some(dec) = body.strip_prefix('#') {
            dec.parse::<u32>().ok().and_then(char::from_u32)
        } else {
            named_entity(body)
        };
        match decoded {
            Some(ch) => ch.to_string(),
            None => caps[0].to_string(),
        }
    })
}

fn named_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}
