//! Markup front-ends: turn source text into the unified [`TreeNode`] model.
//!
//! Each dialect has its own submodule built on a tree-sitter grammar. The
//! two front-ends share nothing but the output shape and the helpers in
//! `common`.
//!
//! ## Architecture
//!
//! ```text
//! markup/
//! ├── mod.rs     - Dialect table, build_tree dispatch
//! ├── common.rs  - Id generation, node text, entity decoding, limits
//! ├── html.rs    - Structural HTML (tree-sitter-html)
//! └── jsx.rs     - JSX / TSX (tree-sitter-javascript, tree-sitter-typescript)
//! ```

pub mod common;
pub mod html;
pub mod jsx;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tree_sitter::{Language, Parser};

use crate::error::{AnalyzeError, Result};
use crate::types::TreeNode;

pub use html::parse_html;
pub use jsx::parse_jsx;

// ============ Supported Dialects ============

/// Source dialects accepted by [`build_tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Html,
    Jsx,
    Tsx,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Html, Dialect::Jsx, Dialect::Tsx];

    /// Detect dialect from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "html" | "htm" => Some(Self::Html),
            "jsx" | "js" | "mjs" | "cjs" => Some(Self::Jsx),
            "tsx" | "ts" | "mts" | "cts" => Some(Self::Tsx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Jsx => "jsx",
            Self::Tsx => "tsx",
        }
    }

    /// Whether the grammar accepts type annotations
    pub fn is_typed(&self) -> bool {
        matches!(self, Self::Tsx)
    }

    /// Get the tree-sitter language for this dialect
    fn tree_sitter_language(&self) -> Language {
        match self {
            Self::Html => tree_sitter_html::LANGUAGE.into(),
            Self::Jsx => tree_sitter_javascript::LANGUAGE.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// A parser loaded with this dialect's grammar
    pub(crate) fn parser(&self) -> Result<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.tree_sitter_language())
            .map_err(|e| AnalyzeError::Grammar {
                dialect: self.as_str().to_string(),
                message: e.to_string(),
            })?;
        Ok(parser)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "html" => Ok(Self::Html),
            "jsx" => Ok(Self::Jsx),
            "tsx" => Ok(Self::Tsx),
            other => Err(AnalyzeError::UnsupportedDialect(other.to_string())),
        }
    }
}

// ============ Main Entry Point ============

/// Build the unified tree for `source` in the given dialect.
pub fn build_tree(source: &str, dialect: Dialect) -> Result<TreeNode> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return Err(AnalyzeError::EmptyInput);
    }

    match dialect {
        Dialect::Html => parse_html(trimmed),
        Dialect::Jsx | Dialect::Tsx => parse_jsx(trimmed, dialect.is_typed()),
    }
}
