//! Shared data model produced by one analysis run.
//!
//! All records are built fresh per run and never mutated afterwards. Field
//! names serialize in camelCase so the JSON matches what the presentation
//! layer consumes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============ Unified Tree ============

/// Node of the unified n-ary tree built from either markup dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    pub tag: String,
    pub children: Vec<TreeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    /// Present only when the element carried at least one attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
}

impl TreeNode {
    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    pub fn has_attributes(&self) -> bool {
        self.attributes.as_ref().is_some_and(|attrs| !attrs.is_empty())
    }
}

// ============ Binary Tree ============

/// Left-child/right-sibling encoding of a [`TreeNode`].
///
/// `left` is the first child of the originating node; following `right`
/// from there enumerates the remaining siblings in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryNode {
    pub id: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<BinaryNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<BinaryNode>>,
}

impl Drop for BinaryNode {
    // Sibling chains can be as long as the widest element; unlink them
    // iteratively instead of recursing once per box.
    fn drop(&mut self) {
        let mut pending: Vec<Box<BinaryNode>> = Vec::new();
        pending.extend(self.left.take());
        pending.extend(self.right.take());
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}

impl BinaryNode {
    /// The n-ary children this node encodes: `left`, then its right chain.
    pub fn children(&self) -> Vec<&BinaryNode> {
        let mut out = Vec::new();
        let mut current = self.left.as_deref();
        while let Some(node) = current {
            out.push(node);
            current = node.right.as_deref();
        }
        out
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.left.as_deref());
            stack.extend(node.right.as_deref());
        }
        count
    }
}

// ============ Depth Statistics ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DfsResult {
    pub max_depth: usize,
    pub total_nodes: usize,
    pub depth_sum: usize,
    /// `depth_sum / total_nodes` rounded to two decimals.
    pub average_depth: f64,
    /// Tags from the root to the first node found at `max_depth`.
    pub deepest_path: Vec<String>,
}

// ============ Optimization ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    RedundantWrapper,
    SingleChildWrapper,
    DeepNesting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSuggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub path: Vec<String>,
    pub description: String,
    pub depth_reduction: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub suggestions: Vec<OptimizationSuggestion>,
    /// Percentage in `0..=100`.
    pub estimated_depth_reduction: u32,
    pub original_depth: usize,
    pub optimized_depth: usize,
    pub summary: String,
}

// ============ Orchestration ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub tree: TreeNode,
    pub binary_tree: BinaryNode,
    pub dfs: DfsResult,
    pub optimization: OptimizationResult,
}

/// Inbound request. The dialect stays a raw string so an unknown value
/// surfaces as an `UnsupportedDialect` failure rather than a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub source_text: String,
    pub dialect: String,
}

impl AnalysisRequest {
    pub fn new(source_text: impl Into<String>, dialect: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            dialect: dialect.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResponse {
    pub fn success(result: AnalysisResult) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tag: &str) -> TreeNode {
        TreeNode {
            id: String::new(),
            tag: tag.to_string(),
            children: Vec::new(),
            depth: None,
            attributes: None,
        }
    }

    #[test]
    fn test_tree_node_count() {
        let mut root = leaf("ul");
        root.children = vec![leaf("li"), leaf("li"), leaf("li")];
        assert_eq!(root.node_count(), 4);
    }

    #[test]
    fn test_suggestion_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&SuggestionKind::SingleChildWrapper).unwrap();
        assert_eq!(json, "\"single-child-wrapper\"");
    }

    #[test]
    fn test_tree_node_omits_empty_optionals() {
        let json = serde_json::to_value(leaf("br")).unwrap();
        assert!(json.get("depth").is_none());
        assert!(json.get("attributes").is_none());
    }

    #[test]
    fn test_failure_response_shape() {
        let json = serde_json::to_value(AnalysisResponse::failure("boom")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert!(json.get("result").is_none());
    }
}
