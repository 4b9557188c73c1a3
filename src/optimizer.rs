//! Heuristic scan for nesting that could be flattened.
//!
//! Every node is checked against each rule in [`RULES`], in order. Rules
//! are independent: one node may trigger several of them.

use std::collections::HashSet;

use crate::types::{OptimizationResult, OptimizationSuggestion, SuggestionKind, TreeNode};

// ============ Constants ============

/// Generic container tags eligible for the wrapper rules.
pub const WRAPPER_TAGS: &[&str] = &[
    "div", "span", "section", "article", "main", "aside", "header", "footer", "nav",
];

/// Stored depth at which a node with children counts as deeply nested.
pub const DEPTH_THRESHOLD: usize = 10;

const CLEAN_SUMMARY: &str = "Your DOM structure looks clean! No obvious optimizations detected.";

// ============ Rules ============

/// What a rule sees for one node.
pub struct RuleContext<'a> {
    pub node: &'a TreeNode,
    /// Tags from the root down to and including `node`.
    pub path: &'a [&'a str],
}

impl RuleContext<'_> {
    fn suggestion(
        &self,
        kind: SuggestionKind,
        description: String,
        depth_reduction: usize,
    ) -> OptimizationSuggestion {
        OptimizationSuggestion {
            kind,
            path: self.path.iter().map(|tag| tag.to_string()).collect(),
            description,
            depth_reduction,
        }
    }

    fn only_child(&self) -> Option<&TreeNode> {
        match self.node.children.as_slice() {
            [child] => Some(child),
            _ => None,
        }
    }
}

pub type Rule = fn(&RuleContext) -> Option<OptimizationSuggestion>;

/// Evaluated in this order at every node.
pub const RULES: &[Rule] = &[single_child_wrapper, redundant_wrapper, deep_nesting];

fn is_wrapper(tag: &str) -> bool {
    WRAPPER_TAGS.contains(&tag)
}

fn single_child_wrapper(ctx: &RuleContext) -> Option<OptimizationSuggestion> {
    let child = ctx.only_child()?;
    let node = ctx.node;
    if !is_wrapper(&node.tag) || node.has_attributes() {
        return None;
    }
    Some(ctx.suggestion(
        SuggestionKind::SingleChildWrapper,
        format!(
            "<{}> wraps only <{}> and has no attributes. It can be removed.",
            node.tag, child.tag
        ),
        1,
    ))
}

fn redundant_wrapper(ctx: &RuleContext) -> Option<OptimizationSuggestion> {
    let child = ctx.only_child()?;
    let tag = &ctx.node.tag;
    if child.tag != *tag || !is_wrapper(tag) {
        return None;
    }
    Some(ctx.suggestion(
        SuggestionKind::RedundantWrapper,
        format!("Redundant nested <{tag}> → <{tag}>. Consider merging into a single element."),
        1,
    ))
}

fn deep_nesting(ctx: &RuleContext) -> Option<OptimizationSuggestion> {
    let depth = ctx.node.depth.unwrap_or(0);
    if depth < DEPTH_THRESHOLD || ctx.node.children.is_empty() {
        return None;
    }
    Some(ctx.suggestion(
        SuggestionKind::DeepNesting,
        format!(
            "Nesting depth {depth} exceeds threshold of {DEPTH_THRESHOLD}. Consider flattening or extracting components."
        ),
        (depth - DEPTH_THRESHOLD).max(1),
    ))
}

// ============ Main Entry Point ============

/// Scan `root` and estimate how far `max_depth` could shrink.
pub fn analyze_optimizations(root: &TreeNode, max_depth: usize) -> OptimizationResult {
    let suggestions = dedupe_deep_nesting(scan(root, RULES));

    let total_reduction: usize = suggestions.iter().map(|s| s.depth_reduction).sum();
    let estimated_depth_reduction = if max_depth > 0 {
        let percent = (total_reduction as f64 / max_depth as f64 * 100.0).round();
        percent.min(100.0) as u32
    } else {
        0
    };
    let optimized_depth = max_depth.saturating_sub(total_reduction).max(1);

    let summary = if suggestions.is_empty() {
        CLEAN_SUMMARY.to_string()
    } else {
        format!(
            "Found {} optimization{} that could reduce depth from {} to ~{} ({}% reduction).",
            suggestions.len(),
            if suggestions.len() > 1 { "s" } else { "" },
            max_depth,
            optimized_depth,
            estimated_depth_reduction
        )
    };

    tracing::debug!(
        suggestions = suggestions.len(),
        total_reduction,
        optimized_depth,
        "optimization scan complete"
    );

    OptimizationResult {
        suggestions,
        estimated_depth_reduction,
        original_depth: max_depth,
        optimized_depth,
        summary,
    }
}

/// Pre-order walk applying `rules` at each node, in rule order.
fn scan(root: &TreeNode, rules: &[Rule]) -> Vec<OptimizationSuggestion> {
    let mut suggestions = Vec::new();
    let mut path: Vec<&str> = Vec::new();
    let mut stack: Vec<(&TreeNode, usize)> = vec![(root, 0)];

    while let Some((node, level)) = stack.pop() {
        path.truncate(level);
        path.push(&node.tag);

        let ctx = RuleContext { node, path: &path };
        suggestions.extend(rules.iter().filter_map(|rule| rule(&ctx)));

        stack.extend(node.children.iter().rev().map(|child| (child, level + 1)));
    }
    suggestions
}

/// Keep the first deep-nesting suggestion per path. Other kinds pass through.
fn dedupe_deep_nesting(suggestions: Vec<OptimizationSuggestion>) -> Vec<OptimizationSuggestion> {
    let mut seen = HashSet::new();
    suggestions
        .into_iter()
        .filter(|s| s.kind != SuggestionKind::DeepNesting || seen.insert(s.path.join("/")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn node(tag: &str, depth: usize, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            id: String::new(),
            tag: tag.to_string(),
            children,
            depth: Some(depth),
            attributes: None,
        }
    }

    fn kinds(result: &OptimizationResult) -> Vec<SuggestionKind> {
        result.suggestions.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_clean_tree() {
        let tree = node("ul", 0, vec![node("li", 1, vec![]), node("li", 1, vec![])]);
        let result = analyze_optimizations(&tree, 1);
        assert!(result.suggestions.is_empty());
        assert_eq!(result.summary, CLEAN_SUMMARY);
        assert_eq!(result.estimated_depth_reduction, 0);
        assert_eq!(result.optimized_depth, 1);
    }

    #[test]
    fn test_single_child_and_redundant_co_fire() {
        let tree = node("div", 0, vec![node("div", 1, vec![node("p", 2, vec![])])]);
        let result = analyze_optimizations(&tree, 2);
        assert_eq!(
            kinds(&result),
            [
                SuggestionKind::SingleChildWrapper,
                SuggestionKind::RedundantWrapper,
                SuggestionKind::SingleChildWrapper,
            ]
        );
        assert_eq!(result.suggestions[0].path, ["div"]);
        assert_eq!(result.suggestions[1].path, ["div"]);
        assert_eq!(result.suggestions[2].path, ["div", "div"]);
        assert_eq!(
            result.suggestions[0].description,
            "<div> wraps only <div> and has no attributes. It can be removed."
        );
        assert_eq!(result.estimated_depth_reduction, 100);
        assert_eq!(result.optimized_depth, 1);
        assert_eq!(
            result.summary,
            "Found 3 optimizations that could reduce depth from 2 to ~1 (100% reduction)."
        );
    }

    #[test]
    fn test_attributes_block_single_child_rule() {
        let mut outer = node("section", 0, vec![node("section", 1, vec![])]);
        outer.attributes = Some(BTreeMap::from([("id".to_string(), "main".to_string())]));
        let result = analyze_optimizations(&outer, 1);
        assert_eq!(kinds(&result), [SuggestionKind::RedundantWrapper]);
        assert_eq!(
            result.summary,
            "Found 1 optimization that could reduce depth from 1 to ~1 (100% reduction)."
        );
    }

    #[test]
    fn test_non_wrapper_tags_ignored() {
        let tree = node("ul", 0, vec![node("ul", 1, vec![node("li", 2, vec![])])]);
        assert!(analyze_optimizations(&tree, 2).suggestions.is_empty());
    }

    #[test]
    fn test_deep_nesting_reduction_uses_stored_depth() {
        let tree = node("table", 12, vec![node("tr", 13, vec![])]);
        let result = analyze_optimizations(&tree, 13);
        assert_eq!(kinds(&result), [SuggestionKind::DeepNesting]);
        assert_eq!(result.suggestions[0].depth_reduction, 2);
        assert_eq!(
            result.suggestions[0].description,
            "Nesting depth 12 exceeds threshold of 10. Consider flattening or extracting components."
        );
        assert_eq!(result.estimated_depth_reduction, 15);
        assert_eq!(result.optimized_depth, 11);
    }

    #[test]
    fn test_deep_nesting_deduplicated_by_path() {
        let siblings = vec![
            node("li", 10, vec![node("a", 11, vec![])]),
            node("li", 10, vec![node("a", 11, vec![])]),
        ];
        let tree = node("ul", 9, siblings);
        let result = analyze_optimizations(&tree, 11);
        assert_eq!(kinds(&result), [SuggestionKind::DeepNesting]);
        assert_eq!(result.suggestions[0].path, ["ul", "li"]);
    }

    #[test]
    fn test_leaf_past_threshold_not_flagged() {
        let tree = node("ol", 9, vec![node("li", 10, vec![])]);
        assert!(analyze_optimizations(&tree, 10).suggestions.is_empty());
    }

    #[test]
    fn test_zero_depth() {
        let result = analyze_optimizations(&node("img", 0, vec![]), 0);
        assert_eq!(result.estimated_depth_reduction, 0);
        assert_eq!(result.optimized_depth, 1);
        assert_eq!(result.original_depth, 0);
    }

    #[test]
    fn test_percentage_clamped() {
        let chain = node(
            "div",
            0,
            vec![node("div", 1, vec![node("div", 2, vec![node("p", 3, vec![])])])],
        );
        // 3 single-child + 2 redundant = 5 levels against a depth of 3
        let result = analyze_optimizations(&chain, 3);
        assert_eq!(result.suggestions.len(), 5);
        assert_eq!(result.estimated_depth_reduction, 100);
        assert_eq!(result.optimized_depth, 1);
    }

    #[test]
    fn test_custom_rule_list() {
        fn every_node(ctx: &RuleContext) -> Option<OptimizationSuggestion> {
            Some(ctx.suggestion(SuggestionKind::DeepNesting, ctx.node.tag.clone(), 1))
        }
        let tree = node("a", 0, vec![node("b", 1, vec![]), node("c", 1, vec![])]);
        let found: Vec<_> = scan(&tree, &[every_node])
            .into_iter()
            .map(|s| s.path.join("/"))
            .collect();
        assert_eq!(found, ["a", "a/b", "a/c"]);
    }
}
