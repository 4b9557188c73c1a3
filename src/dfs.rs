//! Depth-first statistics over the unified tree.

use crate::types::{DfsResult, TreeNode};

/// Single pre-order pass computing depth statistics.
///
/// Depth is the traversal depth (root = 0), not the node's stored `depth`.
/// Children are visited in order; on ties the first node reached at the
/// maximum depth keeps the deepest path.
pub fn dfs_analyze(root: &TreeNode) -> DfsResult {
    let mut max_depth = 0;
    let mut total_nodes = 0;
    let mut depth_sum = 0;
    let mut deepest_path: Vec<String> = Vec::new();

    // Tags from the root to the node being visited.
    let mut path: Vec<&str> = Vec::new();
    let mut stack: Vec<(&TreeNode, usize)> = vec![(root, 0)];

    while let Some((node, depth)) = stack.pop() {
        total_nodes += 1;
        depth_sum += depth;

        path.truncate(depth);
        path.push(&node.tag);

        if depth > max_depth || deepest_path.is_empty() {
            max_depth = depth;
            deepest_path = path.iter().map(|tag| tag.to_string()).collect();
        }

        stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }

    DfsResult {
        max_depth,
        total_nodes,
        depth_sum,
        average_depth: average(depth_sum, total_nodes),
        deepest_path,
    }
}

fn average(depth_sum: usize, total_nodes: usize) -> f64 {
    if total_nodes == 0 {
        return 0.0;
    }
    (depth_sum as f64 / total_nodes as f64 * 100.0).round() / 100.0
}
