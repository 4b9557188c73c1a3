//! Left-child/right-sibling re-encoding of the unified tree.

use crate::error::{AnalyzeError, Result};
use crate::markup::common::IdGenerator;
use crate::types::{BinaryNode, TreeNode};

/// Longest root-to-leaf run of `left`/`right` links a result may carry.
pub const MAX_ENCODED_HEIGHT: usize = 2048;

/// Convert an n-ary tree into its left-child/right-sibling binary form.
///
/// Ids (`bn-<n>`) come from a counter local to this call and are handed out
/// in pre-order. The converted root never has a `right` link.
pub fn convert_to_binary_tree(root: &TreeNode) -> BinaryNode {
    let mut ids = IdGenerator::new("bn");
    convert(root, &mut ids)
}

fn convert(node: &TreeNode, ids: &mut IdGenerator) -> BinaryNode {
    let id = ids.next_id();
    let siblings: Vec<BinaryNode> = node.children.iter().map(|child| convert(child, ids)).collect();

    // Chain from the last sibling backwards so each one owns the next.
    let left = siblings.into_iter().rev().fold(None, |next, mut sibling| {
        sibling.right = next;
        Some(Box::new(sibling))
    });

    BinaryNode {
        id,
        tag: node.tag.clone(),
        left,
        right: None,
    }
}

/// Number of links on the longest path of the binary encoding of `root`.
///
/// The k-th child (from zero) of a node at height `h` lands at `h + 1 + k`,
/// so wide elements grow the encoding as fast as deep ones.
pub fn encoded_height(root: &TreeNode) -> usize {
    let mut height = 0;
    let mut stack = vec![(root, 0usize)];
    while let Some((node, h)) = stack.pop() {
        height = height.max(h);
        for (k, child) in node.children.iter().enumerate() {
            stack.push((child, h + 1 + k));
        }
    }
    height
}

/// Reject trees whose encoding is too tall to serialize safely.
pub fn check_encoded_height(root: &TreeNode) -> Result<()> {
    if encoded_height(root) > MAX_ENCODED_HEIGHT {
        return Err(AnalyzeError::EncodingTooDeep {
            limit: MAX_ENCODED_HEIGHT,
        });
    }
    Ok(())
}
