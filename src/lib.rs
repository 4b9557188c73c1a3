//! Markup depth analysis.
//!
//! Builds a unified tree from HTML, JSX or TSX, then runs three passes over
//! it: depth statistics, the left-child/right-sibling binary encoding, and
//! a heuristic scan for nesting that could be flattened. The combined
//! [`AnalysisResult`] is produced in one call and never mutated afterwards.
//!
//! ```ignore
//! use markup_depth_lib::{analyze, Dialect};
//!
//! let result = analyze("<div><div><p>hi</p></div></div>", Dialect::Html)?;
//! println!("{}", result.optimization.summary);
//! ```

pub mod binary_tree;
pub mod dfs;
pub mod error;
pub mod markup;
pub mod optimizer;
pub mod types;
pub mod worker;


pub use binary_tree::convert_to_binary_tree;
pub use dfs::dfs_analyze;
pub use error::{AnalyzeError, Result};
pub use markup::{build_tree, Dialect};
pub use optimizer::analyze_optimizations;
pub use types::{
    AnalysisRequest, AnalysisResponse, AnalysisResult, BinaryNode, DfsResult,
    OptimizationResult, OptimizationSuggestion, SuggestionKind, TreeNode,
};
pub use worker::{analyze_batch, AnalyzerWorker};

/// Run the full pipeline on `source`.
///
/// Any tree-building failure aborts the run before the analysis passes.
pub fn analyze(source: &str, dialect: Dialect) -> Result<AnalysisResult> {
    let tree = build_tree(source, dialect)?;
    let dfs = dfs_analyze(&tree);
    tracing::debug!(
        %dialect,
        total_nodes = dfs.total_nodes,
        max_depth = dfs.max_depth,
        "tree built"
    );
    binary_tree::check_encoded_height(&tree)?;
    let binary_tree = convert_to_binary_tree(&tree);
    let optimization = analyze_optimizations(&tree, dfs.max_depth);

    Ok(AnalysisResult {
        tree,
        binary_tree,
        dfs,
        optimization,
    })
}

/// Handle one inbound request, folding any failure into the response.
pub fn handle_request(request: &AnalysisRequest) -> AnalysisResponse {
    match run_request(request) {
        Ok(result) => AnalysisResponse::success(result),
        Err(err) => {
            tracing::debug!(dialect = %request.dialect, error = %err, "analysis failed");
            AnalysisResponse::failure(err.to_string())
        }
    }
}

fn run_request(request: &AnalysisRequest) -> Result<AnalysisResult> {
    // Empty input is reported before the dialect is looked at.
    if request.source_text.trim().is_empty() {
        return Err(AnalyzeError::EmptyInput);
    }
    let dialect: Dialect = request.dialect.parse()?;
    analyze(&request.source_text, dialect)
}
