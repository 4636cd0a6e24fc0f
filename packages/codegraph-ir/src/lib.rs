/*
 * Codegraph IR - multi-language static code-analysis engine core
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (Node, Edge, Span)
 * - features/    : Vertical slices (parsing -> ir -> flow -> dfg -> ssa -> pdg)
 * - pipeline/    : Orchestration
 * - api/         : Language-agnostic entry points
 *
 * Performance:
 * - Rayon work-stealing for file-level and per-function parallelism
 */

// Crate-level lint configuration
#![allow(dead_code)] // Many functions reserved for future use
#![allow(unused_variables)] // Parameters kept for API compatibility
#![allow(unused_imports)] // Conditional imports for feature flags
#![allow(clippy::too_many_arguments)] // Complex analysis functions need many params
#![allow(clippy::type_complexity)] // Complex types are necessary for analysis
#![allow(clippy::or_fun_call)] // or_insert_with vs or_default style preference
#![allow(clippy::map_entry)] // Style preference for entry API
#![allow(clippy::option_map_or_none)] // map_or style preference
#![allow(clippy::collapsible_if)] // Readability over brevity
#![allow(clippy::clone_on_copy)] // Explicit clone for clarity
#![allow(clippy::should_implement_trait)] // from_str naming intentional
#![allow(clippy::double_ended_iterator_last)] // Performance acceptable
#![allow(clippy::useless_format)] // Format consistency
#![allow(clippy::derivable_impls)] // Manual impl for documentation
#![allow(clippy::if_same_then_else)] // Branch clarity preferred
#![allow(clippy::only_used_in_recursion)] // Recursive params for API clarity
#![allow(clippy::empty_line_after_doc_comments)] // Doc comment style
#![allow(clippy::unwrap_or_default)] // or_insert_with style preference
#![allow(clippy::option_if_let_else)] // map_or style preference
#![allow(clippy::manual_find)] // Explicit iteration for clarity
#![allow(clippy::redundant_closure)] // Closure for consistency
#![allow(clippy::useless_conversion)] // Explicit conversion for clarity
#![allow(clippy::iter_kv_map)] // Map iteration style
#![allow(clippy::manual_map)] // map_or style preference
#![allow(clippy::needless_lifetimes)] // Explicit lifetimes for clarity
#![allow(clippy::upper_case_acronyms)] // SSA, PDG naming
#![allow(clippy::inherent_to_string)] // to_string impl intentional
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::for_kv_map)] // Map iteration clarity
#![allow(clippy::single_match)] // Single match for readability
#![allow(clippy::manual_strip)] // Manual strip for clarity
#![allow(clippy::explicit_counter_loop)] // Explicit counter for clarity
#![allow(clippy::needless_range_loop)] // Range loop for indexing
#![allow(clippy::collapsible_else_if)] // else if clarity
#![allow(clippy::collapsible_match)] // Match clarity
#![allow(clippy::match_like_matches_macro)] // Match for readability
#![allow(clippy::ptr_arg)] // &PathBuf intentional for API compatibility
#![allow(clippy::doc_nested_refdefs)] // Doc comment style
#![allow(clippy::needless_borrowed_reference)] // Borrowed ref for clarity
#![allow(clippy::trim_split_whitespace)] // Trim then split intentional
#![allow(clippy::map_flatten)] // Map then flatten for clarity
#![allow(clippy::unnecessary_map_or)] // map_or style for compatibility
#![allow(clippy::manual_string_new)] // String construction style
#![allow(deprecated)] // GraphIndex temporarily deprecated until graph_builder completion

use crate::shared::models::Span;
use tree_sitter::{Node, Parser};

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules (IR construction, semantic graph, query engine)
pub mod features;

/// Pipeline orchestration
pub mod pipeline;

/// Configuration system
pub mod config;

/// Language-agnostic Core API
pub mod api;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use features::ir_generation::infrastructure::processor::{process_python_file, ProcessResult};

// ═══════════════════════════════════════════════════════════════════════════
// Internal Types
// ═══════════════════════════════════════════════════════════════════════════

/// Temporary AST node for tree-sitter traversal (legacy API)
#[derive(Debug, Clone)]
pub struct AstNode {
    pub kind: String,
    pub name: Option<String>,
    pub span: Span,
    pub children_count: usize,
}

// ═══════════════════════════════════════════════════════════════════════════
// Rayon Thread Pool
// ═══════════════════════════════════════════════════════════════════════════

/// Initialize Rayon thread pool (75% of cores)
pub(crate) fn init_rayon() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let num_cpus = num_cpus::get();
        let threads = std::cmp::max(1, (num_cpus * 3) / 4);

        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .expect("Failed to init Rayon");

        tracing::info!(threads, num_cpus, "rayon thread pool initialized");
    });
}

// ═══════════════════════════════════════════════════════════════════════════
// Legacy API (for backward compatibility)
// ═══════════════════════════════════════════════════════════════════════════

/// Traverse AST and extract nodes (single file) - Legacy API
pub fn traverse_ast_single(content: &str) -> Result<Vec<AstNode>, String> {
    let mut parser = Parser::new();
    let language = tree_sitter_python::language();
    parser
        .set_language(&language)
        .map_err(|e| format!("Failed to set language: {}", e))?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| "Failed to parse content".to_string())?;

    let root = tree.root_node();
    let mut stack = vec![root];
    let mut result = Vec::new();

    const TARGET_TYPES: &[&str] = &[
        "class_definition",
        "function_definition",
        "decorated_definition",
        "import_statement",
        "import_from_statement",
    ];

    while let Some(current) = stack.pop() {
        let node_type = current.kind();

        if TARGET_TYPES.contains(&node_type) {
            let name = extract_node_name(&current, content);
            let span = node_to_span(&current);

            result.push(AstNode {
                kind: node_type.to_string(),
                name,
                span,
                children_count: current.child_count(),
            });
        } else {
            for i in (0..current.child_count()).rev() {
                if let Some(child) = current.child(i) {
                    stack.push(child);
                }
            }
        }
    }

    Ok(result)
}

fn extract_node_name(node: &Node, source: &str) -> Option<String> {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == "identifier" {
                let start = child.start_byte();
                let end = child.end_byte();
                return Some(source[start..end].to_string());
            }
        }
    }
    None
}

fn node_to_span(node: &Node) -> Span {
    let start_pos = node.start_position();
    let end_pos = node.end_position();

    Span::new(
        start_pos.row as u32 + 1,
        start_pos.column as u32,
        end_pos.row as u32 + 1,
        end_pos.column as u32,
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traverse_empty_content() {
        let result = traverse_ast_single("");
        assert!(result.is_ok());
    }

    #[test]
    fn test_traverse_simple_function() {
        let result = traverse_ast_single("def foo(): pass");
        assert!(result.is_ok());
        let nodes = result.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].kind, "function_definition");
        assert_eq!(nodes[0].name, Some("foo".to_string()));
    }

    #[test]
    fn test_process_simple_file() {
        let result = process_python_file("def hello(): pass", "test-repo", "test.py", "test");
        assert!(result.metadata.errors.is_empty());
        assert!(!result.outputs.nodes.is_empty());
    }
}
