//! IRDocument - the per-file language-neutral artifact the IR builder emits.
//!
//! Carries nodes/edges (the structural IR), expressions (the SSA-like DFG
//! sub-layer), resolved imports, unified cross-language symbols, and the
//! parse metadata needed to reproduce or invalidate the document.

use serde::{Deserialize, Serialize};

use crate::features::cross_file::ResolvedImport;
use crate::shared::models::{Edge, Expression, Node, UnifiedSymbol};

/// Parse/build provenance for an IRDocument, used for cache invalidation
/// and diagnostics when a parser is upgraded or a language is re-plugged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IRDocumentMeta {
    pub language: String,
    pub source_file: String,
    pub build_time: chrono::DateTime<chrono::Utc>,
    pub parser_version: String,
}

impl IRDocumentMeta {
    pub fn new(
        language: impl Into<String>,
        source_file: impl Into<String>,
        parser_version: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            source_file: source_file.into(),
            build_time: chrono::Utc::now(),
            parser_version: parser_version.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IRDocument {
    pub file_path: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub expressions: Vec<Expression>,
    #[serde(default)]
    pub imports: Vec<ResolvedImport>,
    #[serde(default)]
    pub unified_symbols: Vec<UnifiedSymbol>,
    pub meta: Option<IRDocumentMeta>,
}

impl IRDocument {
    pub fn new(file_path: String) -> Self {
        Self {
            file_path,
            nodes: Vec::new(),
            edges: Vec::new(),
            expressions: Vec::new(),
            imports: Vec::new(),
            unified_symbols: Vec::new(),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: IRDocumentMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Every edge endpoint resolves to a node in this document.
    pub fn edges_resolve(&self) -> bool {
        let ids: std::collections::HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .all(|e| ids.contains(e.source_id.as_str()) && ids.contains(e.target_id.as_str()))
    }

    /// `fqn` is unique within the document for nameable kinds (Class,
    /// Function, Method, Interface).
    pub fn fqns_unique(&self) -> bool {
        use crate::shared::models::NodeKind;
        let mut seen = std::collections::HashSet::new();
        for node in &self.nodes {
            if matches!(
                node.kind,
                NodeKind::Class | NodeKind::Function | NodeKind::Method | NodeKind::Interface
            ) && !seen.insert(node.fqn.as_str())
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{EdgeKind, NodeKind, Span};

    fn node(id: &str, kind: NodeKind, fqn: &str) -> Node {
        Node::new(id.to_string(), kind, fqn.to_string(), "a.py".to_string(), Span::new(1, 0, 1, 1))
    }

    #[test]
    fn empty_document_is_trivially_valid() {
        let doc = IRDocument::new("a.py".to_string());
        assert!(doc.edges_resolve());
        assert!(doc.fqns_unique());
    }

    #[test]
    fn dangling_edge_fails_resolution() {
        let mut doc = IRDocument::new("a.py".to_string());
        doc.nodes.push(node("n1", NodeKind::Function, "a.foo"));
        doc.edges.push(Edge::new("n1", "missing", EdgeKind::Calls));
        assert!(!doc.edges_resolve());
    }

    #[test]
    fn duplicate_fqn_among_nameable_kinds_fails_uniqueness() {
        let mut doc = IRDocument::new("a.py".to_string());
        doc.nodes.push(node("n1", NodeKind::Function, "a.foo"));
        doc.nodes.push(node("n2", NodeKind::Function, "a.foo"));
        assert!(!doc.fqns_unique());
    }

    #[test]
    fn meta_builder_sets_fields() {
        let doc = IRDocument::new("a.py".to_string())
            .with_meta(IRDocumentMeta::new("python", "a.py", "tree-sitter-python-0.20"));
        let meta = doc.meta.unwrap();
        assert_eq!(meta.language, "python");
        assert_eq!(meta.parser_version, "tree-sitter-python-0.20");
    }
}
