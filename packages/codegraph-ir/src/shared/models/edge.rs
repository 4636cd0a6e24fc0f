//! IREdge — the edge vocabulary of an IRDocument and the graphs built over it.

use super::Span;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Edge kinds used across the IR, CFG, DFG, call graph, and PDG layers.
///
/// `Contains`/`Imports`/`Inherits`/`Reads`/`Writes`/`Returns`/`Throws`/`Calls`
/// are the IR-level kinds from spec §3. `DataFlow` is the DFG def-use edge.
/// `TrueBranch`/`FalseBranch`/`ControlFlow` are CFG edges projected into the
/// unified graph so the query engine can select over CFG and DFG uniformly.
/// `ControlDependence` is the PDG's half of the union; `DataFlow` doubles as
/// its other half. `CrossLangImport`/`FfiImport` are the cross-file linking
/// edges from spec §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Contains,
    Calls,
    Imports,
    Inherits,
    Reads,
    Writes,
    Returns,
    Throws,
    Catches,

    DataFlow,
    ControlFlow,
    TrueBranch,
    FalseBranch,
    ControlDependence,

    CrossLangImport,
    FfiImport,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Contains => "contains",
            EdgeKind::Calls => "calls",
            EdgeKind::Imports => "imports",
            EdgeKind::Inherits => "inherits",
            EdgeKind::Reads => "reads",
            EdgeKind::Writes => "writes",
            EdgeKind::Returns => "returns",
            EdgeKind::Throws => "throws",
            EdgeKind::Catches => "catches",
            EdgeKind::DataFlow => "data_flow",
            EdgeKind::ControlFlow => "control_flow",
            EdgeKind::TrueBranch => "true_branch",
            EdgeKind::FalseBranch => "false_branch",
            EdgeKind::ControlDependence => "control_dependence",
            EdgeKind::CrossLangImport => "cross_lang_import",
            EdgeKind::FfiImport => "ffi_import",
        }
    }

    /// Edge kinds the query engine's `EdgeType::Dfg` selector matches.
    pub fn is_dfg(&self) -> bool {
        matches!(self, EdgeKind::DataFlow)
    }

    /// Edge kinds the query engine's `EdgeType::Cfg` selector matches.
    pub fn is_cfg(&self) -> bool {
        matches!(
            self,
            EdgeKind::ControlFlow | EdgeKind::TrueBranch | EdgeKind::FalseBranch
        )
    }

    /// Edge kinds the query engine's `EdgeType::Call` selector matches.
    pub fn is_call(&self) -> bool {
        matches!(self, EdgeKind::Calls)
    }
}

/// Per-edge metadata that doesn't belong on every edge: overload rank for
/// resolved-callee fan-out, the attempted-but-unresolved call target name,
/// or an FFI target language.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeMetadata {
    pub overload_rank: Option<u32>,
    pub unresolved_target_name: Option<String>,
    pub target_language: Option<String>,
    pub dynamic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
    pub kind: EdgeKind,
    pub span: Option<Span>,
    pub metadata: Option<EdgeMetadata>,
    pub attrs: Option<Value>,
}

impl Edge {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            kind,
            span: None,
            metadata: None,
            attrs: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_metadata(mut self, metadata: EdgeMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_kind_classification() {
        assert!(EdgeKind::DataFlow.is_dfg());
        assert!(EdgeKind::ControlFlow.is_cfg());
        assert!(EdgeKind::TrueBranch.is_cfg());
        assert!(EdgeKind::Calls.is_call());
        assert!(!EdgeKind::Contains.is_dfg());
    }
}
