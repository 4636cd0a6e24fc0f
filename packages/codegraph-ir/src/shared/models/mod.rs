//! Shared models

mod edge;
mod error;
pub mod expression;
mod node;
pub mod occurrence;
mod span;
mod unified_symbol;

pub use edge::{Edge, EdgeKind, EdgeMetadata};
pub use error::{CodegraphError, ErrorKind, Result};
pub use node::{Node, NodeBuilder, NodeKind};
pub use occurrence::{Occurrence, OccurrenceGenerator, SymbolRole, SymbolRoles};
pub use span::{Location, Span};
pub use unified_symbol::{DescriptorKind, UnifiedSymbol};

// Expression IR models (the SSA-like DFG sub-layer)
pub use expression::{
    AccessKind, BinOp, BoolOp, CollectionKind, CompOp, ExprId, ExprKind, Expression, ExpressionIR,
    HeapAccess, LiteralKind, SymbolId, TypeInfo, UnaryOp, VarId,
};

// Re-export CFG types from flow_graph domain
pub use crate::features::flow_graph::domain::cfg::{CFGBlock, CFGEdge, CFGEdgeKind};

// Re-export serde_json::Value for convenience (used by Node/Edge attrs)
pub use serde_json::Value;
