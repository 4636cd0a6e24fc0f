//! IRNode — the node vocabulary of an IRDocument.
//!
//! Kept deliberately flat: a tagged variant (`NodeKind`) plus a single
//! `attrs` bag for everything that doesn't apply to every kind, rather than
//! one struct field per language feature. Language-specific lowerers decide
//! what goes in `attrs`; the graph and query layers only ever look at the
//! fields declared here.

use super::Span;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The node kinds an IRDocument can contain (spec §3 DATA MODEL), plus
/// `Block` and `Field` which the semantic graph layer and query selectors
/// need but which are not themselves IR declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Module,
    Class,
    Interface,
    Function,
    Method,
    Variable,
    Parameter,
    Import,
    Call,
    Return,
    Lambda,
    /// Basic block in a CFG; not part of the source IR, added during CFG
    /// construction so the query engine can select over blocks uniformly.
    Block,
    Field,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Module => "module",
            NodeKind::Class => "class",
            NodeKind::Interface => "interface",
            NodeKind::Function => "function",
            NodeKind::Method => "method",
            NodeKind::Variable => "variable",
            NodeKind::Parameter => "parameter",
            NodeKind::Import => "import",
            NodeKind::Call => "call",
            NodeKind::Return => "return",
            NodeKind::Lambda => "lambda",
            NodeKind::Block => "block",
            NodeKind::Field => "field",
        }
    }

    /// Kinds that carry a unique FQN within a document (spec invariant 2).
    pub fn is_nameable(&self) -> bool {
        matches!(
            self,
            NodeKind::Class
                | NodeKind::Interface
                | NodeKind::Function
                | NodeKind::Method
                | NodeKind::Variable
                | NodeKind::Field
        )
    }
}

/// A node in the language-neutral IR.
///
/// `id` is the stable ID described in spec §4.2; `fqn` is the dotted
/// declaration path; `attrs` carries anything language- or kind-specific
/// (decorators, modifiers, async/static/abstract flags, parameter lists,
/// base classes, ...) as a JSON value so new lowerers never need a schema
/// migration to attach a new fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub fqn: String,
    pub file_path: String,
    pub span: Span,
    pub language: String,

    /// Present once a lowering pass (or a later rebuild) has assigned it;
    /// identical to `id` for freshly-built nodes but kept distinct so the
    /// incremental-update layer can compare "what the stable ID was" against
    /// "what `id` currently is" when reconciling snapshots.
    pub stable_id: Option<String>,
    /// SHA256 content hash of the node's subtree, used by stable-ID
    /// generation and by incremental dirty-node detection.
    pub content_hash: Option<String>,

    pub name: Option<String>,
    pub parent_id: Option<String>,

    /// False when `fqn` is a placeholder because resolution failed
    /// (spec §4.2 failure semantics). Defaults to true.
    pub resolved: bool,

    pub docstring: Option<String>,
    pub metadata: Option<Value>,
    pub attrs: Option<Value>,
}

impl Node {
    pub fn new(id: String, kind: NodeKind, fqn: String, file_path: String, span: Span) -> Self {
        let language = "unknown".to_string();
        Self {
            id,
            kind,
            fqn,
            file_path,
            span,
            language,
            stable_id: None,
            content_hash: None,
            name: None,
            parent_id: None,
            resolved: true,
            docstring: None,
            metadata: None,
            attrs: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.as_ref().and_then(|a| a.get(key))
    }

    pub fn attr_bool(&self, key: &str) -> bool {
        self.attr(key).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    pub fn set_attr(&mut self, key: &str, value: Value) {
        let map = self
            .attrs
            .get_or_insert_with(|| Value::Object(Default::default()));
        if let Value::Object(obj) = map {
            obj.insert(key.to_string(), value);
        }
    }
}

/// Convenience builder mirroring `Node::new` plus `with_*` chaining, kept for
/// call sites that build nodes field-by-field during CST walking.
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn new(id: String, kind: NodeKind, fqn: String, file_path: String, span: Span) -> Self {
        Self {
            node: Node::new(id, kind, fqn, file_path, span),
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.node.language = language.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.node.name = Some(name.into());
        self
    }

    pub fn parent(mut self, parent_id: impl Into<String>) -> Self {
        self.node.parent_id = Some(parent_id.into());
        self
    }

    pub fn resolved(mut self, resolved: bool) -> Self {
        self.node.resolved = resolved;
        self
    }

    pub fn attrs(mut self, attrs: Value) -> Self {
        self.node.attrs = Some(attrs);
        self
    }

    pub fn content_hash(mut self, hash: impl Into<String>) -> Self {
        self.node.content_hash = Some(hash.into());
        self
    }

    pub fn build(self) -> Node {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nameable_kinds() {
        assert!(NodeKind::Function.is_nameable());
        assert!(!NodeKind::Import.is_nameable());
    }

    #[test]
    fn attr_roundtrip() {
        let mut n = Node::new(
            "stable_function_abc".into(),
            NodeKind::Function,
            "m.f".into(),
            "m.py".into(),
            Span::new(1, 0, 2, 0),
        );
        n.set_attr("is_async", Value::Bool(true));
        assert!(n.attr_bool("is_async"));
        assert!(!n.attr_bool("is_static"));
    }
}
