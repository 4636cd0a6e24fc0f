//! UnifiedSymbol - language-neutral cross-language identifier.
//!
//! Follows the SCIP symbol grammar so descriptors from different language
//! lowerers can be compared textually: two symbols are declared equivalent
//! when their descriptors match after the language-pair type mapping is
//! applied, regardless of which lowerer produced them.

use serde::{Deserialize, Serialize};

use super::NodeKind;

/// The syntactic category a descriptor suffix encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DescriptorKind {
    /// Type-like declarations (`Class`, `Interface`) end the descriptor in `#`.
    Type,
    /// Callable declarations (`Function`, `Method`) end the descriptor in `().`.
    Callable,
    /// Namespace-like declarations (`Module`, `File`) end the descriptor in `/`.
    Namespace,
}

impl DescriptorKind {
    fn suffix(self) -> &'static str {
        match self {
            DescriptorKind::Type => "#",
            DescriptorKind::Callable => "().",
            DescriptorKind::Namespace => "/",
        }
    }

    /// Classify a node kind into the descriptor suffix it should carry.
    /// Returns `None` for kinds that don't participate in cross-language
    /// symbol unification (e.g. `Variable`, `Import`, `Call`).
    pub fn for_node_kind(kind: &NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Class | NodeKind::Interface => Some(DescriptorKind::Type),
            NodeKind::Function | NodeKind::Method => Some(DescriptorKind::Callable),
            NodeKind::Module | NodeKind::File => Some(DescriptorKind::Namespace),
            _ => None,
        }
    }
}

/// Language-neutral identifier, unique across a snapshot's IRDocuments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedSymbol {
    pub scheme: String,
    pub manager: String,
    pub package: String,
    pub version: String,
    pub root: String,
    pub file_path: String,
    pub descriptor: String,
    pub language_fqn: String,
    pub language_kind: NodeKind,
}

impl UnifiedSymbol {
    /// Build a symbol for a node, synthesizing the descriptor from its FQN
    /// and the suffix its kind requires. Returns `None` for kinds that don't
    /// get a UnifiedSymbol (only Class/Function/Method/Interface do).
    pub fn for_node(
        scheme: impl Into<String>,
        manager: impl Into<String>,
        package: impl Into<String>,
        version: impl Into<String>,
        root: impl Into<String>,
        file_path: impl Into<String>,
        language_fqn: impl Into<String>,
        language_kind: NodeKind,
    ) -> Option<Self> {
        let descriptor_kind = DescriptorKind::for_node_kind(&language_kind)?;
        let language_fqn = language_fqn.into();
        let descriptor = format!("{}{}", language_fqn, descriptor_kind.suffix());
        Some(Self {
            scheme: scheme.into(),
            manager: manager.into(),
            package: package.into(),
            version: version.into(),
            root: root.into(),
            file_path: file_path.into(),
            descriptor,
            language_fqn,
            language_kind,
        })
    }

    /// Render in the canonical `scip-<scheme> <manager> <package> <version>
    /// <root> \`<file_path>\` \`<descriptor>\`` grammar.
    pub fn to_symbol_string(&self) -> String {
        format!(
            "scip-{} {} {} {} {} `{}` `{}`",
            self.scheme, self.manager, self.package, self.version, self.root, self.file_path, self.descriptor
        )
    }

    /// Two symbols are equivalent iff their descriptors match after mapping
    /// each language's descriptor through the given pairwise type map. The
    /// map translates `other`'s descriptor into `self`'s language before
    /// comparing; an absent mapping falls back to a literal match.
    pub fn equivalent_under(&self, other: &Self, type_map: &dyn Fn(&str) -> Option<String>) -> bool {
        if self.descriptor == other.descriptor {
            return true;
        }
        type_map(&other.descriptor)
            .map(|mapped| mapped == self.descriptor)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_descriptor_ends_in_hash() {
        let sym = UnifiedSymbol::for_node(
            "codegraph",
            "cargo",
            "myapp",
            "0.1.0",
            "src",
            "src/auth.rs",
            "myapp::auth::User",
            NodeKind::Class,
        )
        .unwrap();
        assert!(sym.descriptor.ends_with('#'));
        assert_eq!(sym.to_symbol_string(), "scip-codegraph cargo myapp 0.1.0 src `src/auth.rs` `myapp::auth::User#`");
    }

    #[test]
    fn callable_descriptor_ends_in_paren_dot() {
        let sym = UnifiedSymbol::for_node(
            "codegraph", "pip", "myapp", "1.0", "src", "auth.py", "myapp.auth.login", NodeKind::Function,
        )
        .unwrap();
        assert!(sym.descriptor.ends_with("()."));
    }

    #[test]
    fn non_symbol_kinds_yield_none() {
        assert!(UnifiedSymbol::for_node(
            "codegraph", "cargo", "myapp", "0.1.0", "src", "src/auth.rs", "x", NodeKind::Variable,
        )
        .is_none());
    }

    #[test]
    fn equivalence_under_identity_map() {
        let a = UnifiedSymbol::for_node(
            "codegraph", "cargo", "myapp", "0.1.0", "src", "a.rs", "myapp::User", NodeKind::Class,
        )
        .unwrap();
        let b = UnifiedSymbol::for_node(
            "codegraph", "pip", "myapp", "1.0", "src", "a.py", "myapp::User", NodeKind::Class,
        )
        .unwrap();
        assert!(a.equivalent_under(&b, &|d| Some(d.to_string())));
    }
}
