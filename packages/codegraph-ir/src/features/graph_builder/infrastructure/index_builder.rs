// Index Builder - SOTA Parallel Index Construction
//
// Builds all graph indexes in parallel with SIMD optimizations where applicable

use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use tracing::debug;

use super::builder::GraphBuilderError;
use crate::features::graph_builder::domain::{GraphEdge, GraphIndex, GraphNode, InternedString};
use crate::shared::models::EdgeKind;

pub struct IndexBuilder;

impl IndexBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build all graph indexes (PARALLEL)
    ///
    /// Builds the reverse indexes (called_by, imported_by, etc.), the
    /// adjacency indexes (outgoing, incoming) and the EdgeKind-specific
    /// indexes, all in parallel using Rayon.
    pub fn build_indexes(
        &self,
        _nodes: &AHashMap<InternedString, GraphNode>,
        edges: &[GraphEdge],
    ) -> Result<GraphIndex, GraphBuilderError> {
        // Build indexes in parallel (rayon::join only takes 2 closures)
        let (
            ((called_by, imported_by, contains_children), (type_users, reads_by, writes_by)),
            ((outgoing, incoming), (outgoing_by_kind, incoming_by_kind)),
        ) = rayon::join(
            || {
                rayon::join(
                    || self.build_reverse_indexes(edges),
                    || self.build_data_flow_indexes(edges),
                )
            },
            || {
                rayon::join(
                    || self.build_adjacency_indexes(edges),
                    || self.build_kind_specific_indexes(edges),
                )
            },
        );

        Ok(GraphIndex {
            called_by,
            imported_by,
            contains_children,
            type_users,
            reads_by,
            writes_by,
            outgoing,
            incoming,
            outgoing_by_kind,
            incoming_by_kind,
        })
    }

    /// Build path index for O(1) node lookup by file path (PARALLEL)
    pub fn build_path_index(
        &self,
        nodes: &AHashMap<InternedString, GraphNode>,
    ) -> Result<AHashMap<InternedString, AHashSet<InternedString>>, GraphBuilderError> {
        let path_index: AHashMap<InternedString, AHashSet<InternedString>> = nodes
            .par_iter()
            .filter_map(|(node_id, node)| {
                node.path
                    .as_ref()
                    .map(|path| (path.clone(), node_id.clone()))
            })
            .fold(AHashMap::new, |mut map, (path, node_id)| {
                map.entry(path)
                    .or_insert_with(AHashSet::new)
                    .insert(node_id);
                map
            })
            .reduce(AHashMap::new, |mut a, b| {
                for (path, node_ids) in b {
                    a.entry(path).or_insert_with(AHashSet::new).extend(node_ids);
                }
                a
            });

        Ok(path_index)
    }

    /// Build reverse indexes (PARALLEL)
    fn build_reverse_indexes(
        &self,
        edges: &[GraphEdge],
    ) -> (
        AHashMap<InternedString, Vec<InternedString>>,
        AHashMap<InternedString, Vec<InternedString>>,
        AHashMap<InternedString, Vec<InternedString>>,
    ) {
        let (called_by, (imported_by, contains_children)) = rayon::join(
            || self.build_index_for_kind(edges, EdgeKind::Calls),
            || {
                rayon::join(
                    || self.build_import_index(edges),
                    || self.build_index_for_kind_reverse(edges, EdgeKind::Contains),
                )
            },
        );

        (called_by, imported_by, contains_children)
    }

    /// Build data flow indexes (PARALLEL)
    ///
    /// `type_users` is keyed by base type, fed from Inherits edges (a
    /// subclass is a "user" of the type it inherits from) since the
    /// vocabulary has no standalone type-reference edge kind.
    fn build_data_flow_indexes(
        &self,
        edges: &[GraphEdge],
    ) -> (
        AHashMap<InternedString, Vec<InternedString>>,
        AHashMap<InternedString, Vec<InternedString>>,
        AHashMap<InternedString, Vec<InternedString>>,
    ) {
        let (type_users, (reads_by, writes_by)) = rayon::join(
            || self.build_index_for_kind(edges, EdgeKind::Inherits),
            || {
                rayon::join(
                    || self.build_index_for_kind(edges, EdgeKind::Reads),
                    || self.build_index_for_kind(edges, EdgeKind::Writes),
                )
            },
        );

        (type_users, reads_by, writes_by)
    }

    /// Build adjacency indexes (PARALLEL)
    fn build_adjacency_indexes(
        &self,
        edges: &[GraphEdge],
    ) -> (
        AHashMap<InternedString, Vec<InternedString>>,
        AHashMap<InternedString, Vec<InternedString>>,
    ) {
        rayon::join(
            || {
                // Outgoing: source → edge_ids
                edges
                    .par_iter()
                    .fold(AHashMap::new, |mut map, edge| {
                        map.entry(edge.source_id.clone())
                            .or_insert_with(Vec::new)
                            .push(edge.id.clone());
                        map
                    })
                    .reduce(AHashMap::new, |mut a, b| {
                        for (k, v) in b {
                            a.entry(k).or_insert_with(Vec::new).extend(v);
                        }
                        a
                    })
            },
            || {
                // Incoming: target → edge_ids
                edges
                    .par_iter()
                    .fold(AHashMap::new, |mut map, edge| {
                        map.entry(edge.target_id.clone())
                            .or_insert_with(Vec::new)
                            .push(edge.id.clone());
                        map
                    })
                    .reduce(AHashMap::new, |mut a, b| {
                        for (k, v) in b {
                            a.entry(k).or_insert_with(Vec::new).extend(v);
                        }
                        a
                    })
            },
        )
    }

    /// Build EdgeKind-specific indexes (PARALLEL)
    fn build_kind_specific_indexes(
        &self,
        edges: &[GraphEdge],
    ) -> (
        AHashMap<(InternedString, EdgeKind), Vec<InternedString>>,
        AHashMap<(InternedString, EdgeKind), Vec<InternedString>>,
    ) {
        rayon::join(
            || {
                // Outgoing by kind: (source, kind) → target_ids
                edges
                    .par_iter()
                    .fold(AHashMap::new, |mut map, edge| {
                        map.entry((edge.source_id.clone(), edge.kind))
                            .or_insert_with(Vec::new)
                            .push(edge.target_id.clone());
                        map
                    })
                    .reduce(AHashMap::new, |mut a, b| {
                        for (k, v) in b {
                            a.entry(k).or_insert_with(Vec::new).extend(v);
                        }
                        a
                    })
            },
            || {
                // Incoming by kind: (target, kind) → source_ids
                edges
                    .par_iter()
                    .fold(AHashMap::new, |mut map, edge| {
                        map.entry((edge.target_id.clone(), edge.kind))
                            .or_insert_with(Vec::new)
                            .push(edge.source_id.clone());
                        map
                    })
                    .reduce(AHashMap::new, |mut a, b| {
                        for (k, v) in b {
                            a.entry(k).or_insert_with(Vec::new).extend(v);
                        }
                        a
                    })
            },
        )
    }

    /// Build index for import-family edge kinds (target → sources), covering
    /// same-language imports as well as cross-language and FFI imports.
    fn build_import_index(
        &self,
        edges: &[GraphEdge],
    ) -> AHashMap<InternedString, Vec<InternedString>> {
        edges
            .par_iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    EdgeKind::Imports | EdgeKind::CrossLangImport | EdgeKind::FfiImport
                )
            })
            .fold(AHashMap::new, |mut map, edge| {
                map.entry(edge.target_id.clone())
                    .or_insert_with(Vec::new)
                    .push(edge.source_id.clone());
                map
            })
            .reduce(AHashMap::new, |mut a, b| {
                for (k, v) in b {
                    a.entry(k).or_insert_with(Vec::new).extend(v);
                }
                a
            })
    }

    /// Build index for specific edge kind (target → sources)
    fn build_index_for_kind(
        &self,
        edges: &[GraphEdge],
        kind: EdgeKind,
    ) -> AHashMap<InternedString, Vec<InternedString>> {
        edges
            .par_iter()
            .filter(|e| e.kind == kind)
            .fold(AHashMap::new, |mut map, edge| {
                map.entry(edge.target_id.clone())
                    .or_insert_with(Vec::new)
                    .push(edge.source_id.clone());
                map
            })
            .reduce(AHashMap::new, |mut a, b| {
                for (k, v) in b {
                    a.entry(k).or_insert_with(Vec::new).extend(v);
                }
                a
            })
    }

    /// Build index for specific edge kind (source → targets) - for CONTAINS
    fn build_index_for_kind_reverse(
        &self,
        edges: &[GraphEdge],
        kind: EdgeKind,
    ) -> AHashMap<InternedString, Vec<InternedString>> {
        edges
            .par_iter()
            .filter(|e| e.kind == kind)
            .fold(AHashMap::new, |mut map, edge| {
                map.entry(edge.source_id.clone())
                    .or_insert_with(Vec::new)
                    .push(edge.target_id.clone());
                map
            })
            .reduce(AHashMap::new, |mut a, b| {
                for (k, v) in b {
                    a.entry(k).or_insert_with(Vec::new).extend(v);
                }
                a
            })
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}
