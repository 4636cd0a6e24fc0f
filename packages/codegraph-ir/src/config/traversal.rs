//! Typed traversal configuration.
//!
//! Recognized option set only — enumerated as a struct with explicit
//! defaults rather than a duck-typed bag, so a typo'd key is a
//! deserialization error instead of a silently-ignored no-op.

use serde::{Deserialize, Serialize};

/// Interprocedural context handling for the path query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextStrategy {
    /// Summarize a callee once per context-key and reuse the summary.
    Summary,
    /// Clone the callee's analysis per call site, k-limited by `context_k`.
    Cloning,
}

impl Default for ContextStrategy {
    fn default() -> Self {
        ContextStrategy::Summary
    }
}

/// Alias handling for field/access-path sensitive traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasMode {
    /// No alias tracking; every access path is treated as distinct.
    None,
    /// Only definite (must-alias) points-to facts are followed.
    Must,
    /// Possible (may-alias) points-to facts are followed, flagged `uncertain`.
    May,
}

impl Default for AliasMode {
    fn default() -> Self {
        AliasMode::None
    }
}

/// How a `.within(...)` scope clause is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeMode {
    /// Nodes outside the scope are never enqueued.
    Prune,
    /// Nodes outside the scope are enqueued but excluded from results.
    Filter,
}

impl Default for ScopeMode {
    fn default() -> Self {
        ScopeMode::Prune
    }
}

/// The full recognized option set for a path query traversal.
///
/// `#[serde(deny_unknown_fields)]` so an unrecognized key fails to
/// deserialize rather than being silently ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraversalOptions {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub context_strategy: ContextStrategy,
    #[serde(default = "default_context_k")]
    pub context_k: usize,
    #[serde(default)]
    pub alias_mode: AliasMode,
    #[serde(default)]
    pub scope_mode: ScopeMode,
}

fn default_max_depth() -> usize {
    10
}

fn default_max_paths() -> usize {
    1000
}

fn default_max_nodes() -> usize {
    100_000
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_context_k() -> usize {
    1
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_paths: default_max_paths(),
            max_nodes: default_max_nodes(),
            timeout_ms: default_timeout_ms(),
            context_strategy: ContextStrategy::default(),
            context_k: default_context_k(),
            alias_mode: AliasMode::default(),
            scope_mode: ScopeMode::default(),
        }
    }
}

impl TraversalOptions {
    /// Parse a YAML preset, rejecting unknown keys.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = TraversalOptions::default();
        assert_eq!(opts.max_depth, 10);
        assert_eq!(opts.max_paths, 1000);
        assert_eq!(opts.max_nodes, 100_000);
        assert_eq!(opts.timeout_ms, 5000);
        assert_eq!(opts.context_strategy, ContextStrategy::Summary);
        assert_eq!(opts.context_k, 1);
        assert_eq!(opts.alias_mode, AliasMode::None);
        assert_eq!(opts.scope_mode, ScopeMode::Prune);
    }

    #[test]
    fn yaml_overrides_merge_with_defaults() {
        let opts = TraversalOptions::from_yaml("max_depth: 5\nalias_mode: may\n").unwrap();
        assert_eq!(opts.max_depth, 5);
        assert_eq!(opts.alias_mode, AliasMode::May);
        assert_eq!(opts.max_paths, 1000);
    }

    #[test]
    fn unknown_key_is_a_hard_error() {
        let result = TraversalOptions::from_yaml("max_depth: 5\nbogus_option: 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn empty_yaml_yields_all_defaults() {
        let opts = TraversalOptions::from_yaml("{}").unwrap();
        assert_eq!(opts, TraversalOptions::default());
    }
}
