//! Pipeline and query configuration.
//!
//! One typed struct, not a tiered preset/YAML system: the traversal engine
//! recognizes exactly the option set in spec §9, each with an explicit
//! default, and rejects anything else at deserialization time rather than
//! silently ignoring a typo'd key.

mod traversal;

pub use traversal::{AliasMode, ContextStrategy, ScopeMode, TraversalOptions};
