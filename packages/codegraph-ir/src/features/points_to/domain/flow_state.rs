//! Flow-Sensitive Analysis State
//!
//! Domain model for flow-sensitive points-to analysis:
//! - ProgramPoint: Location in CFG
//! - FlowState: Points-to facts at a program point
//! - MustAliasSet: Must-alias pairs for strong update
//!
//! # References
//! - Choi et al. (1999): "Efficient and Precise Modeling of Exceptions"
//! - Hind (2001): "Pointer Analysis: Haven't We Solved This Problem Yet?"

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

use super::abstract_location::LocationId;
use super::constraint::VarId;

/// Program point in CFG
///
/// Represents a unique location in the control flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramPoint {
    /// Basic block ID
    pub block_id: u32,

    /// Statement index within block (0-based)
    pub stmt_idx: u32,
}

impl ProgramPoint {
    pub fn new(block_id: u32, stmt_idx: u32) -> Self {
        Self { block_id, stmt_idx }
    }

    /// Entry point of function
    pub fn entry() -> Self {
        Self::new(0, 0)
    }

    /// Next statement in same block
    pub fn next_stmt(&self) -> Self {
        Self::new(self.block_id, self.stmt_idx + 1)
    }
}

impl fmt::Display for ProgramPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}:{}", self.block_id, self.stmt_idx)
    }
}

/// Set of abstract locations that a variable may point to
pub type LocationSet = FxHashSet<LocationId>;

/// Points-to state at a program point
///
/// Maps each variable to its possible points-to set.
/// Flow-sensitive: different program points have different states.
#[derive(Debug, Clone, Default)]
pub struct FlowState {
    /// Variable → LocationSet mapping
    pub points_to: FxHashMap<VarId, LocationSet>,

    /// Must-alias pairs at this point
    /// (var1, var2) means var1 and var2 MUST refer to same location
    pub must_alias: FxHashSet<(VarId, VarId)>,

    /// Null-checked variables (known to be non-null)
    pub non_null: FxHashSet<VarId>,
}

impl FlowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get points-to set for a variable (empty if not present)
    pub fn get_points_to(&self, var: VarId) -> &LocationSet {
        static EMPTY: LocationSet = LocationSet::with_hasher(rustc_hash::FxBuildHasher);
        self.points_to.get(&var).unwrap_or(&EMPTY)
    }

    /// Set points-to for a variable (strong update for locals)
    pub fn set_points_to(&mut self, var: VarId, locs: LocationSet) {
        self.points_to.insert(var, locs);
    }

    /// Add location to variable's points-to set (weak update)
    pub fn add_points_to(&mut self, var: VarId, loc: LocationId) {
        self.points_to.entry(var).or_default().insert(loc);
    }

    /// Check if two variables may alias
    pub fn may_alias(&self, var1: VarId, var2: VarId) -> bool {
        let pts1 = self.get_points_to(var1);
        let pts2 = self.get_points_to(var2);
        !pts1.is_disjoint(pts2)
    }

    /// Check if two variables must alias
    pub fn must_alias(&self, var1: VarId, var2: VarId) -> bool {
        // Explicit must-alias tracking
        if self.must_alias.contains(&(var1, var2)) || self.must_alias.contains(&(var2, var1)) {
            return true;
        }

        // Single-target must-alias
        let pts1 = self.get_points_to(var1);
        let pts2 = self.get_points_to(var2);

        pts1.len() == 1 && pts2.len() == 1 && pts1 == pts2
    }

    /// Mark variables as must-alias
    pub fn add_must_alias(&mut self, var1: VarId, var2: VarId) {
        let (min_var, max_var) = if var1 < var2 {
            (var1, var2)
        } else {
            (var2, var1)
        };
        self.must_alias.insert((min_var, max_var));
    }

    /// Mark variable as non-null (after null check)
    pub fn mark_non_null(&mut self, var: VarId) {
        self.non_null.insert(var);
    }

    /// Check if variable is known to be non-null
    pub fn is_non_null(&self, var: VarId) -> bool {
        self.non_null.contains(&var)
    }

    /// Merge another state into this one (at join points)
    ///
    /// Uses:
    /// - Union for points-to sets (may-alias is conservative)
    /// - Intersection for must-alias (must hold on ALL paths)
    /// - Intersection for non-null (must hold on ALL paths)
    pub fn merge(&mut self, other: &FlowState) -> bool {
        let mut changed = false;

        // Merge points-to sets (union)
        for (var, other_locs) in &other.points_to {
            let entry = self.points_to.entry(*var).or_default();
            let old_len = entry.len();
            entry.extend(other_locs.iter().copied());
            if entry.len() > old_len {
                changed = true;
            }
        }

        // Merge must-alias (intersection)
        let old_must_alias_len = self.must_alias.len();
        self.must_alias
            .retain(|pair| other.must_alias.contains(pair));
        if self.must_alias.len() < old_must_alias_len {
            changed = true;
        }

        // Merge non-null (intersection)
        let old_non_null_len = self.non_null.len();
        self.non_null.retain(|var| other.non_null.contains(var));
        if self.non_null.len() < old_non_null_len {
            changed = true;
        }

        changed
    }

    /// Check if state equals another (for fixpoint detection)
    pub fn equals(&self, other: &FlowState) -> bool {
        self.points_to == other.points_to
            && self.must_alias == other.must_alias
            && self.non_null == other.non_null
    }

    /// Clone state for propagation
    pub fn clone_state(&self) -> FlowState {
        self.clone()
    }

    /// Number of variables tracked
    pub fn var_count(&self) -> usize {
        self.points_to.len()
    }

    /// Total number of points-to facts
    pub fn fact_count(&self) -> usize {
        self.points_to.values().map(|s| s.len()).sum()
    }
}

/// Strong update condition
///
/// Strong update (kill + gen) is sound when:
/// 1. Target is a local variable (not heap)
/// 2. Target is a must-alias singleton
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Strong update: replaces previous value
    Strong,
    /// Weak update: adds to previous value
    Weak,
}

impl FlowState {
    /// Determine update kind for a variable assignment
    ///
    /// Strong update when:
    /// - Target is a local variable (VarId < HEAP_BASE)
    /// - Target has single points-to target
    pub fn update_kind(&self, var: VarId) -> UpdateKind {
        // Local variables always get strong update
        // (Heap locations would need special handling)
        if var < HEAP_VAR_BASE {
            UpdateKind::Strong
        } else {
            UpdateKind::Weak
        }
    }
}

/// Threshold for heap variable IDs
/// Variables with ID >= this are considered heap locations
pub const HEAP_VAR_BASE: VarId = 1_000_000;
