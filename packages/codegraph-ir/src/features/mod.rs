//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure business logic (no external dependencies)
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - External dependency implementations

pub mod data_flow;
pub mod flow_graph;
pub mod ir_generation;
pub mod parsing;
pub mod ssa;

// Cross-File Resolution: import graph, symbol resolution, scope index
pub mod cross_file;

// Points-to Analysis
pub mod points_to;

// Query Engine with fluent DSL
pub mod query_engine;

// IR -> unified graph index conversion
pub mod graph_builder;

// L1 Expression IR extraction
// - tree-sitter visitor pattern
// - Multi-language support (Python, TypeScript, Java, Kotlin, Rust, Go)
// - Automatic data flow tracking (reads/defines)
// - Heap access detection (obj.field, arr[index])
// - Parent/child relationship tracking
pub mod expression_builder;

// Progressive Lowering - L1 (Expression IR) -> L2 (Node IR)
// - Semantic preservation (high-level info available at all levels)
// - Explicit data flow edges (reads/writes/controls)
// - SSA-friendly Node IR generation
pub mod lowering;
