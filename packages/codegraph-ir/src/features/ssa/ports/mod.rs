pub mod ssa_builder;
pub use ssa_builder::SSABuilder;
