pub mod build_ssa;
