pub mod build_dfg;
