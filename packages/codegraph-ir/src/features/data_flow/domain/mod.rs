pub mod dfg;
pub use dfg::DataFlowGraph;
