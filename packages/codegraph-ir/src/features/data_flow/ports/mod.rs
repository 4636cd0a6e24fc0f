pub mod dfg_analyzer;
pub use dfg_analyzer::DFGAnalyzer;
