pub mod flow_analyzer;
pub use flow_analyzer::FlowAnalyzer;
