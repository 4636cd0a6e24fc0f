//! Pipeline orchestration
//!
//! Ties source acquisition, IR construction, and semantic graph building
//! together into a single per-file pass, and tracks timing/error metadata
//! across the stages.

use crate::features::data_flow::infrastructure::dfg::DataFlowGraph;
use crate::features::flow_graph::infrastructure::{bfg::BasicFlowGraph, cfg::CFGEdge};
use crate::features::ssa::infrastructure::ssa::SSAGraph;
use crate::shared::models::{Edge, Node, Occurrence, UnifiedSymbol};
use std::collections::HashMap;
use std::time::Duration;

/// Program Dependence Graph summary for a single function.
#[derive(Debug, Clone)]
pub struct PDGSummary {
    pub function_id: String,
    pub node_count: usize,
    pub control_edges: usize,
    pub data_edges: usize,
}

/// Pipeline type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineType {
    /// Single file L1-L3 analysis (parse -> IR -> flow/data-flow graphs)
    SingleFile,
}

impl std::fmt::Display for PipelineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineType::SingleFile => write!(f, "SingleFile"),
        }
    }
}

/// Pipeline execution metadata: timing, throughput, errors.
#[derive(Debug, Clone)]
pub struct PipelineMetadata {
    pub pipeline_type: PipelineType,
    pub total_duration: Duration,
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_loc: usize,
    pub loc_per_second: f64,
    pub errors: Vec<String>,
}

impl PipelineMetadata {
    pub fn new(pipeline_type: PipelineType) -> Self {
        Self {
            pipeline_type,
            total_duration: Duration::ZERO,
            files_processed: 0,
            files_failed: 0,
            total_loc: 0,
            loc_per_second: 0.0,
            errors: Vec::new(),
        }
    }

    pub fn calculate_rate(&mut self) {
        let seconds = self.total_duration.as_secs_f64();
        if seconds > 0.0 {
            self.loc_per_second = self.total_loc as f64 / seconds;
        }
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.files_failed += 1;
    }
}

impl Default for PipelineMetadata {
    fn default() -> Self {
        Self::new(PipelineType::SingleFile)
    }
}

/// Per-stage execution metrics.
#[derive(Debug, Clone)]
pub struct StageMetrics {
    pub duration: Duration,
    pub items_processed: usize,
}

impl StageMetrics {
    pub fn new(duration: Duration, items_processed: usize) -> Self {
        Self {
            duration,
            items_processed,
        }
    }
}

/// Outputs of the single-file pipeline: IR plus the semantic graphs built on top of it.
#[derive(Debug, Clone, Default)]
pub struct SingleFileOutputs {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub occurrences: Vec<Occurrence>,
    pub bfg_graphs: Vec<BasicFlowGraph>,
    pub cfg_edges: Vec<CFGEdge>,
    pub dfg_graphs: Vec<DataFlowGraph>,
    pub ssa_graphs: Vec<SSAGraph>,
    pub pdg_graphs: Vec<PDGSummary>,
    pub unified_symbols: Vec<UnifiedSymbol>,
}

/// Result of running the single-file pipeline.
#[derive(Debug, Clone, Default)]
pub struct ProcessResult {
    pub outputs: SingleFileOutputs,
    pub metadata: PipelineMetadata,
    pub stage_metrics: HashMap<&'static str, StageMetrics>,
}

impl ProcessResult {
    pub fn from_outputs(outputs: SingleFileOutputs, metadata: PipelineMetadata) -> Self {
        Self {
            outputs,
            metadata,
            stage_metrics: HashMap::new(),
        }
    }

    /// Empty result carrying a single fatal error (parse/language-setup failure).
    pub fn with_error(error: impl Into<String>) -> Self {
        let mut metadata = PipelineMetadata::new(PipelineType::SingleFile);
        metadata.add_error(error);
        Self {
            outputs: SingleFileOutputs::default(),
            metadata,
            stage_metrics: HashMap::new(),
        }
    }

    pub fn add_stage_metrics(&mut self, stage_name: &'static str, metrics: StageMetrics) {
        self.stage_metrics.insert(stage_name, metrics);
    }

    pub fn is_success(&self) -> bool {
        self.metadata.errors.is_empty()
    }
}
