//! Error types for the codegraph-ir crate
//!
//! A single `CodegraphError` propagates through `?` everywhere; `Diagnostic`
//! (see `errors.rs`) is its non-fatal sibling for the local failures the
//! pipeline is expected to recover from (parse errors, lowering defects,
//! unresolved imports).

use std::fmt;

/// Error kind categorization, one per pipeline stage that can fail hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    IRGeneration,
    FlowAnalysis,
    TypeResolution,
    DataFlow,
    SSA,
    PDG,
    TaintAnalysis,
    /// Eager query-construction failures (bad type transition, unknown
    /// selector, malformed depth range) — spec §7 "Query construction
    /// errors".
    Query,
    Config,
    IO,
    Storage,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Parse => "parse",
            ErrorKind::IRGeneration => "ir_generation",
            ErrorKind::FlowAnalysis => "flow_analysis",
            ErrorKind::TypeResolution => "type_resolution",
            ErrorKind::DataFlow => "data_flow",
            ErrorKind::SSA => "ssa",
            ErrorKind::PDG => "pdg",
            ErrorKind::TaintAnalysis => "taint_analysis",
            ErrorKind::Query => "query",
            ErrorKind::Config => "config",
            ErrorKind::IO => "io",
            ErrorKind::Storage => "storage",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Unified error type
#[derive(Debug)]
pub struct CodegraphError {
    pub kind: ErrorKind,
    pub message: String,
    pub file_path: Option<String>,
    pub line: Option<u32>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CodegraphError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file_path: None,
            line: None,
            source: None,
        }
    }

    pub fn with_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn ir_generation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IRGeneration, message)
    }

    pub fn flow_analysis(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FlowAnalysis, message)
    }

    pub fn type_resolution(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeResolution, message)
    }

    pub fn data_flow(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataFlow, message)
    }

    pub fn ssa(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SSA, message)
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Query, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl fmt::Display for CodegraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)?;
        if let Some(ref file) = self.file_path {
            write!(f, " in {}", file)?;
            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for CodegraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CodegraphError>;

impl From<serde_json::Error> for CodegraphError {
    fn from(err: serde_json::Error) -> Self {
        CodegraphError::storage(format!("JSON serialization error: {}", err)).with_source(err)
    }
}

impl From<std::io::Error> for CodegraphError {
    fn from(err: std::io::Error) -> Self {
        CodegraphError::new(ErrorKind::IO, format!("IO error: {}", err)).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodegraphError::parse("unexpected token")
            .with_file("test.py")
            .with_line(42);

        let msg = format!("{}", err);
        assert!(msg.contains("parse"));
        assert!(msg.contains("unexpected token"));
        assert!(msg.contains("test.py"));
        assert!(msg.contains("42"));
    }
}
