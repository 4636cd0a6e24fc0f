pub mod graph_usecase;
pub use graph_usecase::{GraphBuilderUseCase, GraphBuilderUseCaseImpl, GraphBuildResult};
