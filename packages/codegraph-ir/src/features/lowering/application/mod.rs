pub mod lowering_usecase;
pub use lowering_usecase::{LoweringUseCase, LoweringUseCaseImpl, LoweringResult};
