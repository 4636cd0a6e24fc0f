pub mod ir_builder;
pub mod processor;
pub mod visitor;
