//! Flow Graph infrastructure

pub mod bfg;
pub mod cfg;
pub mod exceptional_cfg_builder;

pub use bfg::*;
pub use cfg::*;
pub use exceptional_cfg_builder::ExceptionalCFGBuilder;
