//! Commands run by the CLI

pub mod build;
pub mod clean;

pub use build::BuildReport;
