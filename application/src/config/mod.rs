//! Application configuration

pub mod execution_options;

pub use execution_options::ExecutionOptions;
