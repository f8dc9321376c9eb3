//! Output placement

pub mod resolver;

pub use resolver::{OutputNamer, OutputResolver, output_extension};
