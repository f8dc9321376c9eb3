//! Port definitions
//!
//! Interfaces the application layer needs from outer layers.

pub mod progress;
pub mod report_sink;
