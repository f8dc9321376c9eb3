//! Tool descriptors, registry and the execution contract
//!
//! ```text
//! ┌──────────────┐ register ┌──────────────┐ get/list ┌──────────────┐
//! │ GisTool      │─────────▶│ ToolRegistry │─────────▶│ CLI / UI     │
//! │ (body)       │          │ (catalog)    │          │ (consumers)  │
//! └──────┬───────┘          └──────────────┘          └──────────────┘
//!        │ descriptor() once
//!        ▼
//! ┌──────────────┐
//! │ToolDescriptor│  id, name, group, ordered parameters
//! └──────────────┘
//! ```
//!
//! A tool body implements [`GisTool::run`] against a [`ToolContext`]; it
//! never sees raw, unvalidated values. Declarations are checked at
//! registration ([`ToolDescriptor::validate_declaration`]) so broken tools
//! never reach the catalog.

pub mod context;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod traits;

pub use context::ToolContext;
pub use descriptor::{GROUP_RASTER, GROUP_VECTOR_ATTRIBUTES, GROUP_VECTOR_GEOMETRY, ToolDescriptor};
pub use error::{ConfigurationError, ExecutionFailure};
pub use registry::{RegisteredTool, ToolRegistry};
pub use traits::GisTool;
