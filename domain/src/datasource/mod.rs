//! Datasource input/output
//!
//! - [`DatasourcePointer`]: path plus optional layer identity, enough to
//!   reopen a dataset later without keeping it open
//! - [`DatasourceInput`]: a dataset bound to a layer parameter for one run,
//!   tagged [`Ownership::Owned`] or [`Ownership::Borrowed`]
//! - [`OutputTarget`]: the destination chosen for an output parameter
//!
//! The backend behind [`DatasourceProvider`] lives in the infrastructure
//! layer.

pub mod error;
pub mod input;
pub mod output;
pub mod pointer;
pub mod schema;
pub mod traits;

pub use error::DatasourceError;
pub use input::{DatasourceInput, InputSet, Ownership};
pub use output::{OutputTarget, ProducedOutput};
pub use pointer::{DatasourcePointer, MEMORY_SCHEME};
pub use schema::{FieldInfo, FieldType};
pub use traits::{Datasource, DatasourceProvider};
