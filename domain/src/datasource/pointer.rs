//! Serializable datasource references.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Path prefix of datasources held in the in-memory store.
pub const MEMORY_SCHEME: &str = "memory://";

/// Separator between a file path and a layer identity in textual pointers.
const IDENTITY_SEPARATOR: char = '#';

/// A reference to a datasource that can be reopened later.
///
/// `identity` selects a layer inside multi-layer files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasourcePointer {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

impl DatasourcePointer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            identity: None,
        }
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Pointer to a dataset in the in-memory store.
    pub fn memory(name: &str) -> Self {
        Self::new(format!("{}{}", MEMORY_SCHEME, name))
    }

    /// Parse `path` or `path#identity`.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.rsplit_once(IDENTITY_SEPARATOR) {
            Some((path, identity)) if !path.is_empty() && !identity.is_empty() => {
                Self::new(path).with_identity(identity)
            }
            _ => Self::new(text),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.path
            .to_str()
            .is_some_and(|p| p.starts_with(MEMORY_SCHEME))
    }

    /// Key of an in-memory dataset, if this pointer refers to one.
    pub fn memory_key(&self) -> Option<&str> {
        self.path.to_str()?.strip_prefix(MEMORY_SCHEME)
    }

    /// Display name: the memory key or the file stem.
    pub fn name(&self) -> String {
        if let Some(key) = self.memory_key() {
            return key.to_string();
        }
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Display for DatasourcePointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.identity {
            Some(identity) => write!(f, "{}{}{}", self.path.display(), IDENTITY_SEPARATOR, identity),
            None => write!(f, "{}", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_identity() {
        let p = DatasourcePointer::parse("data/city.gpkg#roads");
        assert_eq!(p.path, PathBuf::from("data/city.gpkg"));
        assert_eq!(p.identity.as_deref(), Some("roads"));
        assert_eq!(p.to_string(), "data/city.gpkg#roads");

        let p = DatasourcePointer::parse("parcels.geojson");
        assert!(p.identity.is_none());
        assert_eq!(p.name(), "parcels");
    }

    #[test]
    fn test_memory_pointer() {
        let p = DatasourcePointer::memory("Buffer");
        assert!(p.is_in_memory());
        assert_eq!(p.memory_key(), Some("Buffer"));
        assert_eq!(p.name(), "Buffer");
        assert!(!DatasourcePointer::new("Buffer.geojson").is_in_memory());
    }
}
