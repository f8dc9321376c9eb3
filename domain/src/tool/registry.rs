//! Process-wide tool catalog.

use crate::tool::descriptor::ToolDescriptor;
use crate::tool::error::ConfigurationError;
use crate::tool::traits::GisTool;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::debug;

/// A registered tool: its cached descriptor plus the executable body.
pub struct RegisteredTool {
    pub descriptor: Arc<ToolDescriptor>,
    pub tool: Arc<dyn GisTool>,
}

impl RegisteredTool {
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("id", &self.descriptor.id)
            .field("group", &self.descriptor.group)
            .finish()
    }
}

/// Catalog of tools keyed by id.
///
/// Populated at startup, read-mostly afterwards. Entries are immutable
/// `Arc`s, so readers never block each other for longer than a lookup.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<RegisteredTool>>>,
}

static GLOBAL: OnceLock<ToolRegistry> = OnceLock::new();

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static ToolRegistry {
        GLOBAL.get_or_init(ToolRegistry::new)
    }

    /// Register a tool. Registering an id twice keeps the first entry.
    ///
    /// The descriptor is built once and validated; a bad declaration is
    /// rejected here rather than at run time.
    pub fn register(&self, tool: Arc<dyn GisTool>) -> Result<Arc<RegisteredTool>, ConfigurationError> {
        let descriptor = tool.descriptor();
        let mut tools = self.tools.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = tools.get(&descriptor.id) {
            debug!(tool = %descriptor.id, "Tool already registered");
            return Ok(existing.clone());
        }

        descriptor.validate_declaration()?;
        let entry = Arc::new(RegisteredTool {
            descriptor: Arc::new(descriptor),
            tool,
        });
        debug!(tool = %entry.id(), group = %entry.descriptor.group, "Registered tool");
        tools.insert(entry.id().to_string(), entry.clone());
        Ok(entry)
    }

    pub fn get(&self, id: &str) -> Option<Arc<RegisteredTool>> {
        self.tools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn describe(&self, id: &str) -> Option<Arc<ToolDescriptor>> {
        self.get(id).map(|t| t.descriptor.clone())
    }

    /// All tools, sorted by group then display name.
    pub fn all(&self) -> Vec<Arc<RegisteredTool>> {
        let mut tools: Vec<_> = self
            .tools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        tools.sort_by(|a, b| {
            (&a.descriptor.group, &a.descriptor.name).cmp(&(&b.descriptor.group, &b.descriptor.name))
        });
        tools
    }

    pub fn list_by_group(&self, group: &str) -> Vec<Arc<ToolDescriptor>> {
        self.all()
            .into_iter()
            .filter(|t| t.descriptor.group == group)
            .map(|t| t.descriptor.clone())
            .collect()
    }

    /// Distinct group keys, sorted.
    pub fn groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self
            .all()
            .into_iter()
            .map(|t| t.descriptor.group.clone())
            .collect();
        groups.dedup();
        groups
    }

    pub fn len(&self) -> usize {
        self.tools.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::output::ProducedOutput;
    use crate::parameter::definition::ParameterDefinition;
    use crate::tool::context::ToolContext;
    use crate::tool::error::ExecutionFailure;

    struct Fixed(ToolDescriptor);

    impl GisTool for Fixed {
        fn descriptor(&self) -> ToolDescriptor {
            self.0.clone()
        }

        fn run(&self, _ctx: &ToolContext<'_>) -> Result<Vec<ProducedOutput>, ExecutionFailure> {
            Ok(Vec::new())
        }
    }

    fn tool(id: &str, name: &str, group: &str) -> Arc<dyn GisTool> {
        Arc::new(Fixed(
            ToolDescriptor::new(id, name)
                .with_group(group)
                .with_parameter(ParameterDefinition::vector_layer("InputLayer", "Input")),
        ))
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = ToolRegistry::new();
        registry.register(tool("buffer", "Buffer", "vector-geometry")).unwrap();
        registry.register(tool("buffer", "Buffer", "vector-geometry")).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.list_by_group("vector-geometry").len(), 1);
    }

    #[test]
    fn test_register_rejects_bad_declaration() {
        let registry = ToolRegistry::new();
        let bad = Arc::new(Fixed(
            ToolDescriptor::new("bad", "Bad")
                .with_parameter(ParameterDefinition::double("X", "X"))
                .with_parameter(ParameterDefinition::double("X", "X again")),
        ));
        assert!(matches!(
            registry.register(bad),
            Err(ConfigurationError::DuplicateParameter { .. })
        ));
        assert!(registry.get("bad").is_none());
    }

    #[test]
    fn test_list_and_groups_sorted() {
        let registry = ToolRegistry::new();
        registry.register(tool("raster-info", "Raster info", "raster")).unwrap();
        registry.register(tool("select", "Select", "vector-attributes")).unwrap();
        registry.register(tool("buffer", "Buffer", "vector-geometry")).unwrap();
        registry.register(tool("clip", "Clip", "vector-geometry")).unwrap();

        assert_eq!(
            registry.groups(),
            vec!["raster", "vector-attributes", "vector-geometry"]
        );
        let names: Vec<_> = registry
            .list_by_group("vector-geometry")
            .iter()
            .map(|d| d.id.clone())
            .collect();
        assert_eq!(names, vec!["buffer", "clip"]);
        assert!(registry.list_by_group("unknown").is_empty());
    }

    #[test]
    fn test_concurrent_reads() {
        let registry = Arc::new(ToolRegistry::new());
        registry.register(tool("buffer", "Buffer", "vector-geometry")).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.get("buffer").is_some())
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
    }
}
