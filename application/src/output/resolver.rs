//! Output destination resolution.
//!
//! Decides where each output parameter is materialized before the tool
//! body runs. The tool body writes; this module only picks the target and
//! refuses to replace existing data unless overwriting is enabled.

use crate::config::ExecutionOptions;
use geotools_domain::{
    DataSourceType, DatasourceProvider, OutputRequest, OutputTarget, ParameterDefinition,
    ParameterKind, ValidationError,
};
use std::collections::HashSet;
use std::path::PathBuf;

/// File extension written for outputs of a given layer type.
pub fn output_extension(layer_type: DataSourceType) -> &'static str {
    match layer_type {
        DataSourceType::Raster => "asc",
        DataSourceType::Vector | DataSourceType::Any => "geojson",
    }
}

pub struct OutputResolver<'a> {
    provider: &'a dyn DatasourceProvider,
    options: &'a ExecutionOptions,
}

impl<'a> OutputResolver<'a> {
    pub fn new(provider: &'a dyn DatasourceProvider, options: &'a ExecutionOptions) -> Self {
        Self { provider, options }
    }

    /// Resolve `request` for output parameter `definition`, naming the
    /// dataset `name` (the request name, or a derived batch name).
    pub fn resolve(
        &self,
        definition: &ParameterDefinition,
        request: &OutputRequest,
        name: &str,
    ) -> Result<OutputTarget, ValidationError> {
        let ParameterKind::OutputLayer {
            layer_type,
            support_in_memory,
        } = definition.kind
        else {
            return Err(ValidationError::invalid(
                &definition.name,
                "not an output layer parameter",
            ));
        };

        if request.in_memory && !support_in_memory {
            return Err(ValidationError::InMemoryNotSupported {
                parameter: definition.name.clone(),
            });
        }
        let overwrite = request.overwrite || self.options.overwrite_outputs;
        let target = if request.in_memory || (self.options.prefer_in_memory && support_in_memory) {
            OutputTarget::InMemory {
                name: name.to_string(),
            }
        } else {
            let directory = request
                .directory
                .clone()
                .or_else(|| self.options.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            let path = directory.join(format!("{}.{}", name, output_extension(layer_type)));
            OutputTarget::File { path, overwrite }
        };

        if !overwrite && self.provider.exists(&target.pointer()) {
            return Err(ValidationError::OutputExists {
                parameter: definition.name.clone(),
                path: target.pointer().path,
            });
        }
        Ok(target)
    }
}

/// Hands out unique output names across the items of one batch.
///
/// The first claim of a name gets it unchanged; later claims get `_2`,
/// `_3`, ... appended.
#[derive(Debug, Default)]
pub struct OutputNamer {
    claimed: HashSet<String>,
}

impl OutputNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of a batch item's output: `<input name>_<template>`.
    pub fn batch_name(input_name: &str, template: &str) -> String {
        format!("{}_{}", input_name, template)
    }

    pub fn claim(&mut self, base: &str) -> String {
        if self.claimed.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if self.claimed.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotools_domain::{Datasource, DatasourceError, DatasourcePointer};
    use std::path::Path;

    struct DiskOnly;

    impl DatasourceProvider for DiskOnly {
        fn open(&self, pointer: &DatasourcePointer) -> Result<Box<dyn Datasource>, DatasourceError> {
            Err(DatasourceError::Unsupported {
                path: pointer.path.clone(),
            })
        }
    }

    /// Reports one in-memory dataset as already present.
    struct HoldsMemory(&'static str);

    impl DatasourceProvider for HoldsMemory {
        fn open(&self, pointer: &DatasourcePointer) -> Result<Box<dyn Datasource>, DatasourceError> {
            DiskOnly.open(pointer)
        }

        fn exists(&self, pointer: &DatasourcePointer) -> bool {
            pointer.memory_key() == Some(self.0)
        }
    }

    fn output() -> ParameterDefinition {
        ParameterDefinition::vector_output("Output", "Output")
    }

    #[test]
    fn test_namer_suffixes_collisions() {
        let mut namer = OutputNamer::new();
        let base = OutputNamer::batch_name("parcels", "Buffer");
        assert_eq!(namer.claim(&base), "parcels_Buffer");
        assert_eq!(namer.claim(&base), "parcels_Buffer_2");
        assert_eq!(namer.claim(&base), "parcels_Buffer_3");
        assert_eq!(namer.claim("roads_Buffer"), "roads_Buffer");
    }

    #[test]
    fn test_namer_does_not_reuse_explicit_suffix() {
        let mut namer = OutputNamer::new();
        assert_eq!(namer.claim("a_2"), "a_2");
        assert_eq!(namer.claim("a"), "a");
        assert_eq!(namer.claim("a"), "a_3");
    }

    #[test]
    fn test_resolve_file_in_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExecutionOptions::default().with_output_dir(dir.path());
        let resolver = OutputResolver::new(&DiskOnly, &options);

        let target = resolver
            .resolve(&output(), &OutputRequest::new("Buffer"), "Buffer")
            .unwrap();
        assert_eq!(
            target,
            OutputTarget::File {
                path: dir.path().join("Buffer.geojson"),
                overwrite: false
            }
        );
    }

    #[test]
    fn test_resolve_refuses_existing_file_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Buffer.geojson"), "{}").unwrap();
        let options = ExecutionOptions::default().with_output_dir(dir.path());
        let resolver = OutputResolver::new(&DiskOnly, &options);

        let err = resolver
            .resolve(&output(), &OutputRequest::new("Buffer"), "Buffer")
            .unwrap_err();
        assert!(matches!(err, ValidationError::OutputExists { .. }));

        let target = resolver
            .resolve(
                &output(),
                &OutputRequest::new("Buffer").with_overwrite(true),
                "Buffer",
            )
            .unwrap();
        assert!(matches!(target, OutputTarget::File { overwrite: true, .. }));
    }

    #[test]
    fn test_resolve_in_memory() {
        let options = ExecutionOptions::default().with_prefer_in_memory(true);
        let resolver = OutputResolver::new(&DiskOnly, &options);
        let target = resolver
            .resolve(&output(), &OutputRequest::new("Buffer"), "parcels_Buffer")
            .unwrap();
        assert_eq!(
            target,
            OutputTarget::InMemory {
                name: "parcels_Buffer".into()
            }
        );

        let disk_only = output().disk_only();
        let target = resolver
            .resolve(&disk_only, &OutputRequest::new("Buffer").with_directory("out"), "Buffer")
            .unwrap();
        assert_eq!(target.pointer().path, Path::new("out/Buffer.geojson"));
        assert!(matches!(
            resolver.resolve(&disk_only, &OutputRequest::in_memory("Buffer"), "Buffer"),
            Err(ValidationError::InMemoryNotSupported { .. })
        ));
    }

    #[test]
    fn test_resolve_refuses_existing_in_memory_without_overwrite() {
        let options = ExecutionOptions::default();
        let provider = HoldsMemory("Buffer");
        let resolver = OutputResolver::new(&provider, &options);

        let err = resolver
            .resolve(&output(), &OutputRequest::in_memory("Buffer"), "Buffer")
            .unwrap_err();
        assert!(matches!(err, ValidationError::OutputExists { .. }));

        assert!(resolver
            .resolve(&output(), &OutputRequest::in_memory("Other"), "Other")
            .is_ok());

        let overwriting = ExecutionOptions::default().with_overwrite_outputs(true);
        let target = OutputResolver::new(&provider, &overwriting)
            .resolve(&output(), &OutputRequest::in_memory("Buffer"), "Buffer")
            .unwrap();
        assert_eq!(
            target,
            OutputTarget::InMemory {
                name: "Buffer".into()
            }
        );
    }
}
