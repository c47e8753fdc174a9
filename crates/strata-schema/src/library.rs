//! Loading blueprints from a directory tree
//!
//! Each object type lives in its own directory holding
//! `<type>/<type>.blueprint.ois`. The file may name a custom blueprint type
//! with `blueprint-class`; otherwise the default blueprint factory is used.

use crate::blueprint::{Blueprint, ComponentHost, BLUEPRINT_CLASS};
use crate::registry::{Instantiator, TypeRegistry};
use crate::{Error, Result};
use indexmap::IndexMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use strata_core::DataNode;
use strata_format::DataFormat;
use tracing::{debug, warn};

/// Extension of blueprint files
pub const BLUEPRINT_EXTENSION: &str = "blueprint.ois";

/// Chooses and builds the blueprint for one object type
pub struct BlueprintFactory<H: ComponentHost> {
    default: Box<dyn Fn(&str) -> Blueprint<H>>,
    custom: TypeRegistry<Blueprint<H>>,
}

impl<H: ComponentHost> BlueprintFactory<H> {
    /// Build `default(type)` for files without a `blueprint-class`
    pub fn new(default: impl Fn(&str) -> Blueprint<H> + 'static) -> Self {
        Self {
            default: Box::new(default),
            custom: TypeRegistry::new(),
        }
    }

    /// Register a custom blueprint type under its `blueprint-class` name
    pub fn register(
        &mut self,
        blueprint_class: impl Into<String>,
        factory: impl Fn() -> Blueprint<H> + 'static,
    ) -> &mut Self
    where
        H: 'static,
    {
        self.custom.register(blueprint_class, factory);
        self
    }

    /// Build and load the blueprint described by `node`
    pub fn build(&self, type_name: &str, node: &DataNode) -> Result<Blueprint<H>> {
        let mut blueprint = match node.get(BLUEPRINT_CLASS) {
            Some(class) => {
                let class = class.get_string()?;
                self.custom
                    .construct(class)
                    .map_err(|source| Error::Construction {
                        type_name: class.to_string(),
                        source,
                    })?
            }
            None => (self.default)(type_name),
        };
        blueprint.load_data(node)?;
        Ok(blueprint)
    }
}

/// Blueprints by object type
pub struct BlueprintLibrary<H: ComponentHost> {
    blueprints: IndexMap<String, Blueprint<H>>,
}

impl<H: ComponentHost> BlueprintLibrary<H> {
    pub fn new() -> Self {
        Self {
            blueprints: IndexMap::new(),
        }
    }

    pub fn get(&self, type_name: &str) -> Option<&Blueprint<H>> {
        self.blueprints.get(type_name)
    }

    pub fn get_mut(&mut self, type_name: &str) -> Option<&mut Blueprint<H>> {
        self.blueprints.get_mut(type_name)
    }

    /// Add a blueprint, returning the one it replaces
    pub fn insert(
        &mut self,
        type_name: impl Into<String>,
        blueprint: Blueprint<H>,
    ) -> Option<Blueprint<H>> {
        self.blueprints.insert(type_name.into(), blueprint)
    }

    /// Object types in load order
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.blueprints.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    /// Build an object of `type_name` from its blueprint
    pub fn create(&self, type_name: &str) -> Result<H> {
        let blueprint = self
            .blueprints
            .get(type_name)
            .ok_or_else(|| Error::InvalidValue(format!("no blueprint for type '{}'", type_name)))?;
        blueprint.create()
    }

    /// Load `<dir>/<type>/<type>.blueprint.ois` for every subdirectory of `dir`
    ///
    /// Subdirectories are visited in name order. Those without a blueprint
    /// file are skipped with a warning. Returns the number of blueprints
    /// loaded; a blueprint already in the library under the same type is
    /// replaced. If any type fails to load, the library is left unchanged.
    pub fn load_directory(
        &mut self,
        dir: &Path,
        format: &dyn DataFormat,
        factory: &BlueprintFactory<H>,
    ) -> Result<usize> {
        let mut entries = fs::read_dir(dir)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<io::Result<Vec<PathBuf>>>()?;
        entries.sort();

        let mut loaded = IndexMap::new();
        for path in entries.iter().filter(|path| path.is_dir()) {
            let Some(type_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let file = path.join(format!("{}.{}", type_name, BLUEPRINT_EXTENSION));
            if !file.is_file() {
                warn!(path = %file.display(), "blueprint file not found, skipping type");
                continue;
            }

            let node = format.load_file(&file)?;
            let blueprint = factory.build(type_name, &node)?;
            debug!(
                type_name,
                blueprint_class = ?blueprint.blueprint_class(),
                "loaded blueprint"
            );
            loaded.insert(type_name.to_string(), blueprint);
        }

        let count = loaded.len();
        self.blueprints.extend(loaded);
        debug!(dir = %dir.display(), count, "loaded blueprint directory");
        Ok(count)
    }
}

impl<H: ComponentHost> Default for BlueprintLibrary<H> {
    fn default() -> Self {
        Self::new()
    }
}
