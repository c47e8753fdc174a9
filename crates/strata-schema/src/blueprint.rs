//! Blueprints: data-driven factories for objects with components
//!
//! A [`Blueprint`] builds its root object in two steps. First the root
//! itself, either with the default factory or, when the data names a custom
//! `class`, through an [`Instantiator`]. Then every component blueprint, in
//! registration order, is built with the live root as context and attached to
//! it.

use crate::property::Bindable;
use crate::registry::{InstantiationError, Instantiator, TypeRegistry};
use crate::{DataObject, Error, Property, Result};
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::sync::Arc;
use strata_core::DataNode;
use tracing::{debug, trace};

/// Key naming a custom implementation type for the root object
pub const CLASS: &str = "class";
/// Key naming the blueprint type of a component (or of a whole blueprint)
pub const BLUEPRINT_CLASS: &str = "blueprint-class";
/// Key holding component blueprints by component key
pub const COMPONENTS: &str = "components";

/// An object that components can be attached to
pub trait ComponentHost {
    type Component;

    fn attach(&mut self, key: &str, component: Self::Component) -> Result<()>;
}

/// Builds one component of a host object
///
/// The component's own settings are loaded through [`DataObject`]; the
/// blueprint class is written back under `blueprint-class` so the component
/// blueprint can be rebuilt from data.
pub trait ComponentBlueprint<H: ComponentHost>: DataObject {
    /// Name this blueprint is registered under
    fn blueprint_class(&self) -> &str;

    /// Build the component for `context`, which is already constructed
    fn create(&self, context: &H) -> Result<H::Component>;
}

/// Registry of component blueprint types by `blueprint-class`
pub type ComponentTypes<H> = TypeRegistry<Box<dyn ComponentBlueprint<H>>>;

/// A factory schema building `H` objects
pub struct Blueprint<H: ComponentHost> {
    default_type: String,
    factory: Box<dyn Fn(&str) -> H>,
    blueprint_class: Option<String>,
    custom_class: Property<String>,
    components: IndexMap<String, Box<dyn ComponentBlueprint<H>>>,
    code_components: IndexSet<String>,
    instances: Option<Arc<dyn Instantiator<H>>>,
    component_types: Option<Arc<ComponentTypes<H>>>,
}

impl<H: ComponentHost> Blueprint<H> {
    /// Create a blueprint building `factory(default_type)` unless data says otherwise
    pub fn new(default_type: impl Into<String>, factory: impl Fn(&str) -> H + 'static) -> Self {
        Self {
            default_type: default_type.into(),
            factory: Box::new(factory),
            blueprint_class: None,
            custom_class: Property::scalar(CLASS).optional(),
            components: IndexMap::new(),
            code_components: IndexSet::new(),
            instances: None,
            component_types: None,
        }
    }

    /// Resolve custom `class` names with `instances`
    pub fn with_instantiator(mut self, instances: Arc<dyn Instantiator<H>>) -> Self {
        self.instances = Some(instances);
        self
    }

    /// Resolve component `blueprint-class` names with `types`
    pub fn with_component_types(mut self, types: Arc<ComponentTypes<H>>) -> Self {
        self.component_types = Some(types);
        self
    }

    /// Record the name this blueprint type is registered under
    pub fn with_blueprint_class(mut self, name: impl Into<String>) -> Self {
        self.blueprint_class = Some(name.into());
        self
    }

    pub fn default_type(&self) -> &str {
        &self.default_type
    }

    pub fn blueprint_class(&self) -> Option<&str> {
        self.blueprint_class.as_deref()
    }

    /// The custom implementation type, if a non-blank one is set
    pub fn custom_class(&self) -> Option<&str> {
        self.custom_class
            .get()
            .map(String::as_str)
            .filter(|class| !class.trim().is_empty())
    }

    pub fn set_custom_class(&mut self, class: impl Into<String>) -> &mut Self {
        self.custom_class.set(class.into());
        self
    }

    /// Register a component blueprint in code
    ///
    /// Code-registered keys take precedence over components defined in data,
    /// which are skipped when loading.
    pub fn register_component(
        &mut self,
        key: impl Into<String>,
        blueprint: Box<dyn ComponentBlueprint<H>>,
    ) -> Result<&mut Self> {
        let key = key.into();
        if self.components.contains_key(&key) {
            return Err(Error::DuplicateComponent(key));
        }
        self.code_components.insert(key.clone());
        self.components.insert(key, blueprint);
        Ok(self)
    }

    /// Component keys in build order
    pub fn component_keys(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn component(&self, key: &str) -> Option<&dyn ComponentBlueprint<H>> {
        self.components.get(key).map(|blueprint| blueprint.as_ref())
    }

    /// Load the custom class and data-defined components
    ///
    /// Components loaded by an earlier call are replaced. On failure nothing
    /// changes.
    pub fn load_data(&mut self, node: &DataNode) -> Result<()> {
        let owner = format!("blueprint '{}'", self.default_type);
        self.custom_class.stage(node, &owner)?;
        let loaded = match self.load_components(node) {
            Ok(loaded) => loaded,
            Err(err) => {
                self.custom_class.discard();
                return Err(err);
            }
        };
        self.custom_class.commit();

        self.components
            .retain(|key, _| self.code_components.contains(key));
        self.components.extend(loaded);
        Ok(())
    }

    fn load_components(
        &self,
        node: &DataNode,
    ) -> Result<IndexMap<String, Box<dyn ComponentBlueprint<H>>>> {
        let mut loaded = IndexMap::new();
        let Some(components) = node.get(COMPONENTS) else {
            return Ok(loaded);
        };

        for (key, data) in components.to_map()? {
            if self.code_components.contains(key) {
                debug!(component = %key, "component blueprint registered in code, skip loading");
                continue;
            }
            let owner = format!("component '{}'", key);
            let class = data
                .get(BLUEPRINT_CLASS)
                .ok_or_else(|| Error::MissingKey {
                    key: BLUEPRINT_CLASS.to_string(),
                    owner: owner.clone(),
                })?
                .get_string()
                .map_err(|source| Error::Coercion {
                    key: BLUEPRINT_CLASS.to_string(),
                    owner,
                    source,
                })?;

            let mut blueprint = self.construct_component(class)?;
            blueprint.load_data(data)?;
            debug!(component = %key, class, "loaded component blueprint");
            loaded.insert(key.clone(), blueprint);
        }
        Ok(loaded)
    }

    fn construct_component(&self, class: &str) -> Result<Box<dyn ComponentBlueprint<H>>> {
        let result = match &self.component_types {
            Some(types) => types.construct(class),
            None => Err(InstantiationError::UnknownType(class.to_string())),
        };
        result.map_err(|source| Error::Construction {
            type_name: class.to_string(),
            source,
        })
    }

    fn construct_root(&self) -> Result<H> {
        let Some(class) = self.custom_class() else {
            return Ok((self.factory)(&self.default_type));
        };
        let result = match &self.instances {
            Some(instances) => instances.construct(class),
            None => Err(InstantiationError::UnknownType(class.to_string())),
        };
        result.map_err(|source| Error::Construction {
            type_name: class.to_string(),
            source,
        })
    }

    /// Build the root object, then attach every component in order
    pub fn create(&self) -> Result<H> {
        let mut root = self.construct_root()?;
        for (key, blueprint) in &self.components {
            let component = blueprint.create(&root)?;
            root.attach(key, component)?;
            trace!(component = %key, class = blueprint.blueprint_class(), "attached component");
        }
        debug!(
            default_type = %self.default_type,
            custom_class = ?self.custom_class(),
            components = self.components.len(),
            "created object from blueprint"
        );
        Ok(root)
    }

    /// Persist the blueprint class, custom class and component blueprints
    pub fn convert_to_data_node(&self) -> Result<DataNode> {
        let mut root = DataNode::object();
        if let Some(class) = &self.blueprint_class {
            root.set(BLUEPRINT_CLASS, class.as_str())?;
        }
        if self.custom_class().is_some() {
            self.custom_class.append_to(&mut root)?;
        }
        if self.components.is_empty() {
            return Ok(root);
        }

        let components = root.get_property(&[COMPONENTS])?;
        for (key, blueprint) in &self.components {
            let mut data = blueprint.convert_to_data_node()?;
            data.set(BLUEPRINT_CLASS, blueprint.blueprint_class())?;
            components.set(key.as_str(), data)?;
        }
        Ok(root)
    }
}

impl<H: ComponentHost> fmt::Debug for Blueprint<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("default_type", &self.default_type)
            .field("blueprint_class", &self.blueprint_class)
            .field("custom_class", &self.custom_class())
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish()
    }
}
