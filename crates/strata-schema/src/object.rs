//! Objects whose persistence derives from their properties

use crate::{Bindable, Result};
use strata_core::DataNode;

/// An object that loads and persists itself through registered properties
///
/// Implementors list their properties in a fixed order; loading and writing
/// both follow that order, so output key order is stable. Loading is all or
/// nothing: if any property fails, none of them change.
///
/// # Example
///
/// ```
/// use strata_core::DataNode;
/// use strata_schema::{Bindable, DataObject, Property};
///
/// #[derive(Clone)]
/// struct Unit {
///     kind: Property<String>,
///     hp: Property<i64>,
/// }
///
/// impl Default for Unit {
///     fn default() -> Self {
///         Self {
///             kind: Property::scalar("type"),
///             hp: Property::scalar("hp").optional().with_default(10),
///         }
///     }
/// }
///
/// impl DataObject for Unit {
///     fn properties(&self) -> Vec<&dyn Bindable> {
///         vec![&self.kind, &self.hp]
///     }
///
///     fn properties_mut(&mut self) -> Vec<&mut dyn Bindable> {
///         vec![&mut self.kind, &mut self.hp]
///     }
/// }
///
/// let mut unit = Unit::default();
/// unit.load_data(&DataNode::map([("type", "archer")])).unwrap();
/// assert_eq!(unit.kind.get().unwrap(), "archer");
/// assert_eq!(unit.hp.get(), Some(&10));
///
/// let node = unit.convert_to_data_node().unwrap();
/// assert_eq!(node, DataNode::map([("type", "archer")]));
/// ```
pub trait DataObject {
    /// Properties in registration order
    fn properties(&self) -> Vec<&dyn Bindable>;

    fn properties_mut(&mut self) -> Vec<&mut dyn Bindable>;

    /// Name used for this object in error messages
    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Load every property from the attributes of `node`
    fn load_data(&mut self, node: &DataNode) -> Result<()> {
        let owner = self.type_name().to_string();
        let mut properties = self.properties_mut();

        let failed = properties
            .iter_mut()
            .map(|property| property.stage(node, &owner))
            .find_map(Result::err);
        if let Some(err) = failed {
            for property in &mut properties {
                property.discard();
            }
            return Err(err);
        }
        for property in properties {
            property.commit();
        }
        Ok(())
    }

    /// Write every property into a new object node
    fn convert_to_data_node(&self) -> Result<DataNode> {
        let mut root = DataNode::object();
        for property in self.properties() {
            property.append_to(&mut root)?;
        }
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{self, NestedHandler};
    use crate::{Error, Property, Vec3};

    #[derive(Clone)]
    struct Stats {
        hp: Property<i64>,
        armor: Property<f32>,
        title: Property<String>,
    }

    impl Default for Stats {
        fn default() -> Self {
            Self {
                hp: Property::scalar("hp").with_default(1),
                armor: Property::scalar("armor").optional().with_default(0.0),
                title: Property::scalar("title").optional(),
            }
        }
    }

    impl DataObject for Stats {
        fn properties(&self) -> Vec<&dyn Bindable> {
            vec![&self.hp, &self.armor, &self.title]
        }

        fn properties_mut(&mut self) -> Vec<&mut dyn Bindable> {
            vec![&mut self.hp, &mut self.armor, &mut self.title]
        }

        fn type_name(&self) -> &str {
            "Stats"
        }
    }

    struct Unit {
        kind: Property<String>,
        name: Property<String>,
        position: Property<Vec3>,
        stats: Property<Stats>,
        enable: Property<bool>,
    }

    impl Unit {
        fn new() -> Self {
            Self {
                kind: Property::scalar("type"),
                name: Property::scalar("name").optional(),
                position: Property::new("position", handlers::vector3())
                    .optional()
                    .with_default(Vec3::ZERO),
                stats: Property::new("stats", NestedHandler::<Stats>::new())
                    .optional()
                    .with_default(Stats::default()),
                enable: Property::enable(),
            }
        }
    }

    impl DataObject for Unit {
        fn properties(&self) -> Vec<&dyn Bindable> {
            vec![&self.kind, &self.name, &self.position, &self.stats, &self.enable]
        }

        fn properties_mut(&mut self) -> Vec<&mut dyn Bindable> {
            vec![
                &mut self.kind,
                &mut self.name,
                &mut self.position,
                &mut self.stats,
                &mut self.enable,
            ]
        }

        fn type_name(&self) -> &str {
            "Unit"
        }
    }

    fn unit_node() -> DataNode {
        let mut node = DataNode::object();
        node.set("type", "archer").unwrap();
        node.set("name", "Robin").unwrap();
        node.set("position", DataNode::map([("x", 1.0), ("y", 2.0), ("z", 0.0)]))
            .unwrap();
        node.set("stats", DataNode::map([("hp", 30), ("armor", 2)]))
            .unwrap();
        node.set("enable", false).unwrap();
        node
    }

    #[test]
    fn test_load_all_properties() {
        let mut unit = Unit::new();
        unit.load_data(&unit_node()).unwrap();

        assert_eq!(unit.kind.get().unwrap(), "archer");
        assert_eq!(unit.name.get().unwrap(), "Robin");
        assert_eq!(unit.position.get(), Some(&Vec3::new(1.0, 2.0, 0.0)));
        let stats = unit.stats.get().unwrap();
        assert_eq!(stats.hp.get(), Some(&30));
        assert_eq!(stats.armor.get(), Some(&2.0));
        assert_eq!(unit.enable.get(), Some(&false));
    }

    #[test]
    fn test_missing_required_type() {
        let mut unit = Unit::new();
        let mut node = unit_node();
        node.remove("type");

        let err = unit.load_data(&node).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingKey { ref key, ref owner } if key == "type" && owner == "Unit"
        ));
    }

    #[test]
    fn test_failed_load_changes_nothing() {
        let mut unit = Unit::new();
        unit.kind.set("knight".to_string());

        let mut node = unit_node();
        node.get_path_mut(&["stats"]).unwrap().remove("hp");

        let err = unit.load_data(&node).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingKey { ref key, ref owner } if key == "hp" && owner == "Stats"
        ));
        assert_eq!(unit.kind.get().unwrap(), "knight");
        assert!(unit.name.get().is_none());
        assert_eq!(unit.position.get(), Some(&Vec3::ZERO));
        assert_eq!(unit.enable.get(), Some(&true));
    }

    #[test]
    fn test_nested_reload() {
        let mut unit = Unit::new();
        let mut node = unit_node();
        node.set(
            "stats",
            DataNode::map([("hp", "30"), ("armor", "2"), ("title", "Captain")]),
        )
        .unwrap();
        unit.load_data(&node).unwrap();

        node.set("stats", DataNode::map([("hp", 5)])).unwrap();
        unit.load_data(&node).unwrap();

        let stats = unit.stats.get().unwrap();
        assert_eq!(stats.hp.get(), Some(&5));
        assert_eq!(stats.armor.get(), Some(&0.0));
        assert_eq!(stats.title.get().unwrap(), "Captain");
    }

    #[test]
    fn test_convert_in_registration_order() {
        let mut unit = Unit::new();
        unit.load_data(&unit_node()).unwrap();

        let node = unit.convert_to_data_node().unwrap();
        let keys: Vec<&str> = node.properties().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["type", "name", "position", "stats", "enable"]);
        assert_eq!(node, unit_node_canonical());
    }

    fn unit_node_canonical() -> DataNode {
        let mut node = unit_node();
        node.set("stats", DataNode::map([("hp", "30"), ("armor", "2.0")]))
            .unwrap();
        node
    }

    #[test]
    fn test_defaults_are_left_out() {
        let mut unit = Unit::new();
        unit.load_data(&DataNode::map([("type", "scout")])).unwrap();

        let node = unit.convert_to_data_node().unwrap();
        assert_eq!(node, DataNode::map([("type", "scout")]));
    }

    #[test]
    fn test_nested_default_compared_structurally() {
        let mut unit = Unit::new();
        unit.kind.set("scout".to_string());

        // A separately built but equal value still counts as the default
        unit.stats.set(Stats::default());
        assert!(!unit.convert_to_data_node().unwrap().contains("stats"));

        unit.stats.get_mut().unwrap().hp.set(99);
        let node = unit.convert_to_data_node().unwrap();
        assert_eq!(node.get_path(&["stats", "hp"]).unwrap().get_int().unwrap(), 99);
    }
}
