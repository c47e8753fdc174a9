//! Typed bindings between a value and one attribute of a data node

use crate::handlers::ScalarHandler;
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;
use strata_core::DataNode;

/// Key of the conventional enable flag
pub const ENABLE: &str = "enable";

/// Reads a `T` from a node and writes one back
pub trait PropertyHandler<T> {
    fn load(&self, node: &DataNode) -> Result<T>;

    fn convert(&self, value: &T) -> Result<DataNode>;

    /// Load starting from the property's current value
    ///
    /// Handlers that fill an existing value in place (nested objects) override
    /// this; the default ignores `current`.
    fn load_into(&self, node: &DataNode, _current: Option<&T>) -> Result<T> {
        self.load(node)
    }
}

/// Type-erased view of a [`Property`] used by [`DataObject`](crate::DataObject)
///
/// Loading is split in two phases so an object can load all of its
/// properties or none: `stage` computes the new value without applying it,
/// then every property is either committed or discarded.
pub trait Bindable {
    fn key(&self) -> &str;

    /// Compute the value that loading `node` would produce
    fn stage(&mut self, node: &DataNode, owner: &str) -> Result<()>;

    /// Apply the staged value, if any
    fn commit(&mut self);

    /// Forget the staged value
    fn discard(&mut self);

    /// Write this property into `root`
    fn append_to(&self, root: &mut DataNode) -> Result<()>;
}

/// A named, typed slot bound to one attribute key
///
/// A required property fails to load when its key is absent. An optional
/// one falls back to its default (when configured) or keeps its current
/// value. When written, an optional property whose value encodes to the same
/// node as its default is left out.
///
/// # Example
///
/// ```
/// use strata_core::DataNode;
/// use strata_schema::Property;
///
/// let mut speed: Property<f32> = Property::scalar("speed").optional().with_default(1.0);
/// speed.load_data(&DataNode::object(), "unit").unwrap();
/// assert_eq!(speed.get(), Some(&1.0));
///
/// let mut root = DataNode::object();
/// speed.append_to(&mut root).unwrap();
/// assert!(!root.contains("speed"));
///
/// speed.set(2.5);
/// speed.append_to(&mut root).unwrap();
/// assert_eq!(root.get("speed").unwrap().get_float().unwrap(), 2.5);
/// ```
pub struct Property<T> {
    key: String,
    optional: bool,
    default: Option<T>,
    value: Option<T>,
    staged: Option<Option<T>>,
    handler: Arc<dyn PropertyHandler<T>>,
}

impl<T: Clone> Property<T> {
    /// Create a required property without a value
    pub fn new(key: impl Into<String>, handler: impl PropertyHandler<T> + 'static) -> Self {
        Self::with_handler(key, Arc::new(handler))
    }

    /// Create a required property sharing an existing handler
    pub fn with_handler(key: impl Into<String>, handler: Arc<dyn PropertyHandler<T>>) -> Self {
        Self {
            key: key.into(),
            optional: false,
            default: None,
            value: None,
            staged: None,
            handler,
        }
    }

    /// Make this property optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Configure a default; the current value becomes the default too
    pub fn with_default(mut self, default: T) -> Self {
        self.value = Some(default.clone());
        self.default = Some(default);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    pub fn set(&mut self, value: T) -> &mut Self {
        self.value = Some(value);
        self
    }

    /// Drop the current value
    pub fn clear(&mut self) -> &mut Self {
        self.value = None;
        self
    }

    /// Load this property from the attributes of `node`
    ///
    /// `owner` names the object being loaded in error messages.
    pub fn load_data(&mut self, node: &DataNode, owner: &str) -> Result<()> {
        self.stage(node, owner)?;
        self.commit();
        Ok(())
    }

    /// Encode the current value, if any
    pub fn convert(&self) -> Result<Option<DataNode>> {
        self.value
            .as_ref()
            .map(|value| self.handler.convert(value))
            .transpose()
    }

    /// Write this property into `root` unless it holds its default
    pub fn append_to(&self, root: &mut DataNode) -> Result<()> {
        let Some(value) = &self.value else {
            if self.optional {
                return Ok(());
            }
            return Err(Error::Unset {
                key: self.key.clone(),
            });
        };

        let encoded = self.handler.convert(value)?;
        if self.optional {
            if let Some(default) = &self.default {
                // A default that cannot be encoded never matches
                if matches!(self.handler.convert(default), Ok(ref node) if *node == encoded) {
                    return Ok(());
                }
            }
        }
        root.set(self.key.as_str(), encoded)?;
        Ok(())
    }

    fn load_value(&self, child: &DataNode, owner: &str) -> Result<T> {
        match self.handler.load_into(child, self.value.as_ref()) {
            Err(Error::Node(source)) => Err(Error::Coercion {
                key: self.key.clone(),
                owner: owner.to_string(),
                source,
            }),
            other => other,
        }
    }
}

impl<T: Clone + ScalarValue + 'static> Property<T> {
    /// Create a required property of a scalar type
    pub fn scalar(key: impl Into<String>) -> Self {
        Self::new(key, ScalarHandler::<T>::new())
    }
}

impl Property<bool> {
    /// The conventional optional `enable` flag, on by default
    pub fn enable() -> Self {
        Self::scalar(ENABLE).optional().with_default(true)
    }
}

impl<T: Clone> Bindable for Property<T> {
    fn key(&self) -> &str {
        &self.key
    }

    fn stage(&mut self, node: &DataNode, owner: &str) -> Result<()> {
        self.staged = match node.get(&self.key) {
            Some(child) => Some(Some(self.load_value(child, owner)?)),
            None if !self.optional => {
                return Err(Error::MissingKey {
                    key: self.key.clone(),
                    owner: owner.to_string(),
                })
            }
            None => self.default.clone().map(Some),
        };
        Ok(())
    }

    fn commit(&mut self) {
        if let Some(value) = self.staged.take() {
            self.value = value;
        }
    }

    fn discard(&mut self) {
        self.staged = None;
    }

    fn append_to(&self, root: &mut DataNode) -> Result<()> {
        Property::append_to(self, root)
    }
}

impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            optional: self.optional,
            default: self.default.clone(),
            value: self.value.clone(),
            staged: None,
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("key", &self.key)
            .field("optional", &self.optional)
            .field("default", &self.default)
            .field("value", &self.value)
            .finish()
    }
}

/// Scalars stored as a single primitive node
pub trait ScalarValue: Sized {
    fn read(node: &DataNode) -> strata_core::Result<Self>;

    fn write(&self) -> DataNode;
}

impl ScalarValue for bool {
    fn read(node: &DataNode) -> strata_core::Result<Self> {
        node.get_bool()
    }

    fn write(&self) -> DataNode {
        DataNode::from(*self)
    }
}

impl ScalarValue for i64 {
    fn read(node: &DataNode) -> strata_core::Result<Self> {
        node.get_int()
    }

    fn write(&self) -> DataNode {
        DataNode::from(*self)
    }
}

impl ScalarValue for i32 {
    fn read(node: &DataNode) -> strata_core::Result<Self> {
        let value = node.get_int()?;
        i32::try_from(value).map_err(|_| strata_core::Error::InvalidValue {
            value: value.to_string(),
            expected: "i32",
        })
    }

    fn write(&self) -> DataNode {
        DataNode::from(*self)
    }
}

impl ScalarValue for f32 {
    fn read(node: &DataNode) -> strata_core::Result<Self> {
        Ok(node.get_float()? as f32)
    }

    fn write(&self) -> DataNode {
        DataNode::from(*self)
    }
}

impl ScalarValue for f64 {
    fn read(node: &DataNode) -> strata_core::Result<Self> {
        node.get_float()
    }

    fn write(&self) -> DataNode {
        DataNode::from(*self)
    }
}

impl ScalarValue for String {
    fn read(node: &DataNode) -> strata_core::Result<Self> {
        node.get_string().map(str::to_string)
    }

    fn write(&self) -> DataNode {
        DataNode::from(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(json: &[(&str, DataNode)]) -> DataNode {
        DataNode::map(json.iter().cloned())
    }

    #[test]
    fn test_required_missing_key() {
        let mut name: Property<String> = Property::scalar("type");
        let err = name.load_data(&DataNode::object(), "Unit").unwrap_err();
        assert!(matches!(
            err,
            Error::MissingKey { ref key, ref owner } if key == "type" && owner == "Unit"
        ));
        assert!(name.get().is_none());
    }

    #[test]
    fn test_optional_missing_keeps_value() {
        let mut count: Property<i64> = Property::scalar("count").optional();
        count.set(7);
        count.load_data(&DataNode::object(), "Unit").unwrap();
        assert_eq!(count.get(), Some(&7));
    }

    #[test]
    fn test_optional_missing_resets_to_default() {
        let mut count: Property<i64> = Property::scalar("count").optional().with_default(3);
        count.set(9);
        count.load_data(&DataNode::object(), "Unit").unwrap();
        assert_eq!(count.get(), Some(&3));
    }

    #[test]
    fn test_load_scalars() {
        let data = node(&[
            ("flag", DataNode::from("TRUE")),
            ("int", DataNode::from("-12")),
            ("small", DataNode::from("40")),
            ("float", DataNode::from("0.25")),
            ("text", DataNode::from("hello")),
        ]);

        let mut flag: Property<bool> = Property::scalar("flag");
        let mut int: Property<i64> = Property::scalar("int");
        let mut small: Property<i32> = Property::scalar("small");
        let mut float: Property<f32> = Property::scalar("float");
        let mut text: Property<String> = Property::scalar("text");

        flag.load_data(&data, "T").unwrap();
        int.load_data(&data, "T").unwrap();
        small.load_data(&data, "T").unwrap();
        float.load_data(&data, "T").unwrap();
        text.load_data(&data, "T").unwrap();

        assert_eq!(flag.get(), Some(&true));
        assert_eq!(int.get(), Some(&-12));
        assert_eq!(small.get(), Some(&40));
        assert_eq!(float.get(), Some(&0.25));
        assert_eq!(text.get().map(String::as_str), Some("hello"));
    }

    #[test]
    fn test_coercion_error_names_key() {
        let data = node(&[("hp", DataNode::from("lots"))]);
        let mut hp: Property<i64> = Property::scalar("hp");
        let err = hp.load_data(&data, "Unit").unwrap_err();
        assert!(matches!(err, Error::Coercion { ref key, .. } if key == "hp"));
        assert!(err.to_string().contains("lots"));
    }

    #[test]
    fn test_i32_overflow() {
        let data = node(&[("n", DataNode::from(i64::MAX))]);
        let mut n: Property<i32> = Property::scalar("n");
        assert!(matches!(n.load_data(&data, "T"), Err(Error::Coercion { .. })));
    }

    #[test]
    fn test_default_is_suppressed() {
        let enable = Property::enable();
        let mut root = DataNode::object();
        enable.append_to(&mut root).unwrap();
        assert!(!root.contains(ENABLE));
    }

    #[test]
    fn test_non_default_is_written() {
        let mut enable = Property::enable();
        enable.set(false);
        let mut root = DataNode::object();
        enable.append_to(&mut root).unwrap();
        assert!(!root.get(ENABLE).unwrap().get_bool().unwrap());
    }

    #[test]
    fn test_required_default_is_written() {
        let speed: Property<f64> = Property::scalar("speed").with_default(1.0);
        let mut root = DataNode::object();
        speed.append_to(&mut root).unwrap();
        assert_eq!(root.get("speed").unwrap().get_string().unwrap(), "1.0");
    }

    #[test]
    fn test_unset() {
        let mut root = DataNode::object();

        let required: Property<String> = Property::scalar("name");
        assert!(matches!(
            required.append_to(&mut root),
            Err(Error::Unset { ref key }) if key == "name"
        ));

        let optional: Property<String> = Property::scalar("name").optional();
        optional.append_to(&mut root).unwrap();
        assert_eq!(root.property_count(), 0);
    }

    #[test]
    fn test_staging() {
        let data = node(&[("n", DataNode::from(5))]);
        let mut n: Property<i64> = Property::scalar("n");
        n.set(1);

        n.stage(&data, "T").unwrap();
        assert_eq!(n.get(), Some(&1));
        n.discard();
        n.commit();
        assert_eq!(n.get(), Some(&1));

        n.stage(&data, "T").unwrap();
        n.commit();
        assert_eq!(n.get(), Some(&5));
    }

    #[test]
    fn test_clone_shares_handler() {
        let mut original: Property<i64> = Property::scalar("n").optional().with_default(2);
        let copy = original.clone();
        original.set(4);
        assert_eq!(copy.get(), Some(&2));
        assert_eq!(copy.key(), "n");
        assert!(copy.is_optional());
        assert_eq!(copy.default_value(), Some(&2));
    }

    #[test]
    fn test_convert() {
        let mut n: Property<i64> = Property::scalar("n");
        assert_eq!(n.convert().unwrap(), None);
        n.set(3);
        assert_eq!(n.convert().unwrap(), Some(DataNode::from(3)));
    }
}
