//! The semi-structured data tree

use crate::primitive::{self, PrimitiveValue};
use crate::{Error, Result};
use indexmap::IndexMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The kind of a [`DataNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Unknown,
    Object,
    Collection,
    Primitive,
}

impl NodeType {
    /// Get the lowercase name of this node type
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Unknown => "unknown",
            NodeType::Object => "object",
            NodeType::Collection => "collection",
            NodeType::Primitive => "primitive",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Insertion-ordered attributes of an object node
pub type NodeMap = IndexMap<String, DataNode>;

/// A node of a semi-structured data tree
///
/// The variant is fixed by the constructor. An [`Unknown`](DataNode::Unknown)
/// node is a placeholder that takes the shape of its first write: `set`
/// turns it into an object, `add` into a collection and `set_value` into a
/// primitive. Writes that do not match an already typed node fail with
/// [`Error::TypeMismatch`].
///
/// Equality is structural: primitives compare their value strings, objects
/// their attribute maps (ignoring order) and collections their content in
/// order. An unknown node is only equal to itself, by address, so a tree
/// holding an unknown node is not equal to its clone.
///
/// Hashing follows equality: an unknown node hashes its address. A node that
/// contains unknown nodes must not move while it is a key of a hashed
/// collection, or lookups will miss it.
#[derive(Debug, Clone, Default)]
pub enum DataNode {
    /// A node without content
    #[default]
    Unknown,
    /// A scalar value stored in canonical string form
    Primitive(String),
    /// An ordered list of nodes
    Collection(Vec<DataNode>),
    /// An insertion-ordered map of named nodes
    Object(NodeMap),
}

impl DataNode {
    // === Construction ===

    /// Create an empty object node
    pub fn object() -> Self {
        DataNode::Object(NodeMap::new())
    }

    /// Create an empty collection node
    pub fn collection() -> Self {
        DataNode::Collection(Vec::new())
    }

    /// Create a primitive node from any scalar
    pub fn primitive(value: impl PrimitiveValue) -> Self {
        DataNode::Primitive(value.to_primitive())
    }

    /// Create an unknown (placeholder) node
    pub fn unknown() -> Self {
        DataNode::Unknown
    }

    /// Create an object node from `(key, value)` pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<DataNode>,
        I: IntoIterator<Item = (K, V)>,
    {
        DataNode::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Create a collection node from a sequence of values
    pub fn collection_of<V, I>(items: I) -> Self
    where
        V: Into<DataNode>,
        I: IntoIterator<Item = V>,
    {
        DataNode::Collection(items.into_iter().map(Into::into).collect())
    }

    /// Get the type of this node
    pub fn node_type(&self) -> NodeType {
        match self {
            DataNode::Unknown => NodeType::Unknown,
            DataNode::Primitive(_) => NodeType::Primitive,
            DataNode::Collection(_) => NodeType::Collection,
            DataNode::Object(_) => NodeType::Object,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, DataNode::Unknown)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, DataNode::Object(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, DataNode::Collection(_))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, DataNode::Primitive(_))
    }

    /// Produce a fully independent copy of this tree
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    fn mismatch(&self, operation: &'static str, expected: NodeType) -> Error {
        Error::TypeMismatch {
            operation,
            expected,
            found: self.node_type(),
        }
    }

    // === Node as Object ===

    fn attributes_mut(&mut self, operation: &'static str) -> Result<&mut NodeMap> {
        if self.is_unknown() {
            *self = DataNode::object();
        }
        match self {
            DataNode::Object(map) => Ok(map),
            other => Err(other.mismatch(operation, NodeType::Object)),
        }
    }

    /// Set an attribute, replacing any previous value under the same key
    ///
    /// A replaced key keeps its original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<DataNode>) -> Result<&mut Self> {
        self.attributes_mut("set an attribute")?
            .insert(key.into(), value.into());
        Ok(self)
    }

    /// Get an attribute of this object
    pub fn get(&self, key: &str) -> Option<&DataNode> {
        match self {
            DataNode::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Get a mutable attribute of this object
    pub fn get_mut(&mut self, key: &str) -> Option<&mut DataNode> {
        match self {
            DataNode::Object(map) => map.get_mut(key),
            _ => None,
        }
    }

    /// Navigate nested attributes, stopping at the first missing segment
    ///
    /// ```
    /// use strata_core::DataNode;
    ///
    /// let mut root = DataNode::object();
    /// root.get_property(&["window", "size"]).unwrap().set("width", 800).unwrap();
    ///
    /// assert_eq!(root.get_path(&["window", "size", "width"]).unwrap().get_int().unwrap(), 800);
    /// assert!(root.get_path(&["window", "title"]).is_none());
    /// ```
    pub fn get_path(&self, keys: &[&str]) -> Option<&DataNode> {
        keys.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Mutable variant of [`get_path`](Self::get_path)
    pub fn get_path_mut(&mut self, keys: &[&str]) -> Option<&mut DataNode> {
        let mut node = self;
        for key in keys {
            node = node.get_mut(key)?;
        }
        Some(node)
    }

    /// Navigate nested attributes, creating missing segments on the way
    ///
    /// Missing intermediate segments are created as objects and a missing
    /// final segment as an unknown node, ready to take the shape of its first
    /// write. Fails if an existing segment is neither an object nor unknown.
    pub fn get_property(&mut self, keys: &[&str]) -> Result<&mut DataNode> {
        let Some((last, parents)) = keys.split_last() else {
            return Ok(self);
        };
        let mut node = self;
        for key in parents {
            node = node
                .attributes_mut("get a property")?
                .entry((*key).to_string())
                .or_insert_with(DataNode::object);
        }
        Ok(node
            .attributes_mut("get a property")?
            .entry((*last).to_string())
            .or_insert_with(DataNode::unknown))
    }

    /// Check whether this object has an attribute
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove an attribute, keeping the order of the remaining ones
    pub fn remove(&mut self, key: &str) -> Option<DataNode> {
        match self {
            DataNode::Object(map) => map.shift_remove(key),
            _ => None,
        }
    }

    /// Iterate over `(key, node)` attributes in insertion order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &DataNode)> {
        self.as_map()
            .into_iter()
            .flat_map(|map| map.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Number of attributes of this object
    pub fn property_count(&self) -> usize {
        self.as_map().map_or(0, NodeMap::len)
    }

    /// Get the attribute map if this is an object
    pub fn as_map(&self) -> Option<&NodeMap> {
        match self {
            DataNode::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Remove all attributes
    pub fn clear_attributes(&mut self) {
        if let DataNode::Object(map) = self {
            map.clear();
        }
    }

    // === Node as Collection ===

    fn content_mut(&mut self, operation: &'static str) -> Result<&mut Vec<DataNode>> {
        if self.is_unknown() {
            *self = DataNode::collection();
        }
        match self {
            DataNode::Collection(items) => Ok(items),
            other => Err(other.mismatch(operation, NodeType::Collection)),
        }
    }

    /// Append a value to this collection
    pub fn add(&mut self, value: impl Into<DataNode>) -> Result<&mut Self> {
        self.content_mut("add content")?.push(value.into());
        Ok(self)
    }

    /// Append several values to this collection
    pub fn add_all<V, I>(&mut self, values: I) -> Result<&mut Self>
    where
        V: Into<DataNode>,
        I: IntoIterator<Item = V>,
    {
        self.content_mut("add content")?
            .extend(values.into_iter().map(Into::into));
        Ok(self)
    }

    /// Get an element of this collection
    pub fn get_at(&self, index: usize) -> Option<&DataNode> {
        self.as_slice().and_then(|items| items.get(index))
    }

    /// Get a mutable element of this collection
    pub fn get_at_mut(&mut self, index: usize) -> Option<&mut DataNode> {
        match self {
            DataNode::Collection(items) => items.get_mut(index),
            _ => None,
        }
    }

    /// Replace an element of this collection
    pub fn set_at(&mut self, index: usize, value: impl Into<DataNode>) -> Result<()> {
        let items = match self {
            DataNode::Collection(items) => items,
            other => return Err(other.mismatch("set content", NodeType::Collection)),
        };
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;
        *slot = value.into();
        Ok(())
    }

    fn element(&self, index: usize) -> Result<&DataNode> {
        let items = self
            .as_slice()
            .ok_or_else(|| self.mismatch("read content", NodeType::Collection))?;
        items.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: items.len(),
        })
    }

    /// Read an element as a string
    pub fn string_at(&self, index: usize) -> Result<&str> {
        self.element(index)?.get_string()
    }

    /// Read an element as an integer
    pub fn int_at(&self, index: usize) -> Result<i64> {
        self.element(index)?.get_int()
    }

    /// Read an element as a float
    pub fn float_at(&self, index: usize) -> Result<f64> {
        self.element(index)?.get_float()
    }

    /// Read an element as a boolean
    pub fn bool_at(&self, index: usize) -> Result<bool> {
        self.element(index)?.get_bool()
    }

    /// Number of elements in this collection
    pub fn content_count(&self) -> usize {
        self.as_slice().map_or(0, <[DataNode]>::len)
    }

    /// Iterate over the elements of this collection in order
    ///
    /// Non-collection nodes yield nothing.
    pub fn iter(&self) -> std::slice::Iter<'_, DataNode> {
        self.as_slice().unwrap_or(&[]).iter()
    }

    /// Get the content if this is a collection
    pub fn as_slice(&self) -> Option<&[DataNode]> {
        match self {
            DataNode::Collection(items) => Some(items),
            _ => None,
        }
    }

    /// Remove all elements
    pub fn clear_content(&mut self) {
        if let DataNode::Collection(items) = self {
            items.clear();
        }
    }

    // === Node as Primitive ===

    /// Set the primitive value of this node
    pub fn set_value(&mut self, value: impl PrimitiveValue) -> Result<&mut Self> {
        if !matches!(self, DataNode::Unknown | DataNode::Primitive(_)) {
            return Err(self.mismatch("set a value", NodeType::Primitive));
        }
        *self = DataNode::Primitive(value.to_primitive());
        Ok(self)
    }

    /// Get the value string if this is a primitive
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataNode::Primitive(value) => Some(value),
            _ => None,
        }
    }

    /// Read the value as a string
    pub fn get_string(&self) -> Result<&str> {
        self.as_str()
            .ok_or_else(|| self.mismatch("read a value", NodeType::Primitive))
    }

    /// Read the value as an integer (`""` reads as `0`)
    pub fn get_int(&self) -> Result<i64> {
        primitive::parse_int(self.get_string()?)
    }

    /// Read the value as a float (`""` reads as `0.0`)
    pub fn get_float(&self) -> Result<f64> {
        primitive::parse_float(self.get_string()?)
    }

    /// Read the value as a boolean (`""` reads as `false`)
    pub fn get_bool(&self) -> Result<bool> {
        primitive::parse_bool(self.get_string()?)
    }
}

impl PartialEq for DataNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DataNode::Primitive(a), DataNode::Primitive(b)) => a == b,
            (DataNode::Collection(a), DataNode::Collection(b)) => a == b,
            (DataNode::Object(a), DataNode::Object(b)) => a == b,
            (DataNode::Unknown, DataNode::Unknown) => std::ptr::eq(self, other),
            _ => false,
        }
    }
}

impl Eq for DataNode {}

impl Hash for DataNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node_type().hash(state);
        match self {
            DataNode::Unknown => std::ptr::hash(self, state),
            DataNode::Primitive(value) => value.hash(state),
            DataNode::Collection(items) => items.hash(state),
            DataNode::Object(map) => {
                // Order-insensitive, matching map equality
                let combined = map.iter().fold(0u64, |acc, (key, value)| {
                    let mut hasher = DefaultHasher::new();
                    key.hash(&mut hasher);
                    value.hash(&mut hasher);
                    acc.wrapping_add(hasher.finish())
                });
                map.len().hash(state);
                combined.hash(state);
            }
        }
    }
}

impl<'a> IntoIterator for &'a DataNode {
    type Item = &'a DataNode;
    type IntoIter = std::slice::Iter<'a, DataNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for DataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataNode::Unknown => write!(f, "?"),
            DataNode::Primitive(value) => write!(f, "\"{}\"", value),
            DataNode::Collection(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            DataNode::Object(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

// Convenient From implementations
macro_rules! impl_from_primitive {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for DataNode {
                fn from(value: $ty) -> Self {
                    DataNode::primitive(value)
                }
            }
        )*
    };
}

impl_from_primitive!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String, &str, &String);

impl From<NodeMap> for DataNode {
    fn from(map: NodeMap) -> Self {
        DataNode::Object(map)
    }
}

impl<T: Into<DataNode>> From<Vec<T>> for DataNode {
    fn from(vec: Vec<T>) -> Self {
        DataNode::collection_of(vec)
    }
}
