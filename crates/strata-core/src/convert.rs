//! Typed views over attributes and content
//!
//! These helpers interpret every attribute (or element) of a node under one
//! scalar type so callers do not have to walk the tree by hand. An unknown
//! node reads as empty.

use crate::{DataNode, Error, NodeMap, NodeType, Result};
use indexmap::IndexMap;

impl DataNode {
    /// Get the attributes of this object node
    pub fn to_map(&self) -> Result<&NodeMap> {
        self.as_map().ok_or_else(|| Error::TypeMismatch {
            operation: "read attributes",
            expected: NodeType::Object,
            found: self.node_type(),
        })
    }

    /// Get the content of this collection node
    pub fn to_collection(&self) -> Result<&[DataNode]> {
        self.as_slice().ok_or_else(|| Error::TypeMismatch {
            operation: "read content",
            expected: NodeType::Collection,
            found: self.node_type(),
        })
    }

    /// Interpret every attribute with `read`, keeping key order
    pub fn map_attributes<T>(
        &self,
        read: impl Fn(&DataNode) -> Result<T>,
    ) -> Result<IndexMap<String, T>> {
        if self.is_unknown() {
            return Ok(IndexMap::new());
        }
        self.to_map()?
            .iter()
            .map(|(key, node)| Ok((key.clone(), read(node)?)))
            .collect()
    }

    /// Interpret every element with `read`, keeping order
    pub fn map_content<T>(&self, read: impl Fn(&DataNode) -> Result<T>) -> Result<Vec<T>> {
        match self {
            DataNode::Unknown => Ok(Vec::new()),
            DataNode::Collection(items) => items.iter().map(read).collect(),
            other => Err(Error::TypeMismatch {
                operation: "read content",
                expected: NodeType::Collection,
                found: other.node_type(),
            }),
        }
    }

    pub fn to_string_map(&self) -> Result<IndexMap<String, String>> {
        self.map_attributes(|node| node.get_string().map(str::to_string))
    }

    pub fn to_int_map(&self) -> Result<IndexMap<String, i64>> {
        self.map_attributes(DataNode::get_int)
    }

    pub fn to_float_map(&self) -> Result<IndexMap<String, f64>> {
        self.map_attributes(DataNode::get_float)
    }

    pub fn to_bool_map(&self) -> Result<IndexMap<String, bool>> {
        self.map_attributes(DataNode::get_bool)
    }

    pub fn to_string_collection(&self) -> Result<Vec<String>> {
        self.map_content(|node| node.get_string().map(str::to_string))
    }

    pub fn to_int_collection(&self) -> Result<Vec<i64>> {
        self.map_content(DataNode::get_int)
    }

    pub fn to_float_collection(&self) -> Result<Vec<f64>> {
        self.map_content(DataNode::get_float)
    }

    pub fn to_bool_collection(&self) -> Result<Vec<bool>> {
        self.map_content(DataNode::get_bool)
    }
}
