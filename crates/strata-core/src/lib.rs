//! Strata Core - Format-agnostic semi-structured data tree
//!
//! This crate provides the in-memory representation shared by every wire
//! format and by the schema binding layer:
//! - [`DataNode`]: a tagged tree node (object, collection, primitive, unknown)
//! - [`NodeType`]: the kind of a node
//! - [`PrimitiveValue`]: canonical string forms for scalars
//!
//! Primitive values are always stored as strings and parsed lazily when read
//! as numbers or booleans.
//!
//! ```
//! use strata_core::{DataNode, NodeType};
//!
//! let mut root = DataNode::object();
//! root.set("name", "crate").unwrap();
//! root.get_property(&["stats", "downloads"]).unwrap().set_value(42).unwrap();
//!
//! assert_eq!(root.get_path(&["stats", "downloads"]).unwrap().get_int().unwrap(), 42);
//! assert_eq!(root.get("stats").unwrap().node_type(), NodeType::Object);
//! ```

mod convert;
mod error;
mod node;
mod primitive;

pub use error::{Error, Result};
pub use node::{DataNode, NodeMap, NodeType};
pub use primitive::{format_f32, format_f64, PrimitiveValue};
