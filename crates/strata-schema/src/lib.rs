//! Strata Schema - Typed property binding and blueprints over data trees
//!
//! This crate maps Rust values to and from [`strata_core::DataNode`] trees:
//! - [`Property`]: a typed binding between a value and one attribute key
//! - [`handlers`]: encodings for scalars, vectors, colors, transforms and
//!   nested objects
//! - [`DataObject`]: objects that load and persist through their properties
//! - [`Blueprint`]: factories building objects with components from data
//! - [`TypeRegistry`]: construction of types named in data
//! - [`BlueprintLibrary`]: blueprints loaded from a directory tree
//!
//! ```
//! use strata_core::DataNode;
//! use strata_schema::{handlers, Color, Property};
//!
//! let mut tint: Property<Color> = Property::new("tint", handlers::color())
//!     .optional()
//!     .with_default(Color::named("white").unwrap());
//!
//! tint.load_data(&DataNode::map([("tint", "orange")]), "sprite").unwrap();
//! assert_eq!(tint.get(), Color::named("orange").as_ref());
//!
//! let mut root = DataNode::object();
//! tint.append_to(&mut root).unwrap();
//! assert_eq!(root.get("tint").unwrap().get_string().unwrap(), "orange");
//! ```

mod blueprint;
mod error;
pub mod handlers;
mod library;
mod object;
mod property;
mod registry;
mod values;

pub use blueprint::{
    Blueprint, ComponentBlueprint, ComponentHost, ComponentTypes, BLUEPRINT_CLASS, CLASS,
    COMPONENTS,
};
pub use error::{Error, Result};
pub use library::{BlueprintFactory, BlueprintLibrary, BLUEPRINT_EXTENSION};
pub use object::DataObject;
pub use property::{Bindable, Property, PropertyHandler, ScalarValue, ENABLE};
pub use registry::{InstantiationError, Instantiator, TypeRegistry};
pub use values::{Color, Transform, Vec2, Vec3, NAMED_COLORS};
