//! Property handlers
//!
//! New encodings are added by pairing a load function with a convert function
//! through [`create`]; no new property type is needed. The composite handlers
//! here (vectors, colors, transforms) are built that way.

use crate::property::{PropertyHandler, ScalarValue};
use crate::values::{Color, Transform, Vec2, Vec3};
use crate::{DataObject, Error, Result};
use std::marker::PhantomData;
use strata_core::DataNode;

/// A handler made of two closures, see [`create`]
pub struct FnHandler<L, C> {
    load: L,
    convert: C,
}

impl<T, L, C> PropertyHandler<T> for FnHandler<L, C>
where
    L: Fn(&DataNode) -> Result<T>,
    C: Fn(&T) -> Result<DataNode>,
{
    fn load(&self, node: &DataNode) -> Result<T> {
        (self.load)(node)
    }

    fn convert(&self, value: &T) -> Result<DataNode> {
        (self.convert)(value)
    }
}

/// Pair a load function with a convert function
///
/// ```
/// use strata_core::DataNode;
/// use strata_schema::{handlers, Property};
///
/// // A percentage stored as "42%"
/// let percent = handlers::create(
///     |node: &DataNode| {
///         let text = node.get_string()?;
///         text.trim_end_matches('%')
///             .parse::<u8>()
///             .map_err(|_| strata_schema::Error::InvalidValue(text.to_string()))
///     },
///     |value: &u8| Ok(DataNode::from(format!("{}%", value))),
/// );
/// let mut volume: Property<u8> = Property::new("volume", percent);
/// volume.load_data(&DataNode::map([("volume", "42%")]), "settings").unwrap();
/// assert_eq!(volume.get(), Some(&42));
/// ```
pub fn create<T, L, C>(load: L, convert: C) -> FnHandler<L, C>
where
    L: Fn(&DataNode) -> Result<T>,
    C: Fn(&T) -> Result<DataNode>,
{
    FnHandler { load, convert }
}

/// Handler for values stored as one primitive node
pub struct ScalarHandler<T>(PhantomData<fn() -> T>);

impl<T> ScalarHandler<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for ScalarHandler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ScalarValue> PropertyHandler<T> for ScalarHandler<T> {
    fn load(&self, node: &DataNode) -> Result<T> {
        Ok(T::read(node)?)
    }

    fn convert(&self, value: &T) -> Result<DataNode> {
        Ok(value.write())
    }
}

/// Handler for nested [`DataObject`]s
///
/// Loading fills a copy of the property's current value (or a default
/// instance), so optional fields of the child keep their values.
pub struct NestedHandler<T>(PhantomData<fn() -> T>);

impl<T> NestedHandler<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for NestedHandler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DataObject + Clone + Default> PropertyHandler<T> for NestedHandler<T> {
    fn load(&self, node: &DataNode) -> Result<T> {
        self.load_into(node, None)
    }

    fn convert(&self, value: &T) -> Result<DataNode> {
        value.convert_to_data_node()
    }

    fn load_into(&self, node: &DataNode, current: Option<&T>) -> Result<T> {
        let mut value = current.cloned().unwrap_or_default();
        value.load_data(node)?;
        Ok(value)
    }
}

fn read_channel(node: &DataNode, key: &str) -> Result<f32> {
    match node.get(key) {
        Some(channel) => Ok(channel.get_float()? as f32),
        None => Ok(0.0),
    }
}

/// `{x, y}` with missing axes read as `0.0`
pub fn vector2() -> impl PropertyHandler<Vec2> {
    create(
        |node: &DataNode| Ok(Vec2::new(read_channel(node, "x")?, read_channel(node, "y")?)),
        |value: &Vec2| Ok(DataNode::map([("x", value.x), ("y", value.y)])),
    )
}

/// `{x, y, z}` with missing axes read as `0.0`
pub fn vector3() -> impl PropertyHandler<Vec3> {
    create(load_vec3, |value: &Vec3| Ok(convert_vec3(value)))
}

fn load_vec3(node: &DataNode) -> Result<Vec3> {
    Ok(Vec3::new(
        read_channel(node, "x")?,
        read_channel(node, "y")?,
        read_channel(node, "z")?,
    ))
}

fn convert_vec3(value: &Vec3) -> DataNode {
    DataNode::map([("x", value.x), ("y", value.y), ("z", value.z)])
}

/// A color name, or `{r, g, b, a}` with missing channels read as `0.0`
///
/// Named colors are written back by name.
pub fn color() -> impl PropertyHandler<Color> {
    create(load_color, |value: &Color| {
        Ok(match value.name() {
            Some(name) => DataNode::from(name),
            None => DataNode::map([("r", value.r), ("g", value.g), ("b", value.b), ("a", value.a)]),
        })
    })
}

fn load_color(node: &DataNode) -> Result<Color> {
    if node.is_object() {
        return Ok(Color::new(
            read_channel(node, "r")?,
            read_channel(node, "g")?,
            read_channel(node, "b")?,
            read_channel(node, "a")?,
        ));
    }
    let name = node.get_string()?;
    Color::named(name).ok_or_else(|| Error::InvalidValue(format!("unknown color '{}'", name)))
}

/// `{position, scale, rotation}`, each a `{x, y, z}` vector
///
/// A missing vector keeps its [`Transform::default`] value.
pub fn transform() -> impl PropertyHandler<Transform> {
    create(
        |node: &DataNode| {
            let mut transform = Transform::default();
            if let Some(position) = node.get("position") {
                transform.position = load_vec3(position)?;
            }
            if let Some(scale) = node.get("scale") {
                transform.scale = load_vec3(scale)?;
            }
            if let Some(rotation) = node.get("rotation") {
                transform.rotation = load_vec3(rotation)?;
            }
            Ok(transform)
        },
        |value: &Transform| {
            Ok(DataNode::map([
                ("position", convert_vec3(&value.position)),
                ("scale", convert_vec3(&value.scale)),
                ("rotation", convert_vec3(&value.rotation)),
            ]))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bindable, Property};

    #[test]
    fn test_vector2_missing_axis() {
        let handler = vector2();
        let value = handler.load(&DataNode::map([("x", 1.5)])).unwrap();
        assert_eq!(value, Vec2::new(1.5, 0.0));
        assert_eq!(
            handler.convert(&value).unwrap(),
            DataNode::map([("x", "1.5"), ("y", "0.0")])
        );
    }

    #[test]
    fn test_vector3_round_trip() {
        let handler = vector3();
        let value = Vec3::new(1.0, -2.0, 0.5);
        assert_eq!(handler.load(&handler.convert(&value).unwrap()).unwrap(), value);
    }

    #[test]
    fn test_color_by_name() {
        let handler = color();
        let purple = handler.load(&DataNode::from("Purple")).unwrap();
        assert_eq!(purple, Color::from_rgba8888(0xa020f0ff));
        assert_eq!(handler.convert(&purple).unwrap(), DataNode::from("purple"));
    }

    #[test]
    fn test_color_by_channels() {
        let handler = color();
        let color = handler.load(&DataNode::map([("r", 0.5), ("a", 1.0)])).unwrap();
        assert_eq!(color, Color::new(0.5, 0.0, 0.0, 1.0));

        let node = handler.convert(&color).unwrap();
        assert_eq!(node.get("g").unwrap().get_float().unwrap(), 0.0);
        assert_eq!(node.property_count(), 4);
    }

    #[test]
    fn test_unknown_color_name() {
        assert!(matches!(
            color().load(&DataNode::from("teal")),
            Err(Error::InvalidValue(_))
        ));
    }

    #[test]
    fn test_transform_defaults() {
        let node = DataNode::map([("position", DataNode::map([("y", 3.0)]))]);
        let value = transform().load(&node).unwrap();
        assert_eq!(value.position, Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(value.scale, Vec3::ONE);

        let written = transform().convert(&value).unwrap();
        assert_eq!(written.get_path(&["scale", "z"]).unwrap().get_float().unwrap(), 1.0);
    }

    #[test]
    fn test_composite_default_suppressed_structurally() {
        let property: Property<Vec2> = Property::new("offset", vector2())
            .optional()
            .with_default(Vec2::new(0.0, 0.0));
        let mut root = DataNode::object();
        Bindable::append_to(&property, &mut root).unwrap();
        assert!(!root.contains("offset"));
    }

    #[test]
    fn test_channel_coercion_error() {
        let mut tint: Property<Color> = Property::new("tint", color());
        let data = DataNode::map([("tint", DataNode::map([("r", "bright")]))]);
        assert!(matches!(
            tint.load_data(&data, "Sprite"),
            Err(Error::Coercion { ref key, .. }) if key == "tint"
        ));
    }
}
