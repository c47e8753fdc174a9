//! Small math and color values with data encodings in [`handlers`](crate::handlers)

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// An RGBA color with channels in `0.0..=1.0`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Colors that can be written by name, as packed RGBA8888
pub const NAMED_COLORS: [(&str, u32); 10] = [
    ("green", 0x00ff00ff),
    ("red", 0xff0000ff),
    ("blue", 0x0000ffff),
    ("black", 0x000000ff),
    ("yellow", 0xffff00ff),
    ("orange", 0xffa500ff),
    ("white", 0xffffffff),
    ("purple", 0xa020f0ff),
    ("brown", 0x8b4513ff),
    ("gray", 0x7f7f7fff),
];

impl Color {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a `0xRRGGBBAA` value
    pub fn from_rgba8888(value: u32) -> Self {
        let channel = |shift: u32| ((value >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(24), channel(16), channel(8), channel(0))
    }

    /// Look up a named color, ignoring case
    ///
    /// ```
    /// use strata_schema::Color;
    ///
    /// assert_eq!(Color::named("White"), Some(Color::new(1.0, 1.0, 1.0, 1.0)));
    /// assert_eq!(Color::named("teal"), None);
    /// ```
    pub fn named(name: &str) -> Option<Self> {
        NAMED_COLORS
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, value)| Self::from_rgba8888(*value))
    }

    /// The name of this color if it is one of [`NAMED_COLORS`]
    pub fn name(&self) -> Option<&'static str> {
        NAMED_COLORS
            .iter()
            .find(|(_, value)| Self::from_rgba8888(*value) == *self)
            .map(|(name, _)| *name)
    }
}

/// Position, scale and rotation of an object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_color() {
        let orange = Color::from_rgba8888(0xffa500ff);
        assert_eq!(orange.r, 1.0);
        assert_eq!(orange.g, 165.0 / 255.0);
        assert_eq!(orange.b, 0.0);
        assert_eq!(orange.a, 1.0);
    }

    #[test]
    fn test_color_names() {
        for (name, _) in NAMED_COLORS {
            let color = Color::named(&name.to_uppercase()).unwrap();
            assert_eq!(color.name(), Some(name));
        }
        assert_eq!(Color::new(0.1, 0.2, 0.3, 1.0).name(), None);
    }

    #[test]
    fn test_default_transform() {
        let transform = Transform::default();
        assert_eq!(transform.scale, Vec3::ONE);
        assert_eq!(transform.position, Vec3::ZERO);
    }
}
