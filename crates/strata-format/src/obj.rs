//! Wavefront OBJ codec
//!
//! Only geometry is understood: vertices (`v`), texture coordinates (`vt`),
//! vertex normals (`vn`) and polygonal faces (`f`). The parsed tree looks
//! like this:
//!
//! ```text
//! {
//!   vertices: [{x, y, z[, w]}, ..],
//!   textures: [{x, y}, ..],          // only when a `vt` line was seen
//!   normals:  [{x, y, z}, ..],       // only when a `vn` line was seen
//!   faces:    [[{vertex[, texture][, normal]}, ..], ..],
//!   comments: {"<row>": "<line>", ..} // lossless mode only
//! }
//! ```
//!
//! Face indices are 1-based on the wire and 0-based in the tree.

use crate::{DataFormat, Error, ObjOptions, ParseError, Result};
use strata_core::{format_f64, DataNode, NodeMap};

pub const VERTICES: &str = "vertices";
pub const NORMALS: &str = "normals";
pub const TEXTURES: &str = "textures";
pub const FACES: &str = "faces";
pub const COMMENTS: &str = "comments";

pub const VERTEX: &str = "vertex";
pub const TEXTURE: &str = "texture";
pub const NORMAL: &str = "normal";

/// Wavefront OBJ implementation of [`DataFormat`]
#[derive(Debug, Clone, Default)]
pub struct ObjFormat {
    options: ObjOptions,
}

impl ObjFormat {
    pub fn new(options: ObjOptions) -> Self {
        Self { options }
    }

    /// Codec keeping comment and unrecognized lines for re-serialization
    pub fn lossless() -> Self {
        Self::new(ObjOptions { keep_unknown: true })
    }

    /// Codec dropping everything except geometry
    pub fn geometry_only() -> Self {
        Self::new(ObjOptions { keep_unknown: false })
    }

    pub fn options(&self) -> &ObjOptions {
        &self.options
    }
}

impl DataFormat for ObjFormat {
    fn serialize(&self, node: &DataNode) -> Result<String> {
        Printer::new(node)?.print()
    }

    fn deserialize(&self, text: &str) -> Result<DataNode> {
        let mut geometry = Geometry::default();
        for (row, line) in text.lines().enumerate() {
            geometry.parse_line(row, line, self.options.keep_unknown)?;
        }
        Ok(geometry.into_node())
    }
}

/// A whitespace separated token with its 1-based column
#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    column: usize,
    text: &'a str,
}

fn tokenize(line: &str) -> Vec<Token<'_>> {
    let start = line.as_ptr() as usize;
    line.split_whitespace()
        .map(|text| Token {
            column: text.as_ptr() as usize - start + 1,
            text,
        })
        .collect()
}

#[derive(Default)]
struct Geometry {
    vertices: Vec<DataNode>,
    textures: Option<Vec<DataNode>>,
    normals: Option<Vec<DataNode>>,
    faces: Vec<DataNode>,
    comments: NodeMap,
}

impl Geometry {
    fn parse_line(&mut self, row: usize, line: &str, keep_unknown: bool) -> Result<()> {
        let line_no = row + 1;
        let tokens = tokenize(line);
        let Some(keyword) = tokens.first() else {
            self.keep(row, line, keep_unknown);
            return Ok(());
        };

        match keyword.text.to_ascii_lowercase().as_str() {
            "v" => {
                let vertex = parse_vertex(line_no, &tokens)?;
                self.vertices.push(vertex);
            }
            "vt" => {
                let texture = parse_texture(line_no, &tokens)?;
                self.textures.get_or_insert_with(Vec::new).push(texture);
            }
            "vn" => {
                let normal = parse_normal(line_no, &tokens)?;
                self.normals.get_or_insert_with(Vec::new).push(normal);
            }
            "f" => {
                let face = self.parse_face(line_no, &tokens)?;
                self.faces.push(face);
            }
            _ => self.keep(row, line, keep_unknown),
        }
        Ok(())
    }

    // Comments, blank lines and unsupported statements
    fn keep(&mut self, row: usize, line: &str, keep_unknown: bool) {
        if keep_unknown {
            self.comments
                .insert(row.to_string(), DataNode::Primitive(line.to_string()));
        }
    }

    fn parse_face(&self, line_no: usize, tokens: &[Token<'_>]) -> Result<DataNode> {
        if tokens.len() < 4 {
            return Err(ParseError::new(
                line_no,
                tokens[0].column,
                format!("face expects at least 3 vertices, found {}", tokens.len() - 1),
            )
            .into());
        }
        let mut face = Vec::with_capacity(tokens.len() - 1);
        for token in &tokens[1..] {
            face.push(self.parse_face_vertex(line_no, *token)?);
        }
        Ok(DataNode::Collection(face))
    }

    /// Parse `v`, `v/vt`, `v/vt/vn` or `v//vn`
    fn parse_face_vertex(&self, line_no: usize, token: Token<'_>) -> Result<DataNode> {
        let parts: Vec<&str> = token.text.split('/').collect();
        let malformed = || {
            Error::from(ParseError::new(
                line_no,
                token.column,
                format!("malformed face vertex '{}'", token.text),
            ))
        };

        let mut map = NodeMap::new();
        let vertex = parts.first().copied().filter(|p| !p.is_empty()).ok_or_else(malformed)?;
        let index = resolve_index(line_no, token.column, vertex, VERTEX, self.vertices.len())?;
        map.insert(VERTEX.to_string(), DataNode::from(index));

        match parts.len() {
            1 => {}
            2 | 3 => {
                if !parts[1].is_empty() {
                    let count = self.textures.as_ref().map_or(0, Vec::len);
                    let index = resolve_index(line_no, token.column, parts[1], TEXTURE, count)?;
                    map.insert(TEXTURE.to_string(), DataNode::from(index));
                } else if parts.len() == 2 {
                    return Err(malformed());
                }
                if parts.len() == 3 {
                    if parts[2].is_empty() {
                        return Err(malformed());
                    }
                    let count = self.normals.as_ref().map_or(0, Vec::len);
                    let index = resolve_index(line_no, token.column, parts[2], NORMAL, count)?;
                    map.insert(NORMAL.to_string(), DataNode::from(index));
                }
            }
            _ => return Err(malformed()),
        }
        Ok(DataNode::Object(map))
    }

    fn into_node(self) -> DataNode {
        let mut root = NodeMap::new();
        root.insert(VERTICES.to_string(), DataNode::Collection(self.vertices));
        if let Some(textures) = self.textures {
            root.insert(TEXTURES.to_string(), DataNode::Collection(textures));
        }
        if let Some(normals) = self.normals {
            root.insert(NORMALS.to_string(), DataNode::Collection(normals));
        }
        root.insert(FACES.to_string(), DataNode::Collection(self.faces));
        if !self.comments.is_empty() {
            root.insert(COMMENTS.to_string(), DataNode::Object(self.comments));
        }
        DataNode::Object(root)
    }
}

/// Convert a 1-based (or negative, end-relative) wire index into a 0-based
/// index into the `count` elements defined so far
fn resolve_index(
    line_no: usize,
    column: usize,
    text: &str,
    element: &'static str,
    count: usize,
) -> Result<usize> {
    let index: i64 = text.parse().map_err(|_| {
        ParseError::new(line_no, column, format!("invalid {} index '{}'", element, text))
    })?;
    let resolved = if index > 0 {
        index - 1
    } else {
        count as i64 + index
    };
    if index == 0 || resolved < 0 || resolved >= count as i64 {
        return Err(Error::IndexBounds {
            line: line_no,
            element,
            index,
            count,
        });
    }
    Ok(resolved as usize)
}

fn parse_coordinate(line_no: usize, token: Token<'_>) -> Result<DataNode> {
    token
        .text
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| DataNode::Primitive(format_f64(value)))
        .ok_or_else(|| {
            ParseError::new(
                line_no,
                token.column,
                format!("expected a number, found '{}'", token.text),
            )
            .into()
        })
}

fn coordinates(line_no: usize, names: &[&str], tokens: &[Token<'_>]) -> Result<DataNode> {
    let mut map = NodeMap::new();
    for (name, token) in names.iter().zip(tokens) {
        map.insert((*name).to_string(), parse_coordinate(line_no, *token)?);
    }
    Ok(DataNode::Object(map))
}

fn arity_error(line_no: usize, keyword: Token<'_>, expected: &str, found: usize) -> Error {
    ParseError::new(
        line_no,
        keyword.column,
        format!("'{}' expects {} coordinates, found {}", keyword.text, expected, found),
    )
    .into()
}

// v x y z [w]
fn parse_vertex(line_no: usize, tokens: &[Token<'_>]) -> Result<DataNode> {
    let found = tokens.len() - 1;
    if found < 3 {
        return Err(arity_error(line_no, tokens[0], "at least 3", found));
    }
    // Anything past w (such as vertex colors) is ignored
    let names: &[&str] = if found == 4 { &["x", "y", "z", "w"] } else { &["x", "y", "z"] };
    coordinates(line_no, names, &tokens[1..])
}

// vn x y z
fn parse_normal(line_no: usize, tokens: &[Token<'_>]) -> Result<DataNode> {
    let found = tokens.len() - 1;
    if found != 3 {
        return Err(arity_error(line_no, tokens[0], "exactly 3", found));
    }
    coordinates(line_no, &["x", "y", "z"], &tokens[1..])
}

// vt u [v [w]]
fn parse_texture(line_no: usize, tokens: &[Token<'_>]) -> Result<DataNode> {
    let found = tokens.len() - 1;
    if !(1..=3).contains(&found) {
        return Err(arity_error(line_no, tokens[0], "1 to 3", found));
    }
    let mut texture = coordinates(line_no, &["x", "y"], &tokens[1..])?;
    if !texture.contains("y") {
        texture.set("y", DataNode::Primitive(format_f64(0.0)))?;
    }
    Ok(texture)
}

/// Writes sections in the fixed order vertices, textures, normals, faces,
/// re-emitting kept lines whenever the row counter reaches their row
struct Printer<'a> {
    root: &'a DataNode,
    comments: Option<&'a DataNode>,
    out: String,
    row: usize,
}

impl<'a> Printer<'a> {
    fn new(root: &'a DataNode) -> Result<Self> {
        if !root.is_object() {
            return Err(Error::InvalidNode(format!(
                "OBJ data must be an object, found {}",
                root.node_type()
            )));
        }
        for key in [VERTICES, FACES] {
            if !root.contains(key) {
                return Err(Error::InvalidNode(format!("OBJ data must contain '{}'", key)));
            }
        }
        Ok(Self {
            root,
            comments: root.get(COMMENTS),
            out: String::new(),
            row: 0,
        })
    }

    fn section(&self, key: &str) -> Option<&'a DataNode> {
        self.root.get(key)
    }

    fn print(mut self) -> Result<String> {
        let has_textures = self.section(TEXTURES).is_some_and(|n| n.content_count() > 0);
        let has_normals = self.section(NORMALS).is_some_and(|n| n.content_count() > 0);

        if let Some(vertices) = self.section(VERTICES) {
            self.write_section(vertices, write_vertex)?;
        }
        if let Some(textures) = self.section(TEXTURES) {
            self.write_section(textures, write_texture)?;
        }
        if let Some(normals) = self.section(NORMALS) {
            self.write_section(normals, write_normal)?;
        }
        if let Some(faces) = self.section(FACES) {
            self.write_section(faces, |out, face| {
                write_face(out, face, has_textures, has_normals)
            })?;
        }
        self.flush_remaining_comments()?;
        Ok(self.out)
    }

    fn write_section(
        &mut self,
        section: &DataNode,
        write: impl Fn(&mut String, &DataNode) -> Result<()>,
    ) -> Result<()> {
        self.write_comments()?;
        for element in section.to_collection()? {
            write(&mut self.out, element)?;
            self.out.push('\n');
            self.row += 1;
            self.write_comments()?;
        }
        Ok(())
    }

    fn write_comments(&mut self) -> Result<()> {
        let Some(comments) = self.comments else {
            return Ok(());
        };
        while let Some(comment) = comments.get(&self.row.to_string()) {
            self.out.push_str(comment.get_string()?);
            self.out.push('\n');
            self.row += 1;
        }
        Ok(())
    }

    // Kept lines past the end of the geometry (or past a gap in the rows)
    fn flush_remaining_comments(&mut self) -> Result<()> {
        let Some(comments) = self.comments else {
            return Ok(());
        };
        let mut remaining: Vec<(usize, &str)> = Vec::new();
        for (key, comment) in comments.properties() {
            if let Ok(row) = key.parse::<usize>() {
                if row >= self.row {
                    remaining.push((row, comment.get_string()?));
                }
            }
        }
        remaining.sort_by_key(|(row, _)| *row);
        for (_, comment) in remaining {
            self.out.push_str(comment);
            self.out.push('\n');
        }
        Ok(())
    }
}

fn coordinate(node: &DataNode, key: &str) -> Result<String> {
    let value = node
        .get(key)
        .ok_or_else(|| Error::InvalidNode(format!("missing coordinate '{}'", key)))?;
    Ok(format_f64(value.get_float()?))
}

fn write_vertex(out: &mut String, vertex: &DataNode) -> Result<()> {
    out.push_str(&format!(
        "v {} {} {}",
        coordinate(vertex, "x")?,
        coordinate(vertex, "y")?,
        coordinate(vertex, "z")?
    ));
    if let Some(w) = vertex.get("w") {
        let w = w.get_float()?;
        if w != 1.0 {
            out.push(' ');
            out.push_str(&format_f64(w));
        }
    }
    Ok(())
}

fn write_texture(out: &mut String, texture: &DataNode) -> Result<()> {
    out.push_str(&format!(
        "vt {} {}",
        coordinate(texture, "x")?,
        coordinate(texture, "y")?
    ));
    Ok(())
}

fn write_normal(out: &mut String, normal: &DataNode) -> Result<()> {
    out.push_str(&format!(
        "vn {} {} {}",
        coordinate(normal, "x")?,
        coordinate(normal, "y")?,
        coordinate(normal, "z")?
    ));
    Ok(())
}

fn wire_index(face_vertex: &DataNode, key: &str) -> Result<i64> {
    let index = face_vertex
        .get(key)
        .ok_or_else(|| Error::InvalidNode(format!("face vertex is missing '{}'", key)))?;
    Ok(index.get_int()? + 1)
}

fn write_face(out: &mut String, face: &DataNode, has_textures: bool, has_normals: bool) -> Result<()> {
    out.push('f');
    for face_vertex in face.to_collection()? {
        let vertex = wire_index(face_vertex, VERTEX)?;
        let entry = match (has_textures, has_normals) {
            (true, true) => format!(
                "{}/{}/{}",
                vertex,
                wire_index(face_vertex, TEXTURE)?,
                wire_index(face_vertex, NORMAL)?
            ),
            (true, false) => format!("{}/{}", vertex, wire_index(face_vertex, TEXTURE)?),
            (false, true) => format!("{}//{}", vertex, wire_index(face_vertex, NORMAL)?),
            (false, false) => vertex.to_string(),
        };
        out.push(' ');
        out.push_str(&entry);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_vertex(vertex: i64, texture: Option<i64>, normal: Option<i64>) -> DataNode {
        let mut node = DataNode::map([(VERTEX, vertex)]);
        if let Some(texture) = texture {
            node.set(TEXTURE, texture).unwrap();
        }
        if let Some(normal) = normal {
            node.set(NORMAL, normal).unwrap();
        }
        node
    }

    fn point(x: f64, y: f64, z: f64) -> DataNode {
        DataNode::map([("x", x), ("y", y), ("z", z)])
    }

    #[test]
    fn test_triangle_scenario() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n";
        let node = ObjFormat::lossless().deserialize(text).unwrap();

        let vertices = node.get(VERTICES).unwrap();
        assert_eq!(vertices.content_count(), 3);
        assert_eq!(vertices.get_at(1).unwrap(), &point(1.0, 0.0, 0.0));

        let face = node.get(FACES).unwrap().get_at(0).unwrap();
        let indices: Vec<i64> = face
            .iter()
            .map(|v| v.get(VERTEX).unwrap().get_int().unwrap())
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(!node.contains(NORMALS));
        assert!(!node.contains(COMMENTS));

        assert_eq!(
            ObjFormat::lossless().serialize(&node).unwrap(),
            "v 0.0 0.0 0.0\nv 1.0 0.0 0.0\nv 1.0 1.0 0.0\nf 1 2 3\n"
        );
    }

    #[test]
    fn test_empty_input_has_required_sections() {
        let node = ObjFormat::lossless().deserialize("").unwrap();
        assert_eq!(node.get(VERTICES).unwrap().content_count(), 0);
        assert_eq!(node.get(FACES).unwrap().content_count(), 0);
        assert_eq!(ObjFormat::lossless().serialize(&node).unwrap(), "");
    }

    #[test]
    fn test_lossless_keeps_comment_rows() {
        let text = "# corner\nv 0.0 0.0 0.0\nv 1.0 0.0 0.0\n\n# top\nv 1.0 1.0 0.0\nf 1 2 3\no name\n";
        let node = ObjFormat::lossless().deserialize(text).unwrap();

        let comments = node.get(COMMENTS).unwrap().to_string_map().unwrap();
        assert_eq!(comments.len(), 4);
        assert_eq!(comments["0"], "# corner");
        assert_eq!(comments["3"], "");
        assert_eq!(comments["7"], "o name");

        assert_eq!(ObjFormat::lossless().serialize(&node).unwrap(), text);
    }

    #[test]
    fn test_geometry_only_drops_comments() {
        let text = "# corner\nv 0 0 0\nv 1 0 0\nv 1 1 0\ns off\nf 1 2 3\n";
        let node = ObjFormat::geometry_only().deserialize(text).unwrap();
        assert!(!node.contains(COMMENTS));
        assert_eq!(
            ObjFormat::geometry_only().serialize(&node).unwrap(),
            "v 0.0 0.0 0.0\nv 1.0 0.0 0.0\nv 1.0 1.0 0.0\nf 1 2 3\n"
        );
    }

    #[test]
    fn test_comment_rows_past_geometry_are_flushed() {
        let mut node = ObjFormat::lossless().deserialize("v 0 0 0\n").unwrap();
        node.get_property(&[COMMENTS]).unwrap().set("5", "# trailing").unwrap();
        assert_eq!(
            ObjFormat::lossless().serialize(&node).unwrap(),
            "v 0.0 0.0 0.0\n# trailing\n"
        );
    }

    #[test]
    fn test_full_face_grammar() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nvt 0 0\nvt 1\nvt 1 1\nvn 0 0 1\nf 1/1/1 2/2/1 3/3/1\n";
        let node = ObjFormat::lossless().deserialize(text).unwrap();

        let textures = node.get(TEXTURES).unwrap();
        assert_eq!(textures.get_at(1).unwrap().get("y").unwrap().get_string().unwrap(), "0.0");

        let face = node.get(FACES).unwrap().get_at(0).unwrap();
        assert_eq!(face.get_at(1).unwrap(), &face_vertex(1, Some(1), Some(0)));

        assert_eq!(
            ObjFormat::lossless().serialize(&node).unwrap(),
            "v 0.0 0.0 0.0\nv 1.0 0.0 0.0\nv 1.0 1.0 0.0\nvt 0.0 0.0\nvt 1.0 0.0\nvt 1.0 1.0\nvn 0.0 0.0 1.0\nf 1/1/1 2/2/1 3/3/1\n"
        );
    }

    #[test]
    fn test_normals_only_grammar() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let node = ObjFormat::lossless().deserialize(text).unwrap();
        let face = node.get(FACES).unwrap().get_at(0).unwrap();
        assert_eq!(face.get_at(2).unwrap(), &face_vertex(2, None, Some(0)));
        assert!(ObjFormat::lossless()
            .serialize(&node)
            .unwrap()
            .ends_with("vn 0.0 0.0 1.0\nf 1//1 2//1 3//1\n"));
    }

    #[test]
    fn test_texture_only_grammar() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nvt 0 0\nf 1/1 2/1 3/1\n";
        let node = ObjFormat::lossless().deserialize(text).unwrap();
        let face = node.get(FACES).unwrap().get_at(0).unwrap();
        assert_eq!(face.get_at(2).unwrap(), &face_vertex(2, Some(0), None));
        assert!(ObjFormat::lossless()
            .serialize(&node)
            .unwrap()
            .ends_with("f 1/1 2/1 3/1\n"));
    }

    #[test]
    fn test_negative_indices() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf -3 -2 -1\n";
        let node = ObjFormat::lossless().deserialize(text).unwrap();
        let face = node.get(FACES).unwrap().get_at(0).unwrap();
        assert_eq!(face.get_at(0).unwrap(), &face_vertex(0, None, None));
        assert_eq!(face.get_at(2).unwrap(), &face_vertex(2, None, None));
    }

    #[test]
    fn test_forward_reference_fails() {
        let text = "v 0 0 0\nf 1 2 3\nv 1 0 0\nv 1 1 0\n";
        let err = ObjFormat::lossless().deserialize(text).unwrap_err();
        assert!(matches!(
            err,
            Error::IndexBounds {
                line: 2,
                element: VERTEX,
                index: 2,
                count: 1
            }
        ));
    }

    #[test]
    fn test_zero_index_fails() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 0 1 2\n";
        assert!(matches!(
            ObjFormat::lossless().deserialize(text),
            Err(Error::IndexBounds { index: 0, .. })
        ));
    }

    #[test]
    fn test_vertex_w() {
        let text = "v 1 2 3 1\nv 1 2 3 0.5\n";
        let node = ObjFormat::lossless().deserialize(text).unwrap();
        assert_eq!(
            node.get(VERTICES).unwrap().get_at(1).unwrap().get("w").unwrap().get_float().unwrap(),
            0.5
        );
        assert_eq!(
            ObjFormat::lossless().serialize(&node).unwrap(),
            "v 1.0 2.0 3.0\nv 1.0 2.0 3.0 0.5\n"
        );
    }

    #[test]
    fn test_malformed_lines() {
        let format = ObjFormat::lossless();

        let err = format.deserialize("v 1 2\n").unwrap_err();
        assert_eq!(err.parse_error().map(|e| (e.line, e.column)), Some((1, 1)));

        let err = format.deserialize("v 0 0 0\nv 1 abc 0\n").unwrap_err();
        assert_eq!(err.parse_error().map(|e| (e.line, e.column)), Some((2, 5)));

        assert!(format.deserialize("vn 0 1\n").is_err());
        assert!(format.deserialize("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2\n").is_err());
        assert!(format.deserialize("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1/ 2 3\n").is_err());
        assert!(format.deserialize("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1/1/1/1 2 3\n").is_err());
    }

    #[test]
    fn test_serialize_requires_sections() {
        let node = DataNode::map([(VERTICES, DataNode::collection())]);
        assert!(matches!(
            ObjFormat::lossless().serialize(&node),
            Err(Error::InvalidNode(_))
        ));
        assert!(ObjFormat::lossless().serialize(&DataNode::collection()).is_err());
    }

    #[test]
    fn test_serialize_missing_face_attribute() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let mut node = ObjFormat::lossless().deserialize(text).unwrap();
        node.get_path_mut(&[FACES])
            .unwrap()
            .add(vec![face_vertex(0, None, None)])
            .unwrap();
        assert!(matches!(
            ObjFormat::lossless().serialize(&node),
            Err(Error::InvalidNode(_))
        ));
    }
}
