//! The codec contract shared by every wire format

use crate::Result;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use strata_core::DataNode;
use tracing::debug;

/// A symmetric text codec over [`DataNode`] trees
///
/// Implementors provide `serialize` and `deserialize`; the stream and file
/// helpers are built on top of them. A failed call never yields a partial
/// tree.
pub trait DataFormat {
    /// Render a tree as text
    fn serialize(&self, node: &DataNode) -> Result<String>;

    /// Parse text into a tree
    fn deserialize(&self, text: &str) -> Result<DataNode>;

    /// Read all of `reader` and parse it
    fn read_from(&self, reader: &mut dyn Read) -> Result<DataNode> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.deserialize(&text)
    }

    /// Serialize `node` into `writer`
    fn write_to(&self, node: &DataNode, writer: &mut dyn Write) -> Result<()> {
        writer.write_all(self.serialize(node)?.as_bytes())?;
        Ok(())
    }

    /// Read and parse a file
    fn load_file(&self, path: &Path) -> Result<DataNode> {
        let text = fs::read_to_string(path)?;
        debug!(path = %path.display(), bytes = text.len(), "loading data file");
        self.deserialize(&text)
    }

    /// Serialize `node` into a file, replacing its content
    fn save_file(&self, node: &DataNode, path: &Path) -> Result<()> {
        let text = self.serialize(node)?;
        debug!(path = %path.display(), bytes = text.len(), "saving data file");
        fs::write(path, text)?;
        Ok(())
    }
}
