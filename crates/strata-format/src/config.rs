//! Codec configuration
//!
//! Whitespace options for the JSON printer and line retention for the OBJ
//! parser. A whole [`FormatConfig`] can be loaded from a RON document;
//! missing fields fall back to their defaults.

use crate::{JsonFormat, ObjFormat, Result};
use serde::{Deserialize, Serialize};

/// Whitespace used by the JSON printer
///
/// When both symbols are empty the output has no whitespace at all.
///
/// # Example
///
/// ```
/// use strata_format::JsonOptions;
///
/// assert!(JsonOptions::compact().is_compact());
/// assert!(!JsonOptions::default().is_compact());
/// assert_eq!(JsonOptions::default().indent, "\t");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    /// Repeated once per nesting level
    pub indent: String,
    /// Written before every entry and before a closing bracket
    pub newline: String,
}

impl JsonOptions {
    /// Tab indentation, one entry per line
    pub fn human_readable() -> Self {
        Self::new("\t", "\n")
    }

    /// No whitespace
    pub fn compact() -> Self {
        Self::new("", "")
    }

    /// Create options with custom symbols
    pub fn new(indent: impl Into<String>, newline: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
            newline: newline.into(),
        }
    }

    /// Check if these options produce whitespace-free output
    pub fn is_compact(&self) -> bool {
        self.indent.is_empty() && self.newline.is_empty()
    }
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self::human_readable()
    }
}

/// Options for the OBJ codec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjOptions {
    /// Keep comment, blank and unrecognized lines so they can be written back
    /// at their original rows
    pub keep_unknown: bool,
}

impl Default for ObjOptions {
    fn default() -> Self {
        Self { keep_unknown: true }
    }
}

/// Configuration for every codec in this crate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub json: JsonOptions,
    pub obj: ObjOptions,
}

impl FormatConfig {
    /// Load a configuration from a RON string
    ///
    /// ```
    /// use strata_format::FormatConfig;
    ///
    /// let config = FormatConfig::from_ron_str("(obj: (keep_unknown: false))").unwrap();
    /// assert!(!config.obj.keep_unknown);
    /// assert_eq!(config.json.indent, "\t");
    /// ```
    pub fn from_ron_str(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }

    /// Build the JSON codec described by this configuration
    pub fn json_format(&self) -> JsonFormat {
        JsonFormat::new(self.json.clone())
    }

    /// Build the OBJ codec described by this configuration
    pub fn obj_format(&self) -> ObjFormat {
        ObjFormat::new(self.obj.clone())
    }
}
