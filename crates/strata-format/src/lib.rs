//! Strata Format - Text codecs for strata data trees
//!
//! Every codec implements [`DataFormat`] and converts between wire text and
//! [`strata_core::DataNode`]:
//! - [`JsonFormat`]: JSON with compact or human readable output
//! - [`ObjFormat`]: Wavefront OBJ geometry (vertices, textures, normals, faces)
//!
//! Codec options can be built in code or loaded from RON through
//! [`FormatConfig`].
//!
//! ```
//! use strata_format::{DataFormat, JsonFormat, ObjFormat};
//!
//! let mesh = ObjFormat::lossless()
//!     .deserialize("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n")
//!     .unwrap();
//! let json = JsonFormat::compact().serialize(&mesh).unwrap();
//! assert!(json.starts_with(r#"{"vertices":[{"x":0.0,"y":0.0,"z":0.0}"#));
//! ```

mod config;
mod error;
mod format;
pub mod json;
pub mod obj;

pub use config::{FormatConfig, JsonOptions, ObjOptions};
pub use error::{Error, ParseError, Result};
pub use format::DataFormat;
pub use json::JsonFormat;
pub use obj::ObjFormat;
