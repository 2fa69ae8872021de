//! A PLY (Polygon File Format) mesh decoder.
//!
//! PLY files carry a textual header describing a schema, followed by an
//! ASCII or raw binary (little- or big-endian) body. This crate locates
//! the header terminator in an untrusted byte stream, parses the header
//! into a typed schema, walks the body strictly in schema-declared
//! order, resolves non-standard property names into semantic roles, and
//! returns an owned [`Mesh`] with positions, optional normals / uvs /
//! colors, and triangle indices (quads are fan-decomposed).
//!
//! # Example
//!
//! ```rust
//! let ply_data = "ply
//! format ascii 1.0
//! element vertex 3
//! property float x
//! property float y
//! property float z
//! property uchar red
//! property uchar green
//! property uchar blue
//! element face 1
//! property list uchar int vertex_indices
//! end_header
//! 0 0 0 255 0 0
//! 1 0 0 0 255 0
//! 0 1 0 0 0 255
//! 3 0 1 2
//! ";
//!
//! let mesh = ply_mesh::parse_str(ply_data).unwrap();
//! assert_eq!(mesh.positions.len(), 3);
//! assert_eq!(mesh.indices, vec![[0, 1, 2]]);
//! assert_eq!(mesh.colors.as_ref().unwrap()[0], [1.0, 0.0, 0.0]);
//! ```
//!
//! Fetching bytes (filesystem, network) and turning the mesh into a
//! renderable GPU buffer are the caller's concern; parsing is
//! synchronous, single-pass, and operates on a fully resident buffer.

mod attribute;
mod decode;
mod error;
mod header;
mod mesh;
mod reader;

pub use error::PlyError;
pub use header::{extract_header, ElementDef, PlyFormat, PlyHeader, PropertyType, ScalarType};
pub use mesh::{FaceListPolicy, Mesh};

use std::collections::HashMap;

/// A configured PLY parser.
///
/// Configuration is applied before parsing; `parse` takes `&self`, so a
/// configured parser can serve independent parse calls on separate
/// threads without synchronization.
#[derive(Debug, Clone, Default)]
pub struct PlyParser {
    name_mapping: HashMap<String, String>,
    custom_mapping: HashMap<String, String>,
    face_policy: FaceListPolicy,
}

impl PlyParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename header property names before attribute resolution, e.g.
    /// mapping a producer's `vertex_x` onto `x`. Unmapped names pass
    /// through unchanged.
    pub fn set_property_name_mapping(&mut self, mapping: HashMap<String, String>) {
        self.name_mapping = mapping;
    }

    /// Request verbatim passthrough of non-standard scalar vertex
    /// properties into named [`Mesh::custom`] channels. Keys are
    /// property names (after renaming), values are output channel
    /// names. The core copies these values per vertex without
    /// interpreting them.
    pub fn set_custom_property_name_mapping(&mut self, mapping: HashMap<String, String>) {
        self.custom_mapping = mapping;
    }

    /// Choose what happens to face lists whose length is neither 3 nor
    /// 4. Defaults to [`FaceListPolicy::Drop`].
    pub fn set_face_list_policy(&mut self, policy: FaceListPolicy) {
        self.face_policy = policy;
    }

    /// Decode a PLY byte buffer (ASCII or binary body) into a mesh.
    pub fn parse(&self, bytes: &[u8]) -> Result<Mesh, PlyError> {
        let (header_text, payload_offset) = header::extract_header(bytes)?;
        let ply_header = PlyHeader::parse(&header_text, &self.name_mapping)?;

        let plans = ply_header
            .elements
            .iter()
            .map(|element| attribute::resolve_plan(element, &self.custom_mapping))
            .collect::<Result<Vec<_>, _>>()?;

        let mesh = decode::decode_body(
            &ply_header,
            &bytes[payload_offset..],
            &plans,
            self.face_policy,
        )?;
        log::debug!(
            "decoded {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Convenience path for pure-ASCII input.
    pub fn parse_str(&self, text: &str) -> Result<Mesh, PlyError> {
        self.parse(text.as_bytes())
    }
}

/// Decode a PLY byte buffer with default configuration.
pub fn parse(bytes: &[u8]) -> Result<Mesh, PlyError> {
    PlyParser::new().parse(bytes)
}

/// Decode an ASCII PLY string with default configuration.
pub fn parse_str(text: &str) -> Result<Mesh, PlyError> {
    PlyParser::new().parse_str(text)
}
