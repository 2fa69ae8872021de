use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

/// Errors that can occur while decoding a PLY file.
///
/// Every variant is fatal to the enclosing parse call: a call returns
/// either a fully populated [`Mesh`](crate::Mesh) or exactly one error.
#[derive(Error, Debug)]
pub enum PlyError {
    #[error("No end_header terminator found in input")]
    HeaderNotFound,

    #[error("Invalid PLY header at line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },

    #[error("Unknown scalar type: {0}")]
    UnknownScalarType(String),

    #[error("Unsupported PLY format: {0}")]
    UnsupportedFormat(String),

    #[error("Element '{0}' is missing one or more position properties")]
    MissingPositionAttribute(String),

    #[error("List property bound to a vertex attribute on element '{0}'")]
    ListPropertyOnVertexElement(String),

    #[error("Payload ended unexpectedly at offset {offset}")]
    TruncatedPayload { offset: usize },

    #[error("Face with {0} vertices is not supported")]
    UnsupportedFaceSize(usize),

    #[error("Face index {index} out of bounds for {vertex_count} vertices")]
    FaceIndexOutOfBounds { index: u32, vertex_count: usize },

    #[error("Error parsing integer: {0}")]
    ParseIntError(#[from] ParseIntError),

    #[error("Error parsing float: {0}")]
    ParseFloatError(#[from] ParseFloatError),
}

impl PlyError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        PlyError::MalformedHeader {
            line,
            reason: reason.into(),
        }
    }
}
