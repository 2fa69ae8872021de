//! Header extraction and parsing.
//!
//! A PLY file opens with a textual header that declares the body format
//! and an ordered list of elements, each with an ordered list of
//! properties. The header ends with the literal `end_header` token;
//! the body begins immediately after it.

use std::collections::HashMap;

use crate::PlyError;

/// The literal token that terminates a PLY header.
const HEADER_TERMINATOR: &[u8] = b"end_header";

/// PLY body format (ascii or binary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

/// PLY scalar data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl ScalarType {
    /// Parse a scalar type name. Each of the 8 type families has two
    /// accepted spellings (`char`/`int8`, `float`/`float32`, ...).
    pub fn parse(s: &str) -> Result<Self, PlyError> {
        match s {
            "char" | "int8" => Ok(ScalarType::I8),
            "uchar" | "uint8" => Ok(ScalarType::U8),
            "short" | "int16" => Ok(ScalarType::I16),
            "ushort" | "uint16" => Ok(ScalarType::U16),
            "int" | "int32" => Ok(ScalarType::I32),
            "uint" | "uint32" => Ok(ScalarType::U32),
            "float" | "float32" => Ok(ScalarType::F32),
            "double" | "float64" => Ok(ScalarType::F64),
            _ => Err(PlyError::UnknownScalarType(s.to_string())),
        }
    }

    /// Encoded width in bytes for binary bodies.
    pub fn size_bytes(&self) -> usize {
        match self {
            ScalarType::I8 | ScalarType::U8 => 1,
            ScalarType::I16 | ScalarType::U16 => 2,
            ScalarType::I32 | ScalarType::U32 | ScalarType::F32 => 4,
            ScalarType::F64 => 8,
        }
    }
}

/// PLY property definition.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyType {
    /// A scalar property holding a single value per record.
    Scalar { data_type: ScalarType, name: String },
    /// A list property: a length prefix of `count_type` followed by
    /// that many `data_type` items.
    List {
        count_type: ScalarType,
        data_type: ScalarType,
        name: String,
    },
}

impl PropertyType {
    pub fn name(&self) -> &str {
        match self {
            PropertyType::Scalar { name, .. } => name,
            PropertyType::List { name, .. } => name,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, PropertyType::List { .. })
    }
}

/// PLY element definition (e.g. vertex, face).
///
/// Property order is the exact decode order and is never reordered.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDef {
    pub name: String,
    pub count: usize,
    pub properties: Vec<PropertyType>,
}

impl ElementDef {
    /// Index of the property with the given (post-aliasing) name.
    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name() == name)
    }
}

/// Parsed PLY header: body format plus ordered element definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct PlyHeader {
    pub format: PlyFormat,
    pub version: String,
    pub elements: Vec<ElementDef>,
    pub comments: Vec<String>,
    pub obj_info: Vec<String>,
}

impl PlyHeader {
    /// Get an element definition by name.
    pub fn get_element(&self, name: &str) -> Option<&ElementDef> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Parse header text into a schema.
    ///
    /// Property names are passed through `aliases` before being stored;
    /// unmapped names pass through unchanged. Unrecognized directives
    /// are ignored.
    pub fn parse(text: &str, aliases: &HashMap<String, String>) -> Result<Self, PlyError> {
        let mut format = None;
        let mut version = String::new();
        let mut elements: Vec<ElementDef> = Vec::new();
        let mut comments = Vec::new();
        let mut obj_info = Vec::new();

        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "end_header" {
                break;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts[0] {
                "format" => {
                    if parts.len() < 3 {
                        return Err(PlyError::malformed(line_no, "Invalid format line"));
                    }
                    format = Some(match parts[1] {
                        "ascii" => PlyFormat::Ascii,
                        "binary_little_endian" => PlyFormat::BinaryLittleEndian,
                        "binary_big_endian" => PlyFormat::BinaryBigEndian,
                        other => return Err(PlyError::UnsupportedFormat(other.to_string())),
                    });
                    version = parts[2].to_string();
                }
                "comment" => {
                    comments.push(parts[1..].join(" "));
                }
                "obj_info" => {
                    obj_info.push(parts[1..].join(" "));
                }
                "element" => {
                    if parts.len() < 3 {
                        return Err(PlyError::malformed(line_no, "Invalid element line"));
                    }
                    let count = parts[2].parse::<usize>().map_err(|_| {
                        PlyError::malformed(
                            line_no,
                            format!("Invalid element count: {}", parts[2]),
                        )
                    })?;
                    elements.push(ElementDef {
                        name: parts[1].to_string(),
                        count,
                        properties: Vec::new(),
                    });
                }
                "property" => {
                    let element = elements.last_mut().ok_or_else(|| {
                        PlyError::malformed(line_no, "Property declared before any element")
                    })?;

                    let property = if parts.get(1) == Some(&"list") {
                        // property list <count_type> <data_type> <name>
                        if parts.len() < 5 {
                            return Err(PlyError::malformed(
                                line_no,
                                "Invalid list property line",
                            ));
                        }
                        PropertyType::List {
                            count_type: ScalarType::parse(parts[2])?,
                            data_type: ScalarType::parse(parts[3])?,
                            name: apply_alias(aliases, parts[4]),
                        }
                    } else {
                        // property <type> <name>
                        if parts.len() < 3 {
                            return Err(PlyError::malformed(line_no, "Invalid property line"));
                        }
                        PropertyType::Scalar {
                            data_type: ScalarType::parse(parts[1])?,
                            name: apply_alias(aliases, parts[2]),
                        }
                    };
                    element.properties.push(property);
                }
                // "ply" magic and any unknown directive.
                _ => {}
            }
        }

        let format = format
            .ok_or_else(|| PlyError::malformed(1, "Missing format specification"))?;

        log::debug!(
            "parsed PLY header: format {:?} {}, {} element(s)",
            format,
            version,
            elements.len()
        );

        Ok(PlyHeader {
            format,
            version,
            elements,
            comments,
            obj_info,
        })
    }
}

fn apply_alias(aliases: &HashMap<String, String>, name: &str) -> String {
    match aliases.get(name) {
        Some(mapped) => mapped.clone(),
        None => name.to_string(),
    }
}

/// Locate the header terminator in a raw byte stream.
///
/// Returns the header text (everything before the terminator) and the
/// byte offset at which the body starts. The terminator is matched at
/// the byte level, not via line splitting: header text may contain
/// non-text bytes and may omit the trailing newline entirely when the
/// binary payload follows directly. Non-printable bytes are substituted
/// with a line separator in the returned text so the grammar parser
/// still sees well-formed lines; the returned offset always refers to
/// the original bytes.
pub fn extract_header(bytes: &[u8]) -> Result<(String, usize), PlyError> {
    let pos = bytes
        .windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
        .ok_or(PlyError::HeaderNotFound)?;

    let mut offset = pos + HEADER_TERMINATOR.len();
    // Consume a single line ending after the terminator if one is
    // present; a missing newline leaves the offset at the exact
    // post-terminator byte.
    if bytes.get(offset) == Some(&b'\r') {
        offset += 1;
    }
    if bytes.get(offset) == Some(&b'\n') {
        offset += 1;
    }

    let text = bytes[..pos]
        .iter()
        .map(|&b| match b {
            b'\n' | b'\r' | b'\t' | 0x20..=0x7e => b as char,
            _ => '\n',
        })
        .collect();

    Ok((text, offset))
}
