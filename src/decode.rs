//! Element decoding.
//!
//! The body is walked strictly in schema order. Binary bodies use one
//! cumulative byte cursor across all elements, because list lengths are
//! decode-time values and no record offset can be known up front; no
//! alignment padding exists between or within records. ASCII bodies are
//! one flat whitespace token stream in the same per-property order,
//! ignoring line boundaries. Elements that do not feed the mesh are
//! still fully consumed to keep the cursor position correct for the
//! elements that follow.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::attribute::DecodePlan;
use crate::mesh::{FaceListPolicy, MeshBuilder};
use crate::reader::ScalarReader;
use crate::{ElementDef, Mesh, PlyError, PlyFormat, PlyHeader, PropertyType};

/// One decoded property within the transient record row.
enum Value {
    Scalar(f64),
    List(Vec<f64>),
}

/// Decode the whole payload into a mesh according to the schema and the
/// per-element plans (one plan per element, in schema order).
pub(crate) fn decode_body(
    header: &PlyHeader,
    payload: &[u8],
    plans: &[DecodePlan],
    policy: FaceListPolicy,
) -> Result<Mesh, PlyError> {
    let mut builder = MeshBuilder::new(policy);
    match header.format {
        PlyFormat::Ascii => decode_ascii(header, payload, plans, &mut builder)?,
        PlyFormat::BinaryLittleEndian => {
            decode_binary::<LittleEndian>(header, payload, plans, &mut builder)?;
        }
        PlyFormat::BinaryBigEndian => {
            decode_binary::<BigEndian>(header, payload, plans, &mut builder)?;
        }
    }
    builder.finish()
}

struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    fn take(&mut self, width: usize) -> Result<&'a [u8], PlyError> {
        let end = self.pos + width;
        if end > self.buf.len() {
            return Err(PlyError::TruncatedPayload { offset: self.pos });
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

/// Binary reader for one property, resolved once per element schema.
enum PropReader {
    Scalar(ScalarReader),
    List {
        count: ScalarReader,
        item: ScalarReader,
    },
}

fn resolve_readers<E: ByteOrder>(element: &ElementDef) -> Vec<PropReader> {
    element
        .properties
        .iter()
        .map(|property| match property {
            PropertyType::Scalar { data_type, .. } => {
                PropReader::Scalar(ScalarReader::resolve::<E>(*data_type))
            }
            PropertyType::List {
                count_type,
                data_type,
                ..
            } => PropReader::List {
                count: ScalarReader::resolve::<E>(*count_type),
                item: ScalarReader::resolve::<E>(*data_type),
            },
        })
        .collect()
}

fn decode_binary<E: ByteOrder>(
    header: &PlyHeader,
    payload: &[u8],
    plans: &[DecodePlan],
    builder: &mut MeshBuilder,
) -> Result<(), PlyError> {
    let mut cursor = ByteCursor {
        buf: payload,
        pos: 0,
    };
    let mut row: Vec<Value> = Vec::new();

    for (element, plan) in header.elements.iter().zip(plans) {
        log::trace!("decoding element '{}' x{}", element.name, element.count);
        let readers = resolve_readers::<E>(element);

        for _ in 0..element.count {
            row.clear();
            for reader in &readers {
                match reader {
                    PropReader::Scalar(scalar) => {
                        let bytes = cursor.take(scalar.width)?;
                        row.push(Value::Scalar((scalar.read)(bytes)));
                    }
                    PropReader::List { count, item } => {
                        let length = (count.read)(cursor.take(count.width)?) as usize;
                        if length.saturating_mul(item.width) > cursor.remaining() {
                            return Err(PlyError::TruncatedPayload { offset: cursor.pos });
                        }
                        let mut items = Vec::with_capacity(length);
                        for _ in 0..length {
                            items.push((item.read)(cursor.take(item.width)?));
                        }
                        row.push(Value::List(items));
                    }
                }
            }
            consume_record(plan, &row, builder)?;
        }
    }

    // Trailing bytes mean the schema and the payload disagree just as
    // much as running out of bytes does.
    if cursor.pos != payload.len() {
        return Err(PlyError::TruncatedPayload { offset: cursor.pos });
    }
    Ok(())
}

fn decode_ascii(
    header: &PlyHeader,
    payload: &[u8],
    plans: &[DecodePlan],
    builder: &mut MeshBuilder,
) -> Result<(), PlyError> {
    let text = String::from_utf8_lossy(payload);
    let mut tokens = TokenCursor {
        iter: text.split_ascii_whitespace(),
        consumed: 0,
    };

    let mut row: Vec<Value> = Vec::new();
    for (element, plan) in header.elements.iter().zip(plans) {
        log::trace!("decoding element '{}' x{}", element.name, element.count);

        for _ in 0..element.count {
            row.clear();
            for property in &element.properties {
                match property {
                    PropertyType::Scalar { data_type, .. } => {
                        let value = data_type.decode_ascii(tokens.next()?)?;
                        row.push(Value::Scalar(value));
                    }
                    PropertyType::List {
                        count_type,
                        data_type,
                        ..
                    } => {
                        let length = count_type.decode_ascii(tokens.next()?)? as usize;
                        let mut items = Vec::new();
                        for _ in 0..length {
                            items.push(data_type.decode_ascii(tokens.next()?)?);
                        }
                        row.push(Value::List(items));
                    }
                }
            }
            consume_record(plan, &row, builder)?;
        }
    }
    Ok(())
}

/// Flat whitespace token stream over the ASCII body. The offset
/// reported on exhaustion is a token index, since text bodies have no
/// meaningful byte position per value.
struct TokenCursor<'a> {
    iter: std::str::SplitAsciiWhitespace<'a>,
    consumed: usize,
}

impl<'a> TokenCursor<'a> {
    fn next(&mut self) -> Result<&'a str, PlyError> {
        let token = self.iter.next().ok_or(PlyError::TruncatedPayload {
            offset: self.consumed,
        })?;
        self.consumed += 1;
        Ok(token)
    }
}

fn consume_record(
    plan: &DecodePlan,
    row: &[Value],
    builder: &mut MeshBuilder,
) -> Result<(), PlyError> {
    match plan {
        DecodePlan::Vertex(vertex) => {
            builder.push_position(gather3(row, vertex.position));
            if let Some(normal) = vertex.normal {
                builder.push_normal(gather3(row, normal));
            }
            if let Some(uv) = vertex.uv {
                builder.push_uv([scalar_at(row, uv[0]), scalar_at(row, uv[1])]);
            }
            if let Some(color) = vertex.color {
                builder.push_color(gather3(row, color));
            }
            for (channel, index) in &vertex.custom {
                builder.push_custom(channel, scalar_at(row, *index));
            }
        }
        DecodePlan::Face { indices } => {
            if let Value::List(list) = &row[*indices] {
                builder.push_face(list)?;
            }
        }
        DecodePlan::Skip => {}
    }
    Ok(())
}

fn gather3(row: &[Value], indices: [usize; 3]) -> [f64; 3] {
    [
        scalar_at(row, indices[0]),
        scalar_at(row, indices[1]),
        scalar_at(row, indices[2]),
    ]
}

fn scalar_at(row: &[Value], index: usize) -> f64 {
    match &row[index] {
        Value::Scalar(value) => *value,
        // Role resolution rejects list-typed attributes up front.
        Value::List(_) => 0.0,
    }
}
