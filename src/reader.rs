//! Scalar value readers.
//!
//! A fixed registry covering the 8 PLY primitive type families. Binary
//! readers are resolved once per element schema into plain function
//! pointers so the decode loop never re-dispatches on the type name per
//! value.

use byteorder::ByteOrder;

use crate::{PlyError, ScalarType};

/// A resolved binary reader for one scalar type: its encoded width and
/// a decode function for the chosen endianness. All values widen to
/// `f64`, which holds every PLY scalar exactly except the extremes of
/// 64-bit integers (which PLY does not define).
#[derive(Clone, Copy)]
pub(crate) struct ScalarReader {
    pub width: usize,
    pub read: fn(&[u8]) -> f64,
}

impl ScalarReader {
    /// Resolve the reader for `ty` under byte order `E`.
    pub fn resolve<E: ByteOrder>(ty: ScalarType) -> Self {
        let read: fn(&[u8]) -> f64 = match ty {
            ScalarType::I8 => read_i8,
            ScalarType::U8 => read_u8,
            ScalarType::I16 => read_i16::<E>,
            ScalarType::U16 => read_u16::<E>,
            ScalarType::I32 => read_i32::<E>,
            ScalarType::U32 => read_u32::<E>,
            ScalarType::F32 => read_f32::<E>,
            ScalarType::F64 => read_f64::<E>,
        };
        ScalarReader {
            width: ty.size_bytes(),
            read,
        }
    }
}

fn read_i8(buf: &[u8]) -> f64 {
    buf[0] as i8 as f64
}

fn read_u8(buf: &[u8]) -> f64 {
    buf[0] as f64
}

fn read_i16<E: ByteOrder>(buf: &[u8]) -> f64 {
    E::read_i16(buf) as f64
}

fn read_u16<E: ByteOrder>(buf: &[u8]) -> f64 {
    E::read_u16(buf) as f64
}

fn read_i32<E: ByteOrder>(buf: &[u8]) -> f64 {
    E::read_i32(buf) as f64
}

fn read_u32<E: ByteOrder>(buf: &[u8]) -> f64 {
    E::read_u32(buf) as f64
}

fn read_f32<E: ByteOrder>(buf: &[u8]) -> f64 {
    E::read_f32(buf) as f64
}

fn read_f64<E: ByteOrder>(buf: &[u8]) -> f64 {
    E::read_f64(buf)
}

impl ScalarType {
    /// Decode one ASCII token according to this type's family: decimal
    /// integers (signed or unsigned) for the integer families, decimal
    /// floating point for `float`/`double`. The same family
    /// classification governs the binary path, so behavior is
    /// consistent across file formats.
    pub(crate) fn decode_ascii(&self, token: &str) -> Result<f64, PlyError> {
        let value = match self {
            ScalarType::I8 | ScalarType::I16 | ScalarType::I32 => {
                token.parse::<i64>()? as f64
            }
            ScalarType::U8 | ScalarType::U16 | ScalarType::U32 => {
                token.parse::<u64>()? as f64
            }
            ScalarType::F32 | ScalarType::F64 => token.parse::<f64>()?,
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian};

    #[test]
    fn binary_readers_respect_endianness() {
        let le = ScalarReader::resolve::<LittleEndian>(ScalarType::U16);
        let be = ScalarReader::resolve::<BigEndian>(ScalarType::U16);
        let bytes = [0x01, 0x02];
        assert_eq!((le.read)(&bytes), 0x0201 as f64);
        assert_eq!((be.read)(&bytes), 0x0102 as f64);
    }

    #[test]
    fn widths_match_declared_sizes() {
        for ty in [
            ScalarType::I8,
            ScalarType::U8,
            ScalarType::I16,
            ScalarType::U16,
            ScalarType::I32,
            ScalarType::U32,
            ScalarType::F32,
            ScalarType::F64,
        ] {
            let reader = ScalarReader::resolve::<LittleEndian>(ty);
            assert_eq!(reader.width, ty.size_bytes());
        }
    }

    #[test]
    fn float_bytes_round_trip() {
        let reader = ScalarReader::resolve::<LittleEndian>(ScalarType::F32);
        assert_eq!((reader.read)(&1.5f32.to_le_bytes()), 1.5);
    }

    #[test]
    fn signed_bytes_decode_negative() {
        let reader = ScalarReader::resolve::<LittleEndian>(ScalarType::I8);
        assert_eq!((reader.read)(&[0xff]), -1.0);
    }

    #[test]
    fn ascii_families() {
        assert_eq!(ScalarType::U8.decode_ascii("255").unwrap(), 255.0);
        assert_eq!(ScalarType::I32.decode_ascii("-7").unwrap(), -7.0);
        assert_eq!(ScalarType::F32.decode_ascii("0.5").unwrap(), 0.5);
        assert!(ScalarType::U8.decode_ascii("-1").is_err());
        assert!(ScalarType::I32.decode_ascii("1.5").is_err());
    }
}
