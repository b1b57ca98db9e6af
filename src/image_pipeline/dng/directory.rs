//! Minimal reader for the first image file directory of a TIFF-structured
//! file.
//!
//! DNG files and DNG camera profiles (DCP, magic `0x4352`) share the TIFF
//! layout. The `tiff` decoder only accepts magic 42, so profiles are read
//! with this reader instead.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use anyhow::{Context, Result, bail};
use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

/// Magic number of a classic TIFF (and DNG) file.
pub const TIFF_MAGIC: u16 = 42;
/// Magic number of a DNG camera profile.
pub const DCP_MAGIC: u16 = 0x4352;

/// A decoded field, widened to a common representation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// BYTE, SHORT, LONG, UNDEFINED
    Unsigned(Vec<u32>),
    /// SBYTE, SSHORT, SLONG
    Signed(Vec<i32>),
    Rational(Vec<(u32, u32)>),
    SRational(Vec<(i32, i32)>),
    /// FLOAT, DOUBLE
    Float(Vec<f64>),
    Ascii(String),
}

impl FieldValue {
    pub fn as_u32_vec(&self) -> Option<Vec<u32>> {
        match self {
            FieldValue::Unsigned(values) => Some(values.clone()),
            FieldValue::Signed(values) => values.iter().map(|&v| u32::try_from(v).ok()).collect(),
            _ => None,
        }
    }

    pub fn as_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            FieldValue::Unsigned(values) => Some(values.iter().map(|&v| f64::from(v)).collect()),
            FieldValue::Signed(values) => Some(values.iter().map(|&v| f64::from(v)).collect()),
            FieldValue::Rational(values) => values
                .iter()
                .map(|&(n, d)| (d != 0).then(|| f64::from(n) / f64::from(d)))
                .collect(),
            FieldValue::SRational(values) => values
                .iter()
                .map(|&(n, d)| (d != 0).then(|| f64::from(n) / f64::from(d)))
                .collect(),
            FieldValue::Float(values) => Some(values.clone()),
            FieldValue::Ascii(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Ascii(text) => Some(text),
            _ => None,
        }
    }
}

/// Tags of the first directory, keyed by tag code.
#[derive(Debug, Clone)]
pub struct TiffDirectory {
    magic: u16,
    fields: BTreeMap<u16, FieldValue>,
}

impl TiffDirectory {
    pub fn parse(data: &[u8]) -> Result<Self> {
        match data.get(..2) {
            Some(b"II") => Self::parse_with::<LittleEndian>(data),
            Some(b"MM") => Self::parse_with::<BigEndian>(data),
            _ => bail!("missing TIFF byte order mark"),
        }
    }

    fn parse_with<E: ByteOrder>(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        cursor.set_position(2);
        let magic = cursor.read_u16::<E>().context("truncated TIFF header")?;
        let ifd_offset = cursor.read_u32::<E>().context("truncated TIFF header")?;

        cursor.set_position(u64::from(ifd_offset));
        let entry_count = cursor
            .read_u16::<E>()
            .with_context(|| format!("directory offset {} is out of bounds", ifd_offset))?;

        let mut fields = BTreeMap::new();
        for index in 0..entry_count {
            let tag = cursor.read_u16::<E>()?;
            let field_type = cursor.read_u16::<E>()?;
            let count = cursor.read_u32::<E>()? as usize;
            let mut value_field = [0u8; 4];
            cursor
                .read_exact(&mut value_field)
                .with_context(|| format!("truncated directory entry {}", index))?;

            // Unknown field types are skipped, as TIFF readers must.
            let Some(size) = field_size(field_type) else {
                continue;
            };
            let len = size
                .checked_mul(count)
                .with_context(|| format!("tag {} is too large", tag))?;
            let bytes = if len <= value_field.len() {
                &value_field[..len]
            } else {
                let offset = E::read_u32(&value_field) as usize;
                data.get(offset..offset.saturating_add(len))
                    .with_context(|| format!("tag {} points outside the file", tag))?
            };

            fields.insert(tag, decode_field::<E>(field_type, bytes, count)?);
        }

        Ok(Self { magic, fields })
    }

    pub fn magic(&self) -> u16 {
        self.magic
    }

    pub fn get(&self, tag: u16) -> Option<&FieldValue> {
        self.fields.get(&tag)
    }

    pub fn contains(&self, tag: u16) -> bool {
        self.fields.contains_key(&tag)
    }

    pub fn u32_vec(&self, tag: u16) -> Option<Vec<u32>> {
        self.get(tag)?.as_u32_vec()
    }

    pub fn u32(&self, tag: u16) -> Option<u32> {
        match self.u32_vec(tag)?.as_slice() {
            [value] => Some(*value),
            _ => None,
        }
    }

    pub fn f64_vec(&self, tag: u16) -> Option<Vec<f64>> {
        self.get(tag)?.as_f64_vec()
    }

    pub fn ascii(&self, tag: u16) -> Option<&str> {
        self.get(tag)?.as_str()
    }
}

fn field_size(field_type: u16) -> Option<usize> {
    match field_type {
        1 | 2 | 6 | 7 => Some(1),
        3 | 8 => Some(2),
        4 | 9 | 11 => Some(4),
        5 | 10 | 12 => Some(8),
        _ => None,
    }
}

fn decode_field<E: ByteOrder>(field_type: u16, bytes: &[u8], count: usize) -> Result<FieldValue> {
    let mut reader = Cursor::new(bytes);
    let value = match field_type {
        1 | 7 => FieldValue::Unsigned(bytes.iter().map(|&b| u32::from(b)).collect()),
        2 => {
            let text = bytes.split(|&b| b == 0).next().unwrap_or_default();
            FieldValue::Ascii(String::from_utf8_lossy(text).into_owned())
        }
        3 => FieldValue::Unsigned(
            (0..count).map(|_| reader.read_u16::<E>().map(u32::from)).collect::<std::io::Result<_>>()?,
        ),
        4 => FieldValue::Unsigned(
            (0..count).map(|_| reader.read_u32::<E>()).collect::<std::io::Result<_>>()?,
        ),
        5 => FieldValue::Rational(
            (0..count)
                .map(|_| -> std::io::Result<(u32, u32)> { Ok((reader.read_u32::<E>()?, reader.read_u32::<E>()?)) })
                .collect::<std::io::Result<_>>()?,
        ),
        6 => FieldValue::Signed(bytes.iter().map(|&b| i32::from(b as i8)).collect()),
        8 => FieldValue::Signed(
            (0..count).map(|_| reader.read_i16::<E>().map(i32::from)).collect::<std::io::Result<_>>()?,
        ),
        9 => FieldValue::Signed(
            (0..count).map(|_| reader.read_i32::<E>()).collect::<std::io::Result<_>>()?,
        ),
        10 => FieldValue::SRational(
            (0..count)
                .map(|_| -> std::io::Result<(i32, i32)> { Ok((reader.read_i32::<E>()?, reader.read_i32::<E>()?)) })
                .collect::<std::io::Result<_>>()?,
        ),
        11 => FieldValue::Float(
            (0..count).map(|_| reader.read_f32::<E>().map(f64::from)).collect::<std::io::Result<_>>()?,
        ),
        12 => FieldValue::Float(
            (0..count).map(|_| reader.read_f64::<E>()).collect::<std::io::Result<_>>()?,
        ),
        other => bail!("unsupported field type {}", other),
    };
    Ok(value)
}
