//! Declarative field layouts for each subsystem, and the code that
//! applies them to a [ByteCursor].

use crate::cursor::{sign_extend, ByteCursor, Underflow};
use crate::record::{Record, Value};

pub mod tables;

/// Conversion from a raw reading to physical units.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum Transform {
    /// Keep the raw value. Integers stay integers.
    Identity,
    /// `scale * raw + offset`, always producing a float.
    Affine { scale: f64, offset: f64 },
}

impl Transform {
    pub fn apply_int(&self, raw: i64) -> Value {
        match self {
            Transform::Identity => Value::Int(raw),
            Transform::Affine { scale, offset } => Value::Float(raw as f64 * scale + offset),
        }
    }

    pub fn apply_float(&self, raw: f64) -> Value {
        match self {
            Transform::Identity => Value::Float(raw),
            Transform::Affine { scale, offset } => Value::Float(raw * scale + offset),
        }
    }

    /// Recover the raw reading from a converted value.
    pub fn invert(&self, value: f64) -> f64 {
        match self {
            Transform::Identity => value,
            Transform::Affine { scale, offset } => (value - offset) / scale,
        }
    }
}

/// A named group of bits inside a [Kind::Bits] register.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct BitField {
    pub name: &'static str,
    /// Position of the lowest bit, 0 being the least significant.
    pub offset: u32,
    pub len: u32,
    /// Sign-extend the extracted bits.
    pub signed: bool,
    pub transform: Transform,
}

impl BitField {
    /// A single bit, reported as a flag.
    pub const fn flag(name: &'static str, offset: u32) -> Self {
        Self {
            name,
            offset,
            len: 1,
            signed: false,
            transform: Transform::Identity,
        }
    }

    /// An unsigned group of `len` bits, reported as an integer.
    pub const fn slice(name: &'static str, offset: u32, len: u32) -> Self {
        Self {
            name,
            offset,
            len,
            signed: false,
            transform: Transform::Identity,
        }
    }

    pub const fn signed(self) -> Self {
        Self {
            signed: true,
            ..self
        }
    }

    pub const fn scaled(self, scale: f64) -> Self {
        self.affine(scale, 0.0)
    }

    pub const fn affine(self, scale: f64, offset: f64) -> Self {
        Self {
            transform: Transform::Affine { scale, offset },
            ..self
        }
    }

    fn extract(&self, bits: &[u8]) -> Value {
        let start = self.offset as usize;
        let raw = bits[start..start + self.len as usize]
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, b)| acc | ((*b as u64) << i));

        if self.len == 1 && self.transform == Transform::Identity {
            return Value::Flag(raw == 1);
        }

        let raw = if self.signed {
            sign_extend(raw, self.len)
        } else {
            raw as i64
        };
        self.transform.apply_int(raw)
    }
}

/// How a field is laid out on the wire.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum Kind {
    /// Little-endian unsigned integer of this many bytes.
    Uint(usize),
    /// Little-endian two's complement integer of this many bytes.
    Int(usize),
    /// A register of this many bytes, split into named bit groups.
    /// Bits not covered by any group are dropped.
    Bits {
        width: usize,
        fields: &'static [BitField],
    },
    Float32,
    Float64,
    /// Bytes that are skipped.
    Padding(usize),
}

impl Kind {
    /// Width on the wire, in bytes.
    pub const fn width(&self) -> usize {
        match self {
            Kind::Uint(w) => *w,
            Kind::Int(w) => *w,
            Kind::Bits { width, .. } => *width,
            Kind::Float32 => 4,
            Kind::Float64 => 8,
            Kind::Padding(w) => *w,
        }
    }
}

/// One entry in a [Schema].
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct FieldSpec {
    /// Output name. Unused for [Kind::Bits] and [Kind::Padding], whose
    /// output (if any) is named elsewhere.
    pub name: &'static str,
    pub kind: Kind,
    pub transform: Transform,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            transform: Transform::Identity,
        }
    }

    pub const fn uint(name: &'static str, width: usize) -> Self {
        Self::new(name, Kind::Uint(width))
    }

    pub const fn int(name: &'static str, width: usize) -> Self {
        Self::new(name, Kind::Int(width))
    }

    pub const fn float32(name: &'static str) -> Self {
        Self::new(name, Kind::Float32)
    }

    pub const fn float64(name: &'static str) -> Self {
        Self::new(name, Kind::Float64)
    }

    pub const fn bits(width: usize, fields: &'static [BitField]) -> Self {
        Self::new("", Kind::Bits { width, fields })
    }

    pub const fn padding(width: usize) -> Self {
        Self::new("", Kind::Padding(width))
    }

    pub const fn scaled(self, scale: f64) -> Self {
        self.affine(scale, 0.0)
    }

    pub const fn affine(self, scale: f64, offset: f64) -> Self {
        Self {
            transform: Transform::Affine { scale, offset },
            ..self
        }
    }

    /// Read this field from the cursor and append its outputs to `record`.
    pub fn decode(&self, cursor: &mut ByteCursor, record: &mut Record) -> Result<(), Underflow> {
        match self.kind {
            Kind::Uint(width) => {
                let raw = cursor.read_uint(width)?;
                record.push(self.name, self.transform.apply_int(raw as i64));
            }
            Kind::Int(width) => {
                let raw = cursor.read_int(width)?;
                record.push(self.name, self.transform.apply_int(raw));
            }
            Kind::Bits { width, fields } => {
                let bits = cursor.read_bits(width)?;
                for field in fields {
                    record.push(field.name, field.extract(&bits));
                }
            }
            Kind::Float32 => {
                let raw = cursor.read_single()?;
                record.push(self.name, self.transform.apply_float(raw));
            }
            Kind::Float64 => {
                let raw = cursor.read_double()?;
                record.push(self.name, self.transform.apply_float(raw));
            }
            Kind::Padding(width) => cursor.skip(width)?,
        }
        Ok(())
    }

    /// Names this field produces, in output order.
    pub fn outputs(&self) -> impl Iterator<Item = &'static str> {
        let (own, bits): (Option<&'static str>, &'static [BitField]) = match self.kind {
            Kind::Bits { fields, .. } => (None, fields),
            Kind::Padding(_) => (None, &[]),
            _ => (Some(self.name), &[]),
        };
        own.into_iter().chain(bits.iter().map(|b| b.name))
    }
}

/// The fields sent by one subsystem, in wire order.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Schema {
    pub name: &'static str,
    /// Total bytes, equal to the sum of the field widths.
    pub length: usize,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Total of the field widths.
    pub const fn field_width(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].kind.width();
            i += 1;
        }
        total
    }

    /// Decode every field in order, starting at the cursor's position.
    pub fn decode(&self, cursor: &mut ByteCursor, record: &mut Record) -> Result<(), Underflow> {
        let start = cursor.position();
        for field in self.fields {
            field.decode(cursor, record)?;
        }
        debug_assert_eq!(cursor.position() - start, self.length, "{}", self.name);
        Ok(())
    }

    /// Every output name, in order.
    pub fn outputs(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().flat_map(FieldSpec::outputs)
    }
}
