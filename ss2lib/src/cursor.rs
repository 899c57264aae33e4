//! A little-endian read cursor over a decoded frame.

use nom::number::complete as number;

/// Largest integer read supported by the cursor, in bytes.
pub const MAX_WIDTH: usize = 8;

/// Returned when a read asks for more bytes than are left. Nothing is
/// consumed when this happens.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Underflow {
    pub wanted: usize,
    pub remaining: usize,
}

impl std::error::Error for Underflow {}

impl std::fmt::Display for Underflow {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "tried to read {} bytes with only {} remaining",
            self.wanted, self.remaining
        )
    }
}

/// Reads values from the front of a byte buffer, moving forward as it
/// goes. The buffer itself is never modified.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unread part of the buffer.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    // run a nom parser on the unread bytes, and advance past what it ate
    fn parse<O, P>(&mut self, wanted: usize, mut parser: P) -> Result<O, Underflow>
    where
        P: FnMut(&'a [u8]) -> nom::IResult<&'a [u8], O>,
    {
        let rest = self.remaining();
        let (after, out) = parser(rest).map_err(|_| Underflow {
            wanted,
            remaining: rest.len(),
        })?;
        self.pos += rest.len() - after.len();
        Ok(out)
    }

    /// Consume `n` raw bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], Underflow> {
        self.parse(n, nom::bytes::complete::take(n))
    }

    /// Consume and discard `n` bytes of padding.
    pub fn skip(&mut self, n: usize) -> Result<(), Underflow> {
        self.take(n).map(|_| ())
    }

    /// Read a little-endian unsigned integer `width` bytes wide.
    ///
    /// Panics if `width` is 0 or larger than [MAX_WIDTH].
    pub fn read_uint(&mut self, width: usize) -> Result<u64, Underflow> {
        assert!(
            (1..=MAX_WIDTH).contains(&width),
            "integer width {} not supported",
            width
        );

        match width {
            1 => self.parse(1, number::le_u8).map(u64::from),
            2 => self.parse(2, number::le_u16).map(u64::from),
            3 => self.parse(3, number::le_u24).map(u64::from),
            4 => self.parse(4, number::le_u32).map(u64::from),
            8 => self.parse(8, number::le_u64),
            _ => self.take(width).map(|bytes| {
                bytes
                    .iter()
                    .rev()
                    .fold(0, |acc, b| (acc << 8) | *b as u64)
            }),
        }
    }

    /// Read a little-endian two's complement integer `width` bytes wide.
    pub fn read_int(&mut self, width: usize) -> Result<i64, Underflow> {
        let raw = self.read_uint(width)?;
        Ok(sign_extend(raw, 8 * width as u32))
    }

    /// Read `width` bytes as a little-endian bit array, least significant
    /// bit first. Each entry is 0 or 1.
    pub fn read_bits(&mut self, width: usize) -> Result<Vec<u8>, Underflow> {
        let raw = self.read_uint(width)?;
        Ok((0..8 * width).map(|i| ((raw >> i) & 1) as u8).collect())
    }

    /// Read a little-endian IEEE-754 single.
    pub fn read_single(&mut self) -> Result<f64, Underflow> {
        self.parse(4, number::le_u32)
            .map(crate::float::single_from_bits)
    }

    /// Read a little-endian IEEE-754 double.
    pub fn read_double(&mut self) -> Result<f64, Underflow> {
        self.parse(8, number::le_u64)
            .map(crate::float::double_from_bits)
    }
}

/// Interpret the low `bits` bits of `raw` as two's complement.
pub(crate) fn sign_extend(raw: u64, bits: u32) -> i64 {
    if bits >= 64 {
        return raw as i64;
    }
    if raw >= 1 << (bits - 1) {
        raw as i64 - (1 << bits)
    } else {
        raw as i64
    }
}
