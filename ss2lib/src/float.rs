//! IEEE-754 values rebuilt by hand from their sign, exponent and
//! mantissa bits.
//!
//! Every exponent goes through the same formula, including the all-zero
//! and all-one patterns that normally mean zero/subnormal and
//! infinity/NaN. So `00000000` decodes to `2^-127`, not `0.0`. Beacon
//! values have never been seen in those ranges.

/// Sign, exponent and mantissa widths for one float format.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
struct Format {
    exponent_bits: u32,
    mantissa_bits: u32,
    bias: i32,
}

const SINGLE: Format = Format {
    exponent_bits: 8,
    mantissa_bits: 23,
    bias: 127,
};

const DOUBLE: Format = Format {
    exponent_bits: 11,
    mantissa_bits: 52,
    bias: 1023,
};

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FloatFormatError {
    /// No digits after the optional `0x`.
    Empty,
    /// Non-hex character, and its position after any `0x` prefix.
    InvalidCharacter(char, usize),
    /// More hex digits than the format has bits for.
    TooLong { digits: usize, max: usize },
}

impl std::error::Error for FloatFormatError {}

impl std::fmt::Display for FloatFormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FloatFormatError::Empty => write!(f, "no hex digits in float"),
            FloatFormatError::InvalidCharacter(c, at) => {
                write!(f, "invalid hex character {:?} in float at {}", c, at)
            }
            FloatFormatError::TooLong { digits, max } => write!(
                f,
                "float has {} hex digits, must be {} or less",
                digits, max
            ),
        }
    }
}

impl Format {
    fn decode(&self, bits: u64) -> f64 {
        let sign = if (bits >> (self.exponent_bits + self.mantissa_bits)) & 1 == 0 {
            1.0
        } else {
            -1.0
        };
        let exponent = ((bits >> self.mantissa_bits) & ((1 << self.exponent_bits) - 1)) as i32;

        // 1 + sum of bit_i * 2^-(i+1), most significant mantissa bit first
        let mut mantissa = 1.0;
        for i in 0..self.mantissa_bits {
            if (bits >> (self.mantissa_bits - 1 - i)) & 1 == 1 {
                mantissa += 2f64.powi(-(i as i32 + 1));
            }
        }

        sign * 2f64.powi(exponent - self.bias) * mantissa
    }

    fn digits(&self) -> usize {
        (1 + self.exponent_bits + self.mantissa_bits) as usize / 4
    }

    fn parse(&self, hex: &str, swap: bool) -> Result<f64, FloatFormatError> {
        let mut bits = parse_hex(hex, self.digits())?;
        if swap {
            // reverse the digit pairs as given, then zero-extend
            bits = parse_hex(&swap_pairs(strip_0x(hex)), self.digits())?;
        }
        Ok(self.decode(bits))
    }
}

fn strip_0x(hex: &str) -> &str {
    hex.strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex)
}

/// Reverse the order of digit pairs, counted from the left. An odd
/// trailing digit comes out first. Only called on checked hex.
fn swap_pairs(digits: &str) -> String {
    digits
        .as_bytes()
        .chunks(2)
        .rev()
        .map(|pair| String::from_utf8_lossy(pair))
        .collect()
}

/// Parse big-endian hex with an optional `0x` prefix into an integer.
/// Short strings are zero-extended on the left.
fn parse_hex(hex: &str, max: usize) -> Result<u64, FloatFormatError> {
    let digits = strip_0x(hex);

    if let Some((at, c)) = digits.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(FloatFormatError::InvalidCharacter(c, at));
    }
    if digits.is_empty() {
        return Err(FloatFormatError::Empty);
    }
    if digits.len() > max {
        return Err(FloatFormatError::TooLong {
            digits: digits.len(),
            max,
        });
    }

    // checked above: only hex digits, and at most 64 bits of them
    u64::from_str_radix(digits, 16).map_err(|_| FloatFormatError::TooLong {
        digits: digits.len(),
        max,
    })
}

/// Decode the bits of an IEEE-754 single.
pub fn single_from_bits(bits: u32) -> f64 {
    SINGLE.decode(bits as u64)
}

/// Decode the bits of an IEEE-754 double.
pub fn double_from_bits(bits: u64) -> f64 {
    DOUBLE.decode(bits)
}

/// Decode a big-endian hex single, like `3f800000`.
pub fn single(hex: &str) -> Result<f64, FloatFormatError> {
    SINGLE.parse(hex, false)
}

/// Decode a big-endian hex double, like `3ff0000000000000`.
pub fn double(hex: &str) -> Result<f64, FloatFormatError> {
    DOUBLE.parse(hex, false)
}

/// Decode a little-endian hex single, like `0000803f`.
pub fn single_swapped(hex: &str) -> Result<f64, FloatFormatError> {
    SINGLE.parse(hex, true)
}

/// Decode a little-endian hex double, like `000000000000f03f`.
pub fn double_swapped(hex: &str) -> Result<f64, FloatFormatError> {
    DOUBLE.parse(hex, true)
}
