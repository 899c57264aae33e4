//! Cleaning and validation of raw hex input.

/// A validated frame, one byte per pair of hex digits in the input.
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd, Default)]
pub struct Frame(Vec<u8>);

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum InputError {
    /// Nothing was left after removing whitespace and delimiters.
    Empty,
    /// A character outside the hex alphabet, and where it was found.
    InvalidCharacter(char, usize),
    /// The cleaned string has an odd number of hex digits.
    OddLength(usize),
}

impl std::error::Error for InputError {}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            InputError::Empty => write!(f, "string is empty"),
            InputError::InvalidCharacter(c, at) => {
                write!(f, "invalid character {:?} found in string at {}", c, at)
            }
            InputError::OddLength(n) => {
                write!(f, "string has an odd number of hex digits ({})", n)
            }
        }
    }
}

/// Remove surrounding space, whitespace and every occurrence of
/// `delimiter`, and lowercase what remains.
///
/// The delimiter is matched case-insensitively.
pub fn clean(input: &str, delimiter: &str) -> String {
    let mut cleaned = input.trim().to_lowercase().replace(' ', "");
    if !delimiter.is_empty() {
        cleaned = cleaned.replace(&delimiter.to_lowercase(), "");
    }
    cleaned.retain(|c| !matches!(c, '\t' | '\r' | '\n'));
    cleaned
}

/// Clean `input` and convert it into a [Frame].
pub fn normalize(input: &str, delimiter: &str) -> Result<Frame, InputError> {
    let cleaned = clean(input, delimiter);
    if cleaned.is_empty() {
        return Err(InputError::Empty);
    }

    if let Some((at, c)) = cleaned
        .char_indices()
        .find(|(_, c)| !matches!(c, '0'..='9' | 'a'..='f'))
    {
        return Err(InputError::InvalidCharacter(c, at));
    }

    if cleaned.len() % 2 != 0 {
        return Err(InputError::OddLength(cleaned.len()));
    }

    // every character was checked above, so this only fails on a bug
    hex::decode(&cleaned)
        .map(Frame)
        .map_err(|_| InputError::OddLength(cleaned.len()))
}

impl Frame {
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    pub fn new_cloned(data: &[u8]) -> Self {
        Self::new(data.to_owned())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Lowercase hex, as the frame would have been received.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_tuple("Frame").field(&self.to_hex()).finish()
    }
}

impl std::str::FromStr for Frame {
    type Err = InputError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s, "")
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::ops::Deref for Frame {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clean_strips_whitespace() {
        assert_eq!(clean("  DE ad\tBE\r\nef \n", ""), "deadbeef");
    }

    #[test]
    fn clean_strips_delimiter() {
        assert_eq!(clean("de:AD:be:EF", ":"), "deadbeef");
        assert_eq!(clean("de0XAD0xbe", "0x"), "deadbe");
    }

    #[test]
    fn normalize_bytes() {
        let frame = normalize("01 02 ff", "").unwrap();
        assert_eq!(frame.as_bytes(), &[0x01, 0x02, 0xff]);
        assert_eq!(frame.to_hex(), "0102ff");
    }

    #[test]
    fn normalize_empty() {
        assert_eq!(normalize("", ""), Err(InputError::Empty));
        assert_eq!(normalize(" \t\r\n ", ""), Err(InputError::Empty));
        assert_eq!(normalize(",,,", ","), Err(InputError::Empty));
    }

    #[test]
    fn normalize_invalid_character() {
        assert_eq!(
            normalize("01g2", ""),
            Err(InputError::InvalidCharacter('g', 2))
        );
        // a delimiter that was not configured is just a bad character
        assert_eq!(
            normalize("01,02", ""),
            Err(InputError::InvalidCharacter(',', 2))
        );
    }

    #[test]
    fn normalize_odd_length() {
        assert_eq!(normalize("abc", ""), Err(InputError::OddLength(3)));
    }

    #[test]
    fn frame_from_str() {
        let frame: Frame = "CAFE".parse().unwrap();
        assert_eq!(&frame[..], &[0xca, 0xfe]);
    }
}
