//! Hexdumps of frames that would not decode.

const WIDTH: usize = 0x10;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Line<'a> {
    offset: usize,
    data: &'a [u8],
}

pub fn printable(chr: u8) -> Option<char> {
    if (0x20..0x7f).contains(&chr) {
        Some(chr as char)
    } else {
        None
    }
}

impl<'a> std::fmt::Display for Line<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:04x}", self.offset)?;

        for i in 0..WIDTH {
            if i % 8 == 0 {
                write!(f, " ")?;
            }
            match self.data.get(i) {
                Some(b) => write!(f, " {:02x}", b)?,
                None => write!(f, "   ")?,
            }
        }

        write!(f, "  |")?;
        for b in self.data {
            write!(f, "{}", printable(*b).unwrap_or('.'))?;
        }
        write!(f, "|")
    }
}

/// Lines of a hexdump. Runs of identical lines collapse into a single
/// `*`, and the total length is printed last.
pub fn lines(data: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut last: Option<&[u8]> = None;
    let mut in_duplicate = false;

    for (i, chunk) in data.chunks(WIDTH).enumerate() {
        if last == Some(chunk) {
            if !in_duplicate {
                in_duplicate = true;
                out.push("*".to_owned());
            }
            continue;
        }
        last = Some(chunk);
        in_duplicate = false;
        out.push(
            Line {
                offset: i * WIDTH,
                data: chunk,
            }
            .to_string(),
        );
    }

    out.push(format!("{:04x}", data.len()));
    out
}

/// Log a hexdump at debug level, one line per record.
pub fn debug(prefix: &str, data: &[u8]) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    for line in lines(data) {
        log::debug!("{}{}", prefix, line);
    }
}
