use std::path::Path;

use nom::bytes::complete::take_while_m_n;
use nom::character::complete::char;
use nom::sequence::terminated;
use nom::IResult;

use ss2lib::normalize::clean;

/// AX.25 address header on every downlinked frame.
const CALLSIGN: &str = "aea468aa8c40e0ae9664b092886103f0";
/// KISS framing around a packet.
const KISS_PREFIX: &str = "c000";
const KISS_SUFFIX: &str = "c0";

/// Capture log formats accepted by this tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum LogFormat {
    /// One hex frame per line, as saved by a terminal (.log, .txt).
    Log,
    /// A KISS terminal capture, with hex behind a `NNN>` prompt (.kss).
    Kss,

    /// Decide from the file extension.
    ///
    /// If the chosen format finds nothing, the other is tried.
    Auto,
}

impl LogFormat {
    /// Pick a concrete format for `path`.
    pub fn resolve(self, path: &Path) -> anyhow::Result<Self> {
        if self != LogFormat::Auto {
            return Ok(self);
        }

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "kss" => Ok(LogFormat::Kss),
            "log" | "txt" => Ok(LogFormat::Log),
            _ => anyhow::bail!("capture file extension must be one of .txt, .log, .kss"),
        }
    }

    fn other(self) -> Self {
        match self {
            LogFormat::Log => LogFormat::Kss,
            LogFormat::Kss => LogFormat::Log,
            LogFormat::Auto => LogFormat::Auto,
        }
    }

    fn read_from(self, data: &[u8]) -> Vec<String> {
        match self {
            LogFormat::Log => read_plain(data),
            LogFormat::Kss => read_kss(data),
            LogFormat::Auto => Vec::new(),
        }
    }
}

/// Read every hex frame from a capture log.
pub fn read_frames<P>(path: P, format: LogFormat) -> anyhow::Result<Vec<String>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let format = format.resolve(path)?;
    let data = std::fs::read(path)?;
    Ok(read_frames_from(&data, format))
}

/// Read frames in `format`, falling back to the other format if that
/// finds nothing.
pub fn read_frames_from(data: &[u8], format: LogFormat) -> Vec<String> {
    let frames = format.read_from(data);
    if !frames.is_empty() {
        return frames;
    }

    let other = format.other();
    let frames = other.read_from(data);
    if !frames.is_empty() {
        eprintln!("switched to {:?} format and found valid frames", other);
    }
    frames
}

/// Lines ending in `\n`, `\r\n` or a lone `\r`.
fn lines(data: &[u8]) -> Vec<&[u8]> {
    let mut out = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        match rest.iter().position(|b| *b == b'\n' || *b == b'\r') {
            Some(end) => {
                out.push(&rest[..end]);
                let skip = if rest[end..].starts_with(b"\r\n") { 2 } else { 1 };
                rest = &rest[end + skip..];
            }
            None => {
                out.push(rest);
                break;
            }
        }
    }
    out
}

/// Every line that is entirely hex once whitespace is removed.
pub fn read_plain(data: &[u8]) -> Vec<String> {
    lines(data)
        .into_iter()
        .filter_map(|l| std::str::from_utf8(l).ok())
        .map(|l| clean(l, ""))
        .filter(|l| !l.is_empty() && l.chars().all(|c| c.is_ascii_hexdigit()))
        .collect()
}

/// A terminal prompt, 1 to 3 digits and a `>`.
fn prompt(input: &str) -> IResult<&str, &str> {
    terminated(take_while_m_n(1, 3, |c: char| c.is_ascii_digit()), char('>'))(input)
}

/// Text after the first prompt in `line`, if there is one.
fn after_prompt(line: &str) -> Option<&str> {
    line.char_indices()
        .find_map(|(i, _)| prompt(&line[i..]).ok().map(|(rest, _)| rest))
}

/// Packets from a KISS terminal capture.
///
/// Consecutive prompt lines are joined into one packet. Any other line
/// ends the packet.
pub fn read_kss(data: &[u8]) -> Vec<String> {
    let mut packets = Vec::new();
    let mut packet = String::new();

    for line in lines(data) {
        let text = std::str::from_utf8(line).ok().map(|l| clean(l, ""));
        match text.as_deref().and_then(after_prompt) {
            Some(hex) => packet.push_str(hex),
            None => {
                if !packet.is_empty() {
                    packets.push(std::mem::take(&mut packet));
                }
            }
        }
    }
    if !packet.is_empty() {
        packets.push(packet);
    }

    packets.into_iter().map(|p| strip_kss(&p).to_owned()).collect()
}

/// Remove KISS framing and the address header from a packet.
fn strip_kss(packet: &str) -> &str {
    let packet = packet
        .strip_prefix(KISS_PREFIX)
        .and_then(|p| p.strip_suffix(KISS_SUFFIX))
        .unwrap_or(packet);

    // keep only what is between the first header and any second one
    match packet.split(CALLSIGN).nth(1) {
        Some(rest) => rest,
        None => packet,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plain() {
        let data = b"DE AD be ef\r\nnot hex\r\n\r\n0102\n\xff\xfe\n  \t\n";
        assert_eq!(read_plain(data), vec!["deadbeef", "0102"]);
    }

    #[test]
    fn prompt_search() {
        assert_eq!(after_prompt("12>abcd"), Some("abcd"));
        assert_eq!(after_prompt("x1234>abcd"), Some("abcd"));
        assert_eq!(after_prompt("port1>0a>ff"), Some("0a>ff"));
        assert_eq!(after_prompt(">abcd"), None);
        assert_eq!(after_prompt("abcd"), None);
    }

    #[test]
    fn kss_packets() {
        let mut data = Vec::new();
        data.extend_from_slice(b"Fm KJ4OLP To CQ\r\n");
        data.extend_from_slice(b"001> c0 00 aa bb\r\n");
        data.extend_from_slice(b"002> cc c0\r\n");
        data.extend_from_slice(b"\r\n");
        data.extend_from_slice(b"001> 01 02\r\n");
        data.extend_from_slice(b"\xff\r\n");
        data.extend_from_slice(b"001> 03");

        assert_eq!(read_kss(&data), vec!["aabbcc", "0102", "03"]);
    }

    #[test]
    fn line_endings() {
        assert_eq!(
            lines(b"a\r\nb\rc\n\rd"),
            vec![&b"a"[..], &b"b"[..], &b"c"[..], &b""[..], &b"d"[..]]
        );
        assert!(lines(b"").is_empty());
    }

    #[test]
    fn carriage_returns_only() {
        assert_eq!(read_plain(b"0102\r0304\r"), vec!["0102", "0304"]);
        assert_eq!(
            read_kss(b"001> 0102\r\r001> 0304\r"),
            vec!["0102", "0304"]
        );
    }

    #[test]
    fn kss_callsign() {
        let line = format!("001> c000{}1234c0\n", CALLSIGN.to_uppercase());
        assert_eq!(read_kss(line.as_bytes()), vec!["1234"]);
    }

    #[test]
    fn fallback() {
        // a plain log read as kss
        let data = b"0102\n0304\n";
        assert_eq!(read_frames_from(data, LogFormat::Kss), vec!["0102", "0304"]);
        // and the other way
        let data = b"1> 0102\n";
        assert_eq!(read_frames_from(data, LogFormat::Log), vec!["0102"]);
        assert!(read_frames_from(b"nothing here", LogFormat::Log).is_empty());
    }

    #[test]
    fn resolve() {
        let auto = LogFormat::Auto;
        assert_eq!(auto.resolve(Path::new("a/b.KSS")).unwrap(), LogFormat::Kss);
        assert_eq!(auto.resolve(Path::new("b.txt")).unwrap(), LogFormat::Log);
        assert_eq!(auto.resolve(Path::new("b.log")).unwrap(), LogFormat::Log);
        assert!(auto.resolve(Path::new("b.bin")).is_err());
        assert_eq!(
            LogFormat::Kss.resolve(Path::new("b.bin")).unwrap(),
            LogFormat::Kss
        );
    }
}
