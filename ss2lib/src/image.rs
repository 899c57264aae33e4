//! Reassembly of a downlinked JPEG from its numbered data frames.
//!
//! Each frame is 256 bytes: a little-endian u32 total, a little-endian
//! u32 index, then 248 bytes of image data. Both header values are byte
//! offsets, so dividing them by 248 gives the packet count and packet
//! number.

use nom::number::complete::le_u32;
use nom::IResult;

use crate::normalize::normalize;

/// Bytes in one image frame.
pub const PACKET_LEN: usize = 256;
/// Bytes of header before the payload.
pub const HEADER_LEN: usize = 8;
/// Bytes of image data in one frame.
pub const PAYLOAD_LEN: usize = PACKET_LEN - HEADER_LEN;
/// Divisor turning header values into packet counts.
pub const NORMALIZATION: u32 = 248;
/// Pattern written over missing packets.
pub const DEFAULT_FILLER: &[u8] = &[0x00];

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ImageError {
    /// Too few usable frames to build an image.
    NoData,
}

impl std::error::Error for ImageError {}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ImageError::NoData => write!(f, "no image data found"),
        }
    }
}

/// One image frame, headers still raw.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Packet<'a> {
    pub total_raw: u32,
    pub index_raw: u32,
    pub payload: &'a [u8],
}

impl<'a> Packet<'a> {
    fn parse_header(data: &'a [u8]) -> IResult<&'a [u8], (u32, u32)> {
        let (data, total) = le_u32(data)?;
        let (data, index) = le_u32(data)?;
        Ok((data, (total, index)))
    }

    /// Read a packet from the start of `data`. Anything past 256 bytes
    /// is ignored.
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        let block = data.get(..PACKET_LEN)?;
        let (payload, (total_raw, index_raw)) = Self::parse_header(block).ok()?;
        Some(Self {
            total_raw,
            index_raw,
            payload,
        })
    }

    /// Packet count claimed by this frame. Not always a whole number.
    pub fn total(&self) -> f64 {
        self.total_raw as f64 / NORMALIZATION as f64
    }

    /// Packet number, if the raw index is a whole multiple.
    pub fn index(&self) -> Option<usize> {
        if self.index_raw % NORMALIZATION == 0 {
            Some((self.index_raw / NORMALIZATION) as usize)
        } else {
            None
        }
    }
}

/// A reassembled image, with filler wherever a packet never arrived.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Image {
    data: Vec<u8>,
    slots: usize,
    missing: Vec<usize>,
}

impl Image {
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Number of packet slots in the image.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Slots that were filled with filler.
    pub fn missing(&self) -> &[usize] {
        &self.missing
    }

    /// Rebuild an image from binary frames, in any order.
    pub fn reassemble<I, T>(frames: I, filler: &[u8]) -> Result<Self, ImageError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let frames: Vec<T> = frames.into_iter().collect();
        let packets: Vec<Packet> = frames
            .iter()
            .filter_map(|f| {
                let packet = Packet::parse(f.as_ref());
                if packet.is_none() {
                    log::warn!("dropping {} byte image frame", f.as_ref().len());
                }
                packet
            })
            .collect();

        let total_raw = mode(packets.iter().map(|p| p.total_raw)).ok_or(ImageError::NoData)?;
        let total = total_raw as f64 / NORMALIZATION as f64;
        let slots = total.ceil() as usize;

        let mut indexed: Vec<(usize, &[u8])> = packets
            .iter()
            .filter(|p| p.total_raw == total_raw && p.index_raw <= total_raw)
            .filter_map(|p| p.index().map(|i| (i, p.payload)))
            .filter(|(i, _)| *i < slots)
            .collect();
        log::debug!(
            "{} of {} frames belong to a {} packet image",
            indexed.len(),
            packets.len(),
            total
        );

        // stable, so the first copy of each index comes first
        indexed.sort_by_key(|(i, _)| *i);
        indexed.dedup_by_key(|(i, _)| *i);

        let filler = if filler.is_empty() {
            DEFAULT_FILLER
        } else {
            filler
        };
        let blank: Vec<u8> = filler.iter().copied().cycle().take(PAYLOAD_LEN).collect();

        let mut data = Vec::with_capacity(slots * PAYLOAD_LEN);
        let mut missing = Vec::new();
        let mut next = indexed.into_iter().peekable();
        for slot in 0..slots {
            match next.next_if(|(i, _)| *i == slot) {
                Some((_, payload)) => data.extend_from_slice(payload),
                None => {
                    missing.push(slot);
                    data.extend_from_slice(&blank);
                }
            }
        }

        log::info!("{} of {} image packets missing", missing.len(), slots);

        if (missing.len() as f64) < total {
            Ok(Self {
                data,
                slots,
                missing,
            })
        } else {
            Err(ImageError::NoData)
        }
    }

    /// Rebuild an image from hex frames. Frames that are not valid hex
    /// are dropped.
    pub fn reassemble_hex<I, S>(frames: I, delimiter: &str, filler: &[u8]) -> Result<Self, ImageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let frames = frames.into_iter().filter_map(|hex| {
            normalize(hex.as_ref(), delimiter)
                .map_err(|e| log::warn!("dropping image frame: {}", e))
                .ok()
        });
        Self::reassemble(frames, filler)
    }
}

impl std::ops::Deref for Image {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

/// Most common value. Ties go to whichever was seen first.
fn mode<I>(values: I) -> Option<u32>
where
    I: IntoIterator<Item = u32>,
{
    let mut counts: Vec<(u32, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(u32, usize)> = None;
    for (value, n) in counts {
        if best.map_or(true, |(_, m)| n > m) {
            best = Some((value, n));
        }
    }
    best.map(|(value, _)| value)
}
