//! Which schemas make up a frame of a given length, per firmware
//! generation.

use crate::schema::tables::{ADCS, ANTS, BATTERY, CDH, EPS, STX, VUTRX};
use crate::schema::Schema;

/// Sent in reply to a ping from the ground.
pub const ACK_MARKER: &[u8; 44] = b"Gator Nation Is Everywhere! From SwampSat II";

/// Message type reported for acknowledgements.
pub const ACK_MSGTYPE: u8 = 0;

/// Firmware generation of the satellite that sent a frame. Chosen by
/// the user, never guessed from the frame.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Default)]
pub enum Generation {
    /// The launch firmware.
    #[default]
    One,
    /// Updated firmware, adding the CDH and ADCS beacon and an
    /// acknowledgement with command status.
    Two,
}

/// A known frame: its total length and the schemas inside it.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct FrameLayout {
    pub length: usize,
    pub msgtype: u8,
    /// Message number and total, for reports split across frames.
    pub sequence: (u8, u8),
    pub schemas: &'static [&'static Schema],
}

impl FrameLayout {
    /// Total of the schema lengths.
    pub fn schema_length(&self) -> usize {
        self.schemas.iter().map(|s| s.length).sum()
    }
}

const GEN1: &[FrameLayout] = &[
    FrameLayout {
        length: 163,
        msgtype: 3,
        sequence: (2, 2),
        schemas: &[&EPS, &BATTERY, &VUTRX, &ANTS],
    },
    FrameLayout {
        length: 185,
        msgtype: 4,
        sequence: (2, 2),
        schemas: &[&EPS, &BATTERY, &VUTRX, &ANTS, &STX],
    },
];

const GEN2: &[FrameLayout] = &[
    FrameLayout {
        length: 95,
        msgtype: 5,
        sequence: (1, 2),
        schemas: &[&CDH, &ADCS],
    },
    FrameLayout {
        length: 185,
        msgtype: 4,
        sequence: (2, 2),
        schemas: &[&EPS, &BATTERY, &VUTRX, &ANTS, &STX],
    },
];

impl Generation {
    pub fn layouts(&self) -> &'static [FrameLayout] {
        match self {
            Generation::One => GEN1,
            Generation::Two => GEN2,
        }
    }

    /// The layout for a frame of `length` bytes, if there is one.
    pub fn layout(&self, length: usize) -> Option<&'static FrameLayout> {
        self.layouts().iter().find(|l| l.length == length)
    }

    /// Every frame length this generation sends.
    pub fn lengths(&self) -> Vec<usize> {
        self.layouts().iter().map(|l| l.length).collect()
    }

    /// Whether acknowledgements carry command status after the marker.
    pub fn ack_has_status(&self) -> bool {
        match self {
            Generation::One => false,
            Generation::Two => true,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Generation::One => 1,
            Generation::Two => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Generation::One),
            2 => Some(Generation::Two),
            _ => None,
        }
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "generation {}", self.number())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ALL: &[Generation] = &[Generation::One, Generation::Two];

    #[test]
    fn layout_lengths() {
        for generation in ALL {
            for layout in generation.layouts() {
                assert_eq!(layout.schema_length(), layout.length, "{:?}", layout);
            }
        }
    }

    #[test]
    fn lengths_unique() {
        for generation in ALL {
            let mut lengths = generation.lengths();
            let count = lengths.len();
            lengths.dedup();
            assert_eq!(lengths.len(), count);
        }
    }

    #[test]
    fn lookup() {
        assert_eq!(Generation::One.layout(163).map(|l| l.msgtype), Some(3));
        assert_eq!(Generation::One.layout(185).map(|l| l.msgtype), Some(4));
        assert!(Generation::One.layout(95).is_none());
        assert!(Generation::Two.layout(163).is_none());
        assert_eq!(Generation::Two.layout(95).map(|l| l.sequence), Some((1, 2)));
        assert_eq!(Generation::One.lengths(), vec![163, 185]);
    }

    #[test]
    fn marker_text() {
        assert_eq!(
            std::str::from_utf8(ACK_MARKER),
            Ok("Gator Nation Is Everywhere! From SwampSat II")
        );
    }

    #[test]
    fn numbers() {
        for generation in ALL {
            assert_eq!(Generation::from_number(generation.number()), Some(*generation));
        }
        assert_eq!(Generation::from_number(3), None);
    }
}
