//! Choosing how to decode a frame, and decoding it.

use chrono::NaiveDateTime;

use crate::cursor::{ByteCursor, Underflow};
use crate::layout::{Generation, ACK_MARKER, ACK_MSGTYPE};
use crate::normalize::{normalize, InputError};
use crate::record::{Record, Value, TIMESTAMP_FORMAT};

/// Text reported for an acknowledgement frame.
pub const GREETING: &str = "Gator Nation Is Everywhere! From SwampSat II";

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DecodeError {
    /// The input was not usable hex.
    Input(InputError),
    /// No layout has this length.
    Length { length: usize, valid: Vec<usize> },
    /// A layout ran past the end of its frame. This means the layout
    /// tables are wrong, not the frame.
    Underflow(Underflow),
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Input(e) => Some(e),
            DecodeError::Length { .. } => None,
            DecodeError::Underflow(e) => Some(e),
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DecodeError::Input(e) => write!(f, "{}", e),
            DecodeError::Length { length, valid } => write!(
                f,
                "not a valid SS2 beacon: {} bytes, expected one of {:?}",
                length, valid
            ),
            DecodeError::Underflow(e) => write!(f, "frame layout overran frame: {}", e),
        }
    }
}

impl From<InputError> for DecodeError {
    fn from(other: InputError) -> Self {
        Self::Input(other)
    }
}

impl From<Underflow> for DecodeError {
    fn from(other: Underflow) -> Self {
        Self::Underflow(other)
    }
}

/// Decodes frames for one firmware generation.
///
/// Holds no state between frames, so one decoder can be shared freely.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Default)]
pub struct Decoder {
    generation: Generation,
}

impl Decoder {
    pub fn new(generation: Generation) -> Self {
        Self { generation }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Clean, validate and decode a hex string, removing `delimiter`
    /// wherever it appears.
    pub fn decode(&self, input: &str, delimiter: &str) -> Result<Record, DecodeError> {
        let frame = normalize(input, delimiter)?;
        self.decode_frame(&frame)
    }

    /// Decode a frame, stamped with the current local time.
    pub fn decode_frame(&self, frame: &[u8]) -> Result<Record, DecodeError> {
        self.decode_frame_at(frame, chrono::Local::now().naive_local())
    }

    /// Decode a frame, stamped with `timestamp`.
    pub fn decode_frame_at(
        &self,
        frame: &[u8],
        timestamp: NaiveDateTime,
    ) -> Result<Record, DecodeError> {
        if frame.is_empty() {
            return Err(InputError::Empty.into());
        }
        let timestamp = timestamp.format(TIMESTAMP_FORMAT).to_string();

        if let Some(at) = find_marker(frame) {
            log::debug!("acknowledgement marker at byte {}", at);
            return Ok(self.acknowledgement(frame, at + ACK_MARKER.len(), timestamp));
        }

        let Some(layout) = self.generation.layout(frame.len()) else {
            return Err(DecodeError::Length {
                length: frame.len(),
                valid: self.generation.lengths(),
            });
        };

        log::debug!(
            "{} byte frame is msgtype {} ({}/{})",
            frame.len(),
            layout.msgtype,
            layout.sequence.0,
            layout.sequence.1
        );

        let mut record = Record::new(timestamp, layout.msgtype, layout.sequence);
        let mut cursor = ByteCursor::new(frame);
        for schema in layout.schemas {
            schema.decode(&mut cursor, &mut record)?;
        }
        debug_assert!(cursor.is_empty(), "layout {:?} left bytes", layout);

        Ok(record)
    }

    fn acknowledgement(&self, frame: &[u8], status_at: usize, timestamp: String) -> Record {
        let mut record = Record::new(timestamp, ACK_MSGTYPE, (1, 1));
        record.push("message", Value::Text(GREETING.to_owned()));

        if self.generation.ack_has_status() {
            // status is the frame's last two bytes, somewhere past the marker
            let after = &frame[status_at..];
            let mut cursor = ByteCursor::new(&after[after.len().saturating_sub(2)..]);
            match (cursor.read_uint(1), cursor.read_uint(1)) {
                (Ok(last_command), Ok(ack)) => {
                    record.push("last_command", Value::Int(last_command as i64));
                    record.push("acknowledgement", Value::Int(ack as i64));
                }
                _ => log::warn!("acknowledgement is missing its command status"),
            }
        }

        record
    }
}

/// Position of the acknowledgement marker in `frame`.
fn find_marker(frame: &[u8]) -> Option<usize> {
    frame
        .windows(ACK_MARKER.len())
        .position(|window| window == ACK_MARKER)
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::schema::tables::{ANTS, BATTERY, EPS, STX, VUTRX};

    fn when() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2020, 4, 5)
            .and_then(|d| d.and_hms_opt(6, 7, 8))
            .unwrap()
    }

    fn names(record: &Record) -> Vec<&'static str> {
        record.fields().map(|(n, _)| n).collect()
    }

    // a frame where every byte is its own offset
    fn counting(len: usize) -> Vec<u8> {
        (0..len).map(|i| i as u8).collect()
    }

    #[test]
    fn empty() {
        let decoder = Decoder::default();
        assert_eq!(
            decoder.decode("", ""),
            Err(DecodeError::Input(InputError::Empty))
        );
        assert_eq!(
            decoder.decode_frame(&[]),
            Err(DecodeError::Input(InputError::Empty))
        );
    }

    #[test]
    fn bad_character() {
        assert_eq!(
            Decoder::default().decode("00zz", ""),
            Err(DecodeError::Input(InputError::InvalidCharacter('z', 2)))
        );
    }

    #[test]
    fn wrong_length() {
        let frame = vec![0; 162];
        assert_eq!(
            Decoder::new(Generation::One).decode_frame(&frame),
            Err(DecodeError::Length {
                length: 162,
                valid: vec![163, 185]
            })
        );
        assert_eq!(
            Decoder::new(Generation::Two).decode_frame(&vec![0; 163]),
            Err(DecodeError::Length {
                length: 163,
                valid: vec![95, 185]
            })
        );
    }

    #[test]
    fn short_beacon() {
        let frame = counting(163);
        let record = Decoder::new(Generation::One)
            .decode_frame_at(&frame, when())
            .unwrap();

        assert_eq!(record.timestamp, "2020-04-05_06-07-08");
        assert_eq!(record.msgtype, 3);
        assert_eq!((record.messagenum, record.messagetotal), (2, 2));

        let expected: Vec<_> = [&EPS, &BATTERY, &VUTRX, &ANTS]
            .iter()
            .flat_map(|s| s.outputs())
            .collect();
        assert_eq!(names(&record), expected);

        // bytes 0, 1
        assert_eq!(
            record.get("eps_output_current_bcr"),
            Some(&Value::Float(0x0100 as f64 * 14.662757))
        );
        // bytes 116, 117
        assert_eq!(
            record.get("battery_voltage"),
            Some(&Value::Float(0x7574 as f64 * 0.008993))
        );
        // byte 131
        assert_eq!(
            record.get("vutrx_rx_failedpackage"),
            Some(&Value::Int(131))
        );
        // byte 136 = 0b1000_1000
        assert_eq!(record.get("vutrx_rx_frequentlock"), Some(&Value::Flag(false)));
        assert_eq!(record.get("vutrx_tx_frequentlock"), Some(&Value::Flag(false)));
        // byte 139 = 0x8b, signed
        assert_eq!(record.get("vutrx_smps_temperature"), Some(&Value::Int(-117)));
        // byte 146 = 0x92
        assert_eq!(record.get("vutrx_dtmf_tone"), Some(&Value::Int(0x2)));
        assert_eq!(record.get("vutrx_dtmf_counter"), Some(&Value::Int(0x9)));
        assert!(record.get("stx_voltage_battery").is_none());
    }

    #[test]
    fn long_beacon() {
        let mut frame = vec![0; 185];
        // stx temperature top, -25.0 C, at 171
        frame[171] = 0x00;
        frame[172] = 0xe7;
        // stx synth offset at 176
        frame[176] = 10;
        // pa status at 181
        frame[181] = 0b10;

        let record = Decoder::new(Generation::One)
            .decode_frame_at(&frame, when())
            .unwrap();
        assert_eq!(record.msgtype, 4);
        assert_eq!(names(&record).last(), Some(&"stx_rf_poweroutput"));
        assert_eq!(record.get("stx_temperature_top"), Some(&Value::Float(-25.0)));
        assert_eq!(record.get("stx_temperature_bottom"), Some(&Value::Float(0.0)));
        assert_eq!(record.get("stx_synth_offset"), Some(&Value::Float(2405.0)));
        assert_eq!(
            record.get("stx_poweramplifier_status_frequencylock"),
            Some(&Value::Flag(false))
        );
        assert_eq!(
            record.get("stx_poweramplifier_status_powergood"),
            Some(&Value::Flag(true))
        );
        assert_eq!(
            record.get("eps_temperature_motherboard"),
            Some(&Value::Float(-273.15))
        );
    }

    #[test]
    fn generation_two_beacon() {
        let mut frame = vec![0; 95];
        // cdh_uptime
        frame[0..4].copy_from_slice(&1234u32.to_le_bytes());
        // cdh_storage_used, 3 bytes at 18
        frame[18..21].copy_from_slice(&[0x01, 0x02, 0x03]);
        // adcs_quaternion_q0 at 24 + 2
        frame[26..30].copy_from_slice(&[0x00, 0x00, 0x80, 0x3f]);
        // adcs_position_x at 24 + 42
        frame[66..74].copy_from_slice(&[0, 0, 0, 0, 0, 0, 0x59, 0x40]);
        // adcs_torquer_duty_x at 24 + 66
        frame[90] = 0x81;

        let record = Decoder::new(Generation::Two)
            .decode_frame_at(&frame, when())
            .unwrap();
        assert_eq!(record.msgtype, 5);
        assert_eq!((record.messagenum, record.messagetotal), (1, 2));
        assert_eq!(record.get("cdh_uptime"), Some(&Value::Int(1234)));
        assert_eq!(record.get("cdh_storage_used"), Some(&Value::Int(0x030201)));
        assert_eq!(record.get("adcs_quaternion_q0"), Some(&Value::Float(1.0)));
        assert_eq!(record.get("adcs_position_x"), Some(&Value::Float(100.0)));
        assert_eq!(
            record.get("adcs_torquer_duty_x"),
            Some(&Value::Float(-127.0 * (100.0 / 127.0)))
        );
    }

    #[test]
    fn deterministic() {
        let frame = counting(185);
        let decoder = Decoder::new(Generation::One);
        let a = decoder.decode_frame_at(&frame, when());
        let b = decoder.decode_frame_at(&frame, when());
        assert!(a.is_ok());
        assert_eq!(a, b);
    }

    #[test]
    fn acknowledgement() {
        let mut frame = vec![0xc0, 0x00];
        frame.extend_from_slice(ACK_MARKER);

        let record = Decoder::new(Generation::One)
            .decode_frame_at(&frame, when())
            .unwrap();
        assert_eq!(record.msgtype, ACK_MSGTYPE);
        assert_eq!((record.messagenum, record.messagetotal), (1, 1));
        assert_eq!(names(&record), vec!["message"]);
        assert_eq!(record.get("message"), Some(&Value::Text(GREETING.to_owned())));
    }

    #[test]
    fn acknowledgement_hex() {
        let hex = crate::normalize::Frame::new_cloned(ACK_MARKER).to_hex();
        let record = Decoder::default().decode(&hex.to_uppercase(), "").unwrap();
        assert_eq!(record.msgtype, ACK_MSGTYPE);
    }

    #[test]
    fn acknowledgement_status() {
        let mut frame = ACK_MARKER.to_vec();
        frame.extend_from_slice(&[0x42, 0x01]);

        let record = Decoder::new(Generation::Two)
            .decode_frame_at(&frame, when())
            .unwrap();
        assert_eq!(
            names(&record),
            vec!["message", "last_command", "acknowledgement"]
        );
        assert_eq!(record.get("last_command"), Some(&Value::Int(0x42)));
        assert_eq!(record.get("acknowledgement"), Some(&Value::Int(1)));

        // generation one ignores the trailing bytes
        let record = Decoder::new(Generation::One)
            .decode_frame_at(&frame, when())
            .unwrap();
        assert_eq!(names(&record), vec!["message"]);
    }

    #[test]
    fn acknowledgement_status_is_trailing() {
        let mut frame = ACK_MARKER.to_vec();
        frame.extend_from_slice(&[0x11, 0x42, 0x01]);

        let record = Decoder::new(Generation::Two)
            .decode_frame_at(&frame, when())
            .unwrap();
        assert_eq!(record.get("last_command"), Some(&Value::Int(0x42)));
        assert_eq!(record.get("acknowledgement"), Some(&Value::Int(1)));

        // one byte after the marker is not enough
        frame.truncate(ACK_MARKER.len() + 1);
        let record = Decoder::new(Generation::Two)
            .decode_frame_at(&frame, when())
            .unwrap();
        assert_eq!(names(&record), vec!["message"]);
    }

    #[test]
    fn acknowledgement_missing_status() {
        let record = Decoder::new(Generation::Two)
            .decode_frame_at(ACK_MARKER, when())
            .unwrap();
        assert_eq!(names(&record), vec!["message"]);
    }
}
