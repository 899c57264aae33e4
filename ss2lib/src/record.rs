//! Decoded beacon records.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Timestamp format used in records and log file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// One decoded value.
#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub enum Value {
    /// A raw integer with no unit conversion.
    Int(i64),
    /// A converted or floating point value.
    Float(f64),
    /// A single bit. Serialized as 0 or 1.
    Flag(bool),
    Text(String),
}

impl Value {
    /// The value as a float, if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Flag(v) => Some(*v as u8 as f64),
            Value::Text(_) => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Flag(v) => write!(f, "{}", *v as u8),
            Value::Text(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Flag(v) => serializer.serialize_u8(*v as u8),
            Value::Text(v) => serializer.serialize_str(v),
        }
    }
}

/// A decoded frame: metadata, then named values in wire order.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Local time of decoding, in [TIMESTAMP_FORMAT].
    pub timestamp: String,
    pub msgtype: u8,
    /// Position of this frame in a multi-frame report, starting at 1.
    pub messagenum: u8,
    pub messagetotal: u8,
    fields: Vec<(&'static str, Value)>,
}

impl Record {
    pub fn new(timestamp: String, msgtype: u8, sequence: (u8, u8)) -> Self {
        Self {
            timestamp,
            msgtype,
            messagenum: sequence.0,
            messagetotal: sequence.1,
            fields: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, name: &'static str, value: Value) {
        self.fields.push((name, value));
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Iterate over fields, in the order they appear in the frame.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    /// Number of decoded fields, not counting metadata.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(4 + self.fields.len()))?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.serialize_entry("msgtype", &self.msgtype)?;
        map.serialize_entry("messagenum", &self.messagenum)?;
        map.serialize_entry("messagetotal", &self.messagetotal)?;
        for (name, value) in self.fields.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
