//! Device message dictionary codec
//!
//! Wire format (little-endian), matching the watch's message dictionary:
//! `[count:u8]` followed by `count` tuples of
//! `[key:u32][type:u8][length:u16][value:length bytes]`.

use crate::error::{CompanionError, Result};
use crate::types::{DeviceMessage, TimeValue};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

pub(crate) const DICT_HEADER_SIZE: usize = 1;
pub(crate) const TUPLE_HEADER_SIZE: usize = 7;

/// Tuple value types understood by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TupleType {
    ByteArray = 0,
    CString = 1,
    UInt = 2,
    Int = 3,
}

impl TryFrom<u8> for TupleType {
    type Error = CompanionError;
    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::ByteArray),
            1 => Ok(Self::CString),
            2 => Ok(Self::UInt),
            3 => Ok(Self::Int),
            _ => Err(CompanionError::Encode(format!(
                "Unknown tuple type: 0x{:02x}",
                value
            ))),
        }
    }
}

/// Dictionary keys assigned to each device message field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageKeys {
    #[serde(default = "default_text_key")]
    pub text: u32,
    #[serde(default = "default_time_key")]
    pub time: u32,
}

fn default_text_key() -> u32 {
    0
}

fn default_time_key() -> u32 {
    1
}

impl Default for MessageKeys {
    fn default() -> Self {
        Self {
            text: default_text_key(),
            time: default_time_key(),
        }
    }
}

/// A single decoded dictionary entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TupleValue {
    Bytes(Vec<u8>),
    CString(String),
    UInt(u64),
    Int(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    pub key: u32,
    pub value: TupleValue,
}

/// Encode a device message into a dictionary
///
/// A `None` time is omitted. Integers use 4 bytes when they fit in 32 bits
/// and 8 bytes otherwise; values are never clamped. A float is sent as an
/// integer only when it is a whole number within `i64`, otherwise the
/// message cannot be encoded.
pub fn encode(message: &DeviceMessage, keys: &MessageKeys) -> Result<Bytes> {
    let mut tuples = vec![Tuple {
        key: keys.text,
        value: TupleValue::CString(message.text.clone()),
    }];
    if let Some(time) = &message.time {
        tuples.push(Tuple {
            key: keys.time,
            value: time_tuple_value(time)?,
        });
    }
    encode_tuples(&tuples)
}

fn time_tuple_value(time: &TimeValue) -> Result<TupleValue> {
    match time {
        TimeValue::Integer(v) => Ok(TupleValue::Int(*v)),
        TimeValue::Unsigned(v) => Ok(TupleValue::UInt(*v)),
        TimeValue::Float(v) => {
            // i64::MAX is not representable as f64; the bound is exclusive
            let whole = v.is_finite() && v.fract() == 0.0;
            if whole && *v >= i64::MIN as f64 && *v < i64::MAX as f64 {
                Ok(TupleValue::Int(*v as i64))
            } else {
                Err(CompanionError::Encode(format!(
                    "Time value {} has no integer encoding",
                    v
                )))
            }
        }
        TimeValue::Text(s) => Ok(TupleValue::CString(s.clone())),
    }
}

/// Encode raw tuples into a dictionary
pub fn encode_tuples(tuples: &[Tuple]) -> Result<Bytes> {
    let count = u8::try_from(tuples.len()).map_err(|_| {
        CompanionError::Encode(format!("Too many tuples: {}", tuples.len()))
    })?;

    let mut buf = BytesMut::with_capacity(DICT_HEADER_SIZE + tuples.len() * TUPLE_HEADER_SIZE);
    buf.put_u8(count);

    for tuple in tuples {
        let (tuple_type, data) = match &tuple.value {
            TupleValue::Bytes(b) => (TupleType::ByteArray, b.clone()),
            TupleValue::CString(s) => {
                if s.contains('\0') {
                    return Err(CompanionError::Encode(format!(
                        "String for key {} contains an interior NUL",
                        tuple.key
                    )));
                }
                let mut data = Vec::with_capacity(s.len() + 1);
                data.extend_from_slice(s.as_bytes());
                data.push(0);
                (TupleType::CString, data)
            }
            TupleValue::UInt(v) => match u32::try_from(*v) {
                Ok(small) => (TupleType::UInt, small.to_le_bytes().to_vec()),
                Err(_) => (TupleType::UInt, v.to_le_bytes().to_vec()),
            },
            TupleValue::Int(v) => match i32::try_from(*v) {
                Ok(small) => (TupleType::Int, small.to_le_bytes().to_vec()),
                Err(_) => (TupleType::Int, v.to_le_bytes().to_vec()),
            },
        };

        let len = u16::try_from(data.len()).map_err(|_| {
            CompanionError::Encode(format!(
                "Value for key {} too large: {} bytes (max {})",
                tuple.key,
                data.len(),
                u16::MAX
            ))
        })?;

        buf.put_u32_le(tuple.key);
        buf.put_u8(tuple_type as u8);
        buf.put_u16_le(len);
        buf.put_slice(&data);
    }

    Ok(buf.freeze())
}

/// Decode a dictionary into its tuples
pub fn decode(mut buf: &[u8]) -> Result<Vec<Tuple>> {
    if buf.remaining() < DICT_HEADER_SIZE {
        return Err(CompanionError::Encode("Empty dictionary".to_string()));
    }
    let count = buf.get_u8();
    let mut tuples = Vec::with_capacity(count as usize);

    for index in 0..count {
        if buf.remaining() < TUPLE_HEADER_SIZE {
            return Err(CompanionError::Encode(format!(
                "Truncated header for tuple {}",
                index
            )));
        }
        let key = buf.get_u32_le();
        let tuple_type = TupleType::try_from(buf.get_u8())?;
        let len = buf.get_u16_le() as usize;
        if buf.remaining() < len {
            return Err(CompanionError::Encode(format!(
                "Truncated value for key {}: expected {} bytes, got {}",
                key,
                len,
                buf.remaining()
            )));
        }
        let data = &buf[..len];
        let value = decode_value(key, tuple_type, data)?;
        buf.advance(len);
        tuples.push(Tuple { key, value });
    }

    Ok(tuples)
}

fn decode_value(key: u32, tuple_type: TupleType, data: &[u8]) -> Result<TupleValue> {
    let bad_width = || {
        CompanionError::Encode(format!(
            "Unsupported integer width {} for key {}",
            data.len(),
            key
        ))
    };
    match tuple_type {
        TupleType::ByteArray => Ok(TupleValue::Bytes(data.to_vec())),
        TupleType::CString => {
            let text = data.strip_suffix(&[0u8]).unwrap_or(data);
            String::from_utf8(text.to_vec())
                .map(TupleValue::CString)
                .map_err(|e| CompanionError::Encode(format!("Key {}: {}", key, e)))
        }
        TupleType::Int => {
            let mut data = data;
            let value = match data.len() {
                1 => data.get_i8() as i64,
                2 => data.get_i16_le() as i64,
                4 => data.get_i32_le() as i64,
                8 => data.get_i64_le(),
                _ => return Err(bad_width()),
            };
            Ok(TupleValue::Int(value))
        }
        TupleType::UInt => {
            let mut data = data;
            let value = match data.len() {
                1 => data.get_u8() as u64,
                2 => data.get_u16_le() as u64,
                4 => data.get_u32_le() as u64,
                8 => data.get_u64_le(),
                _ => return Err(bad_width()),
            };
            Ok(TupleValue::UInt(value))
        }
    }
}
