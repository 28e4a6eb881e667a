//! Scalar cell values and column storage types.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Physical storage type of a fixed-width column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Bool,
    U8,
    I32,
    I64,
    F32,
    F64,
}

impl DType {
    /// Width of one cell in bytes.
    pub const fn width(self) -> usize {
        match self {
            DType::Bool | DType::U8 => 1,
            DType::I32 | DType::F32 => 4,
            DType::I64 | DType::F64 => 8,
        }
    }

    /// Decode one little-endian cell. `bytes` must be exactly `width()` long.
    pub(crate) fn decode(self, bytes: &[u8]) -> StoreResult<Value> {
        let wrong_width = || {
            StoreError::corruption(
                "raw store",
                format!("expected {} bytes for {:?}, got {}", self.width(), self, bytes.len()),
            )
        };
        Ok(match self {
            DType::Bool => match bytes {
                [0] => Value::Bool(false),
                [1] => Value::Bool(true),
                [b] => {
                    return Err(StoreError::corruption(
                        "raw store",
                        format!("invalid bool byte {b:#04x}"),
                    ))
                }
                _ => return Err(wrong_width()),
            },
            DType::U8 => match bytes {
                [b] => Value::Int(i64::from(*b)),
                _ => return Err(wrong_width()),
            },
            DType::I32 => {
                Value::Int(i64::from(i32::from_le_bytes(bytes.try_into().map_err(|_| wrong_width())?)))
            }
            DType::I64 => Value::Int(i64::from_le_bytes(bytes.try_into().map_err(|_| wrong_width())?)),
            DType::F32 => {
                Value::Float(f64::from(f32::from_le_bytes(bytes.try_into().map_err(|_| wrong_width())?)))
            }
            DType::F64 => Value::Float(f64::from_le_bytes(bytes.try_into().map_err(|_| wrong_width())?)),
        })
    }

    /// Encode a value into `out`. Fails if the value does not fit this type.
    pub(crate) fn encode(self, value: Value, out: &mut Vec<u8>) -> StoreResult<()> {
        let mismatch = || {
            StoreError::Serialization(format!("value {value:?} does not fit column type {self:?}"))
        };
        match (self, value) {
            (DType::Bool, Value::Bool(b)) => out.push(u8::from(b)),
            (DType::U8, Value::Int(i)) => out.push(u8::try_from(i).map_err(|_| mismatch())?),
            (DType::I32, Value::Int(i)) => {
                out.extend_from_slice(&i32::try_from(i).map_err(|_| mismatch())?.to_le_bytes())
            }
            (DType::I64, Value::Int(i)) => out.extend_from_slice(&i.to_le_bytes()),
            // f32 columns deliberately lose precision
            (DType::F32, Value::Float(f)) => out.extend_from_slice(&(f as f32).to_le_bytes()),
            (DType::F64, Value::Float(f)) => out.extend_from_slice(&f.to_le_bytes()),
            _ => return Err(mismatch()),
        }
        Ok(())
    }
}

/// One typed scalar from a descriptor row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Value {
    /// Numeric view of the value; booleans map to 0.0 / 1.0.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Bool(b) => f64::from(u8::from(b)),
            Value::Int(i) => i as f64,
            Value::Float(f) => f,
        }
    }

    /// The boolean, if this is a flag cell.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}
