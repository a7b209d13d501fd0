use serde::Serialize;

use crate::error::{Error, ErrorKind, Result};
use crate::macros::map;

/// The data tree exchanged by resource operations.
///
/// It is the output of a retrieve or create operation and the input of an
/// update one. A [`Payload`] is independent of any wire encoding.
///
/// When deserialized, byte strings and arrays of integers are
/// indistinguishable, so a sequence is always decoded as
/// [`Payload::Array`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
#[serde(untagged)]
pub enum Payload {
    /// A [`bool`] value.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A floating point value.
    Double(f64),
    /// A characters sequence.
    String(String),
    /// A sequence of payloads.
    Array(Vec<Payload>),
    /// A string-keyed mapping.
    Map(PayloadMap),
    /// A byte string.
    Bytes(Vec<u8>),
}

impl Payload {
    /// Returns the name of the [`Payload`] variant.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Bytes(_) => "bytes",
        }
    }

    /// Returns the [`bool`] value, if any.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the integer value, if any.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the floating point value, if any.
    ///
    /// Integers are converted to floating point values.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the characters sequence, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the byte string, if any.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the sequence, if any.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Payload]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the mapping, if any.
    #[must_use]
    pub const fn as_map(&self) -> Option<&PayloadMap> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Encodes the [`Payload`] as a `json` string.
    ///
    /// # Errors
    ///
    /// Fails when the [`Payload`] cannot be encoded.
    #[inline]
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::from)
    }
}

map! {
  /// A string-keyed mapping of [`Payload`]s.
  ///
  /// Entries keep their insertion order until [`PayloadMap::sort_keys`]
  /// is called.
  #[derive(Debug, Clone, PartialEq, Serialize)]
  #[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
  #[serde(transparent)]
  pub struct PayloadMap(IndexMap<String, Payload, DefaultHashBuilder>);
}

impl PayloadMap {
    /// Retrieves the [`Payload`] associated with the given key.
    #[must_use]
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Payload> {
        self.0.get(key)
    }

    /// Checks whether the given key is present.
    #[must_use]
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterates over the keys.
    #[inline]
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Payload> {
        self.0.keys()
    }

    /// Sorts the entries in ascending order of their keys.
    #[inline]
    pub fn sort_keys(&mut self) {
        self.0.sort_keys();
    }
}

/// Conversion of a [`Payload`] into a concrete type.
///
/// Typed value setters rely on this trait to receive their input.
pub trait FromPayload: Sized {
    /// Converts a [`Payload`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidType`] when the payload does not
    /// represent the type.
    fn from_payload(payload: Payload) -> Result<Self>;
}

fn invalid_type(expected: &'static str, payload: &Payload) -> Error {
    Error::new(
        ErrorKind::InvalidType,
        format!("Expected a {expected} payload, found a {} one", payload.kind()),
    )
}

impl FromPayload for Payload {
    fn from_payload(payload: Payload) -> Result<Self> {
        Ok(payload)
    }
}

impl FromPayload for bool {
    fn from_payload(payload: Payload) -> Result<Self> {
        payload.as_bool().ok_or_else(|| invalid_type("bool", &payload))
    }
}

impl FromPayload for i64 {
    fn from_payload(payload: Payload) -> Result<Self> {
        payload.as_i64().ok_or_else(|| invalid_type("int", &payload))
    }
}

impl FromPayload for f64 {
    fn from_payload(payload: Payload) -> Result<Self> {
        payload.as_f64().ok_or_else(|| invalid_type("double", &payload))
    }
}

impl FromPayload for String {
    fn from_payload(payload: Payload) -> Result<Self> {
        match payload {
            Payload::String(v) => Ok(v),
            other => Err(invalid_type("string", &other)),
        }
    }
}

impl FromPayload for PayloadMap {
    fn from_payload(payload: Payload) -> Result<Self> {
        match payload {
            Payload::Map(v) => Ok(v),
            other => Err(invalid_type("map", &other)),
        }
    }
}

macro_rules! payload_array {
    ($($ty:ty),+) => {
        $(
            impl From<Vec<$ty>> for Payload {
                fn from(values: Vec<$ty>) -> Self {
                    Self::Array(values.into_iter().map(Into::into).collect())
                }
            }

            impl FromPayload for Vec<$ty> {
                fn from_payload(payload: Payload) -> Result<Self> {
                    match payload {
                        Payload::Array(values) => {
                            values.into_iter().map(<$ty>::from_payload).collect()
                        }
                        other => Err(invalid_type("array", &other)),
                    }
                }
            }
        )+
    };
}

payload_array!(bool, i64, f64, String);

impl From<bool> for Payload {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Payload {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Payload {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<u32> for Payload {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Payload {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Payload {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<String> for Payload {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<Payload>> for Payload {
    fn from(v: Vec<Payload>) -> Self {
        Self::Array(v)
    }
}

impl From<PayloadMap> for Payload {
    fn from(v: PayloadMap) -> Self {
        Self::Map(v)
    }
}
