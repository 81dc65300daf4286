// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `ByteString`.

use std::{convert::TryFrom, fmt};

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    codec::{DecodeStream, EncodeStream},
    types::{encoding::*, guid::Guid},
};

/// A sequence of octets. Null and empty are distinct values and both survive a round trip.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct ByteString {
    pub value: Option<Vec<u8>>,
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        self.value.as_deref().unwrap_or(&[])
    }
}

impl Serialize for ByteString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.value.is_some() {
            serializer.serialize_str(&self.as_base64())
        } else {
            serializer.serialize_none()
        }
    }
}

struct ByteStringVisitor;

impl<'de> de::Visitor<'de> for ByteStringVisitor {
    type Value = ByteString;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "a base64 encoded string value or null")
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ByteString::null())
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ByteString::null())
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(self)
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        ByteString::from_base64(v).ok_or_else(|| de::Error::custom("Cannot decode base64 bytestring"))
    }
}

impl<'de> Deserialize<'de> for ByteString {
    fn deserialize<D>(deserializer: D) -> Result<ByteString, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(ByteStringVisitor)
    }
}

impl BinaryEncoder<ByteString> for ByteString {
    fn encode(&self, stream: &mut EncodeStream<'_>) -> EncodingResult<usize> {
        // Byte strings are encoded as an Int32 length followed by the octets. -1 is a null value
        match self.value {
            None => write_i32(stream, -1),
            Some(ref value) => {
                let mut size = write_length(stream, value.len())?;
                size += stream.write_all(value)?;
                Ok(size)
            }
        }
    }

    fn decode(stream: &mut DecodeStream<'_>) -> EncodingResult<Self> {
        let max_byte_string_length = stream.decoding_options().max_byte_string_length;
        match read_length(stream, max_byte_string_length, "ByteString")? {
            None => Ok(ByteString::null()),
            Some(len) => Ok(ByteString {
                value: Some(stream.read_slice(len)?.to_vec()),
            }),
        }
    }
}

crate::impl_scalar!(ByteString);

impl<'a, T> From<&'a T> for ByteString
where
    T: AsRef<[u8]> + ?Sized,
{
    fn from(value: &'a T) -> Self {
        Self::from(value.as_ref().to_vec())
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(value: Vec<u8>) -> Self {
        // Empty bytes will be treated as Some([])
        ByteString { value: Some(value) }
    }
}

impl From<Guid> for ByteString {
    fn from(value: Guid) -> Self {
        ByteString::from(value.as_bytes().to_vec())
    }
}

impl TryFrom<&ByteString> for Guid {
    type Error = ();

    fn try_from(value: &ByteString) -> Result<Self, Self::Error> {
        let bytes: [u8; 16] = value.as_ref().try_into().map_err(|_| ())?;
        Ok(Guid::from_bytes(bytes))
    }
}

impl Default for ByteString {
    fn default() -> Self {
        ByteString::null()
    }
}

impl ByteString {
    /// Create a null string (not the same as an empty string)
    pub fn null() -> ByteString {
        ByteString { value: None }
    }

    /// Test if the string is null
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    // Test if the bytestring has an empty value (not the same as null)
    pub fn is_empty(&self) -> bool {
        self.value.as_ref().map_or(false, |v| v.is_empty())
    }

    /// Test if the string is null or empty
    pub fn is_null_or_empty(&self) -> bool {
        self.is_null() || self.is_empty()
    }

    /// Number of octets held, 0 for null
    pub fn len(&self) -> usize {
        self.as_ref().len()
    }

    /// Creates a byte string from a Base64 encoded string
    pub fn from_base64(data: &str) -> Option<ByteString> {
        STANDARD.decode(data).ok().map(Self::from)
    }

    /// Encodes the bytestring as a Base64 encoded string
    pub fn as_base64(&self) -> String {
        STANDARD.encode(self.as_ref())
    }
}

#[test]
fn bytestring_null() {
    let v = ByteString::null();
    assert!(v.is_null());
    assert!(!v.is_empty());
    assert_eq!(v.len(), 0);
}

#[test]
fn bytestring_empty() {
    let v = ByteString::from(&[]);
    assert!(!v.is_null());
    assert!(v.is_null_or_empty());
    assert!(v.is_empty());
    assert_ne!(v, ByteString::null());
}

#[test]
fn bytestring_base64() {
    let v = ByteString::from(&[0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(v.as_base64(), "3q2+7w==");
    assert_eq!(ByteString::from_base64("3q2+7w==").unwrap(), v);
    assert!(ByteString::from_base64("not base64!").is_none());
}

#[test]
fn bytestring_serde() {
    let v = ByteString::from(&[1u8, 2, 3]);
    let json = serde_json::to_string(&v).unwrap();
    assert_eq!(json, "\"AQID\"");
    assert_eq!(serde_json::from_str::<ByteString>(&json).unwrap(), v);
    assert_eq!(serde_json::to_string(&ByteString::null()).unwrap(), "null");
    assert_eq!(
        serde_json::from_str::<ByteString>("null").unwrap(),
        ByteString::null()
    );
}
