// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `UAString` and the encoding of Rust strings.

use std::fmt;

use crate::{
    codec::{DecodeStream, EncodeStream},
    types::encoding::*,
};

/// Writes a string as an Int32 length followed by its UTF-8 bytes. `None` writes the null length
/// -1 and no bytes.
pub(crate) fn write_string(stream: &mut EncodeStream<'_>, value: Option<&str>) -> EncodingResult<usize> {
    match value {
        None => write_i32(stream, -1),
        Some(value) => {
            let mut size = write_length(stream, value.len())?;
            size += stream.write_all(value.as_bytes())?;
            Ok(size)
        }
    }
}

/// Reads a string written by `write_string`, checking the length against the decoding limits.
pub(crate) fn read_string(stream: &mut DecodeStream<'_>) -> EncodingResult<Option<String>> {
    let max_string_length = stream.decoding_options().max_string_length;
    match read_length(stream, max_string_length, "String")? {
        None => Ok(None),
        Some(len) => {
            let buf = stream.read_slice(len)?;
            let value = std::str::from_utf8(buf).map_err(|err| {
                trace!("Decoded string was not valid UTF-8 - {}", err);
                EncodingError::decoding(format!("string is not valid UTF-8, {}", err))
            })?;
            Ok(Some(value.to_string()))
        }
    }
}

/// To avoid naming conflict hell, the OPC UA String type is typed `UAString` so it does not collide
/// with the Rust `String`.
///
/// A string contains UTF-8 encoded characters or a null value. A null value is distinct from
/// being an empty string so internally, the code maintains that distinction by holding the value
/// as an `Option<String>`.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub struct UAString {
    value: Option<String>,
}

impl fmt::Display for UAString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref value) = self.value {
            write!(f, "{}", value)
        } else {
            write!(f, "[null]")
        }
    }
}

impl BinaryEncoder<UAString> for UAString {
    fn encode(&self, stream: &mut EncodeStream<'_>) -> EncodingResult<usize> {
        // Strings are encoded as UTF8 chars preceded by an Int32 length. A -1 indicates a null string
        write_string(stream, self.value.as_deref())
    }

    fn decode(stream: &mut DecodeStream<'_>) -> EncodingResult<Self> {
        Ok(UAString {
            value: read_string(stream)?,
        })
    }
}

// A Rust `String` cannot be null so it is always written with its length, and a null string on the
// wire decodes as empty.
impl BinaryEncoder<String> for String {
    fn encode(&self, stream: &mut EncodeStream<'_>) -> EncodingResult<usize> {
        write_string(stream, Some(self))
    }

    fn decode(stream: &mut DecodeStream<'_>) -> EncodingResult<Self> {
        Ok(read_string(stream)?.unwrap_or_default())
    }
}

crate::impl_scalar!(UAString);

impl From<UAString> for String {
    fn from(value: UAString) -> Self {
        value.value.unwrap_or_default()
    }
}

impl AsRef<str> for UAString {
    fn as_ref(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

impl<'a> From<&'a str> for UAString {
    fn from(value: &'a str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<&String> for UAString {
    fn from(value: &String) -> Self {
        UAString {
            value: Some(value.clone()),
        }
    }
}

impl From<String> for UAString {
    fn from(value: String) -> Self {
        UAString { value: Some(value) }
    }
}

impl From<Option<String>> for UAString {
    fn from(value: Option<String>) -> Self {
        UAString { value }
    }
}

impl Default for UAString {
    fn default() -> Self {
        UAString::null()
    }
}

impl PartialEq<str> for UAString {
    fn eq(&self, other: &str) -> bool {
        match self.value {
            None => false,
            Some(ref v) => v.eq(other),
        }
    }
}

impl UAString {
    pub fn value(&self) -> &Option<String> {
        &self.value
    }

    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    /// Returns true if the string is null or empty, false otherwise
    pub fn is_empty(&self) -> bool {
        self.value.as_ref().map_or(true, |v| v.is_empty())
    }

    /// Returns the length of the string in bytes or -1 for null.
    pub fn len(&self) -> isize {
        self.value.as_ref().map_or(-1, |v| v.len() as isize)
    }

    /// Create a null string (not the same as an empty string).
    pub fn null() -> UAString {
        UAString { value: None }
    }

    /// Test if the string is null.
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

/// An XML element.
pub type XmlElement = UAString;

#[test]
fn string_null() {
    let s = UAString::null();
    assert!(s.is_null());
    assert!(s.is_empty());
    assert_eq!(s.len(), -1);
    assert_eq!(s.as_ref(), "");
}

#[test]
fn string_empty() {
    let s = UAString::from("");
    assert!(!s.is_null());
    assert!(s.is_empty());
    assert_eq!(s.len(), 0);
    assert_ne!(s, UAString::null());
}

#[test]
fn string_eq() {
    let s = UAString::null();
    assert!(!s.eq(""));

    let s = UAString::from("");
    assert!(s.eq(""));

    let s = UAString::from("Sunshine");
    assert!(s.ne("Moonshine"));
    assert!(s.eq("Sunshine"));
    assert!(!s.eq("Sunshine "));
}
