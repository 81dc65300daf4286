// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the definition of `LocalizedText`.

use std::fmt;

use crate::{
    codec::{DecodeStream, EncodeStream},
    types::{encoding::*, string::*},
};

/// Mask bit set when the locale is in the stream
const HAS_LOCALE: u8 = 0x1;
/// Mask bit set when the text is in the stream
const HAS_TEXT: u8 = 0x2;

/// A human readable text with an optional locale identifier.
#[derive(PartialEq, Eq, Default, Debug, Clone, Hash, Serialize, Deserialize)]
pub struct LocalizedText {
    /// The locale. Omitted from stream if null or empty
    pub locale: UAString,
    /// The text in the specified locale. Omitted from stream if null or empty.
    pub text: UAString,
}

impl<'a> From<&'a str> for LocalizedText {
    fn from(value: &'a str) -> Self {
        Self {
            locale: UAString::null(),
            text: UAString::from(value),
        }
    }
}

impl From<String> for LocalizedText {
    fn from(value: String) -> Self {
        Self {
            locale: UAString::null(),
            text: UAString::from(value),
        }
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl BinaryEncoder<LocalizedText> for LocalizedText {
    fn encode(&self, stream: &mut EncodeStream<'_>) -> EncodingResult<usize> {
        // A bit mask that indicates which fields are present in the stream.
        let mut encoding_mask: u8 = 0;
        if !self.locale.is_empty() {
            encoding_mask |= HAS_LOCALE;
        }
        if !self.text.is_empty() {
            encoding_mask |= HAS_TEXT;
        }
        let mut size = write_u8(stream, encoding_mask)?;
        if encoding_mask & HAS_LOCALE != 0 {
            size += self.locale.encode(stream)?;
        }
        if encoding_mask & HAS_TEXT != 0 {
            size += self.text.encode(stream)?;
        }
        Ok(size)
    }

    fn decode(stream: &mut DecodeStream<'_>) -> EncodingResult<Self> {
        let encoding_mask = read_u8(stream)?;
        let locale = if encoding_mask & HAS_LOCALE != 0 {
            UAString::decode(stream)?
        } else {
            UAString::null()
        };
        let text = if encoding_mask & HAS_TEXT != 0 {
            UAString::decode(stream)?
        } else {
            UAString::null()
        };
        Ok(LocalizedText { locale, text })
    }
}

crate::impl_override!(LocalizedText);

impl LocalizedText {
    pub fn new(locale: &str, text: &str) -> LocalizedText {
        LocalizedText {
            locale: UAString::from(locale),
            text: UAString::from(text),
        }
    }

    pub fn null() -> LocalizedText {
        LocalizedText {
            locale: UAString::null(),
            text: UAString::null(),
        }
    }
}
