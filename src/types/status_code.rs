// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the `StatusCode` type along with the subset of OPC UA status codes that the codec
//! produces or carries.

use std::{
    error::Error,
    fmt,
    fmt::Formatter,
    io,
};

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::codec::{DecodeStream, EncodeStream};
use crate::types::encoding::*;

macro_rules! status_codes {
    ( $( $(#[$($doc:tt)*])* $name:ident = $value:literal ),* $(,)? ) => {
        bitflags! {
            pub struct StatusCode: u32 {
                // Flag bits and masks
                const IS_ERROR = 0x8000_0000;
                const IS_UNCERTAIN = 0x4000_0000;
                const STATUS_MASK = 0xFFFF_0000;
                const BIT_MASK = 0x0000_FFFF;
                // Historian bits
                const HISTORICAL_CALCULATED = 0x0000_0001;
                const HISTORICAL_INTERPOLATED = 0x0000_0002;
                const HISTORICAL_PARTIAL = 0x0000_0004;
                const HISTORICAL_EXTRA_DATA = 0x0000_0008;
                const HISTORICAL_MULTI_VALUE = 0x0000_0010;
                // Overflow bit
                const OVERFLOW = 0x0000_0080;
                $(
                    $(#[$($doc)*])*
                    #[allow(non_upper_case_globals)]
                    const $name = $value;
                )*
            }
        }

        impl StatusCode {
            /// Returns the name of the status part of the code, e.g. "BadDecodingError"
            pub fn name(&self) -> &'static str {
                match self.status().bits() {
                    $( $value => stringify!($name), )*
                    _ => "Unrecognized",
                }
            }

            /// Looks up a status code by its name
            pub fn from_name(name: &str) -> Option<StatusCode> {
                match name {
                    $( stringify!($name) => Some(StatusCode::$name), )*
                    _ => None,
                }
            }
        }
    };
}

status_codes! {
    Good = 0x0000_0000,
    UncertainLastUsableValue = 0x4090_0000,
    UncertainNoCommunicationLastUsableValue = 0x408F_0000,
    BadUnexpectedError = 0x8001_0000,
    BadInternalError = 0x8002_0000,
    BadOutOfMemory = 0x8003_0000,
    BadResourceUnavailable = 0x8004_0000,
    BadCommunicationError = 0x8005_0000,
    /// Encoding halted because of invalid data in the objects being serialized.
    BadEncodingError = 0x8006_0000,
    /// Decoding halted because of invalid data in the stream.
    BadDecodingError = 0x8007_0000,
    /// The message encoding/decoding limits imposed by the stack have been exceeded.
    BadEncodingLimitsExceeded = 0x8008_0000,
    BadRequestTooLarge = 0x80B8_0000,
    BadResponseTooLarge = 0x80B9_0000,
    BadUnknownResponse = 0x8009_0000,
    BadTimeout = 0x800A_0000,
    /// The server does not support the requested service.
    BadServiceUnsupported = 0x800B_0000,
    BadShutdown = 0x800C_0000,
    BadNothingToDo = 0x800F_0000,
    BadTooManyOperations = 0x8010_0000,
    /// The extension object cannot be (de)serialized because the data type id is not recognized.
    BadDataTypeIdUnknown = 0x8011_0000,
    BadSessionIdInvalid = 0x8025_0000,
    BadSessionClosed = 0x8026_0000,
    BadNodeIdInvalid = 0x8033_0000,
    BadNodeIdUnknown = 0x8034_0000,
    BadAttributeIdInvalid = 0x8035_0000,
    BadIndexRangeInvalid = 0x8036_0000,
    BadNotSupported = 0x803D_0000,
    BadTypeMismatch = 0x8074_0000,
    BadInvalidArgument = 0x80AB_0000,
    BadInvalidTimestampArgument = 0x80BD_0000,
    BadMaxAgeInvalid = 0x8070_0000,
}

// The bitflags! macro implements Debug for StatusCode but it fouls the display because status
// codes are a combination of bits and unique values.

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        // Displays the StatusCode as it's name, or its name+bitflags
        let bits = self.bitflags();
        if bits.is_empty() {
            write!(f, "{}", self.name())
        } else {
            write!(f, "{}+{:#06x}", self.name(), bits.bits())
        }
    }
}

impl BinaryEncoder<StatusCode> for StatusCode {
    fn encode(&self, stream: &mut EncodeStream<'_>) -> EncodingResult<usize> {
        write_u32(stream, self.bits())
    }

    fn decode(stream: &mut DecodeStream<'_>) -> EncodingResult<Self> {
        Ok(StatusCode::from_bits_truncate(read_u32(stream)?))
    }
}

crate::impl_scalar!(StatusCode);

impl Error for StatusCode {}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::Good
    }
}

impl StatusCode {
    /// Returns the bit flags of the status code, i.e. it masks out the actual status code value
    pub fn bitflags(&self) -> StatusCode {
        *self & StatusCode::BIT_MASK
    }

    /// Returns the status only, i.e. it masks out any bit flags that come with the status code
    pub fn status(&self) -> StatusCode {
        *self & StatusCode::STATUS_MASK
    }

    /// Tests if the status code is bad
    pub fn is_bad(&self) -> bool {
        self.contains(StatusCode::IS_ERROR)
    }

    /// Tests if the status code is uncertain
    pub fn is_uncertain(&self) -> bool {
        self.contains(StatusCode::IS_UNCERTAIN)
    }

    /// Tests if the status code is good (i.e. not bad or uncertain)
    pub fn is_good(&self) -> bool {
        !self.is_bad() && !self.is_uncertain()
    }
}

impl From<StatusCode> for io::Error {
    fn from(e: StatusCode) -> io::Error {
        io::Error::new(io::ErrorKind::Other, format!("StatusCode {}", e))
    }
}

// Serialize / Deserialize are manually implemented because bitflags! doesn't do it.

impl Serialize for StatusCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

struct StatusCodeVisitor;

impl<'de> Visitor<'de> for StatusCodeVisitor {
    type Value = u32;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an unsigned 32-bit integer")
    }

    fn visit_u32<E>(self, value: u32) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(value)
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        u32::try_from(value).map_err(|_| E::custom("status code out of range"))
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as Deserializer<'de>>::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(StatusCode::from_bits_truncate(
            deserializer.deserialize_u32(StatusCodeVisitor)?,
        ))
    }
}

#[test]
fn status_code() {
    assert!(StatusCode::Good.is_good());
    assert!(!StatusCode::Good.is_bad());
    assert!(!StatusCode::Good.is_uncertain());

    assert!(StatusCode::UncertainLastUsableValue.is_uncertain());
    assert!(!StatusCode::UncertainLastUsableValue.is_bad());
    assert!(!StatusCode::UncertainLastUsableValue.is_good());

    assert!(StatusCode::BadDecodingError.is_bad());
    assert!(!StatusCode::BadDecodingError.is_uncertain());
    assert!(!StatusCode::BadDecodingError.is_good());

    assert_eq!(
        (StatusCode::BadDecodingError | StatusCode::HISTORICAL_CALCULATED).status(),
        StatusCode::BadDecodingError
    );
    assert_eq!(
        (StatusCode::BadDecodingError | StatusCode::HISTORICAL_CALCULATED).bitflags(),
        StatusCode::HISTORICAL_CALCULATED
    );
}

#[test]
fn status_code_names() {
    assert_eq!(StatusCode::BadServiceUnsupported.name(), "BadServiceUnsupported");
    assert_eq!(
        StatusCode::from_name("BadEncodingLimitsExceeded"),
        Some(StatusCode::BadEncodingLimitsExceeded)
    );
    assert_eq!(StatusCode::from_name("NotAStatus"), None);
    assert_eq!(
        format!("{}", StatusCode::BadDecodingError | StatusCode::OVERFLOW),
        "BadDecodingError+0x0080"
    );
}
