// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `DataValue`.

use crate::{
    codec::{DecodeStream, EncodeStream},
    types::{date_time::DateTime, encoding::*, status_code::StatusCode, variant::Variant},
};

bitflags! {
    struct DataValueFlags: u8 {
        /// False if the Value is Null.
        const HAS_VALUE = 0x1;
        /// False if the StatusCode is Good.
        const HAS_STATUS = 0x2;
        /// False if the Source Timestamp is DateTime.MinValue.
        const HAS_SOURCE_TIMESTAMP = 0x4;
        /// False if the Server Timestamp is DateTime.MinValue.
        const HAS_SERVER_TIMESTAMP = 0x8;
        /// False if the Source Picoseconds is 0.
        const HAS_SOURCE_PICOSECONDS = 0x10;
        /// False if the Server Picoseconds is 0.
        const HAS_SERVER_PICOSECONDS = 0x20;
    }
}

/// A data value is a value of a variable in the OPC UA server and contains information about its
/// value, status and change timestamps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValue {
    /// The value. Not present if the Value bit in the EncodingMask is False.
    pub value: Option<Variant>,
    /// The status associated with the value.
    pub status: Option<StatusCode>,
    /// The source timestamp associated with the value.
    pub source_timestamp: Option<DateTime>,
    /// The number of 10 picosecond intervals for the SourceTimestamp. Ignored without a source
    /// timestamp.
    pub source_picoseconds: Option<u16>,
    /// The Server timestamp associated with the value.
    pub server_timestamp: Option<DateTime>,
    /// The number of 10 picosecond intervals for the ServerTimestamp. Ignored without a server
    /// timestamp.
    pub server_picoseconds: Option<u16>,
}

impl BinaryEncoder<DataValue> for DataValue {
    fn encode(&self, stream: &mut EncodeStream<'_>) -> EncodingResult<usize> {
        let mut size = write_u8(stream, self.encoding_mask().bits())?;
        if let Some(ref value) = self.value {
            size += stream.descend(|stream| value.encode(stream))?;
        }
        if let Some(ref status) = self.status {
            size += status.encode(stream)?;
        }
        if let Some(ref source_timestamp) = self.source_timestamp {
            size += source_timestamp.encode(stream)?;
            if let Some(source_picoseconds) = self.source_picoseconds {
                size += write_u16(stream, source_picoseconds)?;
            }
        }
        if let Some(ref server_timestamp) = self.server_timestamp {
            size += server_timestamp.encode(stream)?;
            if let Some(server_picoseconds) = self.server_picoseconds {
                size += write_u16(stream, server_picoseconds)?;
            }
        }
        Ok(size)
    }

    fn decode(stream: &mut DecodeStream<'_>) -> EncodingResult<Self> {
        let encoding_mask = DataValueFlags::from_bits_truncate(read_u8(stream)?);

        let value = if encoding_mask.contains(DataValueFlags::HAS_VALUE) {
            Some(stream.descend(Variant::decode)?)
        } else {
            None
        };
        let status = if encoding_mask.contains(DataValueFlags::HAS_STATUS) {
            Some(StatusCode::decode(stream)?)
        } else {
            None
        };
        let source_timestamp = if encoding_mask.contains(DataValueFlags::HAS_SOURCE_TIMESTAMP) {
            Some(DateTime::decode(stream)?)
        } else {
            None
        };
        let source_picoseconds = if encoding_mask.contains(DataValueFlags::HAS_SOURCE_PICOSECONDS) {
            Some(read_u16(stream)?)
        } else {
            None
        };
        let server_timestamp = if encoding_mask.contains(DataValueFlags::HAS_SERVER_TIMESTAMP) {
            Some(DateTime::decode(stream)?)
        } else {
            None
        };
        let server_picoseconds = if encoding_mask.contains(DataValueFlags::HAS_SERVER_PICOSECONDS) {
            Some(read_u16(stream)?)
        } else {
            None
        };
        // Pico second values are discarded if associated timestamp is not supplied
        Ok(DataValue {
            value,
            status,
            source_picoseconds: source_timestamp.and(source_picoseconds),
            source_timestamp,
            server_picoseconds: server_timestamp.and(server_picoseconds),
            server_timestamp,
        })
    }
}

crate::impl_override!(DataValue);

impl From<Variant> for DataValue {
    fn from(v: Variant) -> Self {
        DataValue::value_only(v)
    }
}

impl DataValue {
    /// Creates a data value holding just a value
    pub fn value_only<V>(value: V) -> DataValue
    where
        V: Into<Variant>,
    {
        DataValue {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Creates a data value with a value and a server timestamp of now
    pub fn new_now<V>(value: V) -> DataValue
    where
        V: Into<Variant>,
    {
        let now = DateTime::now();
        DataValue {
            value: Some(value.into()),
            status: Some(StatusCode::Good),
            source_timestamp: Some(now),
            server_timestamp: Some(now),
            ..Default::default()
        }
    }

    /// Creates an empty DataValue
    pub fn null() -> DataValue {
        DataValue::default()
    }

    /// Returns the status code or Good if there is no code on the value
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::Good)
    }

    /// Test if the value held by this data value is known to be good
    pub fn is_valid(&self) -> bool {
        self.status().is_good()
    }

    fn encoding_mask(&self) -> DataValueFlags {
        let mut encoding_mask = DataValueFlags::empty();
        if self.value.is_some() {
            encoding_mask |= DataValueFlags::HAS_VALUE;
        }
        if self.status.is_some() {
            encoding_mask |= DataValueFlags::HAS_STATUS;
        }
        if self.source_timestamp.is_some() {
            encoding_mask |= DataValueFlags::HAS_SOURCE_TIMESTAMP;
            if self.source_picoseconds.is_some() {
                encoding_mask |= DataValueFlags::HAS_SOURCE_PICOSECONDS;
            }
        }
        if self.server_timestamp.is_some() {
            encoding_mask |= DataValueFlags::HAS_SERVER_TIMESTAMP;
            if self.server_picoseconds.is_some() {
                encoding_mask |= DataValueFlags::HAS_SERVER_PICOSECONDS;
            }
        }
        encoding_mask
    }
}
