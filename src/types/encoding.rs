// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the `BinaryEncoder` trait and helpers for reading and writing of scalar values and
//! other primitives.

use byteorder::{ByteOrder, LittleEndian};

use crate::{
    codec::{DecodeStream, EncodeStream},
    types::constants,
};

pub use crate::types::error::{
    short_type_name, EncodingError, EncodingResult, ErrorKind, PathSegment, Phase,
};

/// Canonical bit pattern written for any f32 NaN
pub const F32_NAN_BITS: u32 = 0xFFC0_0000;
/// Canonical bit pattern written for any f64 NaN
pub const F64_NAN_BITS: u64 = 0xFFF8_0000_0000_0000;

/// Depth gauge is used on potentially recursive structures like Variant & ExtensionObject during
/// decoding to limit the depth the decoder will go before giving up.
#[derive(Debug, Clone, Copy)]
pub struct DepthGauge {
    /// Maximum decoding depth for recursive elements. Triggers when current depth equals max depth.
    pub(crate) max_depth: usize,
    /// Current decoding depth for recursive elements.
    pub(crate) current_depth: usize,
}

impl Default for DepthGauge {
    fn default() -> Self {
        Self::new(constants::MAX_DECODING_DEPTH)
    }
}

impl DepthGauge {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            current_depth: 0,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn current_depth(&self) -> usize {
        self.current_depth
    }

    /// Tests if the depth can increment and increments it.
    pub(crate) fn enter(&mut self) -> EncodingResult<()> {
        if self.current_depth >= self.max_depth {
            warn!("Decoding in stream aborted due maximum recursion depth being reached");
            Err(EncodingError::limit_exceeded(format!(
                "maximum decoding depth {} reached",
                self.max_depth
            )))
        } else {
            self.current_depth += 1;
            Ok(())
        }
    }

    pub(crate) fn leave(&mut self) {
        if self.current_depth > 0 {
            self.current_depth -= 1;
        }
    }
}

/// Restrictions applied while decoding. Exceeding any of these fails the decode with
/// `ErrorKind::LimitExceeded` as soon as the offending length is read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodingOptions {
    /// Maximum size of a message in bytes. 0 means no limit.
    pub max_message_size: usize,
    /// Maximum length in bytes (not chars!) of a string. 0 actually means 0, i.e. no string permitted
    pub max_string_length: usize,
    /// Maximum length in bytes of a byte string. 0 actually means 0, i.e. no byte string permitted
    pub max_byte_string_length: usize,
    /// Maximum number of array elements. 0 actually means 0, i.e. no array permitted
    pub max_array_length: usize,
    /// Maximum nesting of recursive values
    pub max_decoding_depth: usize,
}

impl Default for DecodingOptions {
    fn default() -> Self {
        DecodingOptions {
            max_message_size: constants::MAX_MESSAGE_SIZE,
            max_string_length: constants::MAX_STRING_LENGTH,
            max_byte_string_length: constants::MAX_BYTE_STRING_LENGTH,
            max_array_length: constants::MAX_ARRAY_LENGTH,
            max_decoding_depth: constants::MAX_DECODING_DEPTH,
        }
    }
}

impl DecodingOptions {
    /// This can be useful for decoding extension objects where the payload is not expected to contain
    /// a large value.
    pub fn minimal() -> Self {
        DecodingOptions {
            max_string_length: 8192,
            max_byte_string_length: 8192,
            max_array_length: 8192,
            ..Default::default()
        }
    }

    /// For test only. Having a separate function makes it easier to control calls to DecodingOptions::default().
    #[cfg(test)]
    pub fn test() -> Self {
        Self::default()
    }

    pub fn depth_gauge(&self) -> DepthGauge {
        DepthGauge::new(self.max_decoding_depth)
    }
}

/// Restrictions and tuning applied while encoding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncodingOptions {
    /// Maximum size of an encoded message in bytes. 0 means no limit.
    pub max_message_size: usize,
    /// Recursion depth after which references and sequences are tracked for cycles
    pub cycle_check_depth: usize,
    /// Maximum recursion depth of references, sequences and nested variants
    pub max_encoding_depth: usize,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        EncodingOptions {
            max_message_size: constants::MAX_MESSAGE_SIZE,
            cycle_check_depth: constants::CYCLE_CHECK_DEPTH,
            max_encoding_depth: constants::MAX_ENCODING_DEPTH,
        }
    }
}

/// OPC UA Binary Encoding interface for types which write themselves.
///
/// Scalars implement this directly. Composite types normally describe their fields instead and let
/// the generic walker do the work, but a type that cannot be expressed field by field (tagged
/// unions, masks, validated enums) implements this trait and is registered as an override with
/// `impl_override!`.
pub trait BinaryEncoder<T> {
    /// Encodes the instance to the stream, returning the number of bytes written.
    fn encode(&self, stream: &mut EncodeStream<'_>) -> EncodingResult<usize>;
    /// Decodes an instance from the stream. The stream carries the restrictions set by the
    /// server / client on the length of strings, arrays etc. If these limits are exceeded the
    /// implementation should fail as soon as possible.
    fn decode(stream: &mut DecodeStream<'_>) -> EncodingResult<T>;
}

/// Reads a signed 32-bit length. -1 is returned as `None`, other negative lengths are an error, as
/// are lengths above `limit`. The length is not checked against the bytes remaining since an
/// element may encode to nothing, so callers bound their allocation with `stream.remaining()`.
pub fn read_length(
    stream: &mut DecodeStream<'_>,
    limit: usize,
    what: &str,
) -> EncodingResult<Option<usize>> {
    let len = read_i32(stream)?;
    if len == -1 {
        Ok(None)
    } else if len < -1 {
        error!("{} length is negative value {} and invalid", what, len);
        Err(EncodingError::too_short(format!(
            "{} length {} is negative",
            what, len
        )))
    } else if len as usize > limit {
        error!("{} length {} exceeds decoding limit {}", what, len, limit);
        Err(EncodingError::limit_exceeded(format!(
            "{} length {} exceeds decoding limit {}",
            what, len, limit
        )))
    } else {
        Ok(Some(len as usize))
    }
}

/// Writes a signed 32-bit length, failing if the length cannot be represented.
pub fn write_length(stream: &mut EncodeStream<'_>, len: usize) -> EncodingResult<usize> {
    if len > i32::MAX as usize {
        Err(EncodingError::unsupported_value(format!(
            "length {} exceeds the maximum representable count",
            len
        )))
    } else {
        write_i32(stream, len as i32)
    }
}

/// Write an array of the encoded type to stream, preserving distinction between null array and empty array
pub fn write_array<T: BinaryEncoder<T>>(
    stream: &mut EncodeStream<'_>,
    values: &Option<Vec<T>>,
) -> EncodingResult<usize> {
    let mut size = 0;
    if let Some(ref values) = values {
        size += write_length(stream, values.len())?;
        for (i, value) in values.iter().enumerate() {
            size += value.encode(stream).map_err(|e| e.at_index(i))?;
        }
    } else {
        size += write_i32(stream, -1)?;
    }
    Ok(size)
}

/// Reads an array of the encoded type from a stream, preserving distinction between null array and empty array
pub fn read_array<T: BinaryEncoder<T>>(
    stream: &mut DecodeStream<'_>,
) -> EncodingResult<Option<Vec<T>>> {
    let max_array_length = stream.decoding_options().max_array_length;
    match read_length(stream, max_array_length, "Array")? {
        None => Ok(None),
        Some(len) => {
            let mut values: Vec<T> = Vec::with_capacity(len.min(stream.remaining()));
            for i in 0..len {
                values.push(T::decode(stream).map_err(|e| e.at_index(i))?);
            }
            Ok(Some(values))
        }
    }
}

/// Writes a series of identical bytes to the stream
pub fn write_bytes(stream: &mut EncodeStream<'_>, value: u8, count: usize) -> EncodingResult<usize> {
    for _ in 0..count {
        stream.write_all(&[value])?;
    }
    Ok(count)
}

/// Writes an unsigned byte to the stream
pub fn write_u8<T>(stream: &mut EncodeStream<'_>, value: T) -> EncodingResult<usize>
where
    T: Into<u8>,
{
    stream.write_all(&[value.into()])
}

/// Writes a signed 16-bit value to the stream
pub fn write_i16<T>(stream: &mut EncodeStream<'_>, value: T) -> EncodingResult<usize>
where
    T: Into<i16>,
{
    let mut buf = [0u8; 2];
    LittleEndian::write_i16(&mut buf, value.into());
    stream.write_all(&buf)
}

/// Writes an unsigned 16-bit value to the stream
pub fn write_u16<T>(stream: &mut EncodeStream<'_>, value: T) -> EncodingResult<usize>
where
    T: Into<u16>,
{
    let mut buf = [0u8; 2];
    LittleEndian::write_u16(&mut buf, value.into());
    stream.write_all(&buf)
}

/// Writes a signed 32-bit value to the stream
pub fn write_i32<T>(stream: &mut EncodeStream<'_>, value: T) -> EncodingResult<usize>
where
    T: Into<i32>,
{
    let mut buf = [0u8; 4];
    LittleEndian::write_i32(&mut buf, value.into());
    stream.write_all(&buf)
}

/// Writes an unsigned 32-bit value to the stream
pub fn write_u32<T>(stream: &mut EncodeStream<'_>, value: T) -> EncodingResult<usize>
where
    T: Into<u32>,
{
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value.into());
    stream.write_all(&buf)
}

/// Writes a signed 64-bit value to the stream
pub fn write_i64<T>(stream: &mut EncodeStream<'_>, value: T) -> EncodingResult<usize>
where
    T: Into<i64>,
{
    let mut buf = [0u8; 8];
    LittleEndian::write_i64(&mut buf, value.into());
    stream.write_all(&buf)
}

/// Writes an unsigned 64-bit value to the stream
pub fn write_u64<T>(stream: &mut EncodeStream<'_>, value: T) -> EncodingResult<usize>
where
    T: Into<u64>,
{
    let mut buf = [0u8; 8];
    LittleEndian::write_u64(&mut buf, value.into());
    stream.write_all(&buf)
}

/// Writes a 32-bit precision value to the stream. Any NaN is written as the canonical quiet NaN.
pub fn write_f32<T>(stream: &mut EncodeStream<'_>, value: T) -> EncodingResult<usize>
where
    T: Into<f32>,
{
    let value = value.into();
    let bits = if value.is_nan() {
        F32_NAN_BITS
    } else {
        value.to_bits()
    };
    write_u32(stream, bits)
}

/// Writes a 64-bit precision value to the stream. Any NaN is written as the canonical quiet NaN.
pub fn write_f64<T>(stream: &mut EncodeStream<'_>, value: T) -> EncodingResult<usize>
where
    T: Into<f64>,
{
    let value = value.into();
    let bits = if value.is_nan() {
        F64_NAN_BITS
    } else {
        value.to_bits()
    };
    write_u64(stream, bits)
}

/// Reads an array of bytes from the stream
pub fn read_bytes(stream: &mut DecodeStream<'_>, buf: &mut [u8]) -> EncodingResult<usize> {
    buf.copy_from_slice(stream.read_slice(buf.len())?);
    Ok(buf.len())
}

/// Read an unsigned byte from the stream
pub fn read_u8(stream: &mut DecodeStream<'_>) -> EncodingResult<u8> {
    Ok(stream.read_slice(1)?[0])
}

/// Read an signed 16-bit value from the stream
pub fn read_i16(stream: &mut DecodeStream<'_>) -> EncodingResult<i16> {
    Ok(LittleEndian::read_i16(stream.read_slice(2)?))
}

/// Read an unsigned 16-bit value from the stream
pub fn read_u16(stream: &mut DecodeStream<'_>) -> EncodingResult<u16> {
    Ok(LittleEndian::read_u16(stream.read_slice(2)?))
}

/// Read a signed 32-bit value from the stream
pub fn read_i32(stream: &mut DecodeStream<'_>) -> EncodingResult<i32> {
    Ok(LittleEndian::read_i32(stream.read_slice(4)?))
}

/// Read an unsigned 32-bit value from the stream
pub fn read_u32(stream: &mut DecodeStream<'_>) -> EncodingResult<u32> {
    Ok(LittleEndian::read_u32(stream.read_slice(4)?))
}

/// Read a signed 64-bit value from the stream
pub fn read_i64(stream: &mut DecodeStream<'_>) -> EncodingResult<i64> {
    Ok(LittleEndian::read_i64(stream.read_slice(8)?))
}

/// Read an unsigned 64-bit value from the stream
pub fn read_u64(stream: &mut DecodeStream<'_>) -> EncodingResult<u64> {
    Ok(LittleEndian::read_u64(stream.read_slice(8)?))
}

/// Read a 32-bit precision value from the stream
pub fn read_f32(stream: &mut DecodeStream<'_>) -> EncodingResult<f32> {
    Ok(LittleEndian::read_f32(stream.read_slice(4)?))
}

/// Read a 64-bit precision from the stream
pub fn read_f64(stream: &mut DecodeStream<'_>) -> EncodingResult<f64> {
    Ok(LittleEndian::read_f64(stream.read_slice(8)?))
}
