// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The streams threaded through one encode or decode call.

use std::collections::HashSet;

use crate::{
    codec::{registry::TypeRegistry, Encodable, PlanCache},
    types::encoding::*,
};

/// Identity of a reference or sequence visited during an encode. Sequences use their address
/// and length, references their address and a length no slice can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(usize, usize);

impl Identity {
    pub fn of<T>(value: &T) -> Identity {
        Identity(value as *const T as usize, usize::MAX)
    }

    pub fn of_slice<T>(values: &[T]) -> Identity {
        Identity(values.as_ptr() as usize, values.len())
    }
}

/// The output side of an encode. Owns no buffer of its own, bytes are appended to the buffer the
/// caller provided so nested values never allocate a buffer per level.
pub struct EncodeStream<'a> {
    buffer: &'a mut Vec<u8>,
    start: usize,
    options: &'a EncodingOptions,
    plans: &'a PlanCache,
    registry: &'a TypeRegistry,
    depth: usize,
    visited: HashSet<Identity>,
}

impl<'a> EncodeStream<'a> {
    pub fn new(
        buffer: &'a mut Vec<u8>,
        options: &'a EncodingOptions,
        plans: &'a PlanCache,
        registry: &'a TypeRegistry,
    ) -> EncodeStream<'a> {
        let start = buffer.len();
        EncodeStream {
            buffer,
            start,
            options,
            plans,
            registry,
            depth: 0,
            visited: HashSet::new(),
        }
    }

    /// Appends bytes, enforcing the maximum message size.
    pub fn write_all(&mut self, bytes: &[u8]) -> EncodingResult<usize> {
        let max_message_size = self.options.max_message_size;
        if max_message_size > 0 && self.position() + bytes.len() > max_message_size {
            error!(
                "Encoded message would exceed the maximum message size {}",
                max_message_size
            );
            return Err(EncodingError::limit_exceeded(format!(
                "encoded message exceeds maximum size {}",
                max_message_size
            )));
        }
        self.buffer.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    /// Number of bytes written by this stream so far
    pub fn position(&self) -> usize {
        self.buffer.len() - self.start
    }

    /// Writes a zero length and returns its position so it can be patched once the body following
    /// it has been written.
    pub fn reserve_length(&mut self) -> EncodingResult<usize> {
        let position = self.buffer.len();
        write_i32(self, 0)?;
        Ok(position)
    }

    /// Patches a length reserved by `reserve_length` with the number of bytes written since.
    pub fn patch_length(&mut self, reserved: usize) -> EncodingResult<usize> {
        let body_start = reserved + 4;
        let len = self.buffer.len() - body_start;
        if len > i32::MAX as usize {
            return Err(EncodingError::unsupported_value(format!(
                "body length {} exceeds the maximum representable length",
                len
            )));
        }
        self.buffer[reserved..body_start].copy_from_slice(&(len as i32).to_le_bytes());
        Ok(len)
    }

    pub fn encoding_options(&self) -> &EncodingOptions {
        self.options
    }

    pub fn plans(&self) -> &'a PlanCache {
        self.plans
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Current depth of references and sequences being encoded
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Encodes a value through the codec its type resolves to.
    pub fn encode_value<T: Encodable>(&mut self, value: &T) -> EncodingResult<()> {
        let codec = self.plans.resolve::<T>()?;
        codec.encode(value, self)
    }

    /// Runs `f` inside a reference or sequence identified by `identity`. Once the depth passes the
    /// configured threshold every identity entered is remembered until `f` returns, and entering
    /// one that is still being encoded fails with `ErrorKind::CycleDetected`. Going deeper than
    /// the maximum encoding depth fails with `ErrorKind::LimitExceeded`.
    pub fn enter<R, F>(
        &mut self,
        identity: Identity,
        type_name: fn() -> String,
        f: F,
    ) -> EncodingResult<R>
    where
        F: FnOnce(&mut Self) -> EncodingResult<R>,
    {
        self.check_depth()?;
        self.depth += 1;
        let tracked = self.depth > self.options.cycle_check_depth;
        if tracked && !self.visited.insert(identity) {
            self.depth -= 1;
            let type_name = type_name();
            error!("Encoding aborted, cycle detected via {}", type_name);
            return Err(EncodingError::cycle_detected(type_name));
        }
        let result = f(self);
        if tracked {
            self.visited.remove(&identity);
        }
        self.depth -= 1;
        result
    }

    /// Runs `f` one level deeper without tracking an identity. Types that nest values of their own
    /// kind by value, such as a variant holding a variant, go through here.
    pub fn descend<R, F>(&mut self, f: F) -> EncodingResult<R>
    where
        F: FnOnce(&mut Self) -> EncodingResult<R>,
    {
        self.check_depth()?;
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn check_depth(&self) -> EncodingResult<()> {
        let max_encoding_depth = self.options.max_encoding_depth;
        if self.depth >= max_encoding_depth {
            error!(
                "Encoding aborted, nesting exceeds the maximum depth {}",
                max_encoding_depth
            );
            Err(EncodingError::limit_exceeded(format!(
                "encoding depth exceeds maximum {}",
                max_encoding_depth
            )))
        } else {
            Ok(())
        }
    }
}

/// The input side of a decode. Reads are bounds checked against the slice so a truncated message
/// fails with `ErrorKind::TooShortToDecode` rather than reading past its end.
pub struct DecodeStream<'a> {
    data: &'a [u8],
    position: usize,
    options: DecodingOptions,
    plans: &'a PlanCache,
    registry: &'a TypeRegistry,
    depth_gauge: DepthGauge,
}

impl<'a> DecodeStream<'a> {
    pub fn new(
        data: &'a [u8],
        options: DecodingOptions,
        plans: &'a PlanCache,
        registry: &'a TypeRegistry,
    ) -> DecodeStream<'a> {
        DecodeStream {
            data,
            position: 0,
            depth_gauge: options.depth_gauge(),
            options,
            plans,
            registry,
        }
    }

    /// Creates a stream over a body embedded in this one, e.g. the body of an extension object. The
    /// new stream shares the limits and the current depth of this one.
    pub fn sub_stream(&self, data: &'a [u8]) -> DecodeStream<'a> {
        DecodeStream {
            data,
            position: 0,
            options: self.options,
            plans: self.plans,
            registry: self.registry,
            depth_gauge: self.depth_gauge,
        }
    }

    /// Takes the next `len` bytes from the stream.
    pub fn read_slice(&mut self, len: usize) -> EncodingResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(EncodingError::too_short(format!(
                "need {} bytes, {} remain",
                len,
                self.remaining()
            )));
        }
        let data = self.data;
        let slice = &data[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    /// Takes every remaining byte from the stream.
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let data = self.data;
        let slice = &data[self.position..];
        self.position = data.len();
        slice
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn decoding_options(&self) -> &DecodingOptions {
        &self.options
    }

    pub fn depth_gauge(&self) -> &DepthGauge {
        &self.depth_gauge
    }

    pub fn plans(&self) -> &'a PlanCache {
        self.plans
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Decodes a value through the codec its type resolves to.
    pub fn decode_value<T: Encodable>(&mut self) -> EncodingResult<T> {
        let codec = self.plans.resolve::<T>()?;
        codec.decode(self)
    }

    /// Runs `f` one level deeper in the depth gauge, failing if the maximum depth is reached.
    pub fn descend<R, F>(&mut self, f: F) -> EncodingResult<R>
    where
        F: FnOnce(&mut Self) -> EncodingResult<R>,
    {
        self.depth_gauge.enter()?;
        let result = f(self);
        self.depth_gauge.leave();
        result
    }
}
