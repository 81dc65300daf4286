// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The encode and decode entry points.

use std::sync::Arc;

use crate::{
    codec::{
        registry::TypeRegistry, DecodeStream, DynamicValue, Encodable, EncodeStream, PlanCache,
    },
    core::config::CodecConfig,
    sync::Mutex,
    types::{
        constants,
        encoding::*,
        extension_object::ExtensionObject,
        node_id::NodeId,
        service_types::{register_extension_objects, register_services},
    },
};

lazy_static! {
    static ref DEFAULT_CONTEXT: CodecContext = CodecContext::new();
}

/// The codec context used by the crate level `encode` / `decode` functions. It holds the built in
/// extension objects and services and the default limits.
pub fn default_context() -> &'static CodecContext {
    &DEFAULT_CONTEXT
}

/// Encodes `value` with the default context.
pub fn encode<T: Encodable>(value: &T) -> EncodingResult<Vec<u8>> {
    DEFAULT_CONTEXT.encode(value)
}

/// Decodes a `T` from `data` with the default context.
pub fn decode<T: Encodable>(data: &[u8]) -> EncodingResult<T> {
    DEFAULT_CONTEXT.decode(data)
}

/// Decodes `data` into `target` with the default context. The target is left untouched on error.
pub fn decode_into<T: Encodable>(data: &[u8], target: &mut T) -> EncodingResult<()> {
    DEFAULT_CONTEXT.decode_into(data, target)
}

/// Everything an encode or decode needs: the plan cache, the registries resolving envelope bodies
/// and the limits to apply.
///
/// A context is cheap to share between threads. Every call gets its own stream state; only the plan
/// cache, the registries and the pool of spare output buffers are shared.
pub struct CodecContext {
    plans: PlanCache,
    extension_objects: Arc<TypeRegistry>,
    services: Arc<TypeRegistry>,
    encoding_options: EncodingOptions,
    decoding_options: DecodingOptions,
    buffers: Mutex<Vec<Vec<u8>>>,
}

impl CodecContext {
    /// Creates a context whose registries hold the built in extension objects and services.
    pub fn new() -> CodecContext {
        let extension_objects = TypeRegistry::new();
        register_extension_objects(&extension_objects);
        let services = TypeRegistry::new();
        register_services(&services);
        Self::with_registries(Arc::new(extension_objects), Arc::new(services))
    }

    /// Creates a context resolving extension objects and services through the supplied registries.
    pub fn with_registries(
        extension_objects: Arc<TypeRegistry>,
        services: Arc<TypeRegistry>,
    ) -> CodecContext {
        CodecContext {
            plans: PlanCache::new(),
            extension_objects,
            services,
            encoding_options: EncodingOptions::default(),
            decoding_options: DecodingOptions::default(),
            buffers: Mutex::new(Vec::new()),
        }
    }

    /// Creates a context with the built in types and the limits from the configuration.
    pub fn from_config(config: &CodecConfig) -> CodecContext {
        Self::new().with_options(config.encoding_options(), config.decoding_options())
    }

    pub fn with_options(
        mut self,
        encoding_options: EncodingOptions,
        decoding_options: DecodingOptions,
    ) -> CodecContext {
        self.encoding_options = encoding_options;
        self.decoding_options = decoding_options;
        self
    }

    pub fn plans(&self) -> &PlanCache {
        &self.plans
    }

    /// The registry resolving extension object bodies
    pub fn extension_objects(&self) -> &Arc<TypeRegistry> {
        &self.extension_objects
    }

    /// The registry resolving service message bodies
    pub fn services(&self) -> &Arc<TypeRegistry> {
        &self.services
    }

    pub fn encoding_options(&self) -> &EncodingOptions {
        &self.encoding_options
    }

    pub fn decoding_options(&self) -> &DecodingOptions {
        &self.decoding_options
    }

    /// Encodes `value` into a new byte vector.
    pub fn encode<T: Encodable>(&self, value: &T) -> EncodingResult<Vec<u8>> {
        self.with_buffer(|context, buffer| {
            context.encode_into(value, buffer)?;
            Ok(buffer.to_vec())
        })
    }

    /// Appends the encoding of `value` to `buffer`, returning the number of bytes written. On error
    /// the buffer is restored to its original length.
    pub fn encode_into<T: Encodable>(&self, value: &T, buffer: &mut Vec<u8>) -> EncodingResult<usize> {
        self.encode_with(buffer, |stream| stream.encode_value(value))
            .map_err(|err| err.at_root(short_type_name::<T>()))
    }

    /// Runs `f` against a stream writing to `buffer`, restoring the buffer if `f` fails.
    pub(crate) fn encode_with<F>(&self, buffer: &mut Vec<u8>, f: F) -> EncodingResult<usize>
    where
        F: FnOnce(&mut EncodeStream<'_>) -> EncodingResult<()>,
    {
        let start = buffer.len();
        let result = {
            let mut stream = EncodeStream::new(
                buffer,
                &self.encoding_options,
                &self.plans,
                &self.extension_objects,
            );
            f(&mut stream).map(|_| stream.position())
        };
        if result.is_err() {
            buffer.truncate(start);
        }
        result
    }

    /// Runs `f` with a cleared output buffer taken from the pool, returning the buffer afterwards.
    pub(crate) fn with_buffer<F, R>(&self, f: F) -> EncodingResult<R>
    where
        F: FnOnce(&Self, &mut Vec<u8>) -> EncodingResult<R>,
    {
        let mut buffer = trace_lock!(self.buffers).pop().unwrap_or_default();
        buffer.clear();
        let result = f(self, &mut buffer);
        if buffer.capacity() <= constants::MAX_POOLED_BUFFER_CAPACITY {
            buffer.clear();
            let mut buffers = trace_lock!(self.buffers);
            if buffers.len() < constants::ENCODE_BUFFER_POOL_SIZE {
                buffers.push(buffer);
            }
        }
        result
    }

    /// Decodes a `T` from `data`. Bytes following the value are ignored, use `decode_prefix` to
    /// find out how many were consumed.
    pub fn decode<T: Encodable>(&self, data: &[u8]) -> EncodingResult<T> {
        self.decode_prefix(data).map(|(value, _)| value)
    }

    /// Decodes a `T` from the start of `data`, returning it and the number of bytes it occupied.
    pub fn decode_prefix<T: Encodable>(&self, data: &[u8]) -> EncodingResult<(T, usize)> {
        self.decode_with(data, |stream| stream.decode_value::<T>())
            .map_err(|err| err.at_root(short_type_name::<T>()))
    }

    /// Decodes `data` into `target`. The target is left untouched on error.
    pub fn decode_into<T: Encodable>(&self, data: &[u8], target: &mut T) -> EncodingResult<()> {
        *target = self.decode(data)?;
        Ok(())
    }

    /// Decodes the body of the extension object type bound to `id`.
    pub fn decode_by_id(&self, id: &NodeId, data: &[u8]) -> EncodingResult<Box<dyn DynamicValue>> {
        let entry = self.extension_objects.resolve(id)?;
        self.decode_with(data, |stream| entry.decode(stream))
            .map(|(value, _)| value)
            .map_err(|err| err.at_root(crate::types::error::shorten_type_name(entry.type_name())))
    }

    /// Runs `f` against a stream reading `data`, returning its result and the bytes consumed.
    pub(crate) fn decode_with<F, R>(&self, data: &[u8], f: F) -> EncodingResult<(R, usize)>
    where
        F: FnOnce(&mut DecodeStream<'_>) -> EncodingResult<R>,
    {
        let max_message_size = self.decoding_options.max_message_size;
        if max_message_size > 0 && data.len() > max_message_size {
            error!(
                "Message of {} bytes exceeds the maximum message size {}",
                data.len(),
                max_message_size
            );
            return Err(EncodingError::limit_exceeded(format!(
                "message of {} bytes exceeds maximum size {}",
                data.len(),
                max_message_size
            )));
        }
        let mut stream = DecodeStream::new(
            data,
            self.decoding_options,
            &self.plans,
            &self.extension_objects,
        );
        let value = f(&mut stream)?;
        Ok((value, stream.position()))
    }

    /// Wraps `value` in an extension object using the type id it is bound to in this context.
    pub fn extension_object<T>(&self, value: T) -> EncodingResult<ExtensionObject>
    where
        T: DynamicValue,
    {
        let type_id = self
            .extension_objects
            .type_id_of::<T>()
            .ok_or_else(|| EncodingError::unsupported_type::<T>("type is not bound to an extension object type id"))?;
        Ok(ExtensionObject::new(type_id, value))
    }
}

impl Default for CodecContext {
    fn default() -> Self {
        Self::new()
    }
}
