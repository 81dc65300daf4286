// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The type registry maps the numeric type id carried by an envelope to the code which decodes
//! (and encodes) its body.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use crate::{
    codec::{DecodeStream, DynamicValue, Encodable, EncodeStream},
    sync::RwLock,
    types::{encoding::*, node_id::NodeId},
};

/// Explicit encoder of a function binding. Returns the body bytes of the value.
pub type EncodeFunc<T> = Box<dyn Fn(&T) -> EncodingResult<Vec<u8>> + Send + Sync>;
/// Explicit decoder of a function binding. Fills the value from the complete body bytes.
pub type DecodeFunc<T> = Box<dyn Fn(&[u8], &mut T) -> EncodingResult<()> + Send + Sync>;

type EntryEncoder =
    Box<dyn Fn(&dyn DynamicValue, &mut EncodeStream<'_>) -> EncodingResult<()> + Send + Sync>;
type EntryDecoder =
    Box<dyn Fn(&mut DecodeStream<'_>) -> EncodingResult<Box<dyn DynamicValue>> + Send + Sync>;

/// How a registry entry handles its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// The body is the registered type, encoded by the generic codec
    Type,
    /// The body is encoded and decoded by explicit functions
    Functions,
}

/// One binding of a type id.
pub struct TypeEntry {
    id: NodeId,
    type_id: TypeId,
    type_name: &'static str,
    binding: Binding,
    encoder: Option<EntryEncoder>,
    decoder: Option<EntryDecoder>,
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("binding", &self.binding)
            .field("can_encode", &self.encoder.is_some())
            .field("can_decode", &self.decoder.is_some())
            .finish()
    }
}

impl TypeEntry {
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// The Rust type the binding produces
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub fn can_encode(&self) -> bool {
        self.encoder.is_some()
    }

    pub fn can_decode(&self) -> bool {
        self.decoder.is_some()
    }

    /// Writes the body of `value`, which must be of the bound type.
    pub fn encode(&self, value: &dyn DynamicValue, stream: &mut EncodeStream<'_>) -> EncodingResult<()> {
        match self.encoder {
            Some(ref encoder) => encoder(value, stream),
            None => Err(EncodingError::new(
                ErrorKind::UnsupportedType,
                format!("type id {} is bound for decoding only", self.id),
            )
            .with_type_name(short_name(self.type_name))),
        }
    }

    /// Reads a body of the bound type. Function bindings consume the rest of the stream.
    pub fn decode(&self, stream: &mut DecodeStream<'_>) -> EncodingResult<Box<dyn DynamicValue>> {
        match self.decoder {
            Some(ref decoder) => decoder(stream),
            None => Err(EncodingError::new(
                ErrorKind::UnsupportedType,
                format!("type id {} is bound for encoding only", self.id),
            )
            .with_type_name(short_name(self.type_name))),
        }
    }
}

fn short_name(type_name: &str) -> String {
    crate::types::error::shorten_type_name(type_name)
}

fn mismatched_value(value: &dyn DynamicValue, expected: &'static str) -> EncodingError {
    EncodingError::unsupported_value(format!(
        "value of type {} cannot be encoded as {}",
        short_name(value.type_name()),
        short_name(expected)
    ))
}

#[derive(Default)]
struct RegistryInner {
    entries: HashMap<NodeId, Arc<TypeEntry>>,
    ids: HashMap<TypeId, NodeId>,
}

/// Binds type ids to types or to explicit encode / decode functions. Every id and every type can be
/// bound at most once.
///
/// Registration and lookup are safe to interleave from any number of threads. A lookup racing a
/// `deregister` sees either the old binding or no binding.
#[derive(Default)]
pub struct TypeRegistry {
    inner: RwLock<RegistryInner>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = trace_read_lock!(self.inner);
        f.debug_list().entries(inner.entries.values()).finish()
    }
}

impl TypeRegistry {
    pub fn new() -> TypeRegistry {
        TypeRegistry::default()
    }

    /// Binds `id` to `T`, whose body is encoded and decoded by the generic codec.
    pub fn register<T>(&self, id: impl Into<NodeId>) -> EncodingResult<()>
    where
        T: Encodable + Clone + PartialEq + fmt::Debug,
    {
        let type_name = std::any::type_name::<T>();
        let encoder: EntryEncoder = Box::new(
            move |value: &dyn DynamicValue, stream: &mut EncodeStream<'_>| {
                let value = value
                    .as_any()
                    .downcast_ref::<T>()
                    .ok_or_else(|| mismatched_value(value, type_name))?;
                stream.encode_value::<T>(value)
            },
        );
        let decoder: EntryDecoder = Box::new(|stream: &mut DecodeStream<'_>| {
            let value = stream.decode_value::<T>()?;
            Ok(Box::new(value) as Box<dyn DynamicValue>)
        });
        self.insert(TypeEntry {
            id: id.into(),
            type_id: TypeId::of::<T>(),
            type_name,
            binding: Binding::Type,
            encoder: Some(encoder),
            decoder: Some(decoder),
        })
    }

    /// Binds `id` to `T` with explicit functions for the body. Either function may be omitted to
    /// make the binding encode only or decode only. The decoder is handed the complete body.
    pub fn register_func<T>(
        &self,
        id: impl Into<NodeId>,
        encode: Option<EncodeFunc<T>>,
        decode: Option<DecodeFunc<T>>,
    ) -> EncodingResult<()>
    where
        T: Any + Send + Sync + Default + Clone + PartialEq + fmt::Debug,
    {
        let type_name = std::any::type_name::<T>();
        let encoder = encode.map(|encode| {
            Box::new(move |value: &dyn DynamicValue, stream: &mut EncodeStream<'_>| {
                let value = value
                    .as_any()
                    .downcast_ref::<T>()
                    .ok_or_else(|| mismatched_value(value, type_name))?;
                let body = encode(value)?;
                stream.write_all(&body).map(|_| ())
            }) as EntryEncoder
        });
        let decoder = decode.map(|decode| {
            Box::new(move |stream: &mut DecodeStream<'_>| {
                let body = stream.read_remaining();
                let mut value = T::default();
                decode(body, &mut value)?;
                Ok(Box::new(value) as Box<dyn DynamicValue>)
            }) as EntryDecoder
        });
        self.insert(TypeEntry {
            id: id.into(),
            type_id: TypeId::of::<T>(),
            type_name,
            binding: Binding::Functions,
            encoder,
            decoder,
        })
    }

    fn insert(&self, entry: TypeEntry) -> EncodingResult<()> {
        let mut inner = trace_write_lock!(self.inner);
        if let Some(existing) = inner.entries.get(&entry.id) {
            error!(
                "Type id {} cannot be bound to {}, it is already bound to {}",
                entry.id, entry.type_name, existing.type_name
            );
            return Err(EncodingError::registration_conflict(
                &entry.id,
                format!("type id {} is already bound to {}", entry.id, short_name(existing.type_name)),
            ));
        }
        if let Some(existing_id) = inner.ids.get(&entry.type_id) {
            error!(
                "Type {} cannot be bound to {}, it is already bound to {}",
                entry.type_name, entry.id, existing_id
            );
            return Err(EncodingError::registration_conflict(
                &entry.id,
                format!(
                    "type {} is already bound to type id {}",
                    short_name(entry.type_name),
                    existing_id
                ),
            ));
        }
        debug!("Binding type id {} to {}", entry.id, entry.type_name);
        inner.ids.insert(entry.type_id, entry.id.clone());
        inner.entries.insert(entry.id.clone(), Arc::new(entry));
        Ok(())
    }

    /// Removes the binding of `id`, returning it.
    pub fn deregister(&self, id: impl Into<NodeId>) -> Option<Arc<TypeEntry>> {
        let id = id.into();
        let mut inner = trace_write_lock!(self.inner);
        let entry = inner.entries.remove(&id)?;
        inner.ids.remove(&entry.type_id);
        debug!("Removed binding of type id {} to {}", id, entry.type_name);
        Some(entry)
    }

    /// Looks up the binding of `id`.
    pub fn resolve(&self, id: &NodeId) -> EncodingResult<Arc<TypeEntry>> {
        let inner = trace_read_lock!(self.inner);
        inner
            .entries
            .get(id)
            .cloned()
            .ok_or_else(|| EncodingError::unknown_type_id(id))
    }

    /// Returns the id `T` is bound to.
    pub fn type_id_of<T: Any>(&self) -> Option<NodeId> {
        let inner = trace_read_lock!(self.inner);
        inner.ids.get(&TypeId::of::<T>()).cloned()
    }

    /// Returns the id the type of `value` is bound to.
    pub fn type_id_of_value(&self, value: &dyn DynamicValue) -> Option<NodeId> {
        let inner = trace_read_lock!(self.inner);
        inner.ids.get(&(*value.as_any()).type_id()).cloned()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        trace_read_lock!(self.inner).entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        trace_read_lock!(self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Binds a protocol defined type during start up. A conflict here is a programming error in the
/// set of built in types so it panics rather than returning.
pub(crate) fn register_static<T>(registry: &TypeRegistry, id: u32)
where
    T: Encodable + Clone + PartialEq + fmt::Debug,
{
    if let Err(err) = registry.register::<T>(id) {
        panic!(
            "Built in type {} cannot be registered, {}",
            std::any::type_name::<T>(),
            err
        );
    }
}
