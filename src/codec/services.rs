// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Service message envelopes.
//!
//! A service message is the binary encoding id of its type followed directly by the body. Unlike an
//! extension object the body has no length, so a message whose type id is not registered cannot be
//! skipped and its decode fails with `ErrorKind::UnknownTypeId`. The buffer holds just that one
//! message so the next one decodes normally.

use std::fmt;

use crate::{
    codec::{CodecContext, DynamicValue},
    core::debug,
    types::{
        encoding::*, error::shorten_type_name, expanded_node_id::ExpandedNodeId,
        node_id::NodeId, object_ids::ObjectId, service_types::MessageInfo,
    },
};

/// A decoded service message, or one about to be encoded.
pub struct ServiceMessage {
    type_id: NodeId,
    body: Box<dyn DynamicValue>,
}

impl fmt::Debug for ServiceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceMessage")
            .field("type_id", &self.type_id)
            .field("body", &self.body)
            .finish()
    }
}

impl Clone for ServiceMessage {
    fn clone(&self) -> Self {
        ServiceMessage {
            type_id: self.type_id.clone(),
            body: self.body.clone_box(),
        }
    }
}

impl PartialEq for ServiceMessage {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.body.dyn_eq(other.body.as_ref())
    }
}

impl ServiceMessage {
    /// Creates a message for a protocol defined service type.
    pub fn new<T>(body: T) -> ServiceMessage
    where
        T: MessageInfo + DynamicValue,
    {
        ServiceMessage {
            type_id: body.object_id().into(),
            body: Box::new(body),
        }
    }

    /// Creates a message for a body bound to `type_id` in a context's service registry.
    pub fn with_type_id<T>(type_id: impl Into<NodeId>, body: T) -> ServiceMessage
    where
        T: DynamicValue,
    {
        ServiceMessage {
            type_id: type_id.into(),
            body: Box::new(body),
        }
    }

    pub fn type_id(&self) -> &NodeId {
        &self.type_id
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.type_id.as_object_id()
    }

    pub fn body(&self) -> &dyn DynamicValue {
        self.body.as_ref()
    }

    /// Tests if the body is a `T`
    pub fn is<T: DynamicValue>(&self) -> bool {
        self.body.is::<T>()
    }

    pub fn downcast_ref<T: DynamicValue>(&self) -> Option<&T> {
        self.body.downcast_ref::<T>()
    }

    /// Takes the body if it is a `T`.
    pub fn into_body<T: DynamicValue>(self) -> Option<T> {
        self.body.downcast::<T>().map(|body| *body)
    }
}

impl CodecContext {
    /// Encodes a protocol defined service message together with its type id.
    pub fn encode_service<T>(&self, message: &T) -> EncodingResult<Vec<u8>>
    where
        T: MessageInfo + DynamicValue,
    {
        self.encode_message(&message.object_id().into(), message)
    }

    /// Encodes a service message held in a `ServiceMessage`.
    pub fn encode_service_message(&self, message: &ServiceMessage) -> EncodingResult<Vec<u8>> {
        self.encode_message(&message.type_id, message.body.as_ref())
    }

    fn encode_message(&self, type_id: &NodeId, body: &dyn DynamicValue) -> EncodingResult<Vec<u8>> {
        let entry = self.services().resolve(type_id).map_err(|err| {
            error!("Service message type id {} is not registered", type_id);
            err
        })?;
        let type_name = shorten_type_name(entry.type_name());
        self.with_buffer(|context, buffer| {
            context.encode_with(buffer, |stream| {
                ExpandedNodeId::from(type_id).encode(stream)?;
                entry.encode(body, stream)
            })?;
            debug::log_buffer("Encoded service message", buffer);
            Ok(buffer.to_vec())
        })
        .map_err(|err| err.at_root(type_name))
    }

    /// Decodes a service message, resolving the type of its body through the service registry.
    /// Bytes following the message are ignored.
    pub fn decode_service(&self, data: &[u8]) -> EncodingResult<ServiceMessage> {
        debug::log_buffer("Decoding service message", data);
        let (message, _) = self.decode_with(data, |stream| {
            let type_id = ExpandedNodeId::decode(stream)?;
            if !type_id.is_local() {
                error!("Service message type id {} is not a local node id", type_id);
                return Err(EncodingError::unknown_type_id(&type_id.node_id));
            }
            let type_id = type_id.node_id;
            let entry = self.services().resolve(&type_id).map_err(|err| {
                error!("Service message type id {} is not registered", type_id);
                err
            })?;
            let body = entry
                .decode(stream)
                .map_err(|err| err.at_root(shorten_type_name(entry.type_name())))?;
            Ok(ServiceMessage { type_id, body })
        })?;
        Ok(message)
    }
}
