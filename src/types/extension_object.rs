// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `ExtensionObject`.

use std::fmt;

use crate::{
    codec::{DecodeStream, DynamicValue, EncodeStream},
    types::{
        byte_string::ByteString, encoding::*, node_id::NodeId, object_ids::ObjectId,
        string::XmlElement,
    },
};

/// Encoding byte written ahead of an extension object body
const ENCODING_NONE: u8 = 0x0;
const ENCODING_BINARY: u8 = 0x1;
const ENCODING_XML: u8 = 0x2;

/// The body of an extension object.
#[derive(Debug)]
pub enum ExtensionObjectBody {
    /// An extension object with no body. A binary body of length 0 or -1 also decodes to this, and
    /// is written back with the no body encoding byte 0x00 rather than the bytes it was read from.
    None,
    /// A body of a type bound in the registry the object was decoded with
    Decoded(Box<dyn DynamicValue>),
    /// A binary body whose type id is not bound in the registry. The raw bytes are kept so the
    /// object can be inspected or encoded again unchanged.
    Unknown(ByteString),
    /// An xml body, which is never interpreted
    XmlElement(XmlElement),
}

impl Clone for ExtensionObjectBody {
    fn clone(&self) -> Self {
        match self {
            ExtensionObjectBody::None => ExtensionObjectBody::None,
            ExtensionObjectBody::Decoded(value) => ExtensionObjectBody::Decoded(value.clone_box()),
            ExtensionObjectBody::Unknown(bytes) => ExtensionObjectBody::Unknown(bytes.clone()),
            ExtensionObjectBody::XmlElement(xml) => ExtensionObjectBody::XmlElement(xml.clone()),
        }
    }
}

impl PartialEq for ExtensionObjectBody {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ExtensionObjectBody::None, ExtensionObjectBody::None) => true,
            (ExtensionObjectBody::Decoded(a), ExtensionObjectBody::Decoded(b)) => {
                a.dyn_eq(b.as_ref())
            }
            (ExtensionObjectBody::Unknown(a), ExtensionObjectBody::Unknown(b)) => a == b,
            (ExtensionObjectBody::XmlElement(a), ExtensionObjectBody::XmlElement(b)) => a == b,
            _ => false,
        }
    }
}

/// An extension object holds a body whose type is identified by the node id ahead of it. The body
/// is written with a length prefix so a reader which does not know the type can skip it.
#[derive(PartialEq, Debug, Clone)]
pub struct ExtensionObject {
    pub node_id: NodeId,
    pub body: ExtensionObjectBody,
}

impl fmt::Display for ExtensionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.body {
            ExtensionObjectBody::None => write!(f, "ExtensionObject({}, empty)", self.node_id),
            ExtensionObjectBody::Decoded(ref value) => write!(
                f,
                "ExtensionObject({}, {})",
                self.node_id,
                crate::types::error::shorten_type_name(value.type_name())
            ),
            ExtensionObjectBody::Unknown(ref bytes) => write!(
                f,
                "ExtensionObject({}, {} unknown bytes)",
                self.node_id,
                bytes.len()
            ),
            ExtensionObjectBody::XmlElement(_) => write!(f, "ExtensionObject({}, xml)", self.node_id),
        }
    }
}

impl BinaryEncoder<ExtensionObject> for ExtensionObject {
    fn encode(&self, stream: &mut EncodeStream<'_>) -> EncodingResult<usize> {
        let mut size = self.node_id.encode(stream)?;
        match self.body {
            ExtensionObjectBody::None => {
                size += write_u8(stream, ENCODING_NONE)?;
            }
            ExtensionObjectBody::Decoded(ref value) => {
                let entry = stream.registry().resolve(&self.node_id)?;
                size += write_u8(stream, ENCODING_BINARY)?;
                let reserved = stream.reserve_length()?;
                entry.encode(value.as_ref(), stream)?;
                size += 4 + stream.patch_length(reserved)?;
            }
            ExtensionObjectBody::Unknown(ref bytes) => {
                size += write_u8(stream, ENCODING_BINARY)?;
                size += bytes.encode(stream)?;
            }
            ExtensionObjectBody::XmlElement(ref xml) => {
                size += write_u8(stream, ENCODING_XML)?;
                size += xml.encode(stream)?;
            }
        }
        Ok(size)
    }

    fn decode(stream: &mut DecodeStream<'_>) -> EncodingResult<Self> {
        stream.descend(|stream| {
            let node_id = NodeId::decode(stream)?;
            let encoding_type = read_u8(stream)?;
            let body = match encoding_type {
                ENCODING_NONE => ExtensionObjectBody::None,
                ENCODING_BINARY => {
                    let max_byte_string_length = stream.decoding_options().max_byte_string_length;
                    match read_length(stream, max_byte_string_length, "Extension object body")? {
                        None | Some(0) => {
                            trace!("Extension object {} has an empty binary body", node_id);
                            ExtensionObjectBody::None
                        }
                        Some(len) => {
                            let data = stream.read_slice(len)?;
                            match stream.registry().resolve(&node_id) {
                                Ok(entry) => {
                                    let mut body = stream.sub_stream(data);
                                    ExtensionObjectBody::Decoded(entry.decode(&mut body)?)
                                }
                                Err(err) if err.kind() == ErrorKind::UnknownTypeId => {
                                    debug!(
                                        "Extension object type id {} is not registered, keeping {} bytes of its body",
                                        node_id, len
                                    );
                                    ExtensionObjectBody::Unknown(ByteString::from(data))
                                }
                                Err(err) => return Err(err),
                            }
                        }
                    }
                }
                ENCODING_XML => ExtensionObjectBody::XmlElement(XmlElement::decode(stream)?),
                _ => {
                    error!(
                        "Invalid encoding type {} for extension object {}",
                        encoding_type, node_id
                    );
                    return Err(EncodingError::decoding(format!(
                        "invalid extension object encoding {:#04x}",
                        encoding_type
                    )));
                }
            };
            Ok(ExtensionObject { node_id, body })
        })
    }
}

crate::impl_override!(ExtensionObject);

impl Default for ExtensionObject {
    fn default() -> Self {
        ExtensionObject::null()
    }
}

impl ExtensionObject {
    /// Creates an extension object holding `value`. The type id must be bound to the type of the
    /// value in the registry used to encode the object.
    pub fn new<T>(node_id: impl Into<NodeId>, value: T) -> ExtensionObject
    where
        T: DynamicValue,
    {
        ExtensionObject {
            node_id: node_id.into(),
            body: ExtensionObjectBody::Decoded(Box::new(value)),
        }
    }

    /// Creates a null extension object, i.e. one with a null node id and no body
    pub fn null() -> ExtensionObject {
        ExtensionObject {
            node_id: NodeId::null(),
            body: ExtensionObjectBody::None,
        }
    }

    pub fn is_null(&self) -> bool {
        self.node_id.is_null()
    }

    pub fn is_empty(&self) -> bool {
        self.is_null() || matches!(self.body, ExtensionObjectBody::None)
    }

    /// Tests if the body's type id was not registered when the object was decoded
    pub fn is_unknown(&self) -> bool {
        matches!(self.body, ExtensionObjectBody::Unknown(_))
    }

    /// Returns the decoded body if it is a `T`.
    pub fn value<T: DynamicValue>(&self) -> Option<&T> {
        match self.body {
            ExtensionObjectBody::Decoded(ref value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Takes the decoded body if it is a `T`.
    pub fn into_value<T: DynamicValue>(self) -> Option<T> {
        match self.body {
            ExtensionObjectBody::Decoded(value) => value.downcast::<T>().map(|value| *value),
            _ => None,
        }
    }

    /// Returns the error a strict decode of this object would have raised, i.e.
    /// `ErrorKind::UnknownTypeId` when the body type was not registered.
    pub fn error(&self) -> Option<EncodingError> {
        match self.body {
            ExtensionObjectBody::Unknown(_) => Some(EncodingError::unknown_type_id(&self.node_id)),
            _ => None,
        }
    }

    /// Returns the object id of the extension object's type id, if it has one
    pub fn object_id(&self) -> Option<ObjectId> {
        self.node_id.as_object_id()
    }
}
