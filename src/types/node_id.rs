// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `NodeId`.

use std::{self, convert::TryFrom, fmt, str::FromStr};

use crate::{
    codec::{DecodeStream, EncodeStream},
    types::{
        byte_string::ByteString, encoding::*, guid::Guid, object_ids::ObjectId,
        status_code::StatusCode, string::*,
    },
};

/// The kind of identifier, numeric, string, guid or byte
#[derive(Eq, PartialEq, Clone, Debug, Hash, Serialize, Deserialize)]
pub enum Identifier {
    Numeric(u32),
    String(UAString),
    Guid(Guid),
    ByteString(ByteString),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(v) => write!(f, "i={}", *v),
            Identifier::String(v) => write!(f, "s={}", v),
            Identifier::Guid(v) => write!(f, "g={:?}", v),
            Identifier::ByteString(v) => write!(f, "b={}", v.as_base64()),
        }
    }
}

impl FromStr for Identifier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 2 || !s.is_char_boundary(2) {
            return Err(());
        }
        let (k, v) = s.split_at(2);
        match k {
            "i=" => v.parse::<u32>().map(|v| v.into()).map_err(|_| ()),
            "s=" => Ok(UAString::from(v).into()),
            "g=" => Guid::from_str(v).map(|v| v.into()),
            "b=" => ByteString::from_base64(v).map(|v| v.into()).ok_or(()),
            _ => Err(()),
        }
    }
}

impl From<u32> for Identifier {
    fn from(v: u32) -> Self {
        Identifier::Numeric(v)
    }
}

impl<'a> From<&'a str> for Identifier {
    fn from(v: &'a str) -> Self {
        Identifier::from(UAString::from(v))
    }
}

impl From<String> for Identifier {
    fn from(v: String) -> Self {
        Identifier::from(UAString::from(v))
    }
}

impl From<UAString> for Identifier {
    fn from(v: UAString) -> Self {
        Identifier::String(v)
    }
}

impl From<Guid> for Identifier {
    fn from(v: Guid) -> Self {
        Identifier::Guid(v)
    }
}

impl From<ByteString> for Identifier {
    fn from(v: ByteString) -> Self {
        Identifier::ByteString(v)
    }
}

/// An identifier for a node in the address space of an OPC UA Server. Node ids are also the type
/// ids carried by service messages and extension objects.
#[derive(PartialEq, Eq, Clone, Debug, Hash, Serialize, Deserialize)]
pub struct NodeId {
    /// The index for a namespace
    pub namespace: u16,
    /// The identifier for the node in the address space
    pub identifier: Identifier,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace != 0 {
            write!(f, "ns={};{}", self.namespace, self.identifier)
        } else {
            write!(f, "{}", self.identifier)
        }
    }
}

/// Writes the node id using the most compact form its identifier allows. `flags` are or'ed into the
/// encoding byte, which is how an expanded node id signals the fields following it.
pub(crate) fn write_node_id(
    stream: &mut EncodeStream<'_>,
    node_id: &NodeId,
    flags: u8,
) -> EncodingResult<usize> {
    let mut size: usize = 0;
    let namespace = node_id.namespace;
    match &node_id.identifier {
        Identifier::Numeric(value) => {
            if namespace == 0 && *value <= 255 {
                // node id fits into 2 bytes when the namespace is 0 and the value <= 255
                size += write_u8(stream, flags)?;
                size += write_u8(stream, *value as u8)?;
            } else if namespace <= 255 && *value <= 65535 {
                // node id fits into 4 bytes when namespace <= 255 and value <= 65535
                size += write_u8(stream, flags | 0x1)?;
                size += write_u8(stream, namespace as u8)?;
                size += write_u16(stream, *value as u16)?;
            } else {
                size += write_u8(stream, flags | 0x2)?;
                size += write_u16(stream, namespace)?;
                size += write_u32(stream, *value)?;
            }
        }
        Identifier::String(value) => {
            size += write_u8(stream, flags | 0x3)?;
            size += write_u16(stream, namespace)?;
            size += value.encode(stream)?;
        }
        Identifier::Guid(value) => {
            size += write_u8(stream, flags | 0x4)?;
            size += write_u16(stream, namespace)?;
            size += value.encode(stream)?;
        }
        Identifier::ByteString(value) => {
            size += write_u8(stream, flags | 0x5)?;
            size += write_u16(stream, namespace)?;
            size += value.encode(stream)?;
        }
    }
    Ok(size)
}

/// Reads the node id following an encoding byte whose low nibble is `form`.
pub(crate) fn read_node_id(stream: &mut DecodeStream<'_>, form: u8) -> EncodingResult<NodeId> {
    let node_id = match form {
        0x0 => NodeId::new(0, u32::from(read_u8(stream)?)),
        0x1 => {
            let namespace = read_u8(stream)?;
            let value = read_u16(stream)?;
            NodeId::new(u16::from(namespace), u32::from(value))
        }
        0x2 => {
            let namespace = read_u16(stream)?;
            NodeId::new(namespace, read_u32(stream)?)
        }
        0x3 => {
            let namespace = read_u16(stream)?;
            NodeId::new(namespace, UAString::decode(stream)?)
        }
        0x4 => {
            let namespace = read_u16(stream)?;
            NodeId::new(namespace, Guid::decode(stream)?)
        }
        0x5 => {
            let namespace = read_u16(stream)?;
            NodeId::new(namespace, ByteString::decode(stream)?)
        }
        _ => {
            error!("Unrecognized node id type {}", form);
            return Err(EncodingError::decoding(format!(
                "unrecognized node id encoding {:#04x}",
                form
            )));
        }
    };
    Ok(node_id)
}

impl BinaryEncoder<NodeId> for NodeId {
    fn encode(&self, stream: &mut EncodeStream<'_>) -> EncodingResult<usize> {
        write_node_id(stream, self, 0)
    }

    fn decode(stream: &mut DecodeStream<'_>) -> EncodingResult<Self> {
        let form = read_u8(stream)?;
        read_node_id(stream, form)
    }
}

crate::impl_override!(NodeId);

impl FromStr for NodeId {
    type Err = StatusCode;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        use regex::Regex;

        // Parses a node from a string using the format specified in 5.3.1.10 part 6
        //
        // ns=<namespaceindex>;<type>=<value>
        //
        // Where type:
        //   i = NUMERIC
        //   s = STRING
        //   g = GUID
        //   b = OPAQUE (ByteString)
        //
        // If namespace == 0, the ns=0; will be omitted

        lazy_static! {
            // Contains capture groups "ns" and "t" for namespace and type respectively
            static ref RE: Option<Regex> = Regex::new(r"^(ns=(?P<ns>[0-9]+);)?(?P<t>[isgb]=.+)$").ok();
        }

        let captures = RE
            .as_ref()
            .and_then(|re| re.captures(s))
            .ok_or(StatusCode::BadNodeIdInvalid)?;

        let namespace = match captures.name("ns") {
            Some(ns) => ns
                .as_str()
                .parse::<u16>()
                .map_err(|_| StatusCode::BadNodeIdInvalid)?,
            None => 0,
        };

        captures
            .name("t")
            .ok_or(StatusCode::BadNodeIdInvalid)
            .and_then(|t| Identifier::from_str(t.as_str()).map_err(|_| StatusCode::BadNodeIdInvalid))
            .map(|t| NodeId::new(namespace, t))
    }
}

impl From<&NodeId> for NodeId {
    fn from(v: &NodeId) -> Self {
        v.clone()
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        Self::new(0, v)
    }
}

impl From<ObjectId> for NodeId {
    fn from(v: ObjectId) -> Self {
        Self::new(0, v as u32)
    }
}

impl<'a> From<(u16, &'a str)> for NodeId {
    fn from(v: (u16, &'a str)) -> Self {
        Self::new(v.0, UAString::from(v.1))
    }
}

impl From<(u16, UAString)> for NodeId {
    fn from(v: (u16, UAString)) -> Self {
        Self::new(v.0, v.1)
    }
}

impl From<(u16, u32)> for NodeId {
    fn from(v: (u16, u32)) -> Self {
        Self::new(v.0, v.1)
    }
}

impl From<(u16, Guid)> for NodeId {
    fn from(v: (u16, Guid)) -> Self {
        Self::new(v.0, v.1)
    }
}

impl From<(u16, ByteString)> for NodeId {
    fn from(v: (u16, ByteString)) -> Self {
        Self::new(v.0, v.1)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        NodeId::null()
    }
}

impl NodeId {
    /// Constructs a new NodeId from anything that can be turned into Identifier
    /// u32, Guid, ByteString or String
    pub fn new<T>(namespace: u16, value: T) -> NodeId
    where
        T: Into<Identifier>,
    {
        NodeId {
            namespace,
            identifier: value.into(),
        }
    }

    /// Returns the node id for the root folder.
    pub fn root_folder_id() -> NodeId {
        ObjectId::RootFolder.into()
    }

    /// Returns the node id for the objects folder.
    pub fn objects_folder_id() -> NodeId {
        ObjectId::ObjectsFolder.into()
    }

    /// Test if the node id is null, i.e. 0 namespace and 0 identifier
    pub fn is_null(&self) -> bool {
        self.namespace == 0 && self.identifier == Identifier::Numeric(0)
    }

    /// Returns a null node id
    pub fn null() -> NodeId {
        NodeId::new(0, 0u32)
    }

    /// Extracts an ObjectId from a node id, providing the node id holds an object id
    pub fn as_object_id(&self) -> Option<ObjectId> {
        match self.identifier {
            Identifier::Numeric(id) if self.namespace == 0 => ObjectId::try_from(id).ok(),
            _ => None,
        }
    }

    /// Test if the node id is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(self.identifier, Identifier::Numeric(_))
    }

    /// Test if the node id is a string
    pub fn is_string(&self) -> bool {
        matches!(self.identifier, Identifier::String(_))
    }

    /// Test if the node id is a guid
    pub fn is_guid(&self) -> bool {
        matches!(self.identifier, Identifier::Guid(_))
    }

    /// Test if the node id us a byte string
    pub fn is_byte_string(&self) -> bool {
        matches!(self.identifier, Identifier::ByteString(_))
    }
}
