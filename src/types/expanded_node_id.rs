// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `ExpandedNodeId`.

use std::fmt;

use crate::{
    codec::{DecodeStream, EncodeStream},
    types::{
        encoding::*,
        node_id::{read_node_id, write_node_id, NodeId},
        object_ids::ObjectId,
        string::UAString,
    },
};

/// Encoding byte flag set when a namespace uri follows the node id
const NAMESPACE_URI_FLAG: u8 = 0x80;
/// Encoding byte flag set when a server index follows the node id
const SERVER_INDEX_FLAG: u8 = 0x40;

/// A NodeId that allows the namespace URI to be specified instead of an index. This is the type id
/// written ahead of a service message.
#[derive(PartialEq, Eq, Debug, Clone, Hash, Serialize, Deserialize)]
pub struct ExpandedNodeId {
    pub node_id: NodeId,
    pub namespace_uri: UAString,
    pub server_index: u32,
}

impl BinaryEncoder<ExpandedNodeId> for ExpandedNodeId {
    fn encode(&self, stream: &mut EncodeStream<'_>) -> EncodingResult<usize> {
        let mut flags = 0;
        if !self.namespace_uri.is_null() {
            flags |= NAMESPACE_URI_FLAG;
        }
        if self.server_index != 0 {
            flags |= SERVER_INDEX_FLAG;
        }
        let mut size = write_node_id(stream, &self.node_id, flags)?;
        if !self.namespace_uri.is_null() {
            size += self.namespace_uri.encode(stream)?;
        }
        if self.server_index != 0 {
            size += write_u32(stream, self.server_index)?;
        }
        Ok(size)
    }

    fn decode(stream: &mut DecodeStream<'_>) -> EncodingResult<Self> {
        let data_encoding = read_u8(stream)?;
        let node_id = read_node_id(stream, data_encoding & 0x0f)?;
        if data_encoding & 0x30 != 0 {
            error!("Expanded node id has reserved bits set {:#04x}", data_encoding);
            return Err(EncodingError::decoding(format!(
                "unrecognized expanded node id encoding {:#04x}",
                data_encoding
            )));
        }
        let namespace_uri = if data_encoding & NAMESPACE_URI_FLAG != 0 {
            UAString::decode(stream)?
        } else {
            UAString::null()
        };
        let server_index = if data_encoding & SERVER_INDEX_FLAG != 0 {
            read_u32(stream)?
        } else {
            0
        };
        Ok(ExpandedNodeId {
            node_id,
            namespace_uri,
            server_index,
        })
    }
}

crate::impl_override!(ExpandedNodeId);

impl From<&NodeId> for ExpandedNodeId {
    fn from(v: &NodeId) -> Self {
        v.clone().into()
    }
}

impl From<NodeId> for ExpandedNodeId {
    fn from(v: NodeId) -> Self {
        ExpandedNodeId {
            node_id: v,
            namespace_uri: UAString::null(),
            server_index: 0,
        }
    }
}

impl From<ObjectId> for ExpandedNodeId {
    fn from(v: ObjectId) -> Self {
        NodeId::from(v).into()
    }
}

impl From<u32> for ExpandedNodeId {
    fn from(v: u32) -> Self {
        NodeId::from(v).into()
    }
}

impl fmt::Display for ExpandedNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_uri.is_null() && self.server_index == 0 {
            write!(f, "{}", self.node_id)
        } else if self.namespace_uri.is_empty() {
            // svr=<serverindex>;ns=<namespaceindex>;<type>=<value>
            write!(f, "svr={};{}", self.server_index, self.node_id)
        } else {
            // The % and ; chars have to be escaped out in the uri
            let namespace_uri = self
                .namespace_uri
                .as_ref()
                .replace('%', "%25")
                .replace(';', "%3b");
            // svr=<serverindex>;nsu=<uri>;<type>=<value>
            write!(
                f,
                "svr={};nsu={};{}",
                self.server_index, namespace_uri, self.node_id.identifier
            )
        }
    }
}

impl Default for ExpandedNodeId {
    fn default() -> Self {
        ExpandedNodeId::null()
    }
}

impl ExpandedNodeId {
    /// Creates an expanded node id from a node id
    pub fn new<T>(value: T) -> ExpandedNodeId
    where
        T: Into<ExpandedNodeId>,
    {
        value.into()
    }

    pub fn null() -> ExpandedNodeId {
        Self::new(NodeId::null())
    }

    pub fn is_null(&self) -> bool {
        self.node_id.is_null()
    }

    /// Tests if the id refers to a node on the local server in a namespace identified by index,
    /// which is the only form a registry can resolve.
    pub fn is_local(&self) -> bool {
        self.namespace_uri.is_null() && self.server_index == 0
    }
}
