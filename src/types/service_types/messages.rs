// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Request and response messages of the services the codec knows about.

use crate::types::{
    data_value::DataValue,
    diagnostic_info::DiagnosticInfo,
    node_id::NodeId,
    qualified_name::QualifiedName,
    service_types::{
        enums::TimestampsToReturn,
        headers::{RequestHeader, ResponseHeader},
    },
    status_code::StatusCode,
    string::UAString,
};

/// The attribute id of a node's value
pub const VALUE_ATTRIBUTE_ID: u32 = 13;

crate::ua_struct! {
    /// Returned by the server in place of the expected response when a service fails.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ServiceFault {
        pub response_header: ResponseHeader,
    }
}

impl ServiceFault {
    pub fn new(request_header: &RequestHeader, service_result: StatusCode) -> ServiceFault {
        ServiceFault {
            response_header: ResponseHeader::new_service_result(request_header, service_result),
        }
    }
}

crate::ua_struct! {
    /// Identifies an attribute of a node to read.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ReadValueId {
        pub node_id: NodeId,
        pub attribute_id: u32,
        pub index_range: UAString,
        pub data_encoding: QualifiedName,
    }
}

impl<'a> From<&'a NodeId> for ReadValueId {
    fn from(node_id: &'a NodeId) -> Self {
        Self::from(node_id.clone())
    }
}

impl From<NodeId> for ReadValueId {
    fn from(node_id: NodeId) -> Self {
        ReadValueId {
            node_id,
            attribute_id: VALUE_ATTRIBUTE_ID,
            index_range: UAString::null(),
            data_encoding: QualifiedName::null(),
        }
    }
}

impl<'a> From<(u16, &'a str)> for ReadValueId {
    fn from(v: (u16, &'a str)) -> Self {
        Self::from(NodeId::from(v))
    }
}

crate::ua_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ReadRequest {
        pub request_header: RequestHeader,
        pub max_age: f64,
        pub timestamps_to_return: TimestampsToReturn,
        pub nodes_to_read: Option<Vec<ReadValueId>>,
    }
}

crate::ua_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ReadResponse {
        pub response_header: ResponseHeader,
        pub results: Option<Vec<DataValue>>,
        pub diagnostic_infos: Option<Vec<DiagnosticInfo>>,
    }
}

crate::ua_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct CloseSessionRequest {
        pub request_header: RequestHeader,
        pub delete_subscriptions: bool,
    }
}

crate::ua_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct CloseSessionResponse {
        pub response_header: ResponseHeader,
    }
}
