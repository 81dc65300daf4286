// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The headers common to every request and response.

use crate::types::{
    date_time::DateTime, diagnostic_info::DiagnosticInfo, extension_object::ExtensionObject,
    node_id::NodeId, status_code::StatusCode, string::UAString,
};

crate::ua_struct! {
    /// The `RequestHeader` contains information common to every request from a client to the server.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct RequestHeader {
        /// The secret session identifier used to verify that the request is associated with
        /// the session.
        pub authentication_token: NodeId,
        /// The time the Client sent the request.
        pub timestamp: DateTime,
        /// A requestHandle associated with the request. The server returns it in the response.
        pub request_handle: u32,
        /// A bit mask that identifies the types of vendor-specific diagnostics to be returned.
        pub return_diagnostics: u32,
        /// An identifier that identifies the Client's security audit log entry.
        pub audit_entry_id: UAString,
        /// How long the client is prepared to wait for the response, in milliseconds.
        pub timeout_hint: u32,
        /// Reserved for future use.
        pub additional_header: ExtensionObject,
    }
}

impl RequestHeader {
    pub fn new(authentication_token: &NodeId, timestamp: &DateTime, request_handle: u32) -> Self {
        RequestHeader {
            authentication_token: authentication_token.clone(),
            timestamp: *timestamp,
            request_handle,
            return_diagnostics: 0,
            audit_entry_id: UAString::null(),
            timeout_hint: 0,
            additional_header: ExtensionObject::null(),
        }
    }
}

crate::ua_struct! {
    /// The `ResponseHeader` contains information common to every response from server to client.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ResponseHeader {
        pub timestamp: DateTime,
        pub request_handle: u32,
        pub service_result: StatusCode,
        pub service_diagnostics: DiagnosticInfo,
        pub string_table: Option<Vec<UAString>>,
        pub additional_header: ExtensionObject,
    }
}

impl ResponseHeader {
    pub fn new_good(request_header: &RequestHeader) -> ResponseHeader {
        ResponseHeader::new_service_result(request_header, StatusCode::Good)
    }

    pub fn new_service_result(
        request_header: &RequestHeader,
        service_result: StatusCode,
    ) -> ResponseHeader {
        ResponseHeader::new_timestamped_service_result(
            DateTime::now(),
            request_header,
            service_result,
        )
    }

    pub fn new_timestamped_service_result(
        timestamp: DateTime,
        request_header: &RequestHeader,
        service_result: StatusCode,
    ) -> ResponseHeader {
        ResponseHeader {
            timestamp,
            request_handle: request_header.request_handle,
            service_result,
            service_diagnostics: DiagnosticInfo::default(),
            string_table: None,
            additional_header: ExtensionObject::null(),
        }
    }
}
