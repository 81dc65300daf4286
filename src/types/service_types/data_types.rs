// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Structures carried inside extension objects.

use crate::types::{
    byte_string::ByteString, date_time::DateTime, localized_text::LocalizedText,
    service_types::enums::ServerState, status_code::StatusCode, string::UAString,
};

/// Policy id of the anonymous user token
pub const ANONYMOUS_POLICY_ID: &str = "anonymous";

crate::ua_struct! {
    /// Identity of a client that does not authenticate.
    #[derive(Debug, Clone, PartialEq)]
    pub struct AnonymousIdentityToken {
        pub policy_id: UAString,
    }
}

impl Default for AnonymousIdentityToken {
    fn default() -> Self {
        AnonymousIdentityToken {
            policy_id: UAString::from(ANONYMOUS_POLICY_ID),
        }
    }
}

crate::ua_struct! {
    /// Identity of a client authenticating with a user name and password.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct UserNameIdentityToken {
        pub policy_id: UAString,
        pub user_name: UAString,
        pub password: ByteString,
        pub encryption_algorithm: UAString,
    }
}

impl UserNameIdentityToken {
    /// Ensures the token is valid
    pub fn is_valid(&self) -> bool {
        !self.user_name.is_null() && !self.password.is_null()
    }

    /// Returns the password as a string. Only a password sent without encryption can be read
    /// this way.
    pub fn plaintext_password(&self) -> Result<String, StatusCode> {
        if !self.encryption_algorithm.is_empty() {
            error!(
                "Password is encrypted with {} and cannot be read as plaintext",
                self.encryption_algorithm
            );
            return Err(StatusCode::BadInvalidArgument);
        }
        let password = self.password.value.clone().unwrap_or_default();
        String::from_utf8(password).map_err(|_| StatusCode::BadDecodingError)
    }
}

crate::ua_struct! {
    /// Identity of a client authenticating with a certificate.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct X509IdentityToken {
        pub policy_id: UAString,
        pub certificate_data: ByteString,
    }
}

crate::ua_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct BuildInfo {
        pub product_uri: UAString,
        pub manufacturer_name: UAString,
        pub product_name: UAString,
        pub software_version: UAString,
        pub build_number: UAString,
        pub build_date: DateTime,
    }
}

crate::ua_struct! {
    /// The value of the server's ServerStatus variable.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ServerStatusDataType {
        pub start_time: DateTime,
        pub current_time: DateTime,
        pub state: ServerState,
        pub build_info: BuildInfo,
        pub seconds_till_shutdown: u32,
        pub shutdown_reason: LocalizedText,
    }
}
