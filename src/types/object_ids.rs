// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Numeric ids in namespace 0 of the types and binary encodings known to this crate.

use std::convert::TryFrom;

macro_rules! object_ids {
    ( $( $name:ident = $value:literal ),* $(,)? ) => {
        /// Well known node ids in namespace 0. The `_Encoding_DefaultBinary` ids are the type ids
        /// written ahead of service messages and extension object bodies.
        #[allow(non_camel_case_types)]
        #[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
        pub enum ObjectId {
            $( $name = $value, )*
        }

        impl TryFrom<u32> for ObjectId {
            type Error = ();

            fn try_from(value: u32) -> Result<Self, ()> {
                match value {
                    $( $value => Ok(ObjectId::$name), )*
                    _ => Err(()),
                }
            }
        }
    };
}

object_ids! {
    RootFolder = 84,
    ObjectsFolder = 85,
    TypesFolder = 86,
    ViewsFolder = 87,
    Server = 2253,
    Server_ServerStatus = 2256,
    BuildInfo_Encoding_DefaultBinary = 340,
    AnonymousIdentityToken_Encoding_DefaultBinary = 321,
    UserNameIdentityToken_Encoding_DefaultBinary = 324,
    X509IdentityToken_Encoding_DefaultBinary = 327,
    ServiceFault_Encoding_DefaultBinary = 397,
    CloseSessionRequest_Encoding_DefaultBinary = 473,
    CloseSessionResponse_Encoding_DefaultBinary = 476,
    ReadRequest_Encoding_DefaultBinary = 631,
    ReadResponse_Encoding_DefaultBinary = 634,
    ServerStatusDataType_Encoding_DefaultBinary = 864,
}

#[test]
fn object_id_from_u32() {
    assert_eq!(
        ObjectId::try_from(631),
        Ok(ObjectId::ReadRequest_Encoding_DefaultBinary)
    );
    assert_eq!(ObjectId::try_from(630), Err(()));
    assert_eq!(ObjectId::AnonymousIdentityToken_Encoding_DefaultBinary as u32, 321);
}
