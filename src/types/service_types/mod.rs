// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The protocol defined messages and extension object types the codec knows out of the box.

use crate::{
    codec::registry::{register_static, TypeRegistry},
    types::object_ids::ObjectId,
};

mod data_types;
mod enums;
mod headers;
mod messages;

pub use self::{data_types::*, enums::*, headers::*, messages::*};

/// Implemented by messages and extension object types
pub trait MessageInfo {
    /// The object id associated with the message
    fn object_id(&self) -> ObjectId;
}

macro_rules! message_info {
    ( $( $t:ident => $object_id:ident ),* $(,)? ) => {
        $(
            impl MessageInfo for $t {
                fn object_id(&self) -> ObjectId {
                    ObjectId::$object_id
                }
            }
        )*
    };
}

message_info! {
    ServiceFault => ServiceFault_Encoding_DefaultBinary,
    ReadRequest => ReadRequest_Encoding_DefaultBinary,
    ReadResponse => ReadResponse_Encoding_DefaultBinary,
    CloseSessionRequest => CloseSessionRequest_Encoding_DefaultBinary,
    CloseSessionResponse => CloseSessionResponse_Encoding_DefaultBinary,
    AnonymousIdentityToken => AnonymousIdentityToken_Encoding_DefaultBinary,
    UserNameIdentityToken => UserNameIdentityToken_Encoding_DefaultBinary,
    X509IdentityToken => X509IdentityToken_Encoding_DefaultBinary,
    BuildInfo => BuildInfo_Encoding_DefaultBinary,
    ServerStatusDataType => ServerStatusDataType_Encoding_DefaultBinary,
}

/// Binds the built in extension object types to their binary encoding ids.
pub fn register_extension_objects(registry: &TypeRegistry) {
    register_static::<AnonymousIdentityToken>(
        registry,
        ObjectId::AnonymousIdentityToken_Encoding_DefaultBinary as u32,
    );
    register_static::<UserNameIdentityToken>(
        registry,
        ObjectId::UserNameIdentityToken_Encoding_DefaultBinary as u32,
    );
    register_static::<X509IdentityToken>(
        registry,
        ObjectId::X509IdentityToken_Encoding_DefaultBinary as u32,
    );
    register_static::<BuildInfo>(registry, ObjectId::BuildInfo_Encoding_DefaultBinary as u32);
    register_static::<ServerStatusDataType>(
        registry,
        ObjectId::ServerStatusDataType_Encoding_DefaultBinary as u32,
    );
}

/// Binds the built in service messages to their binary encoding ids.
pub fn register_services(registry: &TypeRegistry) {
    register_static::<ServiceFault>(registry, ObjectId::ServiceFault_Encoding_DefaultBinary as u32);
    register_static::<ReadRequest>(registry, ObjectId::ReadRequest_Encoding_DefaultBinary as u32);
    register_static::<ReadResponse>(registry, ObjectId::ReadResponse_Encoding_DefaultBinary as u32);
    register_static::<CloseSessionRequest>(
        registry,
        ObjectId::CloseSessionRequest_Encoding_DefaultBinary as u32,
    );
    register_static::<CloseSessionResponse>(
        registry,
        ObjectId::CloseSessionResponse_Encoding_DefaultBinary as u32,
    );
}
