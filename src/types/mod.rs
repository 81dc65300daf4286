// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The OPC UA built in types, their binary encoding and the service messages and extension
//! objects the codec registers by default.

pub mod basic_types;
pub mod byte_string;
pub mod constants;
pub mod data_value;
pub mod date_time;
pub mod diagnostic_info;
pub mod encoding;
pub mod error;
pub mod expanded_node_id;
pub mod extension_object;
pub mod guid;
pub mod localized_text;
pub mod node_id;
pub mod object_ids;
pub mod qualified_name;
pub mod service_types;
pub mod status_code;
pub mod string;
pub mod variant;
pub mod variant_type_id;

pub use crate::types::{
    byte_string::*, data_value::*, date_time::*, diagnostic_info::*, encoding::*,
    expanded_node_id::*, extension_object::*, guid::*, localized_text::*, node_id::*,
    object_ids::*, qualified_name::*, service_types::*, status_code::*, string::*, variant::*,
    variant_type_id::VariantTypeId,
};

#[cfg(test)]
mod tests;
