// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Enumerations carried by service messages. They are written as an Int32 and a value outside the
//! enumeration is rejected when decoding.

use std::convert::TryFrom;

use crate::{
    codec::{DecodeStream, EncodeStream},
    types::encoding::*,
};

macro_rules! ua_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$variant_meta:meta])* $variant:ident = $value:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$variant_meta])* $variant = $value, )*
        }

        impl TryFrom<i32> for $name {
            type Error = EncodingError;

            fn try_from(value: i32) -> EncodingResult<Self> {
                match value {
                    $( $value => Ok($name::$variant), )*
                    _ => {
                        error!("Invalid value {} for enum {}", value, stringify!($name));
                        Err(EncodingError::decoding(format!(
                            "{} is not a valid {}",
                            value,
                            stringify!($name)
                        )))
                    }
                }
            }
        }

        impl BinaryEncoder<$name> for $name {
            fn encode(&self, stream: &mut EncodeStream<'_>) -> EncodingResult<usize> {
                write_i32(stream, *self as i32)
            }

            fn decode(stream: &mut DecodeStream<'_>) -> EncodingResult<Self> {
                $name::try_from(read_i32(stream)?)
            }
        }

        crate::impl_override!($name);
    };
}

ua_enum! {
    /// Which timestamps a server returns with the values read.
    pub enum TimestampsToReturn {
        Source = 0,
        Server = 1,
        Both = 2,
        Neither = 3,
        Invalid = 4,
    }
}

impl Default for TimestampsToReturn {
    fn default() -> Self {
        TimestampsToReturn::Neither
    }
}

ua_enum! {
    pub enum ServerState {
        Running = 0,
        Failed = 1,
        NoConfiguration = 2,
        Suspended = 3,
        Shutdown = 4,
        Test = 5,
        CommunicationFault = 6,
        Unknown = 7,
    }
}

impl Default for ServerState {
    fn default() -> Self {
        ServerState::Unknown
    }
}
