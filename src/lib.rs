// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Generic OPC UA binary codec.
//!
//! Values are turned into the canonical OPC UA binary layout through per-type codecs. Composite
//! types describe their fields once and the resulting plan is cached for the life of the
//! [`codec::CodecContext`] that built it. Types which cannot be described field by field supply
//! their own encoding through [`types::BinaryEncoder`]. Envelopes whose body type is only known at
//! runtime (service messages and extension objects) are resolved through a [`codec::TypeRegistry`].

#![allow(clippy::bool_assert_comparison)]
#![allow(clippy::float_cmp)]
#![allow(clippy::from_over_into)]
#![allow(clippy::new_without_default)]

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[cfg(test)]
extern crate tempdir;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate serde_derive;
#[cfg(test)]
extern crate serde_json;
#[macro_use]
extern crate derivative;

/// Takes a `Mutex` lock. Every lock taken by the codec goes through these macros so a deadlock
/// can be traced by adding logging in one place.
#[macro_export]
macro_rules! trace_lock {
    ( $x:expr ) => {
        $x.lock()
    };
}

/// Takes a read lock on a `RwLock`.
#[macro_export]
macro_rules! trace_read_lock {
    ( $x:expr ) => {
        $x.read()
    };
}

/// Takes a write lock on a `RwLock`.
#[macro_export]
macro_rules! trace_write_lock {
    ( $x:expr ) => {
        $x.write()
    };
}

pub mod codec;
#[cfg(feature = "console-logging")]
pub mod console_logging;
pub mod core;
pub mod types;

pub mod sync {
    pub type RwLock<T> = parking_lot::RwLock<T>;
    pub type Mutex<T> = parking_lot::Mutex<T>;
    pub type Condvar = parking_lot::Condvar;
}

pub use crate::codec::{decode, decode_into, encode, CodecContext};

pub mod prelude {
    pub use crate::codec::prelude::*;
    pub use crate::core::prelude::*;
    pub use crate::types::*;
}
