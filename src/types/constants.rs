// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Default limits used while encoding and decoding.

/// Default maximum number of elements in an array
pub const MAX_ARRAY_LENGTH: usize = 100_000;
/// Default maximum size of a string in chars
pub const MAX_STRING_LENGTH: usize = 65_535;
/// Default maximum size of a byte string in bytes
pub const MAX_BYTE_STRING_LENGTH: usize = 1_048_576;
/// Default maximum size of a message in bytes. 0 is no limit
pub const MAX_MESSAGE_SIZE: usize = 0;
/// Default maximum depth of recursive structures (nested variants, diagnostics, structures)
pub const MAX_DECODING_DEPTH: usize = 64;
/// Encoding depth after which the encoder starts tracking visited references and sequences
pub const CYCLE_CHECK_DEPTH: usize = 100;
/// Default maximum depth of nested references, sequences and variants when encoding
pub const MAX_ENCODING_DEPTH: usize = 256;
/// Number of spare output buffers a codec context keeps for reuse
pub const ENCODE_BUFFER_POOL_SIZE: usize = 16;
/// Buffers which grew beyond this capacity are not returned to the pool
pub const MAX_POOLED_BUFFER_CAPACITY: usize = 1_048_576;
