// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Configuration of the limits applied by a codec context.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::result::Result;

use crate::types::{
    constants,
    encoding::{DecodingOptions, EncodingOptions},
};

/// A trait that handles the loading / saving and validity of configuration information.
pub trait Config: serde::Serialize {
    fn save(&self, path: &Path) -> Result<(), ()> {
        if !self.is_valid() {
            error!("Config isn't valid and won't be saved");
            return Err(());
        }
        let s = serde_yaml::to_string(&self).map_err(|err| {
            error!("Cannot serialize configuration, error reason: {}", err);
        })?;
        let mut f = File::create(path).map_err(|err| {
            error!(
                "Cannot create the path {} to save the config, error reason: {}",
                path.to_string_lossy(),
                err
            );
        })?;
        f.write_all(s.as_bytes()).map_err(|err| {
            error!("Could not save config - error = {:?}", err);
        })
    }

    fn load<A>(path: &Path) -> Result<A, ()>
    where
        for<'de> A: Config + serde::Deserialize<'de>,
    {
        let mut f = File::open(path).map_err(|_| {
            error!("Cannot open configuration file {}", path.to_string_lossy());
        })?;
        let mut s = String::new();
        f.read_to_string(&mut s).map_err(|_| {
            error!(
                "Cannot read configuration file {} to string",
                path.to_string_lossy()
            );
        })?;
        let config: A = serde_yaml::from_str(&s).map_err(|err| {
            error!(
                "Cannot deserialize configuration from {}, error reason: {}",
                path.to_string_lossy(),
                err
            );
        })?;
        if config.is_valid() {
            Ok(config)
        } else {
            error!(
                "Configuration loaded from {} isn't valid",
                path.to_string_lossy()
            );
            Err(())
        }
    }

    fn is_valid(&self) -> bool;
}

/// Limits applied when decoding. Lengths are counts of bytes for strings and byte strings and of
/// elements for arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodingLimits {
    /// Maximum size of a message in bytes, 0 for no limit
    pub max_message_size: usize,
    pub max_string_length: usize,
    pub max_byte_string_length: usize,
    pub max_array_length: usize,
    /// Maximum nesting of structures, variants and diagnostics
    pub max_decoding_depth: usize,
}

impl Default for DecodingLimits {
    fn default() -> Self {
        DecodingLimits {
            max_message_size: constants::MAX_MESSAGE_SIZE,
            max_string_length: constants::MAX_STRING_LENGTH,
            max_byte_string_length: constants::MAX_BYTE_STRING_LENGTH,
            max_array_length: constants::MAX_ARRAY_LENGTH,
            max_decoding_depth: constants::MAX_DECODING_DEPTH,
        }
    }
}

/// Limits and tuning applied when encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingLimits {
    /// Maximum size of an encoded message in bytes, 0 for no limit
    pub max_message_size: usize,
    /// Depth of nested references and sequences after which the encoder checks for cycles
    pub cycle_check_depth: usize,
    /// Maximum nesting of references, sequences and variants
    pub max_encoding_depth: usize,
}

impl Default for EncodingLimits {
    fn default() -> Self {
        EncodingLimits {
            max_message_size: constants::MAX_MESSAGE_SIZE,
            cycle_check_depth: constants::CYCLE_CHECK_DEPTH,
            max_encoding_depth: constants::MAX_ENCODING_DEPTH,
        }
    }
}

/// Configuration of a `CodecContext`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CodecConfig {
    pub decoding: DecodingLimits,
    pub encoding: EncodingLimits,
}

impl Config for CodecConfig {
    fn is_valid(&self) -> bool {
        let mut valid = true;
        if self.decoding.max_decoding_depth == 0 {
            error!("Decoding depth must be at least 1 or no structure can be decoded");
            valid = false;
        }
        if self.encoding.max_encoding_depth == 0 {
            error!("Encoding depth must be at least 1 or no structure can be encoded");
            valid = false;
        }
        if self.encoding.cycle_check_depth == 0 {
            warn!("Cycle check depth of 0 checks every reference and sequence for cycles");
        } else if self.encoding.cycle_check_depth >= self.encoding.max_encoding_depth {
            warn!(
                "Cycle check depth {} is not below the encoding depth {}, cycles are reported as exceeding the depth",
                self.encoding.cycle_check_depth, self.encoding.max_encoding_depth
            );
        }
        valid
    }
}

impl CodecConfig {
    pub fn decoding_options(&self) -> DecodingOptions {
        DecodingOptions {
            max_message_size: self.decoding.max_message_size,
            max_string_length: self.decoding.max_string_length,
            max_byte_string_length: self.decoding.max_byte_string_length,
            max_array_length: self.decoding.max_array_length,
            max_decoding_depth: self.decoding.max_decoding_depth,
        }
    }

    pub fn encoding_options(&self) -> EncodingOptions {
        EncodingOptions {
            max_message_size: self.encoding.max_message_size,
            cycle_check_depth: self.encoding.cycle_check_depth,
            max_encoding_depth: self.encoding.max_encoding_depth,
        }
    }
}
