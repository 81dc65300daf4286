// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Functionality shared by everything built on the codec: configuration and debugging helpers.

/// Contains debugging utility helper functions
pub mod debug {
    /// Prints out the content of a slice in hex and visible char format to aid debugging. Format
    /// is similar to corresponding functionality in node-opcua
    pub fn log_buffer(message: &str, buf: &[u8]) {
        // No point doing anything unless trace level is on
        if !log_enabled!(target: "hex", log::Level::Trace) {
            return;
        }

        const LINE_LEN: usize = 32;

        trace!(target: "hex", "{} ({} bytes)", message, buf.len());
        for (line, chunk) in buf.chunks(LINE_LEN).enumerate() {
            let hex_line = chunk
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ");
            let char_line: String = chunk
                .iter()
                .map(|b| if (32..=126).contains(b) { *b as char } else { '.' })
                .collect();
            trace!(
                target: "hex",
                "{:08x}: {:width$} {}",
                line * LINE_LEN,
                hex_line,
                char_line,
                width = LINE_LEN * 3 - 1
            );
        }
    }
}

pub mod config;

#[cfg(test)]
mod tests;

/// Contains most of the things that are typically required by users of the codec.
pub mod prelude {
    pub use super::config::{CodecConfig, Config};
}
