// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `DiagnosticInfo`.

use crate::{
    codec::{DecodeStream, EncodeStream},
    types::{encoding::*, status_code::StatusCode, string::UAString},
};

bitflags! {
    pub struct DiagnosticInfoMask: u8 {
        const HAS_SYMBOLIC_ID = 0x01;
        const HAS_NAMESPACE = 0x02;
        const HAS_LOCALIZED_TEXT = 0x04;
        const HAS_LOCALE = 0x08;
        const HAS_ADDITIONAL_INFO = 0x10;
        const HAS_INNER_STATUS_CODE = 0x20;
        const HAS_INNER_DIAGNOSTIC_INFO = 0x40;
    }
}

/// Diagnostic information. Every field is optional and only the fields present are written, as
/// announced by a leading mask byte. The inner diagnostic info makes the type recursive so its
/// nesting is bounded by the decoding depth.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticInfo {
    /// A symbolic name for the status code.
    pub symbolic_id: Option<i32>,
    /// A namespace that qualifies the symbolic id.
    pub namespace_uri: Option<i32>,
    /// The locale used for the localized text.
    pub locale: Option<i32>,
    /// A human readable summary of the status code.
    pub localized_text: Option<i32>,
    /// Detailed application specific diagnostic information.
    pub additional_info: Option<UAString>,
    /// A status code provided by an underlying system.
    pub inner_status_code: Option<StatusCode>,
    /// Diagnostic info associated with the inner status code.
    pub inner_diagnostic_info: Option<Box<DiagnosticInfo>>,
}

impl BinaryEncoder<DiagnosticInfo> for DiagnosticInfo {
    fn encode(&self, stream: &mut EncodeStream<'_>) -> EncodingResult<usize> {
        let mut size = write_u8(stream, self.encoding_mask().bits())?;
        if let Some(symbolic_id) = self.symbolic_id {
            size += write_i32(stream, symbolic_id)?;
        }
        if let Some(namespace_uri) = self.namespace_uri {
            size += write_i32(stream, namespace_uri)?;
        }
        if let Some(locale) = self.locale {
            size += write_i32(stream, locale)?;
        }
        if let Some(localized_text) = self.localized_text {
            size += write_i32(stream, localized_text)?;
        }
        if let Some(ref additional_info) = self.additional_info {
            size += additional_info.encode(stream)?;
        }
        if let Some(ref inner_status_code) = self.inner_status_code {
            size += inner_status_code.encode(stream)?;
        }
        if let Some(ref inner_diagnostic_info) = self.inner_diagnostic_info {
            size += stream.descend(|stream| inner_diagnostic_info.encode(stream))?;
        }
        Ok(size)
    }

    fn decode(stream: &mut DecodeStream<'_>) -> EncodingResult<Self> {
        let encoding_mask = DiagnosticInfoMask::from_bits_truncate(read_u8(stream)?);
        let mut diagnostic_info = DiagnosticInfo::default();

        if encoding_mask.contains(DiagnosticInfoMask::HAS_SYMBOLIC_ID) {
            diagnostic_info.symbolic_id = Some(read_i32(stream)?);
        }
        if encoding_mask.contains(DiagnosticInfoMask::HAS_NAMESPACE) {
            diagnostic_info.namespace_uri = Some(read_i32(stream)?);
        }
        if encoding_mask.contains(DiagnosticInfoMask::HAS_LOCALE) {
            diagnostic_info.locale = Some(read_i32(stream)?);
        }
        if encoding_mask.contains(DiagnosticInfoMask::HAS_LOCALIZED_TEXT) {
            diagnostic_info.localized_text = Some(read_i32(stream)?);
        }
        if encoding_mask.contains(DiagnosticInfoMask::HAS_ADDITIONAL_INFO) {
            diagnostic_info.additional_info = Some(UAString::decode(stream)?);
        }
        if encoding_mask.contains(DiagnosticInfoMask::HAS_INNER_STATUS_CODE) {
            diagnostic_info.inner_status_code = Some(StatusCode::decode(stream)?);
        }
        if encoding_mask.contains(DiagnosticInfoMask::HAS_INNER_DIAGNOSTIC_INFO) {
            let inner = stream.descend(DiagnosticInfo::decode)?;
            diagnostic_info.inner_diagnostic_info = Some(Box::new(inner));
        }
        Ok(diagnostic_info)
    }
}

crate::impl_override!(DiagnosticInfo);

impl DiagnosticInfo {
    pub fn null() -> DiagnosticInfo {
        DiagnosticInfo::default()
    }

    pub fn encoding_mask(&self) -> DiagnosticInfoMask {
        let mut encoding_mask = DiagnosticInfoMask::empty();
        if self.symbolic_id.is_some() {
            encoding_mask |= DiagnosticInfoMask::HAS_SYMBOLIC_ID;
        }
        if self.namespace_uri.is_some() {
            encoding_mask |= DiagnosticInfoMask::HAS_NAMESPACE;
        }
        if self.locale.is_some() {
            encoding_mask |= DiagnosticInfoMask::HAS_LOCALE;
        }
        if self.localized_text.is_some() {
            encoding_mask |= DiagnosticInfoMask::HAS_LOCALIZED_TEXT;
        }
        if self.additional_info.is_some() {
            encoding_mask |= DiagnosticInfoMask::HAS_ADDITIONAL_INFO;
        }
        if self.inner_status_code.is_some() {
            encoding_mask |= DiagnosticInfoMask::HAS_INNER_STATUS_CODE;
        }
        if self.inner_diagnostic_info.is_some() {
            encoding_mask |= DiagnosticInfoMask::HAS_INNER_DIAGNOSTIC_INFO;
        }
        encoding_mask
    }
}
