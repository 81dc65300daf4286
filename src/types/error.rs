// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The error type produced by encoding and decoding.

use std::{
    error::Error,
    fmt,
    sync::Arc,
};

use crate::types::{node_id::NodeId, status_code::StatusCode};

/// The kind of failure an [`EncodingError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Not enough bytes remain for a declared length or fixed width field, or a length is negative
    TooShortToDecode,
    /// A type has no wire representation
    UnsupportedType,
    /// A value is well typed but cannot be written, e.g. a sequence too long for its count
    UnsupportedValue,
    /// A type's own encode / decode implementation failed
    Override,
    /// A reference or sequence was visited twice during one encode
    CycleDetected,
    /// No registry entry exists for a type id
    UnknownTypeId,
    /// A type id or type is already bound in a registry
    RegistrationConflict,
    /// A length or depth exceeds the configured limits
    LimitExceeded,
    /// The content of the stream is malformed, e.g. invalid utf-8 or a bad encoding mask
    Decoding,
}

impl ErrorKind {
    fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::TooShortToDecode => "too short to decode",
            ErrorKind::UnsupportedType => "unsupported type",
            ErrorKind::UnsupportedValue => "unsupported value",
            ErrorKind::Override => "custom codec failed",
            ErrorKind::CycleDetected => "cycle detected",
            ErrorKind::UnknownTypeId => "unknown type id",
            ErrorKind::RegistrationConflict => "registration conflict",
            ErrorKind::LimitExceeded => "limit exceeded",
            ErrorKind::Decoding => "malformed data",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The phase of a codec operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Encode,
    Decode,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Encode => f.write_str("encode"),
            Phase::Decode => f.write_str("decode"),
        }
    }
}

/// One step of the path from the top level value to the failing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(&'static str),
    Index(usize),
}

/// Error returned by every encode / decode operation.
///
/// The error carries the short name of the type that failed and the path of fields and indices
/// leading to it from the value passed to the public entry point, e.g.
/// `ReadRequest.nodes_to_read[2].node_id`.
#[derive(Debug, Clone)]
pub struct EncodingError {
    kind: ErrorKind,
    type_name: Option<String>,
    phase: Option<Phase>,
    message: String,
    type_id: Option<NodeId>,
    root: Option<String>,
    // Innermost segment first, reversed when displayed
    path: Vec<PathSegment>,
    source: Option<Arc<EncodingError>>,
}

impl PartialEq for EncodingError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.type_name == other.type_name
            && self.phase == other.phase
            && self.message == other.message
            && self.path == other.path
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ref type_name) = self.type_name {
            write!(f, " for {}", type_name)?;
        }
        if let Some(ref phase) = self.phase {
            write!(f, " during {}", phase)?;
        }
        if !self.path.is_empty() || self.root.is_some() {
            write!(f, " at {}", self.path())?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (caused by {})", source)?;
        }
        Ok(())
    }
}

impl Error for EncodingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

impl From<EncodingError> for StatusCode {
    fn from(err: EncodingError) -> StatusCode {
        err.status_code()
    }
}

impl EncodingError {
    pub fn new<S>(kind: ErrorKind, message: S) -> EncodingError
    where
        S: Into<String>,
    {
        EncodingError {
            kind,
            type_name: None,
            phase: None,
            message: message.into(),
            type_id: None,
            root: None,
            path: Vec::new(),
            source: None,
        }
    }

    pub fn too_short<S: Into<String>>(message: S) -> EncodingError {
        Self::new(ErrorKind::TooShortToDecode, message)
    }

    pub fn unsupported_type<T: ?Sized>(message: &str) -> EncodingError {
        Self::new(ErrorKind::UnsupportedType, message).with_type_name(short_type_name::<T>())
    }

    pub fn unsupported_value<S: Into<String>>(message: S) -> EncodingError {
        Self::new(ErrorKind::UnsupportedValue, message)
    }

    pub fn decoding<S: Into<String>>(message: S) -> EncodingError {
        Self::new(ErrorKind::Decoding, message)
    }

    pub fn limit_exceeded<S: Into<String>>(message: S) -> EncodingError {
        Self::new(ErrorKind::LimitExceeded, message)
    }

    pub fn cycle_detected(type_name: String) -> EncodingError {
        Self::new(
            ErrorKind::CycleDetected,
            format!("encountered a cycle via {}", type_name),
        )
        .with_type_name(type_name)
    }

    pub fn unknown_type_id(type_id: &NodeId) -> EncodingError {
        let mut err = Self::new(ErrorKind::UnknownTypeId, format!("no type registered for {}", type_id));
        err.type_id = Some(type_id.clone());
        err
    }

    pub fn registration_conflict<S: Into<String>>(type_id: &NodeId, message: S) -> EncodingError {
        let mut err = Self::new(ErrorKind::RegistrationConflict, message);
        err.type_id = Some(type_id.clone());
        err
    }

    /// Wraps an error raised by a type's own encode / decode implementation. Errors which already
    /// come from another custom codec are passed through so only the innermost one is wrapped.
    pub fn wrap_override(self, type_name: String, phase: Phase) -> EncodingError {
        if self.kind == ErrorKind::Override {
            self
        } else {
            EncodingError {
                kind: ErrorKind::Override,
                type_name: Some(type_name),
                phase: Some(phase),
                message: String::new(),
                type_id: None,
                root: None,
                path: Vec::new(),
                source: Some(Arc::new(self)),
            }
        }
    }

    /// Sets the name of the type that failed, if the error does not have one already.
    pub fn with_type_name<S: Into<String>>(mut self, type_name: S) -> EncodingError {
        if self.type_name.is_none() {
            self.type_name = Some(type_name.into());
        }
        self
    }

    pub fn with_phase(mut self, phase: Phase) -> EncodingError {
        if self.phase.is_none() {
            self.phase = Some(phase);
        }
        self
    }

    /// Records that the error happened inside the named field of the enclosing structure.
    pub fn at_field(mut self, name: &'static str) -> EncodingError {
        self.path.push(PathSegment::Field(name));
        self
    }

    /// Records that the error happened inside the element at `index` of the enclosing sequence.
    pub fn at_index(mut self, index: usize) -> EncodingError {
        self.path.push(PathSegment::Index(index));
        self
    }

    /// Records the type of the value handed to the public entry point.
    pub fn at_root(mut self, type_name: String) -> EncodingError {
        if self.root.is_none() {
            self.root = Some(type_name);
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the kind of the innermost error, looking through custom codec wrapping.
    pub fn root_kind(&self) -> ErrorKind {
        match self.source {
            Some(ref source) => source.root_kind(),
            None => self.kind,
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The type id involved for registry and envelope errors
    pub fn type_id(&self) -> Option<&NodeId> {
        self.type_id.as_ref()
    }

    /// The path to the failing value, e.g. `ReadRequest.nodes_to_read[2].node_id`
    pub fn path(&self) -> String {
        let mut result = self.root.clone().unwrap_or_default();
        for segment in self.path.iter().rev() {
            match segment {
                PathSegment::Field(name) => {
                    if !result.is_empty() {
                        result.push('.');
                    }
                    result.push_str(name);
                }
                PathSegment::Index(index) => {
                    result.push_str(&format!("[{}]", index));
                }
            }
        }
        result
    }

    pub fn path_segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.path.iter().rev()
    }

    /// Maps the error onto the OPC UA status code a peer would be sent.
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::TooShortToDecode | ErrorKind::Decoding => StatusCode::BadDecodingError,
            ErrorKind::LimitExceeded => StatusCode::BadEncodingLimitsExceeded,
            ErrorKind::UnknownTypeId => StatusCode::BadServiceUnsupported,
            ErrorKind::UnsupportedType
            | ErrorKind::UnsupportedValue
            | ErrorKind::CycleDetected
            | ErrorKind::RegistrationConflict => StatusCode::BadEncodingError,
            ErrorKind::Override => match self.source {
                Some(ref source) => source.status_code(),
                None if self.phase == Some(Phase::Decode) => StatusCode::BadDecodingError,
                None => StatusCode::BadEncodingError,
            },
        }
    }
}

/// Returns the name of a type with module paths removed, e.g. `Vec<ReadValueId>` rather than
/// `alloc::vec::Vec<opcua_codec::types::service_types::ReadValueId>`.
pub fn short_type_name<T: ?Sized>() -> String {
    shorten_type_name(std::any::type_name::<T>())
}

pub(crate) fn shorten_type_name(full: &str) -> String {
    let mut result = String::with_capacity(full.len());
    let mut token_start = 0;
    for (i, c) in full.char_indices() {
        if matches!(c, '<' | '>' | ',' | ' ' | '[' | ']' | ';' | '(' | ')' | '&') {
            result.push_str(strip_module_path(&full[token_start..i]));
            result.push(c);
            token_start = i + c.len_utf8();
        }
    }
    result.push_str(strip_module_path(&full[token_start..]));
    result
}

fn strip_module_path(token: &str) -> &str {
    match token.rfind("::") {
        Some(idx) => &token[idx + 2..],
        None => token,
    }
}

pub type EncodingResult<T> = std::result::Result<T, EncodingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names() {
        assert_eq!(short_type_name::<u32>(), "u32");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec<String>");
        assert_eq!(
            shorten_type_name("core::option::Option<alloc::vec::Vec<a::b::ReadValueId>>"),
            "Option<Vec<ReadValueId>>"
        );
        assert_eq!(shorten_type_name("[a::Item; 4]"), "[Item; 4]");
    }

    #[test]
    fn path_display() {
        let err = EncodingError::too_short("need 4 bytes, 2 remain")
            .with_type_name("u32")
            .at_field("namespace")
            .at_field("node_id")
            .at_index(2)
            .at_field("nodes_to_read")
            .at_root("ReadRequest".to_string());
        assert_eq!(err.path(), "ReadRequest.nodes_to_read[2].node_id.namespace");
        assert_eq!(err.kind(), ErrorKind::TooShortToDecode);
        assert_eq!(err.status_code(), StatusCode::BadDecodingError);
        assert_eq!(
            err.to_string(),
            "too short to decode for u32 at ReadRequest.nodes_to_read[2].node_id.namespace: need 4 bytes, 2 remain"
        );
    }

    #[test]
    fn override_wrapping() {
        let inner = EncodingError::decoding("invalid encoding mask 0x7");
        let err = inner.wrap_override("NodeId".to_string(), Phase::Decode);
        assert_eq!(err.kind(), ErrorKind::Override);
        assert_eq!(err.root_kind(), ErrorKind::Decoding);
        assert_eq!(err.type_name(), Some("NodeId"));
        assert_eq!(err.phase(), Some(Phase::Decode));
        assert!(err.source().is_some());
        assert_eq!(err.status_code(), StatusCode::BadDecodingError);

        // A second layer is not added
        let outer = err.clone().wrap_override("Variant".to_string(), Phase::Decode);
        assert_eq!(outer, err);
    }
}
