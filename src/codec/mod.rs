// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The generic codec.
//!
//! Every encodable type resolves to a [`Codec`], a shared handle to the code that writes and reads
//! values of that type. Scalars and types implementing [`BinaryEncoder`] themselves resolve to a
//! codec around that implementation, structures resolve to a cached [`Plan`] of their fields and
//! containers resolve to a codec parameterized by their element's codec.

use std::{any::type_name, marker::PhantomData, sync::Arc};

use crate::{
    sync::RwLock,
    types::encoding::*,
};

mod cache;
mod context;
pub mod dynamic;
mod plan;
pub mod registry;
pub mod services;
mod stream;

pub use self::{
    cache::PlanCache,
    context::{decode, decode_into, default_context, encode, CodecContext},
    dynamic::DynamicValue,
    plan::{Plan, PlanBuilder, Structure},
    registry::{TypeEntry, TypeRegistry},
    stream::{DecodeStream, EncodeStream, Identity},
};

pub mod prelude {
    pub use super::{
        decode, decode_into, encode, services::*, Codec, CodecContext, CodecKind, DecodeStream,
        DynamicValue, Encodable, EncodeStream, Shared, Structure, TypeRegistry,
    };
}

/// A value behind a shared, lockable reference. Values of this type can form reference cycles which
/// the encoder detects.
pub type Shared<T> = Arc<RwLock<T>>;

/// What a resolved codec does with a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    /// A fixed rule primitive such as an integer or a string
    Scalar,
    /// A structure walked field by field
    Plan,
    /// A type encoding itself through `BinaryEncoder`
    Override,
    /// A length prefixed dynamic sequence
    Sequence,
    /// A fixed size array
    Array,
    /// A reference or lock around another value
    Reference,
}

/// Encodes and decodes values of one type.
pub trait ValueCodec<T>: Send + Sync {
    fn encode(&self, value: &T, stream: &mut EncodeStream<'_>) -> EncodingResult<()>;
    fn decode(&self, stream: &mut DecodeStream<'_>) -> EncodingResult<T>;
}

/// A resolved codec for values of type `T`. Cloning is cheap.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct Codec<T> {
    kind: CodecKind,
    #[derivative(Debug = "ignore")]
    inner: Arc<dyn ValueCodec<T>>,
}

impl<T> Codec<T> {
    pub fn new(kind: CodecKind, inner: Arc<dyn ValueCodec<T>>) -> Codec<T> {
        Codec { kind, inner }
    }

    pub fn kind(&self) -> CodecKind {
        self.kind
    }

    pub fn encode(&self, value: &T, stream: &mut EncodeStream<'_>) -> EncodingResult<()> {
        self.inner.encode(value, stream)
    }

    pub fn decode(&self, stream: &mut DecodeStream<'_>) -> EncodingResult<T> {
        self.inner.decode(stream)
    }
}

impl<T> Codec<T>
where
    T: BinaryEncoder<T> + Send + Sync + 'static,
{
    /// A codec for a primitive implementing `BinaryEncoder`.
    pub fn scalar() -> Codec<T> {
        Codec::new(
            CodecKind::Scalar,
            Arc::new(BinaryEncoderCodec::<T> {
                is_override: false,
                _phantom: PhantomData,
            }),
        )
    }

    /// A codec for a type supplying its own encoding through `BinaryEncoder`. Errors raised by the
    /// type's implementation are wrapped with the type and the phase.
    pub fn override_of() -> Codec<T> {
        Codec::new(
            CodecKind::Override,
            Arc::new(BinaryEncoderCodec::<T> {
                is_override: true,
                _phantom: PhantomData,
            }),
        )
    }
}

/// A type which the codec can encode and decode.
///
/// Implementations are usually generated: `ua_struct!` for structures walked field by field,
/// `impl_override!` for types implementing `BinaryEncoder` themselves.
pub trait Encodable: Sized + Send + Sync + 'static {
    /// Resolves the codec for this type. Nested types should be resolved through
    /// `PlanCache::resolve` so that their codecs are shared.
    fn codec(plans: &PlanCache) -> EncodingResult<Codec<Self>>;

    /// Resolves the codec for an optional value of this type. Only types with a null representation
    /// on the wire (sequences) support this.
    fn nullable_codec(_plans: &PlanCache) -> EncodingResult<Codec<Option<Self>>> {
        Err(EncodingError::unsupported_type::<Option<Self>>(
            "type has no null representation",
        ))
    }
}

struct BinaryEncoderCodec<T> {
    is_override: bool,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> ValueCodec<T> for BinaryEncoderCodec<T>
where
    T: BinaryEncoder<T> + Send + Sync + 'static,
{
    fn encode(&self, value: &T, stream: &mut EncodeStream<'_>) -> EncodingResult<()> {
        value.encode(stream).map(|_| ()).map_err(|err| {
            if self.is_override {
                err.wrap_override(short_type_name::<T>(), Phase::Encode)
            } else {
                err.with_type_name(short_type_name::<T>())
                    .with_phase(Phase::Encode)
            }
        })
    }

    fn decode(&self, stream: &mut DecodeStream<'_>) -> EncodingResult<T> {
        T::decode(stream).map_err(|err| {
            if self.is_override {
                err.wrap_override(short_type_name::<T>(), Phase::Decode)
            } else {
                err.with_type_name(short_type_name::<T>())
                    .with_phase(Phase::Decode)
            }
        })
    }
}

/// Implements `Encodable` for scalar types which implement `BinaryEncoder`.
#[macro_export]
macro_rules! impl_scalar {
    ( $( $t:ty ),* $(,)? ) => {
        $(
            impl $crate::codec::Encodable for $t {
                fn codec(
                    _: &$crate::codec::PlanCache,
                ) -> $crate::types::EncodingResult<$crate::codec::Codec<Self>> {
                    Ok($crate::codec::Codec::scalar())
                }
            }
        )*
    };
}

/// Implements `Encodable` for types which supply their own encoding through `BinaryEncoder`,
/// bypassing the field by field walker.
#[macro_export]
macro_rules! impl_override {
    ( $( $t:ty ),* $(,)? ) => {
        $(
            impl $crate::codec::Encodable for $t {
                fn codec(
                    _: &$crate::codec::PlanCache,
                ) -> $crate::types::EncodingResult<$crate::codec::Codec<Self>> {
                    Ok($crate::codec::Codec::override_of())
                }
            }
        )*
    };
}

/// Implements `Encodable` for a type implementing `Structure` by hand.
#[macro_export]
macro_rules! impl_structure {
    ( $( $t:ty ),* $(,)? ) => {
        $(
            impl $crate::codec::Encodable for $t {
                fn codec(
                    plans: &$crate::codec::PlanCache,
                ) -> $crate::types::EncodingResult<$crate::codec::Codec<Self>> {
                    plans.plan_codec::<Self>()
                }
            }
        )*
    };
}

/// Declares a structure and describes its fields to the walker in the order they are declared.
///
/// ```
/// use opcua_codec::{ua_struct, types::UAString};
///
/// ua_struct! {
///     #[derive(Debug, Clone, PartialEq, Default)]
///     pub struct Sample {
///         pub id: u32,
///         pub name: UAString,
///         pub values: Option<Vec<f64>>,
///     }
/// }
///
/// let bytes = opcua_codec::encode(&Sample::default()).unwrap();
/// assert_eq!(bytes, [0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
/// ```
#[macro_export]
macro_rules! ua_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$field_meta:meta])* $field_vis:vis $field:ident : $field_ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$field_meta])* $field_vis $field: $field_ty, )*
        }

        impl $crate::codec::Structure for $name {
            fn describe(
                plan: &mut $crate::codec::PlanBuilder<'_, Self>,
            ) -> $crate::types::EncodingResult<()> {
                $( plan.field(stringify!($field), |v| &v.$field, |v| &mut v.$field)?; )*
                Ok(())
            }
        }

        $crate::impl_structure!($name);
    };
}

impl_scalar!(bool, i8, u8, i16, u16, i32, u32, i64, u64, f32, f64, String);

/// Codec for length prefixed sequences. A `Vec<E>` decodes a null sequence as empty, an
/// `Option<Vec<E>>` keeps null and empty apart.
struct SequenceCodec<E> {
    element: Codec<E>,
}

impl<E: Encodable> SequenceCodec<E> {
    fn encode_elements(&self, values: &[E], stream: &mut EncodeStream<'_>) -> EncodingResult<()> {
        stream.enter(Identity::of_slice(values), short_type_name::<Vec<E>>, |stream| {
            write_length(stream, values.len())
                .map_err(|e| e.with_type_name(short_type_name::<Vec<E>>()))?;
            for (i, value) in values.iter().enumerate() {
                self.element.encode(value, stream).map_err(|e| e.at_index(i))?;
            }
            Ok(())
        })
    }

    fn decode_elements(&self, stream: &mut DecodeStream<'_>) -> EncodingResult<Option<Vec<E>>> {
        let max_array_length = stream.decoding_options().max_array_length;
        let len = read_length(stream, max_array_length, "Array")
            .map_err(|e| e.with_type_name(short_type_name::<Vec<E>>()))?;
        match len {
            None => Ok(None),
            Some(len) => {
                let mut values = Vec::with_capacity(len.min(stream.remaining()));
                for i in 0..len {
                    values.push(self.element.decode(stream).map_err(|e| e.at_index(i))?);
                }
                Ok(Some(values))
            }
        }
    }
}

impl<E: Encodable> ValueCodec<Vec<E>> for SequenceCodec<E> {
    fn encode(&self, value: &Vec<E>, stream: &mut EncodeStream<'_>) -> EncodingResult<()> {
        self.encode_elements(value, stream)
    }

    fn decode(&self, stream: &mut DecodeStream<'_>) -> EncodingResult<Vec<E>> {
        Ok(self.decode_elements(stream)?.unwrap_or_default())
    }
}

impl<E: Encodable> ValueCodec<Option<Vec<E>>> for SequenceCodec<E> {
    fn encode(&self, value: &Option<Vec<E>>, stream: &mut EncodeStream<'_>) -> EncodingResult<()> {
        match value {
            Some(values) => self.encode_elements(values, stream),
            None => write_i32(stream, -1).map(|_| ()),
        }
    }

    fn decode(&self, stream: &mut DecodeStream<'_>) -> EncodingResult<Option<Vec<E>>> {
        self.decode_elements(stream)
    }
}

impl<E: Encodable> Encodable for Vec<E> {
    fn codec(plans: &PlanCache) -> EncodingResult<Codec<Self>> {
        let element = plans.resolve::<E>()?;
        Ok(Codec::new(
            CodecKind::Sequence,
            Arc::new(SequenceCodec { element }),
        ))
    }

    fn nullable_codec(plans: &PlanCache) -> EncodingResult<Codec<Option<Self>>> {
        let element = plans.resolve::<E>()?;
        Ok(Codec::new(
            CodecKind::Sequence,
            Arc::new(SequenceCodec { element }),
        ))
    }
}

impl<T: Encodable> Encodable for Option<T> {
    fn codec(plans: &PlanCache) -> EncodingResult<Codec<Self>> {
        T::nullable_codec(plans)
    }
}

/// Codec for fixed size arrays. The element count is written like a sequence and must match the
/// array size when decoded.
struct ArrayCodec<E, const N: usize> {
    element: Codec<E>,
}

impl<E: Encodable, const N: usize> ValueCodec<[E; N]> for ArrayCodec<E, N> {
    fn encode(&self, value: &[E; N], stream: &mut EncodeStream<'_>) -> EncodingResult<()> {
        stream.enter(Identity::of_slice(&value[..]), short_type_name::<[E; N]>, |stream| {
            write_length(stream, N).map_err(|e| e.with_type_name(short_type_name::<[E; N]>()))?;
            for (i, value) in value.iter().enumerate() {
                self.element.encode(value, stream).map_err(|e| e.at_index(i))?;
            }
            Ok(())
        })
    }

    fn decode(&self, stream: &mut DecodeStream<'_>) -> EncodingResult<[E; N]> {
        let len = read_i32(stream)?;
        if len < 0 || len as usize != N {
            error!("Fixed array of {} elements cannot be decoded from {}", N, len);
            return Err(EncodingError::decoding(format!(
                "expected {} elements, found {}",
                N, len
            ))
            .with_type_name(short_type_name::<[E; N]>()));
        }
        let mut values = Vec::with_capacity(N);
        for i in 0..N {
            values.push(self.element.decode(stream).map_err(|e| e.at_index(i))?);
        }
        values.try_into().map_err(|_| {
            EncodingError::decoding("element count mismatch")
                .with_type_name(short_type_name::<[E; N]>())
        })
    }
}

impl<E: Encodable, const N: usize> Encodable for [E; N] {
    fn codec(plans: &PlanCache) -> EncodingResult<Codec<Self>> {
        let element = plans.resolve::<E>()?;
        Ok(Codec::new(
            CodecKind::Array,
            Arc::new(ArrayCodec::<E, N> { element }),
        ))
    }
}

/// Codec for values behind a reference. The referenced value is encoded in place, so a type's
/// override is honoured whether it is used by value or through a reference.
struct ReferenceCodec<T> {
    inner: Codec<T>,
}

impl<T: Encodable> ValueCodec<Box<T>> for ReferenceCodec<T> {
    fn encode(&self, value: &Box<T>, stream: &mut EncodeStream<'_>) -> EncodingResult<()> {
        let value: &T = value;
        stream.enter(Identity::of(value), short_type_name::<Box<T>>, |stream| {
            self.inner.encode(value, stream)
        })
    }

    fn decode(&self, stream: &mut DecodeStream<'_>) -> EncodingResult<Box<T>> {
        stream.descend(|stream| Ok(Box::new(self.inner.decode(stream)?)))
    }
}

impl<T: Encodable> ValueCodec<Arc<T>> for ReferenceCodec<T> {
    fn encode(&self, value: &Arc<T>, stream: &mut EncodeStream<'_>) -> EncodingResult<()> {
        let value: &T = value;
        stream.enter(Identity::of(value), short_type_name::<Arc<T>>, |stream| {
            self.inner.encode(value, stream)
        })
    }

    fn decode(&self, stream: &mut DecodeStream<'_>) -> EncodingResult<Arc<T>> {
        stream.descend(|stream| Ok(Arc::new(self.inner.decode(stream)?)))
    }
}

impl<T: Encodable> ValueCodec<RwLock<T>> for ReferenceCodec<T> {
    fn encode(&self, value: &RwLock<T>, stream: &mut EncodeStream<'_>) -> EncodingResult<()> {
        // A recursive read so that a value reachable from itself does not deadlock before the
        // cycle is detected
        let value = value.read_recursive();
        self.inner.encode(&value, stream)
    }

    fn decode(&self, stream: &mut DecodeStream<'_>) -> EncodingResult<RwLock<T>> {
        Ok(RwLock::new(self.inner.decode(stream)?))
    }
}

impl<T: Encodable> Encodable for Box<T> {
    fn codec(plans: &PlanCache) -> EncodingResult<Codec<Self>> {
        let inner = plans.resolve::<T>()?;
        Ok(Codec::new(
            CodecKind::Reference,
            Arc::new(ReferenceCodec { inner }),
        ))
    }
}

impl<T: Encodable> Encodable for Arc<T> {
    fn codec(plans: &PlanCache) -> EncodingResult<Codec<Self>> {
        let inner = plans.resolve::<T>()?;
        Ok(Codec::new(
            CodecKind::Reference,
            Arc::new(ReferenceCodec { inner }),
        ))
    }
}

impl<T: Encodable> Encodable for RwLock<T> {
    fn codec(plans: &PlanCache) -> EncodingResult<Codec<Self>> {
        let inner = plans.resolve::<T>()?;
        Ok(Codec::new(
            CodecKind::Reference,
            Arc::new(ReferenceCodec { inner }),
        ))
    }
}

/// Returns the fully qualified name of `T`, used in trace logging.
pub(crate) fn full_type_name<T: ?Sized>() -> &'static str {
    type_name::<T>()
}
