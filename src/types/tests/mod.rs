mod encoding;
mod node_id;

use std::cmp::PartialEq;
use std::fmt::Debug;

use crate::codec::{default_context, CodecContext, Encodable};
use crate::types::*;

pub fn serialize_as_bytes<T>(value: &T) -> Vec<u8>
where
    T: Encodable + Debug,
{
    let bytes = default_context().encode(value).unwrap();
    println!("value = {:?}", value);
    println!("encoded bytes = {:?}", bytes);
    bytes
}

pub fn serialize_test_and_return_expected<T>(value: T, expected_value: T) -> T
where
    T: Encodable + Debug + PartialEq,
{
    let bytes = serialize_as_bytes(&value);
    let (new_value, consumed): (T, usize) = default_context().decode_prefix(&bytes).unwrap();
    println!("new value = {:?}", new_value);
    // Every byte written must be read back
    assert_eq!(consumed, bytes.len());
    assert_eq!(expected_value, new_value);
    new_value
}

pub fn serialize_test_and_return<T>(value: T) -> T
where
    T: Encodable + Debug + PartialEq + Clone,
{
    serialize_test_and_return_expected(value.clone(), value)
}

pub fn serialize_test<T>(value: T)
where
    T: Encodable + Debug + PartialEq + Clone,
{
    let _ = serialize_test_and_return(value);
}

pub fn serialize_test_expected<T>(value: T, expected_value: T)
where
    T: Encodable + Debug + PartialEq,
{
    let _ = serialize_test_and_return_expected(value, expected_value);
}

pub fn serialize_and_compare<T>(value: T, expected: &[u8])
where
    T: Encodable + Debug + PartialEq,
{
    let actual = serialize_as_bytes(&value);
    assert_eq!(actual, expected);

    let new_value: T = default_context().decode(expected).unwrap();
    assert_eq!(new_value, value);
}

/// A context whose decoding limits differ from the defaults
pub fn context_with_decoding(decoding_options: DecodingOptions) -> CodecContext {
    CodecContext::new().with_options(EncodingOptions::default(), decoding_options)
}
