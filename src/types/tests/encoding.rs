use std::str::FromStr;

use crate::codec::default_context;
use crate::types::{tests::*, *};

#[test]
fn encoding_bool() {
    serialize_test(true);
    serialize_test(false);
    serialize_and_compare(true, &[0x01]);
    serialize_and_compare(false, &[0x00]);

    // Anything other than 0 is true
    let value: bool = crate::decode(&[0x7f]).unwrap();
    assert!(value);
}

#[test]
fn encoding_sbyte() {
    serialize_test(0 as i8);
    serialize_test(100 as i8);
    serialize_test(-90 as i8);
}

#[test]
fn encoding_byte() {
    serialize_test(0 as u8);
    serialize_test(255 as u8);
    serialize_test(90 as u8);
}

#[test]
fn encoding_int16() {
    serialize_test(0 as i16);
    serialize_test(-17000 as i16);
    serialize_test(32000 as i16);
}

#[test]
fn encoding_uint16() {
    serialize_test(0 as u16);
    serialize_test(57000 as u16);
    serialize_test(32000 as u16);
}

#[test]
fn encoding_int32() {
    serialize_test(0 as i32);
    serialize_test(-17444000 as i32);
    serialize_test(32004440 as i32);
    serialize_and_compare(-2 as i32, &[0xfe, 0xff, 0xff, 0xff]);
}

#[test]
fn encoding_uint32() {
    serialize_test(0 as u32);
    serialize_test(57055500 as u32);
    serialize_test(32555000 as u32);
}

#[test]
fn encoding_int64() {
    serialize_test(0 as i64);
    serialize_test(-17442224000 as i64);
    serialize_test(32022204440 as i64);
}

#[test]
fn encoding_uint64() {
    serialize_test(0 as u64);
    serialize_test(57054445500 as u64);
    serialize_test(34442555000 as u64);
}

#[test]
fn encoding_f32() {
    serialize_test(0 as f32);
    serialize_test(12.4342 as f32);
    serialize_test(5686.222 as f32);
    serialize_and_compare(1.234 as f32, &[0xb6, 0xf3, 0x9d, 0x3f]);
    serialize_and_compare(5.00078 as f32, &[0x64, 0x06, 0xa0, 0x40]);
}

#[test]
fn encoding_f64() {
    serialize_test(0 as f64);
    serialize_test(12.43424324234 as f64);
    serialize_test(5686.222342342 as f64);
    serialize_and_compare(
        -1.234 as f64,
        &[0x58, 0x39, 0xb4, 0xc8, 0x76, 0xbe, 0xf3, 0xbf],
    );
}

#[test]
fn encoding_nan() {
    // Every NaN is written in the same form
    let bytes = crate::encode(&f32::NAN).unwrap();
    assert_eq!(bytes, [0x00, 0x00, 0xc0, 0xff]);
    let bytes = crate::encode(&f32::from_bits(0x7f80_0001)).unwrap();
    assert_eq!(bytes, [0x00, 0x00, 0xc0, 0xff]);
    let value: f32 = crate::decode(&bytes).unwrap();
    assert!(value.is_nan());

    let bytes = crate::encode(&f64::NAN).unwrap();
    assert_eq!(bytes, [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf8, 0xff]);
    let value: f64 = crate::decode(&bytes).unwrap();
    assert!(value.is_nan());

    // Infinities are not NaN
    serialize_test(f32::INFINITY);
    serialize_test(f64::NEG_INFINITY);
}

#[test]
fn encoding_string() {
    // Null
    serialize_test(UAString::null());
    // UTF-8 strings
    serialize_test(UAString::from(""));
    serialize_test(UAString::from("ショッピング"));
    serialize_test(UAString::from("This is a test"));

    serialize_and_compare(UAString::null(), &[0xff, 0xff, 0xff, 0xff]);
    serialize_and_compare(UAString::from(""), &[0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn encode_string_part_6_5224() {
    // Sample from OPCUA Part 6 - 5.2.2.4
    let expected = [0x06, 0x00, 0x00, 0x00, 0xE6, 0xB0, 0xB4, 0x42, 0x6F, 0x79];
    let input = UAString::from("水Boy");
    serialize_and_compare(input, &expected);
}

#[test]
fn encoding_rust_string() {
    serialize_test(String::from("Rust string"));
    serialize_and_compare(String::new(), &[0x00, 0x00, 0x00, 0x00]);

    // A string cannot be null so a null on the wire becomes empty
    let value: String = crate::decode(&[0xff, 0xff, 0xff, 0xff]).unwrap();
    assert_eq!(value, "");
}

#[test]
fn decode_string_malformed_utf8() {
    // Test that string returns a decoding error when it receives some malformed UTF-8
    // Bytes below are a mangled 水Boy, missing a byte
    let bytes = [0x06, 0x00, 0x00, 0x00, 0xE6, 0xB0, 0x42, 0x6F, 0x79, 0x21];
    let err = crate::decode::<UAString>(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decoding);
    assert_eq!(err.status_code(), StatusCode::BadDecodingError);
}

#[test]
fn decode_string_too_short() {
    // Declares 6 bytes, holds 3
    let bytes = [0x06, 0x00, 0x00, 0x00, 0x42, 0x6F, 0x79];
    let err = crate::decode::<UAString>(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TooShortToDecode);

    // A negative length other than -1
    let bytes = [0xfe, 0xff, 0xff, 0xff];
    let err = crate::decode::<UAString>(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TooShortToDecode);
}

#[test]
fn decode_string_limit() {
    let context = context_with_decoding(DecodingOptions {
        max_string_length: 4,
        ..DecodingOptions::test()
    });
    let bytes = crate::encode(&UAString::from("abcd")).unwrap();
    assert_eq!(context.decode::<UAString>(&bytes).unwrap(), UAString::from("abcd"));

    let bytes = crate::encode(&UAString::from("abcde")).unwrap();
    let err = context.decode::<UAString>(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    assert_eq!(err.status_code(), StatusCode::BadEncodingLimitsExceeded);
}

#[test]
fn encoding_byte_string() {
    serialize_test(ByteString::null());
    serialize_test(ByteString::from(vec![]));
    serialize_and_compare(
        ByteString::from(vec![0xde, 0xad, 0xbe, 0xef]),
        &[0x04, 0x00, 0x00, 0x00, 0xde, 0xad, 0xbe, 0xef],
    );
    serialize_and_compare(ByteString::null(), &[0xff, 0xff, 0xff, 0xff]);
}

#[test]
fn encoding_sequences() {
    // A sequence that may be null keeps null and empty apart
    serialize_and_compare(None::<Vec<u32>>, &[0xff, 0xff, 0xff, 0xff]);
    serialize_and_compare(Some(Vec::<u32>::new()), &[0x00, 0x00, 0x00, 0x00]);
    serialize_and_compare(
        Some(vec![1u16, 2u16]),
        &[0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00],
    );

    // A plain sequence reads null as empty
    let value: Vec<u32> = crate::decode(&[0xff, 0xff, 0xff, 0xff]).unwrap();
    assert!(value.is_empty());
    serialize_and_compare(Vec::<u32>::new(), &[0x00, 0x00, 0x00, 0x00]);

    serialize_test(vec![UAString::from("a"), UAString::null(), UAString::from("")]);
    serialize_test([1u8, 2u8, 3u8]);
}

#[test]
fn decode_fixed_array_wrong_length() {
    let bytes = crate::encode(&vec![1u8, 2u8]).unwrap();
    let err = crate::decode::<[u8; 3]>(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decoding);
}

#[test]
fn decode_sequence_limit() {
    let context = context_with_decoding(DecodingOptions {
        max_array_length: 2,
        ..DecodingOptions::test()
    });
    let bytes = crate::encode(&vec![1u32, 2u32, 3u32]).unwrap();
    let err = context.decode::<Vec<u32>>(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LimitExceeded);
}

#[test]
fn encoding_guid() {
    let guid = Guid::from_str("F0001234-FACE-BEEF-0102-030405060708").unwrap();
    assert_eq!(
        "f0001234-face-beef-0102-030405060708",
        format!("{:?}", guid)
    );
    let new_guid = serialize_test_and_return(guid.clone());
    assert_eq!(
        "f0001234-face-beef-0102-030405060708",
        format!("{:?}", new_guid)
    );
    serialize_test(guid);
}

#[test]
fn encode_guid_5226() {
    // Sample from OPCUA Part 6 - 5.2.2.6
    let expected_bytes = [
        0x91, 0x2B, 0x96, 0x72, 0x75, 0xFA, 0xE6, 0x4A, 0x8D, 0x28, 0xB4, 0x04, 0xDC, 0x7D, 0xAF,
        0x63,
    ];
    let guid = Guid::from_str("72962B91-FA75-4AE6-8D28-B404DC7DAF63").unwrap();
    // RFC order differs from the wire in the first three fields
    assert_eq!(&guid.as_bytes()[..8], &[0x72, 0x96, 0x2B, 0x91, 0xFA, 0x75, 0x4A, 0xE6]);
    assert_eq!(&guid.as_bytes()[8..], &expected_bytes[8..]);
    serialize_and_compare(guid, &expected_bytes);
}

#[test]
fn node_id_2byte_numeric() {
    // Sample from OPCUA Part 6 - 5.2.2.9
    let node_id = NodeId::new(0, 0x72 as u32);
    let expected_bytes = [0x0, 0x72];
    serialize_and_compare(node_id.clone(), &expected_bytes);

    serialize_test(node_id);
}

#[test]
fn node_id_4byte_numeric() {
    // Sample from OPCUA Part 6 - 5.2.2.9
    let node_id = NodeId::new(5, 1025u32);
    assert!(node_id.is_numeric());
    let expected_bytes = [0x1, 0x5, 0x1, 0x4];
    serialize_and_compare(node_id.clone(), &expected_bytes);

    serialize_test(node_id);
}

#[test]
fn node_id_large_namespace() {
    let node_id = NodeId::new(0x100, 1u32);
    assert!(node_id.is_numeric());

    let expected_bytes = [0x2, 0x0, 0x1, 0x1, 0x0, 0x0, 0x0];
    serialize_and_compare(node_id.clone(), &expected_bytes);

    serialize_test(node_id);
}

#[test]
fn node_id_large_id() {
    let node_id = NodeId::new(1, 0xdeadbeef as u32);
    assert!(node_id.is_numeric());

    let expected_bytes = [0x2, 0x1, 0x0, 0xef, 0xbe, 0xad, 0xde];
    serialize_and_compare(node_id.clone(), &expected_bytes);

    serialize_test(node_id);
}

#[test]
fn node_id_string_part_6_5229() {
    // Sample from OPCUA Part 6 - 5.2.2.9
    let node_id = NodeId::new(1, "Hot水");
    assert!(node_id.is_string());
    let expected_bytes = [
        0x03, 0x1, 0x0, 0x6, 0x0, 0x0, 0x0, 0x48, 0x6F, 0x74, 0xE6, 0xB0, 0xB4,
    ];
    serialize_and_compare(node_id.clone(), &expected_bytes);

    serialize_test(node_id);
}

#[test]
fn node_id_guid() {
    let guid = Guid::from_str("72962B91-FA75-4AE6-8D28-B404DC7DAF63").unwrap();
    let node_id = NodeId::new(1, guid);
    assert!(node_id.is_guid());
    let bytes = crate::encode(&node_id).unwrap();
    assert_eq!(&bytes[..3], &[0x04, 0x01, 0x00]);
    assert_eq!(bytes.len(), 19);
    serialize_test(node_id);
}

#[test]
fn node_id_byte_string() {
    let node_id = NodeId::new(30, ByteString::from(b"this is a byte string"));
    assert!(node_id.is_byte_string());
    serialize_test(node_id);
}

#[test]
fn node_id_bad_encoding() {
    let err = crate::decode::<NodeId>(&[0x07, 0x00]).unwrap_err();
    // Node ids encode themselves so the failure is reported through the override
    assert_eq!(err.kind(), ErrorKind::Override);
    assert_eq!(err.root_kind(), ErrorKind::Decoding);
    assert_eq!(err.type_name(), Some("NodeId"));
    assert_eq!(err.phase(), Some(Phase::Decode));
    assert_eq!(err.status_code(), StatusCode::BadDecodingError);
}

#[test]
fn expanded_node_id() {
    let node_id = ExpandedNodeId::new(NodeId::new(200, 2000u32));
    serialize_test(node_id);

    let mut node_id = ExpandedNodeId::new(NodeId::new(200, 2000u32));
    node_id.namespace_uri = UAString::from("test");
    serialize_test(node_id);

    let mut node_id = ExpandedNodeId::new(NodeId::new(200, 2000u32));
    node_id.server_index = 500;
    serialize_test(node_id);

    let mut node_id = ExpandedNodeId::new(NodeId::new(200, 2000u32));
    node_id.namespace_uri = UAString::from("test2");
    node_id.server_index = 50330;
    serialize_test(node_id);
}

#[test]
fn expanded_node_id_flags() {
    let mut node_id = ExpandedNodeId::new(NodeId::new(0, 5u32));
    node_id.namespace_uri = UAString::from("x");
    node_id.server_index = 2;
    serialize_and_compare(
        node_id,
        &[
            0xc0, 0x05, 0x01, 0x00, 0x00, 0x00, 0x78, 0x02, 0x00, 0x00, 0x00,
        ],
    );

    // Bits 0x10 and 0x20 are reserved
    let err = crate::decode::<ExpandedNodeId>(&[0x10, 0x05]).unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::Decoding);
}

#[test]
fn localized_text() {
    let t = LocalizedText {
        locale: UAString::null(),
        text: UAString::null(),
    };
    serialize_and_compare(t, &[0x00]);

    let t = LocalizedText {
        locale: UAString::from("Hello world"),
        text: UAString::null(),
    };
    serialize_test(t);

    let t = LocalizedText {
        locale: UAString::null(),
        text: UAString::from("Now is the winter of our discontent"),
    };
    serialize_test(t);

    let t = LocalizedText {
        locale: UAString::from("ABCDEFG"),
        text: UAString::from("Now is the winter of our discontent"),
    };
    serialize_test(t);
}

#[test]
fn qualified_name() {
    let qname = QualifiedName {
        namespace_index: 100,
        name: UAString::from("this is a qualified name"),
    };
    serialize_test(qname);

    serialize_and_compare(
        QualifiedName::new(2, "ab"),
        &[0x02, 0x00, 0x02, 0x00, 0x00, 0x00, 0x61, 0x62],
    );
}

#[test]
fn status_code() {
    serialize_and_compare(StatusCode::Good, &[0x00, 0x00, 0x00, 0x00]);
    serialize_and_compare(StatusCode::BadDecodingError, &[0x00, 0x00, 0x07, 0x80]);
}

#[test]
fn extension_object() {
    let eo = ExtensionObject::null();
    serialize_and_compare(eo, &[0x00, 0x00, 0x00]);

    // A body whose type id is not registered survives unchanged
    let eo = ExtensionObject {
        node_id: NodeId::new(2, 9999u32),
        body: ExtensionObjectBody::Unknown(ByteString::from(b"hello world")),
    };
    serialize_test(eo);

    let eo = ExtensionObject {
        node_id: ObjectId::AnonymousIdentityToken_Encoding_DefaultBinary.into(),
        body: ExtensionObjectBody::XmlElement(XmlElement::from("<hello/>")),
    };
    serialize_test(eo);
}

#[test]
fn extension_object_anonymous_identity_token() {
    let token = AnonymousIdentityToken {
        policy_id: UAString::from("anonymous"),
    };
    let eo = default_context().extension_object(token.clone()).unwrap();
    assert_eq!(
        eo.object_id(),
        Some(ObjectId::AnonymousIdentityToken_Encoding_DefaultBinary)
    );
    let expected = [
        0x01, 0x00, 0x41, 0x01, 0x01, 0x0d, 0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, b'a', b'n',
        b'o', b'n', b'y', b'm', b'o', b'u', b's',
    ];
    serialize_and_compare(eo, &expected);

    let eo: ExtensionObject = crate::decode(&expected).unwrap();
    assert!(!eo.is_unknown());
    assert_eq!(eo.value::<AnonymousIdentityToken>(), Some(&token));
    assert!(eo.value::<UserNameIdentityToken>().is_none());
    assert_eq!(eo.into_value::<AnonymousIdentityToken>(), Some(token));
}

#[test]
fn extension_object_unknown_type_id() {
    // A type id nobody registered, with a body of 3 bytes
    let bytes = [0x01, 0x02, 0x0f, 0x27, 0x01, 0x03, 0x00, 0x00, 0x00, 0xaa, 0xbb, 0xcc];
    let eo: ExtensionObject = crate::decode(&bytes).unwrap();
    assert!(eo.is_unknown());
    assert_eq!(eo.node_id, NodeId::new(2, 9999u32));
    assert_eq!(
        eo.body,
        ExtensionObjectBody::Unknown(ByteString::from(vec![0xaa, 0xbb, 0xcc]))
    );
    let err = eo.error().unwrap();
    assert_eq!(err.kind(), ErrorKind::UnknownTypeId);
    assert_eq!(err.type_id(), Some(&NodeId::new(2, 9999u32)));

    // And it is written back exactly as it was read
    assert_eq!(crate::encode(&eo).unwrap(), bytes);
}

#[test]
fn extension_object_empty_binary_body() {
    // A registered type id with a body of length 0, then of length -1
    for length in [[0x00u8, 0x00, 0x00, 0x00], [0xff, 0xff, 0xff, 0xff]] {
        let mut bytes = vec![0x01, 0x00, 0x41, 0x01, 0x01];
        bytes.extend_from_slice(&length);
        let eo: ExtensionObject = crate::decode(&bytes).unwrap();
        assert_eq!(
            eo.object_id(),
            Some(ObjectId::AnonymousIdentityToken_Encoding_DefaultBinary)
        );
        assert_eq!(eo.body, ExtensionObjectBody::None);
        assert!(!eo.is_unknown());
        // Written back with no body
        assert_eq!(crate::encode(&eo).unwrap(), [0x01, 0x00, 0x41, 0x01, 0x00]);
    }

    // The objects around an empty body still decode
    let mut bytes = vec![0x02, 0x00, 0x00, 0x00];
    bytes.extend_from_slice(&[0x01, 0x00, 0x41, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00]);
    bytes.extend_from_slice(&[0x00, 0x00, 0x00]);
    let objects: Vec<ExtensionObject> = crate::decode(&bytes).unwrap();
    assert_eq!(objects.len(), 2);
    assert!(objects.iter().all(|eo| eo.body == ExtensionObjectBody::None));
}

#[test]
fn extension_object_bad_encoding() {
    let err = crate::decode::<ExtensionObject>(&[0x00, 0x00, 0x03]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Override);
    assert_eq!(err.root_kind(), ErrorKind::Decoding);
}

#[test]
fn extension_object_unbound_value() {
    // The value's type id is not bound so the body cannot be written
    let eo = ExtensionObject::new(NodeId::new(3, 1u32), 42u32);
    let err = crate::encode(&eo).unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::UnknownTypeId);
}

#[test]
fn data_value() {
    serialize_and_compare(DataValue::null(), &[0x00]);

    let dv = DataValue::value_only(100i32);
    serialize_and_compare(dv, &[0x01, 0x06, 0x64, 0x00, 0x00, 0x00]);

    let now = DateTime::now();
    let dv = DataValue {
        value: Some(Variant::from("hello")),
        status: Some(StatusCode::BadDecodingError),
        source_timestamp: Some(now),
        source_picoseconds: Some(333),
        server_timestamp: Some(now),
        server_picoseconds: Some(666),
    };
    serialize_test(dv);
}

#[test]
fn data_value_picoseconds_without_timestamp() {
    // Picoseconds are only written following their timestamp
    let dv = DataValue {
        source_picoseconds: Some(10),
        server_picoseconds: Some(20),
        ..Default::default()
    };
    serialize_test_expected(dv, DataValue::null());
}

#[test]
fn diagnostic_info() {
    let mut d = DiagnosticInfo {
        symbolic_id: None,
        namespace_uri: None,
        locale: None,
        localized_text: None,
        additional_info: None,
        inner_status_code: None,
        inner_diagnostic_info: None,
    };
    serialize_and_compare(d.clone(), &[0x00]);

    d.symbolic_id = Some(25);

    assert_eq!(d.encoding_mask().bits(), 0x1);

    d.namespace_uri = Some(100);
    assert_eq!(d.encoding_mask().bits(), 0x3);

    d.localized_text = Some(120);
    assert_eq!(d.encoding_mask().bits(), 0x7);

    d.locale = Some(110);
    assert_eq!(d.encoding_mask().bits(), 0xf);

    d.additional_info = Some(UAString::from("Hello world"));
    assert_eq!(d.encoding_mask().bits(), 0x1f);

    d.inner_status_code = Some(StatusCode::BadInvalidArgument);
    assert_eq!(d.encoding_mask().bits(), 0x3f);

    serialize_test(d.clone());

    d.inner_diagnostic_info = Some(Box::new(DiagnosticInfo {
        symbolic_id: Some(99),
        namespace_uri: Some(437437),
        locale: Some(333),
        localized_text: Some(233),
        additional_info: Some(UAString::from("Nested diagnostic")),
        inner_status_code: Some(StatusCode::Good),
        inner_diagnostic_info: None,
    }));
    assert_eq!(d.encoding_mask().bits(), 0x7f);

    serialize_test(d);
}

#[test]
fn decode_prefix_reports_consumed() {
    let mut bytes = crate::encode(&UAString::from("abc")).unwrap();
    bytes.extend_from_slice(&[0xff, 0xff]);
    let (value, consumed) = default_context().decode_prefix::<UAString>(&bytes).unwrap();
    assert_eq!(value, UAString::from("abc"));
    assert_eq!(consumed, 7);
}

#[test]
fn decode_message_size_limit() {
    let context = context_with_decoding(DecodingOptions {
        max_message_size: 4,
        ..DecodingOptions::test()
    });
    assert_eq!(context.decode::<u32>(&[1, 0, 0, 0]).unwrap(), 1);
    let err = context.decode::<u64>(&[1, 0, 0, 0, 0, 0, 0, 0]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LimitExceeded);
}

#[test]
fn decode_too_short() {
    let err = crate::decode::<u32>(&[1, 0]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TooShortToDecode);
    assert_eq!(err.type_name(), Some("u32"));
    assert_eq!(err.phase(), Some(Phase::Decode));
}
