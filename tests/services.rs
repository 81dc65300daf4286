use std::sync::Arc;

use opcua_codec::{
    codec::{services::ServiceMessage, CodecContext, TypeRegistry},
    types::*,
    ua_struct,
};

fn read_request() -> ReadRequest {
    ReadRequest {
        request_header: RequestHeader::new(&NodeId::new(0, 99u32), &DateTime::now(), 1),
        max_age: 500.0,
        timestamps_to_return: TimestampsToReturn::Both,
        nodes_to_read: Some(vec![
            ReadValueId::from((2, "Temperature")),
            ReadValueId::from(NodeId::new(2, 7u32)),
        ]),
    }
}

#[test]
fn read_request_round_trip() {
    let context = CodecContext::new();
    let request = read_request();
    let bytes = context.encode_service(&request).unwrap();
    // ReadRequest_Encoding_DefaultBinary is i=631
    assert_eq!(&bytes[..4], &[0x01, 0x00, 0x77, 0x02]);
    // The body follows directly, without a length
    assert_eq!(&bytes[4..], &context.encode(&request).unwrap()[..]);

    let message = context.decode_service(&bytes).unwrap();
    assert_eq!(
        message.object_id(),
        Some(ObjectId::ReadRequest_Encoding_DefaultBinary)
    );
    assert!(message.is::<ReadRequest>());
    assert!(!message.is::<ReadResponse>());
    assert_eq!(message.downcast_ref::<ReadRequest>(), Some(&request));
    assert_eq!(message, ServiceMessage::new(request.clone()));
    assert_eq!(message.into_body::<ReadRequest>(), Some(request.clone()));

    let message = ServiceMessage::new(request);
    assert_eq!(context.encode_service_message(&message).unwrap(), bytes);
}

#[test]
fn read_response_round_trip() {
    let context = CodecContext::new();
    let request = read_request();
    let response = ReadResponse {
        response_header: ResponseHeader::new_good(&request.request_header),
        results: Some(vec![
            DataValue::value_only(21.5f64),
            DataValue::value_only(Variant::from("ok")),
        ]),
        diagnostic_infos: None,
    };
    let bytes = context.encode_service(&response).unwrap();
    let message = context.decode_service(&bytes).unwrap();
    let decoded = message.into_body::<ReadResponse>().unwrap();
    assert_eq!(decoded, response);
    assert_eq!(decoded.response_header.request_handle, 1);
    assert_eq!(decoded.response_header.service_result, StatusCode::Good);
}

#[test]
fn unknown_service_fails_only_that_message() {
    let context = CodecContext::new();
    // i=9999 followed by a body nobody can read
    let unknown = [0x01, 0x00, 0x0f, 0x27, 0xde, 0xad, 0xbe, 0xef];
    let err = context.decode_service(&unknown).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownTypeId);
    assert_eq!(err.status_code(), StatusCode::BadServiceUnsupported);
    assert_eq!(err.type_id(), Some(&NodeId::new(0, 9999u32)));

    // The context is unaffected and decodes the next message
    let bytes = context.encode_service(&read_request()).unwrap();
    assert!(context.decode_service(&bytes).unwrap().is::<ReadRequest>());
}

#[test]
fn non_local_type_id_is_unknown() {
    let context = CodecContext::new();
    // i=631 with server index 1
    let bytes = [0x41, 0x00, 0x77, 0x02, 0x01, 0x00, 0x00, 0x00];
    let err = context.decode_service(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownTypeId);
}

#[test]
fn truncated_service_body() {
    let context = CodecContext::new();
    let bytes = context.encode_service(&read_request()).unwrap();
    let err = context.decode_service(&bytes[..bytes.len() - 2]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TooShortToDecode);
    assert_eq!(err.status_code(), StatusCode::BadDecodingError);
    assert!(err.path().starts_with("ReadRequest.nodes_to_read[1]"));
}

#[test]
fn unregistered_service_cannot_be_encoded() {
    let context = CodecContext::with_registries(
        Arc::new(TypeRegistry::new()),
        Arc::new(TypeRegistry::new()),
    );
    let err = context.encode_service(&read_request()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownTypeId);
    assert_eq!(err.status_code(), StatusCode::BadServiceUnsupported);
}

ua_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    struct PingRequest {
        sequence: u32,
        payload: ByteString,
    }
}

#[test]
fn custom_service() {
    let type_id = NodeId::new(3, 5u32);
    let services = TypeRegistry::new();
    services.register::<PingRequest>(type_id.clone()).unwrap();
    let context =
        CodecContext::with_registries(Arc::new(TypeRegistry::new()), Arc::new(services));

    let ping = PingRequest {
        sequence: 9,
        payload: ByteString::from(vec![0xcau8, 0xfe]),
    };
    let message = ServiceMessage::with_type_id(type_id.clone(), ping.clone());
    assert_eq!(message.type_id(), &type_id);
    assert_eq!(message.object_id(), None);

    let bytes = context.encode_service_message(&message).unwrap();
    assert_eq!(
        bytes,
        [
            0x01, 0x03, 0x05, 0x00, // type id
            0x09, 0x00, 0x00, 0x00, // sequence
            0x02, 0x00, 0x00, 0x00, 0xca, 0xfe, // payload
        ]
    );
    let decoded = context.decode_service(&bytes).unwrap();
    assert_eq!(decoded, message);
    assert_eq!(decoded.into_body::<PingRequest>(), Some(ping));

    // The built in services are not known to this context
    let err = context.encode_service(&read_request()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownTypeId);
}

#[test]
fn service_fault() {
    let context = CodecContext::new();
    let request = read_request();
    let fault = ServiceFault::new(&request.request_header, StatusCode::BadServiceUnsupported);
    assert_eq!(fault.response_header.request_handle, 1);

    let bytes = context.encode_service(&fault).unwrap();
    let message = context.decode_service(&bytes).unwrap();
    assert_eq!(
        message.object_id(),
        Some(ObjectId::ServiceFault_Encoding_DefaultBinary)
    );
    let decoded = message.downcast_ref::<ServiceFault>().unwrap();
    assert_eq!(
        decoded.response_header.service_result,
        StatusCode::BadServiceUnsupported
    );
}

#[test]
fn close_session() {
    let context = CodecContext::new();
    let request = CloseSessionRequest {
        request_header: RequestHeader::new(&NodeId::new(0, 99u32), &DateTime::now(), 4),
        delete_subscriptions: true,
    };
    let bytes = context.encode_service(&request).unwrap();
    let decoded = context.decode_service(&bytes).unwrap();
    assert_eq!(decoded.downcast_ref::<CloseSessionRequest>(), Some(&request));

    let response = CloseSessionResponse {
        response_header: ResponseHeader::new_good(&request.request_header),
    };
    let bytes = context.encode_service(&response).unwrap();
    let decoded = context.decode_service(&bytes).unwrap();
    assert!(decoded.is::<CloseSessionResponse>());
}

#[test]
fn identity_token_in_request_header() {
    let context = CodecContext::new();
    let token = UserNameIdentityToken {
        policy_id: UAString::from("username"),
        user_name: UAString::from("operator"),
        password: ByteString::from(b"secret"),
        encryption_algorithm: UAString::null(),
    };
    assert!(token.is_valid());
    let mut request = CloseSessionRequest::default();
    request.request_header.additional_header = context.extension_object(token.clone()).unwrap();

    let bytes = context.encode_service(&request).unwrap();
    let decoded = context
        .decode_service(&bytes)
        .unwrap()
        .into_body::<CloseSessionRequest>()
        .unwrap();
    let decoded_token = decoded
        .request_header
        .additional_header
        .into_value::<UserNameIdentityToken>()
        .unwrap();
    assert_eq!(decoded_token, token);
    assert_eq!(decoded_token.plaintext_password(), Ok("secret".to_string()));

    let encrypted = UserNameIdentityToken {
        encryption_algorithm: UAString::from("http://www.w3.org/2001/04/xmlenc#rsa-oaep"),
        ..token
    };
    assert_eq!(
        encrypted.plaintext_password(),
        Err(StatusCode::BadInvalidArgument)
    );
}
