use std::{
    sync::{Arc, Barrier},
    thread,
};

use opcua_codec::{
    codec::{
        registry::{Binding, DecodeFunc, EncodeFunc},
        CodecContext, TypeRegistry,
    },
    types::*,
    ua_struct,
};

ua_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Reading {
        sensor: UAString,
        value: f64,
    }
}

ua_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Setpoint {
        value: f64,
    }
}

/// A counter exchanged big endian by a peer with its own encoding
#[derive(Debug, Clone, PartialEq, Default)]
struct Counter(u32);

fn encode_counter(value: &Counter) -> EncodingResult<Vec<u8>> {
    Ok(value.0.to_be_bytes().to_vec())
}

fn decode_counter(data: &[u8], value: &mut Counter) -> EncodingResult<()> {
    let bytes: [u8; 4] = data
        .try_into()
        .map_err(|_| EncodingError::decoding(format!("counter needs 4 bytes, got {}", data.len())))?;
    value.0 = u32::from_be_bytes(bytes);
    Ok(())
}

fn reading_id() -> NodeId {
    NodeId::new(2, 1000u32)
}

fn reading() -> Reading {
    Reading {
        sensor: UAString::from("t1"),
        value: 1.5,
    }
}

fn reading_bytes() -> Vec<u8> {
    vec![
        0x01, 0x02, 0xe8, 0x03, // type id
        0x01, // binary body
        0x0e, 0x00, 0x00, 0x00, // body length
        0x02, 0x00, 0x00, 0x00, b't', b'1', // sensor
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf8, 0x3f, // value
    ]
}

fn context_with(extension_objects: Arc<TypeRegistry>) -> CodecContext {
    CodecContext::with_registries(extension_objects, Arc::new(TypeRegistry::new()))
}

#[test]
fn register_and_round_trip() {
    let registry = Arc::new(TypeRegistry::new());
    assert!(registry.is_empty());
    registry.register::<Reading>(reading_id()).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(registry.contains(&reading_id()));
    assert_eq!(registry.type_id_of::<Reading>(), Some(reading_id()));
    assert_eq!(registry.type_id_of_value(&reading()), Some(reading_id()));
    assert_eq!(registry.type_id_of::<Setpoint>(), None);

    let entry = registry.resolve(&reading_id()).unwrap();
    assert_eq!(entry.binding(), Binding::Type);
    assert!(entry.can_encode() && entry.can_decode());

    let context = context_with(registry);
    let object = context.extension_object(reading()).unwrap();
    assert_eq!(object.node_id, reading_id());
    let bytes = context.encode(&object).unwrap();
    assert_eq!(bytes, reading_bytes());

    let decoded: ExtensionObject = context.decode(&bytes).unwrap();
    assert_eq!(decoded.value::<Reading>(), Some(&reading()));
    assert_eq!(decoded, object);
    assert_eq!(decoded.into_value::<Reading>(), Some(reading()));

    let body = context.decode_by_id(&reading_id(), &bytes[9..]).unwrap();
    assert_eq!(body.downcast_ref::<Reading>(), Some(&reading()));
}

#[test]
fn conflicting_registrations_keep_first_binding() {
    let registry = TypeRegistry::new();
    registry.register::<Reading>(reading_id()).unwrap();

    // Same id, another type
    let err = registry.register::<Setpoint>(reading_id()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RegistrationConflict);
    assert_eq!(err.type_id(), Some(&reading_id()));

    // Same type, another id
    let err = registry.register::<Reading>(NodeId::new(2, 1001u32)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RegistrationConflict);

    // A function binding conflicts like any other
    let err = registry
        .register_func::<Reading>(NodeId::new(2, 1002u32), None, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RegistrationConflict);

    assert_eq!(registry.len(), 1);
    assert!(registry
        .resolve(&reading_id())
        .unwrap()
        .type_name()
        .ends_with("Reading"));
    assert_eq!(registry.type_id_of::<Reading>(), Some(reading_id()));
    assert_eq!(registry.type_id_of::<Setpoint>(), None);
    assert!(!registry.contains(&NodeId::new(2, 1001u32)));
}

#[test]
fn function_binding() {
    let id = NodeId::new(2, 2000u32);
    let registry = Arc::new(TypeRegistry::new());
    registry
        .register_func::<Counter>(
            id.clone(),
            Some(Box::new(encode_counter) as EncodeFunc<Counter>),
            Some(Box::new(decode_counter) as DecodeFunc<Counter>),
        )
        .unwrap();
    let entry = registry.resolve(&id).unwrap();
    assert_eq!(entry.binding(), Binding::Functions);

    let context = context_with(registry);
    let object = ExtensionObject::new(id, Counter(0x01020304));
    let bytes = context.encode(&object).unwrap();
    assert_eq!(
        bytes,
        [0x01, 0x02, 0xd0, 0x07, 0x01, 0x04, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04]
    );
    let decoded: ExtensionObject = context.decode(&bytes).unwrap();
    assert_eq!(decoded.value::<Counter>(), Some(&Counter(0x01020304)));

    // The decoder sees exactly the body, a short one is its error to report
    let short = [0x01, 0x02, 0xd0, 0x07, 0x01, 0x03, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03];
    let err = context.decode::<ExtensionObject>(&short).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Override);
    assert_eq!(err.root_kind(), ErrorKind::Decoding);
    assert_eq!(err.type_name(), Some("ExtensionObject"));
}

#[test]
fn encode_only_binding() {
    let id = NodeId::new(2, 2001u32);
    let registry = Arc::new(TypeRegistry::new());
    registry
        .register_func::<Counter>(
            id.clone(),
            Some(Box::new(encode_counter) as EncodeFunc<Counter>),
            None,
        )
        .unwrap();
    let entry = registry.resolve(&id).unwrap();
    assert!(entry.can_encode());
    assert!(!entry.can_decode());

    let context = context_with(registry);
    let bytes = context
        .encode(&ExtensionObject::new(id, Counter(7)))
        .unwrap();
    let err = context.decode::<ExtensionObject>(&bytes).unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::UnsupportedType);
}

#[test]
fn mismatched_body_type() {
    let registry = Arc::new(TypeRegistry::new());
    registry.register::<Reading>(reading_id()).unwrap();
    let context = context_with(registry);
    let object = ExtensionObject::new(reading_id(), Setpoint { value: 1.0 });
    let err = context.encode(&object).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Override);
    assert_eq!(err.root_kind(), ErrorKind::UnsupportedValue);
}

#[test]
fn deregistered_type_becomes_unknown() {
    let registry = Arc::new(TypeRegistry::new());
    registry.register::<Reading>(reading_id()).unwrap();
    let context = context_with(registry.clone());

    let entry = registry.deregister(reading_id()).unwrap();
    assert!(entry.type_name().ends_with("Reading"));
    assert!(registry.deregister(reading_id()).is_none());
    assert!(registry.is_empty());
    assert_eq!(registry.type_id_of::<Reading>(), None);

    let decoded: ExtensionObject = context.decode(&reading_bytes()).unwrap();
    assert!(decoded.is_unknown());
    assert_eq!(decoded.value::<Reading>(), None);
    assert_eq!(decoded.error().unwrap().kind(), ErrorKind::UnknownTypeId);
    // The raw body goes back out unchanged
    assert_eq!(context.encode(&decoded).unwrap(), reading_bytes());

    // A decoded value can no longer be written
    let err = context
        .encode(&ExtensionObject::new(reading_id(), reading()))
        .unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::UnknownTypeId);

    // The id is free to be bound again
    registry.register::<Setpoint>(reading_id()).unwrap();
}

ua_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Envelope {
        first: ExtensionObject,
        second: ExtensionObject,
        sequence: u32,
    }
}

#[test]
fn unknown_body_does_not_stop_the_decode() {
    let sender_types = Arc::new(TypeRegistry::new());
    register_extension_objects(&sender_types);
    sender_types.register::<Reading>(reading_id()).unwrap();
    let sender = context_with(sender_types);

    let envelope = Envelope {
        first: sender.extension_object(reading()).unwrap(),
        second: sender
            .extension_object(AnonymousIdentityToken::default())
            .unwrap(),
        sequence: 42,
    };
    let bytes = sender.encode(&envelope).unwrap();

    // The receiver only knows the built in types
    let receiver = CodecContext::new();
    let decoded: Envelope = receiver.decode(&bytes).unwrap();
    assert!(decoded.first.is_unknown());
    assert_eq!(decoded.first.node_id, reading_id());
    assert_eq!(
        decoded.second.value::<AnonymousIdentityToken>(),
        Some(&AnonymousIdentityToken::default())
    );
    assert_eq!(decoded.sequence, 42);

    assert_eq!(receiver.encode(&decoded).unwrap(), bytes);
    let round_trip: Envelope = sender.decode(&receiver.encode(&decoded).unwrap()).unwrap();
    assert_eq!(round_trip, envelope);
}

#[test]
fn concurrent_registration() {
    const THREADS: usize = 8;
    let registry = Arc::new(TypeRegistry::new());
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let result = registry.register::<Reading>(reading_id());
                // Lookups interleave with the registration
                let _ = registry.resolve(&reading_id());
                result
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|err| err.kind() == ErrorKind::RegistrationConflict));
    assert_eq!(registry.len(), 1);
}

#[test]
fn registries_are_per_context() {
    let context = CodecContext::new();
    let other = CodecContext::new();
    context
        .extension_objects()
        .register::<Reading>(reading_id())
        .unwrap();
    assert!(context.extension_objects().contains(&reading_id()));
    assert!(!other.extension_objects().contains(&reading_id()));

    let err = other.extension_object(reading()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);

    let decoded: ExtensionObject = other.decode(&reading_bytes()).unwrap();
    assert!(decoded.is_unknown());
}
