use std::str::FromStr;

use crate::types::{tests::*, *};

#[test]
fn parse_invalid_node_id() {
    // These are all malformed node ids that should fail parsing
    [
        "",
        "ns=2",
        "i= 0",
        "ns=2;i=0 ",
        " ns=2;i=0 ",
        "ns=99 ;i=35",
        "ns=99;i=x",
        "ns=99;s=",
        "ns=;s=valid str",
        "ns=;g=efa38e40-f232-497a-a534-f205e800d73", // Missing char
        "ns=65537;s=valid str",
    ]
    .iter()
    .for_each(|s| {
        assert!(NodeId::from_str(s).is_err());
    });
}

#[test]
fn parse_node_id_integer() {
    // Integer
    let node_id = NodeId::from_str("i=13").unwrap();
    assert_eq!(node_id.namespace, 0);
    assert_eq!(node_id.identifier, Identifier::Numeric(13));
    assert_eq!(format!("{}", node_id), "i=13");

    let node_id = NodeId::from_str("ns=99;i=35").unwrap();
    assert_eq!(node_id.namespace, 99);
    assert_eq!(node_id.identifier, Identifier::Numeric(35));
    assert_eq!(format!("{}", node_id), "ns=99;i=35");
}

#[test]
fn parse_node_id_string() {
    // String
    let node_id = NodeId::from_str("ns=1;s=Hello World").unwrap();
    assert_eq!(node_id.namespace, 1);
    assert_eq!(
        node_id.identifier,
        Identifier::String(UAString::from("Hello World"))
    );
    assert_eq!(format!("{}", node_id), "ns=1;s=Hello World");

    let node_id = NodeId::from_str("s=No NS this time").unwrap();
    assert_eq!(node_id.namespace, 0);
    assert_eq!(
        node_id.identifier,
        Identifier::String(UAString::from("No NS this time"))
    );
    assert_eq!(format!("{}", node_id), "s=No NS this time");
}

#[test]
fn parse_node_id_guid() {
    // Guid (note the mixed case)
    let node_id = NodeId::from_str("g=72962B91-FA75-4ae6-8D28-B404DC7DAF63").unwrap();
    assert_eq!(node_id.namespace, 0);
    assert_eq!(
        node_id.identifier,
        Identifier::Guid(Guid::from_str("72962B91-FA75-4ae6-8D28-B404DC7DAF63").unwrap())
    );
    // All lower case when returned
    assert_eq!(
        format!("{}", node_id),
        "g=72962b91-fa75-4ae6-8d28-b404dc7daf63"
    );
}

#[test]
fn parse_node_id_byte_string() {
    // ByteString (sample bytes come from OPC UA Part 6)
    let node_id = NodeId::from_str("ns=1;b=M/RbKBsRVkePCePcx24oRA==").unwrap();
    assert_eq!(node_id.namespace, 1);
    assert_eq!(
        node_id.identifier,
        Identifier::ByteString(ByteString::from_base64("M/RbKBsRVkePCePcx24oRA==").unwrap())
    );
    // Turn byte string back to string, compare to original
    assert_eq!(format!("{}", node_id), "ns=1;b=M/RbKBsRVkePCePcx24oRA==");
}

#[test]
fn expanded_node_id_display() {
    // The uri is escaped when displayed and the server index is shown alongside it
    let node_id = ExpandedNodeId {
        node_id: NodeId::from_str("ns=1;s=Hello World").unwrap(),
        namespace_uri: UAString::from("http://foo;blah%"),
        server_index: 33,
    };
    assert_eq!(
        format!("{}", node_id),
        "svr=33;nsu=http://foo%3bblah%25;s=Hello World"
    );
    serialize_test(node_id);

    let node_id = ExpandedNodeId {
        node_id: NodeId::from_str("ns=1;s=Hello World").unwrap(),
        namespace_uri: UAString::null(),
        server_index: 33,
    };
    assert_eq!(format!("{}", node_id), "svr=33;ns=1;s=Hello World");
    assert!(!node_id.is_local());

    let node_id = ExpandedNodeId::new(NodeId::new(2, 7u32));
    assert_eq!(format!("{}", node_id), "ns=2;i=7");
    assert!(node_id.is_local());
}

#[test]
fn node_id_object_id() {
    let node_id = NodeId::from(ObjectId::ReadRequest_Encoding_DefaultBinary);
    assert_eq!(node_id, NodeId::new(0, 631u32));
    assert_eq!(
        node_id.as_object_id(),
        Some(ObjectId::ReadRequest_Encoding_DefaultBinary)
    );
    assert!(NodeId::new(1, 631u32).as_object_id().is_none());
    assert!(NodeId::null().is_null());
}
