//! Integration tests for pfgraph-common library.

use pfgraph_common::{
    ByteOrder, FieldLayout, FieldSpec, Format, MetricPathBuilder, MetricPoint, Value,
    decode, decode_payload, encode_message, parse_metric_path, split_frame,
};

#[test]
fn test_full_metric_workflow() {
    let builder = MetricPathBuilder::new("fw01");
    let points = vec![
        MetricPoint::new(builder.build("states.current"), 1_700_000_000, 12),
        MetricPoint::new(builder.build("bytes.out"), 1_700_000_000, 4096),
    ];

    let message = encode_message(&points, Format::Pickle).expect("Encode failed");

    // First 4 bytes are the big-endian length of the rest
    let declared = u32::from_be_bytes([message[0], message[1], message[2], message[3]]);
    assert_eq!(declared as usize, message.len() - 4);

    let (payload, rest) = split_frame(&message).expect("Incomplete frame");
    assert!(rest.is_empty());

    let decoded = decode_payload(payload, Format::Pickle).expect("Decode failed");
    assert_eq!(decoded, points);

    for point in &decoded {
        let parsed = parse_metric_path(&point.path, "pf").expect("Bad path");
        assert_eq!(parsed.hostname, "fw01");
    }
}

#[test]
fn test_back_to_back_frames() {
    let first = vec![MetricPoint::new("a.pf.x", 1, 1)];
    let second = vec![MetricPoint::new("b.pf.y", 2, 2)];

    let mut stream = encode_message(&first, Format::Pickle).unwrap();
    stream.extend(encode_message(&second, Format::Pickle).unwrap());

    let (payload, rest) = split_frame(&stream).unwrap();
    assert_eq!(decode_payload(payload, Format::Pickle).unwrap(), first);

    let (payload, rest) = split_frame(rest).unwrap();
    assert_eq!(decode_payload(payload, Format::Pickle).unwrap(), second);
    assert!(rest.is_empty());
}

#[test]
fn test_walk_records_with_remaining_bytes() {
    const RECORD: FieldLayout =
        FieldLayout::new(ByteOrder::Big, &[FieldSpec::u32(1), FieldSpec::bytes(2)]);

    let mut stream = Vec::new();
    for (id, tag) in [(1u32, *b"ab"), (2, *b"cd"), (3, *b"ef")] {
        stream.extend(
            RECORD
                .encode(&[Value::U32(id), Value::Bytes(tag.to_vec())])
                .unwrap(),
        );
    }

    let mut rest: &[u8] = &stream;
    let mut ids = Vec::new();
    while !rest.is_empty() {
        let decoded = decode(&RECORD, rest).unwrap();
        ids.push(decoded.values[0].as_u64().unwrap());
        rest = decoded.remaining;
    }

    assert_eq!(ids, vec![1, 2, 3]);
}
