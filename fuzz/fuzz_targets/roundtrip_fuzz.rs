#![no_main]
use libfuzzer_sys::fuzz_target;
use oxivarint::io::{parse_be_i64s, parse_be_u64s};
use oxivarint::varint;

fuzz_target!(|data: &[u8]| {
    let usable = data.len() - data.len() % 8;
    if usable == 0 {
        return;
    }
    let raw = &data[..usable];

    let uints = parse_be_u64s(raw).unwrap();
    let stream = varint::encode_u64_stream(&uints);
    assert_eq!(varint::decode_u64_stream(&stream).unwrap(), uints);

    let ints = parse_be_i64s(raw).unwrap();
    let stream = varint::encode_i64_stream(&ints);
    assert_eq!(varint::decode_i64_stream(&stream).unwrap(), ints);
});
