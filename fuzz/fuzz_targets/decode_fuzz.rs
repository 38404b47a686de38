#![no_main]
use libfuzzer_sys::fuzz_target;
use oxivarint::varint::{self, TrailingGroup};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must only ever produce errors, never panics.
    let _ = varint::decode_u64_stream(data);
    let _ = varint::decode_i64_stream_with(data, TrailingGroup::Drop);
    let _ = varint::read_u64(data);

    // Every group the segmenter accepts and decodes must re-encode to a
    // group of at most the same length.
    for group in varint::Groups::new(data).flatten() {
        if let Ok(v) = varint::decode_u64(group.bytes) {
            assert!(varint::encoded_len_u64(v) <= group.bytes.len());
        }
    }
});
