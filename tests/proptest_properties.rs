use oxivarint::varint::{
    self, CONT_MASK, MAX_VARINT_LEN, TrailingGroup, count_groups, zigzag_decode, zigzag_encode,
};
use proptest::prelude::*;

fn boundary_u64() -> impl Strategy<Value = u64> {
    prop_oneof![
        Just(0u64),
        Just(1),
        Just(127),
        Just(128),
        Just(i64::MAX as u64),
        Just(u64::MAX),
        (0u32..64).prop_map(|s| 1u64 << s),
        (1u32..64).prop_map(|s| (1u64 << s) - 1),
        any::<u64>(),
    ]
}

fn boundary_i64() -> impl Strategy<Value = i64> {
    prop_oneof![
        Just(0i64),
        Just(-1),
        Just(1),
        Just(i64::MIN),
        Just(i64::MAX),
        (0u32..63).prop_map(|s| -(1i64 << s)),
        any::<i64>(),
    ]
}

proptest! {
    #[test]
    fn prop_unsigned_roundtrip(v in boundary_u64()) {
        let bytes = varint::encode_u64_to_vec(v);
        prop_assert_eq!(varint::decode_u64(&bytes), Ok(v));
        prop_assert_eq!(bytes.len(), varint::encoded_len_u64(v));
    }

    #[test]
    fn prop_signed_roundtrip(v in boundary_i64()) {
        let bytes = varint::encode_i64_to_vec(v);
        prop_assert_eq!(varint::decode_i64(&bytes), Ok(v));
    }

    #[test]
    fn prop_zigzag_bijection(v in any::<i64>(), u in any::<u64>()) {
        prop_assert_eq!(zigzag_decode(zigzag_encode(v)), v);
        prop_assert_eq!(zigzag_encode(zigzag_decode(u)), u);
    }

    #[test]
    fn prop_zigzag_keeps_small_magnitudes_small(v in -1_000_000i64..1_000_000) {
        prop_assert!(zigzag_encode(v) <= 2 * v.unsigned_abs());
    }

    #[test]
    fn prop_continuation_bit_invariant(v in boundary_u64()) {
        let bytes = varint::encode_u64_to_vec(v);
        prop_assert!(!bytes.is_empty() && bytes.len() <= MAX_VARINT_LEN);
        let (last, rest) = bytes.split_last().unwrap();
        prop_assert_eq!(last & CONT_MASK, 0);
        prop_assert!(rest.iter().all(|b| b & CONT_MASK != 0));
    }

    #[test]
    fn prop_encoding_is_minimal(v in 1u64..) {
        let bytes = varint::encode_u64_to_vec(v);
        // A minimal group never ends in an all-zero payload byte.
        prop_assert_ne!(*bytes.last().unwrap(), 0);
    }

    #[test]
    fn prop_unsigned_stream_roundtrip(values in proptest::collection::vec(boundary_u64(), 0..512)) {
        let bytes = varint::encode_u64_stream(&values);
        prop_assert_eq!(count_groups(&bytes), values.len());
        prop_assert_eq!(varint::decode_u64_stream(&bytes).unwrap(), values);
    }

    #[test]
    fn prop_signed_stream_roundtrip(values in proptest::collection::vec(boundary_i64(), 0..512)) {
        let bytes = varint::encode_i64_stream(&values);
        prop_assert_eq!(varint::decode_i64_stream(&bytes).unwrap(), values);
    }

    #[test]
    fn prop_stream_is_concatenation(values in proptest::collection::vec(any::<i64>(), 0..64)) {
        let joined: Vec<u8> = values.iter().flat_map(|&v| varint::encode_i64_to_vec(v)).collect();
        prop_assert_eq!(varint::encode_i64_stream(&values), joined);
    }

    #[test]
    fn prop_truncated_tail_dropped_or_rejected(
        values in proptest::collection::vec(any::<u64>(), 1..64),
        cut in 1usize..MAX_VARINT_LEN,
    ) {
        let mut bytes = varint::encode_u64_stream(&values);
        let last_len = varint::encoded_len_u64(*values.last().unwrap());
        prop_assume!(cut < last_len);
        bytes.truncate(bytes.len() - cut);

        prop_assert!(varint::decode_u64_stream(&bytes).is_err());
        let kept = varint::decode_u64_stream_with(&bytes, TrailingGroup::Drop).unwrap();
        prop_assert_eq!(&kept[..], &values[..values.len() - 1]);
    }

    #[test]
    fn prop_decoder_never_panics(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = varint::decode_u64_stream(&data);
        let _ = varint::decode_i64_stream_with(&data, TrailingGroup::Drop);
        let _ = varint::read_u64(&data);
    }
}
