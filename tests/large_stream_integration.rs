use oxivarint::io::{to_be_bytes_i64s, to_be_bytes_u64s};
use oxivarint::varint::{self, ValueKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const N: u64 = 1 << 20;

#[test]
fn signed_stream_of_boundary_sweeps() {
    let mut ints = Vec::with_capacity(4 * N as usize);
    for i in 0..N as i64 {
        ints.push(i);
        ints.push(-i);
        ints.push(i64::MAX - i);
        ints.push(i64::MIN + i);
    }
    let stream = varint::encode_i64_stream(&ints);
    let decoded = varint::decode_i64_stream(&stream).unwrap();
    assert_eq!(decoded.len(), ints.len());
    assert!(decoded == ints, "signed stream did not roundtrip");
}

#[test]
fn unsigned_stream_of_boundary_sweeps() {
    let mut uints = Vec::with_capacity(2 * N as usize);
    for i in 0..N {
        uints.push(i);
        uints.push(u64::MAX - i);
    }
    let stream = varint::encode_u64_stream(&uints);
    let decoded = varint::decode_u64_stream(&stream).unwrap();
    assert_eq!(decoded.len(), uints.len());
    assert!(decoded == uints, "unsigned stream did not roundtrip");
}

#[test]
fn sampled_single_values() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..N {
        // Vary the magnitude so every group length is exercised.
        let shift = rng.random_range(0..64u32);
        let u = rng.random::<u64>() >> shift;
        assert_eq!(varint::decode_u64(&varint::encode_u64_to_vec(u)), Ok(u));

        let v = u as i64;
        assert_eq!(varint::decode_i64(&varint::encode_i64_to_vec(v)), Ok(v));
    }
}

#[test]
fn big_endian_file_roundtrip_at_scale() {
    let uints: Vec<u64> = (0..N).map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15)).collect();
    let rt = oxivarint::io::roundtrip_buffer(ValueKind::Unsigned, &to_be_bytes_u64s(&uints))
        .unwrap();
    assert_eq!(rt.decoded.len(), uints.len());

    let ints: Vec<i64> = uints.iter().map(|&u| u as i64).collect();
    let rt = oxivarint::io::roundtrip_buffer(ValueKind::Signed, &to_be_bytes_i64s(&ints))
        .unwrap();
    assert_eq!(rt.decoded.len(), ints.len());
}

#[test]
#[ignore = "performance properties are workload and machine dependent"]
fn perf_property_decode_not_pathological() {
    use std::time::Instant;
    let values: Vec<u64> = (0..16 * N).collect();
    let stream = varint::encode_u64_stream(&values);
    let t0 = Instant::now();
    let decoded = varint::decode_u64_stream(&stream).unwrap();
    let dt = t0.elapsed();
    assert_eq!(decoded.len(), values.len());
    assert!(dt.as_secs_f64() < 20.0, "decode took {:?}", dt);
}
