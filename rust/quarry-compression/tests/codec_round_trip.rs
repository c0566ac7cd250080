use quarry_compression::{BitReader, BitWriter, CodecKind, DEFAULT_CHUNK_SIZE};

fn random_gaps(rng: &mut fastrand::Rng, len: usize, max: u32) -> Vec<u32> {
    (0..len).map(|_| rng.u32(1..=max)).collect()
}

/// Every codec must reproduce arbitrary positive sequences, including the boundary
/// value 1 and values above 2^20.
#[test]
fn test_all_codecs_round_trip() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    for kind in CodecKind::ALL {
        let codec = kind.codec();
        let max = if kind == CodecKind::Unary { 300 } else { u32::MAX };
        for len in [0usize, 1, 2, 127, 128, 129, DEFAULT_CHUNK_SIZE, 3000] {
            let mut values = random_gaps(&mut rng, len, max);
            if len > 2 {
                values[0] = 1;
                values[len - 1] = if kind == CodecKind::Unary { 300 } else { (1 << 20) + 7 };
            }

            let mut writer = BitWriter::new();
            codec.encode(&values, &mut writer).expect("encode");
            let bytes = writer.into_bytes();

            let mut decoded = vec![0u32; len];
            let mut reader = BitReader::new(&bytes);
            codec.decode(&mut reader, &mut decoded, len).expect("decode");
            assert_eq!(decoded, values, "codec {kind}, len {len}");
        }
    }
}

#[test]
fn test_large_values_in_unary() {
    let values = [1u32, (1 << 20) + 1, 2];
    let codec = CodecKind::Unary.codec();
    let mut writer = BitWriter::new();
    codec.encode(&values, &mut writer).unwrap();
    let bytes = writer.into_bytes();
    let mut decoded = [0u32; 3];
    codec
        .decode(&mut BitReader::new(&bytes), &mut decoded, 3)
        .unwrap();
    assert_eq!(decoded, values);
}

/// Blocks of different codecs can share one stream, the way a posting chunk interleaves
/// id, frequency and position blocks.
#[test]
fn test_interleaved_blocks() {
    let mut rng = fastrand::Rng::with_seed(42);
    let plan = [
        CodecKind::Gamma,
        CodecKind::Unary,
        CodecKind::PFor,
        CodecKind::VariableByte,
        CodecKind::Gamma,
        CodecKind::PFor,
    ];
    let blocks = plan
        .iter()
        .map(|kind| {
            let max = if *kind == CodecKind::Unary { 8 } else { 1 << 24 };
            let len = rng.usize(0..200);
            random_gaps(&mut rng, len, max)
        })
        .collect::<Vec<_>>();

    let mut writer = BitWriter::new();
    for (kind, values) in plan.iter().zip(&blocks) {
        kind.codec().encode(values, &mut writer).unwrap();
    }
    let bytes = writer.into_bytes();

    let mut reader = BitReader::new(&bytes);
    for (i, (kind, values)) in plan.iter().zip(&blocks).enumerate() {
        if i == 2 {
            kind.codec().skip(&mut reader).unwrap();
            continue;
        }
        let mut decoded = Vec::new();
        kind.codec().decode_block(&mut reader, &mut decoded).unwrap();
        assert_eq!(&decoded, values, "block {i} ({kind})");
    }
}

#[test]
fn test_truncated_stream_is_reported() {
    for kind in CodecKind::ALL {
        let mut writer = BitWriter::new();
        kind.codec()
            .encode(&[9, 1000, 3, 77, 12], &mut writer)
            .unwrap();
        let bytes = writer.into_bytes();
        let truncated = &bytes[..bytes.len() - 1];
        let mut decoded = [0u32; 5];
        let err = kind
            .codec()
            .decode(&mut BitReader::new(truncated), &mut decoded, 5)
            .unwrap_err();
        assert!(err.is_format_inconsistency(), "codec {kind}: {err}");
    }
}
