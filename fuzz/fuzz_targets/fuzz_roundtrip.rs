#![no_main]

use libfuzzer_sys::fuzz_target;
use parlz::{compress, decompress, ChecksumKind, CompressConfig};

fuzz_target!(|data: &[u8]| {
    // Use the first byte to pick a block size so small inputs still cross
    // block boundaries.
    let shift = data.first().copied().unwrap_or(0) % 6;
    let config = CompressConfig {
        block_size: 1024usize << shift,
        num_workers: 1,
        ..Default::default()
    };

    let stream = compress(data, &config).expect("compression must succeed on any input");
    let decoded =
        decompress(&stream.bytes, ChecksumKind::Crc32).expect("own output must decode");
    assert_eq!(decoded, data);
});
