#![no_main]

use libfuzzer_sys::fuzz_target;
use parlz::{decompress, ChecksumKind};

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary bytes may fail - that's OK
    // We're looking for panics/crashes, not errors
    let _ = decompress(data, ChecksumKind::Crc32);
    let _ = decompress(data, ChecksumKind::Adler32);
});
