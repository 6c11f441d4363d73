//! Rolling checksum accumulators for the stream trailer.
//!
//! The checksum is folded over the uncompressed bytes strictly in block-index
//! order; checksum combination is only valid in sequence, so the packer owns
//! the accumulator and never updates it out of order.

/// Largest number of bytes that can be summed before the Adler-32
/// accumulators must be reduced modulo 65521.
const ADLER_CHUNK: usize = 5552;

const ADLER_MOD: u32 = 65521;

/// Which rolling checksum the stream trailer carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChecksumKind {
    /// CRC32, for gzip-style containers
    #[default]
    Crc32,
    /// Adler32, for zlib-style containers
    Adler32,
}

/// Incremental checksum state for one compression job.
#[derive(Clone)]
pub enum Checksum {
    Crc32(crc32fast::Hasher),
    Adler32 { a: u32, b: u32 },
}

impl Checksum {
    pub fn new(kind: ChecksumKind) -> Self {
        match kind {
            ChecksumKind::Crc32 => Checksum::Crc32(crc32fast::Hasher::new()),
            ChecksumKind::Adler32 => Checksum::Adler32 { a: 1, b: 0 },
        }
    }

    /// Fold the next run of uncompressed bytes into the checksum.
    pub fn update(&mut self, bytes: &[u8]) {
        match self {
            Checksum::Crc32(hasher) => hasher.update(bytes),
            Checksum::Adler32 { a, b } => {
                for chunk in bytes.chunks(ADLER_CHUNK) {
                    for &byte in chunk {
                        *a += byte as u32;
                        *b += *a;
                    }
                    *a %= ADLER_MOD;
                    *b %= ADLER_MOD;
                }
            }
        }
    }

    /// Current checksum value. Does not consume the accumulator.
    pub fn value(&self) -> u32 {
        match self {
            Checksum::Crc32(hasher) => hasher.clone().finalize(),
            Checksum::Adler32 { a, b } => (b << 16) | a,
        }
    }
}
