//! Packs per-block results into the final byte stream.
//!
//! Blocks arrive strictly in index order; the packer compares each block's
//! encoded size against its raw size, emits either the COMPRESSED or the
//! self-checking STORED framing, and folds the raw bytes into the rolling
//! checksum. Checksum combination is only valid in sequence, so packing is
//! the single-writer stage of the job.

use super::constants::*;
use crate::checksum::{Checksum, ChecksumKind};
use crate::error::{Error, Result};
use crate::stats::{BlockResult, SymbolHistogram, TOKEN_RECORD_SIZE};

/// Finished output of the packing stage.
pub struct PackedStream {
    /// Packed blocks plus trailer.
    pub bytes: Vec<u8>,
    /// Per-block packed payload sizes in index order; stored blocks report
    /// their raw size.
    pub block_sizes: Vec<u32>,
    /// Symbol frequencies summed over the blocks emitted as compressed.
    pub histogram: SymbolHistogram,
    /// Final checksum over the uncompressed input.
    pub checksum: u32,
    pub blocks_written: u64,
    pub blocks_stored: u64,
    pub tokens_packed: u64,
}

pub struct OutputPacker {
    out: Vec<u8>,
    checksum: Checksum,
    block_sizes: Vec<u32>,
    histogram: SymbolHistogram,
    next_index: u32,
    blocks_stored: u64,
    tokens_packed: u64,
}

impl OutputPacker {
    pub fn new(kind: ChecksumKind, capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
            checksum: Checksum::new(kind),
            block_sizes: Vec::new(),
            histogram: SymbolHistogram::new(),
            next_index: 0,
            blocks_stored: 0,
            tokens_packed: 0,
        }
    }

    /// Pack the next block. `raw` is the block's slice of the original
    /// input; `result` must carry the next unpacked index.
    pub fn pack_block(&mut self, result: &BlockResult, raw: &[u8]) -> Result<()> {
        if result.index != self.next_index {
            return Err(Error::Internal(format!(
                "block {} packed out of order (expected {})",
                result.index, self.next_index
            )));
        }
        if result.encoded_size as usize != result.payload.len() {
            return Err(Error::EncodedSizeOverflow {
                index: result.index,
                encoded: result.encoded_size,
                limit: result.payload.len() as u32,
            });
        }
        // An all-literal block encodes to TOKEN_RECORD_SIZE bytes per input
        // byte; anything larger is an engine bug.
        let limit = (raw.len() * TOKEN_RECORD_SIZE) as u32;
        if result.encoded_size > limit {
            return Err(Error::EncodedSizeOverflow {
                index: result.index,
                encoded: result.encoded_size,
                limit,
            });
        }

        let compressed_wins =
            !result.stored && !raw.is_empty() && (result.encoded_size as usize) < raw.len();

        if compressed_wins {
            self.out.push(FLAG_COMPRESSED);
            self.out.extend_from_slice(&result.encoded_size.to_le_bytes());
            self.out.extend_from_slice(&result.payload);
            self.block_sizes.push(result.encoded_size);
            self.tokens_packed += result.token_count() as u64;
            // Only tokens that reach the stream feed the frequency tables;
            // a block that falls back to stored contributes nothing.
            self.histogram.merge(&result.histogram);
        } else {
            self.write_stored(raw)?;
            self.block_sizes.push(raw.len() as u32);
            self.blocks_stored += 1;
        }

        self.checksum.update(raw);
        self.next_index += 1;
        Ok(())
    }

    /// STORED framing: flag, LEN, ones'-complement of LEN, raw bytes. The
    /// redundant NLEN lets a decoder validate the header locally.
    fn write_stored(&mut self, raw: &[u8]) -> Result<()> {
        let len = u16::try_from(raw.len()).map_err(|_| Error::InsufficientCapacity {
            required: raw.len(),
            available: u16::MAX as usize,
        })?;
        self.out.push(FLAG_STORED);
        self.out.extend_from_slice(&len.to_le_bytes());
        self.out.extend_from_slice(&(!len).to_le_bytes());
        self.out.extend_from_slice(raw);
        Ok(())
    }

    /// Append the trailer and return the finished stream.
    pub fn finish(mut self, input_len: u64) -> PackedStream {
        let checksum = self.checksum.value();
        self.out.extend_from_slice(&checksum.to_le_bytes());
        self.out.extend_from_slice(&(input_len as u32).to_le_bytes());

        PackedStream {
            bytes: self.out,
            blocks_written: self.block_sizes.len() as u64,
            block_sizes: self.block_sizes,
            histogram: self.histogram,
            checksum,
            blocks_stored: self.blocks_stored,
            tokens_packed: self.tokens_packed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lz77::Token;
    use crate::stats::divide;

    #[test]
    fn test_empty_job_is_trailer_only() {
        let packer = OutputPacker::new(ChecksumKind::Crc32, 64);
        let packed = packer.finish(0);

        assert_eq!(packed.bytes.len(), TRAILER_SIZE);
        assert_eq!(packed.bytes, vec![0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(packed.blocks_written, 0);
    }

    #[test]
    fn test_stored_block_layout() {
        let mut packer = OutputPacker::new(ChecksumKind::Crc32, 64);
        let raw = b"0123456789";
        packer.pack_block(&BlockResult::stored(0), raw).unwrap();
        let packed = packer.finish(raw.len() as u64);

        assert_eq!(packed.bytes[0], FLAG_STORED);
        assert_eq!(u16::from_le_bytes([packed.bytes[1], packed.bytes[2]]), 10);
        assert_eq!(u16::from_le_bytes([packed.bytes[3], packed.bytes[4]]), !10u16);
        assert_eq!(&packed.bytes[5..15], raw);
        assert_eq!(packed.bytes.len(), STORED_HEADER_SIZE + raw.len() + TRAILER_SIZE);
        assert_eq!(packed.block_sizes, vec![10]);
        assert_eq!(packed.blocks_stored, 1);
    }

    #[test]
    fn test_compressed_block_chosen_when_smaller() {
        // 40 raw bytes, 2 tokens -> 8 encoded bytes.
        let raw: Vec<u8> = std::iter::repeat(b'A').take(40).collect();
        let tokens = [Token::Literal(b'A'), Token::Match { length: 39, distance: 1 }];
        let result = divide(0, &tokens).unwrap();

        let mut packer = OutputPacker::new(ChecksumKind::Crc32, 64);
        packer.pack_block(&result, &raw).unwrap();
        let packed = packer.finish(raw.len() as u64);

        assert_eq!(packed.bytes[0], FLAG_COMPRESSED);
        assert_eq!(u32::from_le_bytes(packed.bytes[1..5].try_into().unwrap()), 8);
        assert_eq!(packed.block_sizes, vec![8]);
        assert_eq!(packed.blocks_stored, 0);
        assert_eq!(packed.tokens_packed, 2);
    }

    #[test]
    fn test_stored_fallback_when_encoding_expands() {
        // 3 incompressible bytes -> 12 encoded bytes; stored must win.
        let raw = b"xyz";
        let tokens = [Token::Literal(b'x'), Token::Literal(b'y'), Token::Literal(b'z')];
        let result = divide(0, &tokens).unwrap();

        let mut packer = OutputPacker::new(ChecksumKind::Crc32, 64);
        packer.pack_block(&result, raw).unwrap();
        let packed = packer.finish(raw.len() as u64);

        assert_eq!(packed.bytes[0], FLAG_STORED);
        assert_eq!(packed.blocks_stored, 1);
    }

    #[test]
    fn test_out_of_order_pack_is_fatal() {
        let mut packer = OutputPacker::new(ChecksumKind::Crc32, 64);
        let err = packer.pack_block(&BlockResult::stored(3), b"abc").unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn test_corrupt_encoded_size_is_fatal() {
        let mut result = divide(0, &[Token::Literal(b'a')]).unwrap();
        result.encoded_size = 9999;

        let mut packer = OutputPacker::new(ChecksumKind::Crc32, 64);
        let err = packer.pack_block(&result, b"a").unwrap_err();
        assert!(matches!(err, Error::EncodedSizeOverflow { .. }));
    }

    #[test]
    fn test_trailer_carries_checksum_and_size() {
        let raw = b"trailer bytes";
        let mut packer = OutputPacker::new(ChecksumKind::Crc32, 64);
        packer.pack_block(&BlockResult::stored(0), raw).unwrap();
        let packed = packer.finish(raw.len() as u64);

        let n = packed.bytes.len();
        let checksum = u32::from_le_bytes(packed.bytes[n - 8..n - 4].try_into().unwrap());
        let isize = u32::from_le_bytes(packed.bytes[n - 4..].try_into().unwrap());
        assert_eq!(checksum, crc32fast::hash(raw));
        assert_eq!(checksum, packed.checksum);
        assert_eq!(isize, raw.len() as u32);
    }
}
