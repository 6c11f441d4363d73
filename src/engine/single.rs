use super::run_block;
use crate::error::{Error, Result};
use crate::frame::{max_compressed_size, OutputPacker};
use crate::lz77::MatchFinder;
use crate::stats::BlockResult;
use crate::{CompressConfig, CompressStats, CompressedStream, Compressor};

/// Single-threaded compressor. Blocks run through the engine pipeline one
/// after another on the calling thread; output is identical to any parallel
/// schedule.
pub struct SingleThreadedCompressor {
    config: CompressConfig,
}

impl SingleThreadedCompressor {
    pub fn new(config: CompressConfig) -> Self {
        Self { config }
    }
}

impl Compressor for SingleThreadedCompressor {
    fn compress(&mut self, input: &[u8]) -> Result<CompressedStream> {
        self.config.validate()?;

        let mut finder = MatchFinder::new();
        let mut packer = OutputPacker::new(
            self.config.checksum,
            max_compressed_size(input.len(), self.config.block_size),
        );

        for (index, chunk) in input.chunks(self.config.block_size).enumerate() {
            if let Some(cancel) = &self.config.cancel {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
            }

            let result = if chunk.len() < self.config.min_block_size {
                BlockResult::stored(index as u32)
            } else {
                run_block(&mut finder, index as u32, chunk)?
            };
            packer.pack_block(&result, chunk)?;
        }

        let packed = packer.finish(input.len() as u64);
        let stats = CompressStats {
            input_bytes: input.len() as u64,
            output_bytes: packed.bytes.len() as u64,
            blocks_written: packed.blocks_written,
            blocks_stored: packed.blocks_stored,
            tokens_packed: packed.tokens_packed,
        };

        Ok(CompressedStream {
            bytes: packed.bytes,
            block_sizes: packed.block_sizes,
            histogram: packed.histogram,
            checksum: packed.checksum,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::ChecksumKind;
    use crate::frame::decompress;

    #[test]
    fn test_compress_empty_input() {
        let mut compressor = SingleThreadedCompressor::new(CompressConfig::default());
        let stream = compressor.compress(&[]).unwrap();

        assert_eq!(stream.stats.blocks_written, 0);
        assert_eq!(stream.bytes.len(), 8);
        assert_eq!(stream.checksum, 0);
        assert_eq!(decompress(&stream.bytes, ChecksumKind::Crc32).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_small_input_is_stored() {
        let mut compressor = SingleThreadedCompressor::new(CompressConfig::default());
        let stream = compressor.compress(b"0123456789").unwrap();

        // 5-byte stored header + 10 raw bytes + 8-byte trailer.
        assert_eq!(stream.bytes.len(), 23);
        assert_eq!(stream.stats.blocks_written, 1);
        assert_eq!(stream.stats.blocks_stored, 1);
        assert_eq!(decompress(&stream.bytes, ChecksumKind::Crc32).unwrap(), b"0123456789");
    }

    #[test]
    fn test_repetitive_input_compresses() {
        let data = vec![b'A'; 100_000];
        let mut compressor = SingleThreadedCompressor::new(CompressConfig::default());
        let stream = compressor.compress(&data).unwrap();

        assert!(stream.bytes.len() < data.len() / 10);
        assert_eq!(stream.stats.blocks_stored, 0);
        assert_eq!(decompress(&stream.bytes, ChecksumKind::Crc32).unwrap(), data);
    }

    #[test]
    fn test_invalid_block_size_rejected() {
        let config = CompressConfig { block_size: 3000, ..Default::default() };
        let mut compressor = SingleThreadedCompressor::new(config);
        let err = compressor.compress(b"data").unwrap_err();
        assert!(matches!(err, Error::InvalidBlockSize(3000)));
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = crate::CancelFlag::new();
        cancel.cancel();
        let config = CompressConfig { cancel: Some(cancel), ..Default::default() };

        let mut compressor = SingleThreadedCompressor::new(config);
        let err = compressor.compress(b"some data").unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
