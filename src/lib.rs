pub mod checksum;
pub mod engine;
pub mod error;
pub mod frame;
pub mod lz77;
pub mod stats;

pub use checksum::ChecksumKind;
pub use engine::{ParallelCompressor, SingleThreadedCompressor};
pub use error::{Error, Result};
pub use frame::{decompress, max_compressed_size};
pub use lz77::Token;
pub use stats::{BlockResult, SymbolHistogram};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use frame::constants::{DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE, SMALL_BLOCK_THRESHOLD};

/// Cooperative cancellation handle, checked at block dispatch boundaries.
/// Cancelling discards partially-processed blocks; nothing is emitted for a
/// cancelled job.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Configuration for one compression job.
#[derive(Clone, Debug)]
pub struct CompressConfig {
    /// Uncompressed block size (power of two, 1 KiB to 32 KiB)
    pub block_size: usize,
    /// Blocks smaller than this are stored without running the pipeline
    pub min_block_size: usize,
    /// Number of engine workers (0 = auto, 1 = single-threaded)
    pub num_workers: usize,
    /// Which rolling checksum the trailer carries
    pub checksum: ChecksumKind,
    /// Optional cooperative cancellation handle
    pub cancel: Option<CancelFlag>,
}

impl CompressConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.block_size.is_power_of_two()
            || !(MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&self.block_size)
        {
            return Err(Error::InvalidBlockSize(self.block_size));
        }
        Ok(())
    }
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            min_block_size: SMALL_BLOCK_THRESHOLD,
            num_workers: 0,
            checksum: ChecksumKind::Crc32,
            cancel: None,
        }
    }
}

/// Statistics from a compression job.
#[derive(Clone, Debug, Default)]
pub struct CompressStats {
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub blocks_written: u64,
    pub blocks_stored: u64,
    /// Wire records packed into compressed blocks
    pub tokens_packed: u64,
}

/// Finished output of one compression job: the packed byte stream plus the
/// per-block metadata a downstream entropy-coding stage consumes.
#[derive(Clone, Debug)]
pub struct CompressedStream {
    /// Packed blocks followed by the checksum trailer
    pub bytes: Vec<u8>,
    /// Per-block packed sizes in index order (stored blocks report raw size)
    pub block_sizes: Vec<u32>,
    /// Symbol frequencies summed over the blocks emitted as compressed
    pub histogram: SymbolHistogram,
    /// Rolling checksum over the uncompressed input
    pub checksum: u32,
    pub stats: CompressStats,
}

/// Trait for the complete block-compression operation.
pub trait Compressor {
    /// Compress `input` into a packed block stream.
    fn compress(&mut self, input: &[u8]) -> Result<CompressedStream>;
}

/// Compress with the given config, choosing the parallel engine unless the
/// config pins a single worker.
pub fn compress(input: &[u8], config: &CompressConfig) -> Result<CompressedStream> {
    ParallelCompressor::new(config.clone()).compress(input)
}
