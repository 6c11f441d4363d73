pub mod parallel;
pub mod single;

pub use parallel::ParallelCompressor;
pub use single::SingleThreadedCompressor;

use crate::error::Result;
use crate::lz77::{boost, MatchFinder};
use crate::stats::{divide, BlockResult};

/// One engine instance: match find, boost, stats division for a single
/// block. No shared mutable state with any other block; this is what makes
/// the blocks embarrassingly parallel.
pub(crate) fn run_block(finder: &mut MatchFinder, index: u32, data: &[u8]) -> Result<BlockResult> {
    let tokens = finder.find_matches(data);
    let boosted = boost(data, &tokens);
    divide(index, &boosted)
}
