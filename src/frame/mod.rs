pub mod constants;
pub mod decoder;
pub mod packer;

pub use constants::*;
pub use decoder::decompress;
pub use packer::OutputPacker;

/// Worst-case packed size for `input_len` bytes at a given block size: every
/// block falls back to stored framing, plus the trailer. Callers provisioning
/// a fixed output buffer must allow for this much.
pub fn max_compressed_size(input_len: usize, block_size: usize) -> usize {
    let blocks = if input_len == 0 { 0 } else { (input_len - 1) / block_size + 1 };
    input_len + blocks * STORED_HEADER_SIZE + TRAILER_SIZE
}
