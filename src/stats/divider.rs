//! Converts a block's token stream into its wire form and per-block symbol
//! statistics.
//!
//! Each token becomes one fixed 4-byte record:
//! `[literal, length, dist_lo, dist_hi]`, where `length == 0` marks a literal
//! record. The encoded byte count is therefore 4x the token count, which is
//! what the packer compares against the raw block size.

use super::tables::{distance_class, length_class};
use super::{DIST_CODES, LIT_LEN_CODES};
use crate::error::{Error, Result};
use crate::lz77::{Token, MAX_MATCH_LEN, MAX_OFFSET_LIMIT, MIN_MATCH};

/// Bytes per wire-form token record.
pub const TOKEN_RECORD_SIZE: usize = 4;

/// Per-block frequency counts of code classes, input to a downstream
/// entropy coder. Mutated only while its owning block is divided; read-only
/// afterward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolHistogram {
    pub lit_len: [u32; LIT_LEN_CODES],
    pub dist: [u32; DIST_CODES],
}

impl SymbolHistogram {
    pub fn new() -> Self {
        Self { lit_len: [0; LIT_LEN_CODES], dist: [0; DIST_CODES] }
    }

    /// Add another block's counts into this one.
    pub fn merge(&mut self, other: &SymbolHistogram) {
        for (acc, n) in self.lit_len.iter_mut().zip(other.lit_len.iter()) {
            *acc += n;
        }
        for (acc, n) in self.dist.iter_mut().zip(other.dist.iter()) {
            *acc += n;
        }
    }

    /// Total count over both sides. For a single block this equals the
    /// number of tokens plus the number of match tokens.
    pub fn total(&self) -> u64 {
        let lit_len: u64 = self.lit_len.iter().map(|&n| n as u64).sum();
        let dist: u64 = self.dist.iter().map(|&n| n as u64).sum();
        lit_len + dist
    }
}

impl Default for SymbolHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// One block's processed output, keyed by `index` so completion order does
/// not have to match input order.
#[derive(Clone, Debug)]
pub struct BlockResult {
    pub index: u32,
    /// Wire-form token records; empty for short-circuited stored blocks.
    pub payload: Vec<u8>,
    /// Payload length in bytes.
    pub encoded_size: u32,
    pub histogram: SymbolHistogram,
    /// Forced stored representation, bypassing the size comparison.
    pub stored: bool,
}

impl BlockResult {
    /// Result for a block that skipped the pipeline (small-block policy).
    pub fn stored(index: u32) -> Self {
        Self {
            index,
            payload: Vec::new(),
            encoded_size: 0,
            histogram: SymbolHistogram::new(),
            stored: true,
        }
    }

    /// Number of wire records in the payload.
    pub fn token_count(&self) -> usize {
        self.payload.len() / TOKEN_RECORD_SIZE
    }
}

/// Serialize a block's tokens into wire records while accumulating
/// code-class counts and the encoded byte size.
///
/// An empty token stream yields an all-zero histogram and a zero
/// `encoded_size`; that is still a valid result. Out-of-bounds lengths or
/// distances are invariant violations and abort the job.
pub fn divide(index: u32, tokens: &[Token]) -> Result<BlockResult> {
    let mut histogram = SymbolHistogram::new();
    let mut payload = Vec::with_capacity(tokens.len() * TOKEN_RECORD_SIZE);
    // Bytes of the block logically produced so far; a match may not reach
    // back past the block start.
    let mut produced = 0usize;

    for &token in tokens {
        match token {
            Token::Literal(byte) => {
                histogram.lit_len[byte as usize] += 1;
                payload.extend_from_slice(&[byte, 0, 0, 0]);
                produced += 1;
            }
            Token::Match { length, distance } => {
                if !(MIN_MATCH..=MAX_MATCH_LEN).contains(&(length as usize)) {
                    return Err(Error::InvalidMatchLength(length));
                }
                if distance == 0
                    || distance as usize > MAX_OFFSET_LIMIT
                    || distance as usize > produced
                {
                    return Err(Error::InvalidBackReference { distance, available: produced });
                }

                let (len_code, _, _) = length_class(length)
                    .ok_or(Error::InvalidMatchLength(length))?;
                let (dist_code, _, _) = distance_class(distance)
                    .ok_or(Error::InvalidBackReference { distance, available: produced })?;

                histogram.lit_len[len_code as usize] += 1;
                histogram.dist[dist_code as usize] += 1;

                let [dist_lo, dist_hi] = distance.to_le_bytes();
                payload.extend_from_slice(&[0, length as u8, dist_lo, dist_hi]);
                produced += length as usize;
            }
        }
    }

    let encoded_size = payload.len() as u32;
    Ok(BlockResult { index, payload, encoded_size, histogram, stored: false })
}
