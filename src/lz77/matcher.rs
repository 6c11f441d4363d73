//! Sliding-window match search over a single block.
//!
//! The window never crosses the block start: blocks are compressed fully
//! independently so they can run on any engine instance in any order.

use super::{Token, MAX_MATCH_LEN, MAX_OFFSET_LIMIT, MIN_MATCH};

const HASH_BITS: u32 = 13;
const HASH_SIZE: usize = 1 << HASH_BITS;

/// Bytes hashed per candidate index entry.
const HASH_BYTES: usize = 4;

/// Longest candidate chain walked per position before giving up.
const MAX_CHAIN: usize = 32;

/// Sentinel for "no candidate".
const NIL: u32 = u32::MAX;

/// Greedy LZ77 match finder over one block.
///
/// Candidate match starts are indexed by a hash of the next four bytes; each
/// hash bucket heads a chain ordered most-recent first, so ties on match
/// length resolve to the smallest distance, which keeps the search
/// deterministic and the encoded distances small.
pub struct MatchFinder {
    head: Vec<u32>,
    prev: Vec<u32>,
}

impl MatchFinder {
    pub fn new() -> Self {
        Self { head: vec![NIL; HASH_SIZE], prev: Vec::new() }
    }

    /// Tokenize one block. Replaying the returned tokens reconstructs
    /// `data` exactly. An empty block yields an empty token stream.
    pub fn find_matches(&mut self, data: &[u8]) -> Vec<Token> {
        self.head.fill(NIL);
        self.prev.clear();
        self.prev.resize(data.len(), NIL);

        let mut tokens = Vec::with_capacity(data.len() / 4 + 1);
        let mut pos = 0;

        while pos < data.len() {
            let (length, distance) = self.longest_match(data, pos);

            if length >= MIN_MATCH {
                tokens.push(Token::Match { length: length as u16, distance: distance as u16 });
                for covered in pos..pos + length {
                    self.insert(data, covered);
                }
                pos += length;
            } else {
                tokens.push(Token::Literal(data[pos]));
                self.insert(data, pos);
                pos += 1;
            }
        }

        tokens
    }

    /// Best (length, distance) starting at `pos`, or (0, 0) when no match of
    /// at least `MIN_MATCH` bytes exists in the window.
    fn longest_match(&self, data: &[u8], pos: usize) -> (usize, usize) {
        if pos + HASH_BYTES > data.len() {
            // Too close to the block end to index; the tail is emitted as
            // literals.
            return (0, 0);
        }

        let max_len = MAX_MATCH_LEN.min(data.len() - pos);
        let mut best_len = MIN_MATCH - 1;
        let mut best_dist = 0;

        let mut candidate = self.head[hash4(data, pos)];
        let mut walked = 0;

        while candidate != NIL && walked < MAX_CHAIN {
            let cand = candidate as usize;
            let distance = pos - cand;
            if distance > MAX_OFFSET_LIMIT {
                break;
            }

            let length = common_prefix(data, cand, pos, max_len);
            if length > best_len {
                best_len = length;
                best_dist = distance;
                if length == max_len {
                    break;
                }
            }

            candidate = self.prev[cand];
            walked += 1;
        }

        if best_len >= MIN_MATCH {
            (best_len, best_dist)
        } else {
            (0, 0)
        }
    }

    fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + HASH_BYTES > data.len() {
            return;
        }
        let bucket = hash4(data, pos);
        self.prev[pos] = self.head[bucket];
        self.head[bucket] = pos as u32;
    }
}

impl Default for MatchFinder {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn hash4(data: &[u8], pos: usize) -> usize {
    let v = u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
    (v.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
}

/// Length of the common prefix of `data[cand..]` and `data[pos..]`, capped at
/// `max_len`. `cand < pos`, so overlapping runs compare correctly.
#[inline]
fn common_prefix(data: &[u8], cand: usize, pos: usize, max_len: usize) -> usize {
    let mut len = 0;
    while len < max_len && data[cand + len] == data[pos + len] {
        len += 1;
    }
    len
}
