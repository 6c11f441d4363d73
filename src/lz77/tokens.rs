use super::{MAX_MATCH_LEN, MAX_OFFSET_LIMIT, MIN_MATCH};

/// A single record in the LZ77 stream for one block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// A literal byte
    Literal(u8),
    /// A back-reference: copy `length` bytes from `distance` bytes back
    Match { length: u16, distance: u16 },
}

impl Token {
    /// Number of uncompressed bytes this token stands for.
    pub fn uncompressed_size(&self) -> usize {
        match self {
            Token::Literal(_) => 1,
            Token::Match { length, .. } => *length as usize,
        }
    }

    /// Whether length and distance sit inside the format limits.
    pub fn in_bounds(&self) -> bool {
        match self {
            Token::Literal(_) => true,
            Token::Match { length, distance } => {
                (MIN_MATCH..=MAX_MATCH_LEN).contains(&(*length as usize))
                    && (1..=MAX_OFFSET_LIMIT).contains(&(*distance as usize))
            }
        }
    }
}

/// Replay a token stream back into the bytes it encodes.
///
/// Matches may overlap their own output (distance < length), which is the
/// run-length case; copying byte-by-byte handles it.
pub fn replay(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tokens.iter().map(Token::uncompressed_size).sum());
    for token in tokens {
        match *token {
            Token::Literal(byte) => out.push(byte),
            Token::Match { length, distance } => {
                let start = out.len() - distance as usize;
                for i in 0..length as usize {
                    out.push(out[start + i]);
                }
            }
        }
    }
    out
}
