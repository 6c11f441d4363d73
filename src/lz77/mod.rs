pub mod booster;
pub mod matcher;
pub mod tokens;

pub use booster::boost;
pub use matcher::MatchFinder;
pub use tokens::Token;

/// Shortest back-reference worth encoding.
pub const MIN_MATCH: usize = 3;

/// Longest back-reference a single token can carry. Chosen so the wire
/// record's length field stays one byte.
pub const MAX_MATCH_LEN: usize = 255;

/// Farthest back a match may reach within its block.
pub const MAX_OFFSET_LIMIT: usize = 32 * 1024;
