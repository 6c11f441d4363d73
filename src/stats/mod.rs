pub mod divider;
pub mod tables;

pub use divider::{divide, BlockResult, SymbolHistogram, TOKEN_RECORD_SIZE};
pub use tables::{distance_class, length_class};

/// Literal/length code classes: literals 0-255, end-of-block 256,
/// length codes 257-285.
pub const LIT_LEN_CODES: usize = 286;

/// Distance code classes 0-29.
pub const DIST_CODES: usize = 30;
