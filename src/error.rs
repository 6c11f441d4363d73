use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Invalid block size: {0} (must be a power of two between 1 KiB and 32 KiB)")]
    InvalidBlockSize(usize),

    // Internal invariant violations. These indicate a bug in the engine,
    // not bad input: the block pipeline is total over any byte sequence.
    #[error("Match length {0} outside format limits")]
    InvalidMatchLength(u16),

    #[error("Back-reference distance {distance} exceeds available window {available}")]
    InvalidBackReference { distance: u16, available: usize },

    #[error("Block {index}: encoded size {encoded} exceeds limit {limit}")]
    EncodedSizeOverflow { index: u32, encoded: u32, limit: u32 },

    // Capacity errors - the caller must provision for the worst case
    #[error("Output capacity {available} below worst case {required}")]
    InsufficientCapacity { required: usize, available: usize },

    // Decode-side validation errors
    #[error("Invalid block flag byte: 0x{0:02x}")]
    InvalidBlockFlag(u8),

    #[error("Stored block length mismatch: LEN={len}, NLEN={nlen}")]
    StoredBlockLengthMismatch { len: u16, nlen: u16 },

    #[error("Encoded payload size {0} is not a whole number of token records")]
    RaggedTokenPayload(u32),

    #[error("Token record {0:02x?} has nonzero padding bytes")]
    NonCanonicalTokenRecord([u8; 4]),

    // Checksum errors
    #[error("Checksum mismatch: expected 0x{expected:08x}, got 0x{found:08x}")]
    ChecksumMismatch { expected: u32, found: u32 },

    #[error("Size mismatch: expected {expected} bytes, got {found}")]
    SizeMismatch { expected: u32, found: u32 },

    // Internal errors
    #[error("Unexpected end of input")]
    UnexpectedEof,

    #[error("Compression job cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
