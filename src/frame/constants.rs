/// Flag byte opening a stored block.
pub const FLAG_STORED: u8 = 0x00;

/// Flag byte opening a compressed block.
pub const FLAG_COMPRESSED: u8 = 0x01;

/// Stored block header: flag + LEN (u16 LE) + NLEN (ones'-complement of LEN).
pub const STORED_HEADER_SIZE: usize = 5;

/// Compressed block header: flag + encoded size (u32 LE).
pub const COMPRESSED_HEADER_SIZE: usize = 5;

/// Stream trailer: checksum (u32 LE) + uncompressed size (u32 LE).
pub const TRAILER_SIZE: usize = 8;

/// Default uncompressed block size.
pub const DEFAULT_BLOCK_SIZE: usize = 32 * 1024;

/// Largest configurable block size. The stored-block LEN field is 16 bits,
/// so a stored payload cannot exceed 65535 bytes; 32 KiB also matches the
/// offset window, keeping every in-block distance encodable.
pub const MAX_BLOCK_SIZE: usize = 32 * 1024;

/// Smallest configurable block size.
pub const MIN_BLOCK_SIZE: usize = 1024;

/// Blocks smaller than this skip the match pipeline and are stored
/// directly; the per-block framing and statistics cannot pay off.
pub const SMALL_BLOCK_THRESHOLD: usize = 128;
