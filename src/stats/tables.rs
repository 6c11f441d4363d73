//! DEFLATE-style length and distance code classes (RFC 1951).
//!
//! Lengths bucket into codes 257-285 and distances into log-scaled codes
//! 0-29; the histogram counts these classes, and a downstream entropy coder
//! turns them into a canonical Huffman table.

/// Length codes 257-285: (base length, extra bits), indexed by code - 257.
pub const LENGTH_TABLE: [(u16, u8); 29] = [
    (3, 0),
    (4, 0),
    (5, 0),
    (6, 0),
    (7, 0),
    (8, 0),
    (9, 0),
    (10, 0),
    (11, 1),
    (13, 1),
    (15, 1),
    (17, 1),
    (19, 2),
    (23, 2),
    (27, 2),
    (31, 2),
    (35, 3),
    (43, 3),
    (51, 3),
    (59, 3),
    (67, 4),
    (83, 4),
    (99, 4),
    (115, 4),
    (131, 5),
    (163, 5),
    (195, 5),
    (227, 5),
    (258, 0),
];

/// Distance codes 0-29: (base distance, extra bits).
pub const DISTANCE_TABLE: [(u16, u8); 30] = [
    (1, 0),
    (2, 0),
    (3, 0),
    (4, 0),
    (5, 1),
    (7, 1),
    (9, 2),
    (13, 2),
    (17, 3),
    (25, 3),
    (33, 4),
    (49, 4),
    (65, 5),
    (97, 5),
    (129, 6),
    (193, 6),
    (257, 7),
    (385, 7),
    (513, 8),
    (769, 8),
    (1025, 9),
    (1537, 9),
    (2049, 10),
    (3073, 10),
    (4097, 11),
    (6145, 11),
    (8193, 12),
    (12289, 12),
    (16385, 13),
    (24577, 13),
];

/// Length-to-code lookup, indexed by `length - 3`. Values are `code - 257`.
const LENGTH_CODE: [u8; 256] = build_length_code();

const fn build_length_code() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut code = 0;
    while code < 28 {
        let base = LENGTH_TABLE[code].0 as usize;
        let extra = LENGTH_TABLE[code].1;
        let count = 1usize << extra;
        let mut i = 0;
        while i < count {
            table[base - 3 + i] = code as u8;
            i += 1;
        }
        code += 1;
    }
    // Length 258 has its own extra-bit-free code
    table[255] = 28;
    table
}

/// Code class for a match length (3-258).
/// Returns (code, extra_bits_value, extra_bits).
pub fn length_class(length: u16) -> Option<(u16, u16, u8)> {
    if !(3..=258).contains(&length) {
        return None;
    }
    let idx = LENGTH_CODE[length as usize - 3] as usize;
    let (base, extra_bits) = LENGTH_TABLE[idx];
    Some((idx as u16 + 257, length - base, extra_bits))
}

/// Code class for a match distance (1-32768).
/// Returns (code, extra_bits_value, extra_bits).
pub fn distance_class(distance: u16) -> Option<(u16, u16, u8)> {
    if distance == 0 {
        return None;
    }
    for (code, &(base, extra_bits)) in DISTANCE_TABLE.iter().enumerate().rev() {
        if distance >= base {
            return Some((code as u16, distance - base, extra_bits));
        }
    }
    None
}
