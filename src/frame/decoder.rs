//! Reference decoder for the packed block stream.
//!
//! Replays wire-form token records through a block-local window, validates
//! the stored-block LEN/NLEN redundancy, and checks the trailer checksum and
//! size. By construction the engine's output never triggers a data-dependent
//! decode error; every error here means a corrupted or foreign stream.

use super::constants::*;
use crate::checksum::{Checksum, ChecksumKind};
use crate::error::{Error, Result};
use crate::lz77::{MAX_OFFSET_LIMIT, MIN_MATCH};
use crate::stats::TOKEN_RECORD_SIZE;

/// Decode a packed stream back into the original bytes, verifying the
/// trailer with the given checksum flavor.
pub fn decompress(data: &[u8], kind: ChecksumKind) -> Result<Vec<u8>> {
    StreamDecoder::new(data).decode(kind)
}

struct StreamDecoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> StreamDecoder<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn decode(mut self, kind: ChecksumKind) -> Result<Vec<u8>> {
        let mut out = Vec::new();

        while self.remaining() > TRAILER_SIZE {
            let flag = self.read_u8()?;
            match flag {
                FLAG_STORED => self.decode_stored(&mut out)?,
                FLAG_COMPRESSED => self.decode_compressed(&mut out)?,
                other => return Err(Error::InvalidBlockFlag(other)),
            }
        }

        if self.remaining() != TRAILER_SIZE {
            return Err(Error::UnexpectedEof);
        }

        let expected_checksum = self.read_u32_le()?;
        let expected_size = self.read_u32_le()?;

        let mut checksum = Checksum::new(kind);
        checksum.update(&out);
        let found = checksum.value();
        if found != expected_checksum {
            return Err(Error::ChecksumMismatch { expected: expected_checksum, found });
        }
        if out.len() as u32 != expected_size {
            return Err(Error::SizeMismatch { expected: expected_size, found: out.len() as u32 });
        }

        Ok(out)
    }

    fn decode_stored(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let len = self.read_u16_le()?;
        let nlen = self.read_u16_le()?;
        if len != !nlen {
            return Err(Error::StoredBlockLengthMismatch { len, nlen });
        }
        let raw = self.read_slice(len as usize)?;
        out.extend_from_slice(raw);
        Ok(())
    }

    fn decode_compressed(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let encoded_size = self.read_u32_le()?;
        if encoded_size as usize % TOKEN_RECORD_SIZE != 0 {
            return Err(Error::RaggedTokenPayload(encoded_size));
        }
        let payload = self.read_slice(encoded_size as usize)?;

        // Matches are block-local: a distance may reach back only to the
        // first byte this block produced.
        let block_start = out.len();

        for record in payload.chunks_exact(TOKEN_RECORD_SIZE) {
            // Unused record bytes must be zero; the checksum cannot catch
            // corruption in bytes the replay never reads.
            let length = record[1] as usize;
            if length == 0 {
                if record[2] != 0 || record[3] != 0 {
                    return Err(Error::NonCanonicalTokenRecord([
                        record[0], record[1], record[2], record[3],
                    ]));
                }
                out.push(record[0]);
                continue;
            }

            if record[0] != 0 {
                return Err(Error::NonCanonicalTokenRecord([
                    record[0], record[1], record[2], record[3],
                ]));
            }
            if length < MIN_MATCH {
                return Err(Error::InvalidMatchLength(length as u16));
            }
            let distance = u16::from_le_bytes([record[2], record[3]]);
            let produced = out.len() - block_start;
            if distance == 0 || distance as usize > MAX_OFFSET_LIMIT || distance as usize > produced
            {
                return Err(Error::InvalidBackReference { distance, available: produced });
            }

            // Byte-by-byte copy handles overlapping (run-length) matches.
            let start = out.len() - distance as usize;
            for i in 0..length {
                let byte = out[start + i];
                out.push(byte);
            }
        }

        Ok(())
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Result<u8> {
        let byte = *self.data.get(self.pos).ok_or(Error::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_u16_le(&mut self) -> Result<u16> {
        let bytes = self.read_slice(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32_le(&mut self) -> Result<u32> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_trailer_only() {
        // CRC32 of nothing is 0, size 0.
        let stream = [0u8; 8];
        assert_eq!(decompress(&stream, ChecksumKind::Crc32).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_stored_block() {
        let mut stream = vec![FLAG_STORED, 5, 0, 0xFA, 0xFF];
        stream.extend_from_slice(b"Hello");
        stream.extend_from_slice(&crc32fast::hash(b"Hello").to_le_bytes());
        stream.extend_from_slice(&5u32.to_le_bytes());

        assert_eq!(decompress(&stream, ChecksumKind::Crc32).unwrap(), b"Hello");
    }

    #[test]
    fn test_stored_length_mismatch_rejected() {
        let mut stream = vec![FLAG_STORED, 5, 0, 0x00, 0x00];
        stream.extend_from_slice(b"Hello");
        stream.extend_from_slice(&[0u8; 8]);

        let err = decompress(&stream, ChecksumKind::Crc32).unwrap_err();
        assert!(matches!(err, Error::StoredBlockLengthMismatch { len: 5, nlen: 0 }));
    }

    #[test]
    fn test_invalid_flag_rejected() {
        let mut stream = vec![0x7f];
        stream.extend_from_slice(&[0u8; 8]);

        let err = decompress(&stream, ChecksumKind::Crc32).unwrap_err();
        assert!(matches!(err, Error::InvalidBlockFlag(0x7f)));
    }

    #[test]
    fn test_compressed_block_replay() {
        // Literal 'a', literal 'b', match(4, dist 2) -> "ababab"
        let payload =
            [b'a', 0, 0, 0, b'b', 0, 0, 0, 0, 4, 2, 0];
        let mut stream = vec![FLAG_COMPRESSED];
        stream.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        stream.extend_from_slice(&payload);
        stream.extend_from_slice(&crc32fast::hash(b"ababab").to_le_bytes());
        stream.extend_from_slice(&6u32.to_le_bytes());

        assert_eq!(decompress(&stream, ChecksumKind::Crc32).unwrap(), b"ababab");
    }

    #[test]
    fn test_match_record_with_nonzero_literal_byte_rejected() {
        // Same stream as the replay test, but the match record's unused
        // literal byte is corrupted. Replay would still produce "ababab"
        // and pass the checksum, so the record itself must be rejected.
        let payload =
            [b'a', 0, 0, 0, b'b', 0, 0, 0, 0x7f, 4, 2, 0];
        let mut stream = vec![FLAG_COMPRESSED];
        stream.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        stream.extend_from_slice(&payload);
        stream.extend_from_slice(&crc32fast::hash(b"ababab").to_le_bytes());
        stream.extend_from_slice(&6u32.to_le_bytes());

        let err = decompress(&stream, ChecksumKind::Crc32).unwrap_err();
        assert!(matches!(err, Error::NonCanonicalTokenRecord([0x7f, 4, 2, 0])));
    }

    #[test]
    fn test_literal_record_with_nonzero_distance_bytes_rejected() {
        let payload = [b'a', 0, 1, 0];
        let mut stream = vec![FLAG_COMPRESSED];
        stream.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        stream.extend_from_slice(&payload);
        stream.extend_from_slice(&crc32fast::hash(b"a").to_le_bytes());
        stream.extend_from_slice(&1u32.to_le_bytes());

        let err = decompress(&stream, ChecksumKind::Crc32).unwrap_err();
        assert!(matches!(err, Error::NonCanonicalTokenRecord([b'a', 0, 1, 0])));
    }

    #[test]
    fn test_cross_block_reference_rejected() {
        // A match in the very first record has no window to reach into.
        let payload = [0u8, 3, 1, 0];
        let mut stream = vec![FLAG_COMPRESSED];
        stream.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        stream.extend_from_slice(&payload);
        stream.extend_from_slice(&[0u8; 8]);

        let err = decompress(&stream, ChecksumKind::Crc32).unwrap_err();
        assert!(matches!(err, Error::InvalidBackReference { distance: 1, available: 0 }));
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        let mut stream = vec![FLAG_STORED, 2, 0, 0xFD, 0xFF];
        stream.extend_from_slice(b"ok");
        stream.extend_from_slice(&0xDEADBEEFu32.to_le_bytes());
        stream.extend_from_slice(&2u32.to_le_bytes());

        let err = decompress(&stream, ChecksumKind::Crc32).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_truncated_stream_rejected() {
        let stream = [FLAG_STORED, 5, 0];
        let err = decompress(&stream, ChecksumKind::Crc32).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof));
    }
}
