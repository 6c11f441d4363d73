//! Post-pass over the match finder's token stream.
//!
//! Rewrites the stream without changing the bytes it reconstructs: adjacent
//! matches with the same distance are merged, and literals that repeat the
//! window byte at a neighboring match's distance are absorbed into the match.
//! Every rewrite removes a token, so the pass can only shrink the encoded
//! stream.

use super::{Token, MAX_MATCH_LEN};

/// Rewrite `tokens` for `data` (the block the stream was produced from).
///
/// Guarantees on the output stream:
/// - replays to exactly the same bytes as the input stream;
/// - no two adjacent matches share a distance while their combined length
///   fits `MAX_MATCH_LEN`;
/// - no literal adjacent to a match repeats the match's window byte while
///   the match has room to grow.
pub fn boost(data: &[u8], tokens: &[Token]) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    // Bytes of the block reconstructed so far, i.e. the logical position of
    // the next token.
    let mut pos = 0usize;

    for &token in tokens {
        let size = token.uncompressed_size();

        match token {
            Token::Match { length, distance } => {
                match out.last_mut() {
                    // Merge with a preceding match at the same distance.
                    Some(Token::Match { length: prev_len, distance: prev_dist })
                        if *prev_dist == distance
                            && *prev_len as usize + length as usize <= MAX_MATCH_LEN =>
                    {
                        *prev_len += length;
                    }
                    // Extend backward over a literal that repeats the byte
                    // `distance` back from it.
                    Some(Token::Literal(byte))
                        if (length as usize) < MAX_MATCH_LEN
                            && pos > distance as usize
                            && data[pos - 1 - distance as usize] == *byte =>
                    {
                        out.pop();
                        out.push(Token::Match { length: length + 1, distance });
                    }
                    _ => out.push(Token::Match { length, distance }),
                }
            }
            Token::Literal(byte) => {
                match out.last_mut() {
                    // Extend a preceding match forward over a repeated byte.
                    Some(Token::Match { length, distance })
                        if (*length as usize) < MAX_MATCH_LEN
                            && (*distance as usize) <= pos
                            && data[pos - *distance as usize] == byte =>
                    {
                        *length += 1;
                    }
                    _ => out.push(Token::Literal(byte)),
                }
            }
        }

        pos += size;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lz77::tokens::replay;
    use crate::lz77::MatchFinder;

    fn assert_boost_preserves(data: &[u8]) -> (Vec<Token>, Vec<Token>) {
        let mut finder = MatchFinder::new();
        let tokens = finder.find_matches(data);
        let boosted = boost(data, &tokens);
        assert_eq!(replay(&boosted), data, "boost changed reconstruction");
        assert!(boosted.len() <= tokens.len(), "boost grew the token stream");
        (tokens, boosted)
    }

    #[test]
    fn test_empty_stream() {
        assert!(boost(&[], &[]).is_empty());
    }

    #[test]
    fn test_merges_same_distance_matches() {
        // Two length-100 matches at distance 4 must merge into one.
        let data = replay(&[
            Token::Literal(b'w'),
            Token::Literal(b'x'),
            Token::Literal(b'y'),
            Token::Literal(b'z'),
            Token::Match { length: 100, distance: 4 },
            Token::Match { length: 100, distance: 4 },
        ]);
        let tokens = vec![
            Token::Literal(b'w'),
            Token::Literal(b'x'),
            Token::Literal(b'y'),
            Token::Literal(b'z'),
            Token::Match { length: 100, distance: 4 },
            Token::Match { length: 100, distance: 4 },
        ];

        let boosted = boost(&data, &tokens);
        assert_eq!(
            boosted,
            vec![
                Token::Literal(b'w'),
                Token::Literal(b'x'),
                Token::Literal(b'y'),
                Token::Literal(b'z'),
                Token::Match { length: 200, distance: 4 },
            ]
        );
        assert_eq!(replay(&boosted), data);
    }

    #[test]
    fn test_merge_respects_length_cap() {
        let data = replay(&[
            Token::Literal(b'q'),
            Token::Match { length: 200, distance: 1 },
            Token::Match { length: 200, distance: 1 },
        ]);
        let tokens = vec![
            Token::Literal(b'q'),
            Token::Match { length: 200, distance: 1 },
            Token::Match { length: 200, distance: 1 },
        ];

        let boosted = boost(&data, &tokens);
        // 400 > MAX_MATCH_LEN, so the matches must stay separate.
        assert_eq!(boosted.len(), 3);
        assert_eq!(replay(&boosted), data);
    }

    #[test]
    fn test_absorbs_trailing_literal() {
        // "abab" + match(4, dist 2) produces "abababab"; a following 'a'
        // literal continues the same period and should extend the match.
        let tokens = vec![
            Token::Literal(b'a'),
            Token::Literal(b'b'),
            Token::Match { length: 4, distance: 2 },
            Token::Literal(b'a'),
        ];
        let data = replay(&tokens);

        let boosted = boost(&data, &tokens);
        assert_eq!(
            boosted,
            vec![
                Token::Literal(b'a'),
                Token::Literal(b'b'),
                Token::Match { length: 5, distance: 2 },
            ]
        );
        assert_eq!(replay(&boosted), data);
    }

    #[test]
    fn test_extends_match_backward_over_literal() {
        // "aba" + literal 'b' + match(dist 2) - the 'b' repeats the byte two
        // back, so the match can start one byte earlier.
        let tokens = vec![
            Token::Literal(b'a'),
            Token::Literal(b'b'),
            Token::Literal(b'a'),
            Token::Literal(b'b'),
            Token::Match { length: 6, distance: 2 },
        ];
        let data = replay(&tokens);

        let boosted = boost(&data, &tokens);
        assert_eq!(replay(&boosted), data);
        assert!(boosted.len() < tokens.len());
    }

    #[test]
    fn test_unrelated_tokens_untouched() {
        let tokens = vec![
            Token::Literal(b'x'),
            Token::Literal(b'y'),
            Token::Literal(b'z'),
            Token::Literal(b'x'),
            Token::Literal(b'q'),
        ];
        let data = replay(&tokens);
        assert_eq!(boost(&data, &tokens), tokens);
    }

    #[test]
    fn test_boost_on_finder_output() {
        let mut data = Vec::new();
        for i in 0..3000u32 {
            data.push((i % 251) as u8);
        }
        data.extend(std::iter::repeat(b'R').take(2000));
        assert_boost_preserves(&data);
    }

    #[test]
    fn test_no_adjacent_same_distance_matches_remain() {
        let data = vec![b'A'; 10000];
        let (_, boosted) = assert_boost_preserves(&data);

        for pair in boosted.windows(2) {
            if let [Token::Match { length: l1, distance: d1 }, Token::Match { length: l2, distance: d2 }] =
                pair
            {
                assert!(
                    d1 != d2 || *l1 as usize + *l2 as usize > MAX_MATCH_LEN,
                    "mergeable matches left adjacent: {:?}",
                    pair
                );
            }
        }
    }
}
