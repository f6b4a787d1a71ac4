use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// Longest prefix made of well-formed "extended UTF-8" sequences.
///
/// Only printable ASCII plus TAB, LF and CR count as single-byte characters,
/// so control bytes make a string binary. Not anchored at the end: the match
/// length is compared with the input length.
static VALID_UTF8_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?-u)^(?:[\x09\x0A\x0D\x20-\x7E]|[\xC2-\xDF][\x80-\xBF]|\xE0[\xA0-\xBF][\x80-\xBF]|[\xE1-\xEC\xEE\xEF][\x80-\xBF]{2}|\xED[\x80-\x9F][\x80-\xBF]|\xF0[\x90-\xBF][\x80-\xBF]{2}|[\xF1-\xF3][\x80-\xBF]{3}|\xF4[\x80-\x8F][\x80-\xBF]{2})*",
    )
    .expect("UTF-8 prefix pattern is valid")
});

fn valid_prefix_len(bytes: &[u8]) -> usize {
    VALID_UTF8_PREFIX.find(bytes).map_or(0, |m| m.end())
}

#[must_use]
pub fn is_utf8_encoded(bytes: &[u8]) -> bool {
    valid_prefix_len(bytes) == bytes.len()
}

/// First invalid sequence of a byte string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSequence {
    /// Byte offset of the sequence
    pub offset: usize,
    /// Up to the requested number of bytes starting at `offset`
    pub bytes: Vec<u8>,
}

impl InvalidSequence {
    /// Lowercase hex of the captured bytes
    #[must_use]
    pub fn hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Locate the first byte sequence that breaks UTF-8, keeping at most `len` bytes
#[must_use]
pub fn first_non_utf8_sequence(bytes: &[u8], len: usize) -> Option<InvalidSequence> {
    let offset = valid_prefix_len(bytes);
    if offset == bytes.len() {
        return None;
    }
    let end = bytes.len().min(offset.saturating_add(len));
    Some(InvalidSequence {
        offset,
        bytes: bytes[offset..end].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_multibyte_text() {
        assert!(is_utf8_encoded(b""));
        assert!(is_utf8_encoded("plain ascii\twith\r\nbreaks".as_bytes()));
        assert!(is_utf8_encoded("žluťoučký kůň".as_bytes()));
        assert!(is_utf8_encoded("日本語".as_bytes()));
        assert!(is_utf8_encoded("🦀 crab".as_bytes()));
    }

    #[test]
    fn test_rejects_control_and_broken_sequences() {
        assert!(!is_utf8_encoded(b"\x00"));
        assert!(!is_utf8_encoded(b"bell\x07"));
        assert!(!is_utf8_encoded(b"\x7F"));
        assert!(!is_utf8_encoded(b"\xC0\x80"));
        // surrogate half U+D800
        assert!(!is_utf8_encoded(b"\xED\xA0\x80"));
        // above U+10FFFF
        assert!(!is_utf8_encoded(b"\xF4\x90\x80\x80"));
        assert!(!is_utf8_encoded(b"\xE2\x82"));
    }

    #[test]
    fn test_first_invalid_sequence() {
        let seq = first_non_utf8_sequence(b"abc\xFF\xFEdef", 2).unwrap();
        assert_eq!(seq.offset, 3);
        assert_eq!(seq.bytes, b"\xFF\xFE");
        assert_eq!(seq.hex(), "fffe");

        assert!(first_non_utf8_sequence("valid ✓".as_bytes(), 10).is_none());

        let tail = first_non_utf8_sequence(b"ab\x80", 10).unwrap();
        assert_eq!(tail.offset, 2);
        assert_eq!(tail.bytes, b"\x80");
    }
}
