//! WinAnsiEncoding (PDF 32000-1, Annex D) for the standard Helvetica font.
//!
//! Bytes `0x20..=0x7E` and `0xA0..=0xFF` match Unicode directly. The
//! `0x80..=0x9F` block carries typographic punctuation instead of C1 controls.

/// Code points of `0x80..=0x9F`; `None` marks the five undefined slots.
const HIGH_BLOCK: [Option<char>; 32] = [
    Some('\u{20ac}'), // 0x80 euro sign
    None,
    Some('\u{201a}'),
    Some('\u{0192}'),
    Some('\u{201e}'),
    Some('\u{2026}'), // 0x85 ellipsis
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02c6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017d}'),
    None,
    None,
    Some('\u{2018}'), // 0x91 left single quote
    Some('\u{2019}'),
    Some('\u{201c}'),
    Some('\u{201d}'),
    Some('\u{2022}'), // 0x95 bullet
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02dc}'),
    Some('\u{2122}'), // 0x99 trade mark
    Some('\u{0161}'),
    Some('\u{203a}'),
    Some('\u{0153}'),
    None,
    Some('\u{017e}'),
    Some('\u{0178}'),
];

/// Map text onto single-byte WinAnsi codes. Tabs and control characters
/// become spaces; anything the encoding lacks becomes `?`.
pub(crate) fn encode(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

fn encode_char(c: char) -> u8 {
    if c == '\t' || c.is_control() {
        return b' ';
    }
    if c.is_ascii() || ('\u{a0}'..='\u{ff}').contains(&c) {
        return u8::try_from(u32::from(c)).unwrap_or(b'?');
    }
    HIGH_BLOCK
        .iter()
        .position(|slot| *slot == Some(c))
        .and_then(|i| u8::try_from(0x80 + i).ok())
        .unwrap_or(b'?')
}

/// Inverse of [`encode`]. Undefined high-block bytes decode as U+FFFD.
pub(crate) fn decode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9f => HIGH_BLOCK[usize::from(b - 0x80)].unwrap_or('\u{fffd}'),
            _ => char::from(b),
        })
        .collect()
}
