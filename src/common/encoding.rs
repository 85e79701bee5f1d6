//! Character encoding utilities for codepage-based text used in RTF documents.
//!
//! RTF documents declare a Windows codepage via `\ansicpg` and fall back to
//! `\'HH` byte escapes for characters outside 7-bit ASCII. This module maps
//! codepage identifiers to `encoding_rs` encodings and decodes the resulting
//! byte sequences.

use crate::rtf::{RtfError as Error, RtfResult as Result};
use encoding_rs::Encoding;

/// Map Windows codepage identifier to encoding_rs Encoding.
///
/// This function provides a mapping from Windows codepage identifiers to
/// the corresponding `encoding_rs` encodings. It supports the most common
/// codepages used in Microsoft Office documents.
///
/// # Arguments
/// * `codepage` - Windows codepage number (e.g., 936 for Simplified Chinese, 1252 for Western European)
///
/// # Returns
/// Returns `Some(&'static Encoding)` if the codepage is supported, `None` otherwise.
///
/// # Performance
/// This function uses a match expression which compiles to an efficient jump table.
/// The returned encoding references are static, so no allocation occurs.
///
/// # Examples
/// ```
/// use rtfdom::common::encoding::codepage_to_encoding;
///
/// let encoding = codepage_to_encoding(936).unwrap();
/// assert_eq!(encoding.name(), "GBK");
/// ```
#[inline]
pub fn codepage_to_encoding(codepage: u32) -> Option<&'static Encoding> {
    match codepage {
        // DOS codepages
        437 => Some(encoding_rs::IBM866), // IBM866 (close approximation to CP437)
        850 => Some(encoding_rs::IBM866), // DOS Latin 1 (approximation)

        // Windows codepages (Western scripts)
        874 => Some(encoding_rs::WINDOWS_874),   // Thai
        1250 => Some(encoding_rs::WINDOWS_1250), // Central European
        1251 => Some(encoding_rs::WINDOWS_1251), // Cyrillic
        1252 => Some(encoding_rs::WINDOWS_1252), // Western European (most common, default ANSI)
        1253 => Some(encoding_rs::WINDOWS_1253), // Greek
        1254 => Some(encoding_rs::WINDOWS_1254), // Turkish
        1255 => Some(encoding_rs::WINDOWS_1255), // Hebrew
        1256 => Some(encoding_rs::WINDOWS_1256), // Arabic
        1257 => Some(encoding_rs::WINDOWS_1257), // Baltic
        1258 => Some(encoding_rs::WINDOWS_1258), // Vietnamese

        // East Asian codepages
        932 => Some(encoding_rs::SHIFT_JIS), // Japanese Shift-JIS
        936 => Some(encoding_rs::GBK),       // Simplified Chinese (GB2312/GBK)
        949 => Some(encoding_rs::EUC_KR),    // Korean
        950 => Some(encoding_rs::BIG5),      // Traditional Chinese (Big5)
        1041 => Some(encoding_rs::SHIFT_JIS), // Japanese (alternate)
        1042 => Some(encoding_rs::EUC_KR),   // Korean (alternate)
        2052 => Some(encoding_rs::GBK),      // Chinese PRC
        4100 => Some(encoding_rs::GBK),      // Chinese Singapore
        20936 => Some(encoding_rs::GBK),     // GB2312
        54936 => Some(encoding_rs::GB18030), // Chinese GB18030 (superset of GBK)
        1028 => Some(encoding_rs::BIG5),     // Chinese Taiwan
        3076 => Some(encoding_rs::BIG5),     // Chinese Hong Kong
        5124 => Some(encoding_rs::BIG5),     // Chinese Macau
        20932 => Some(encoding_rs::EUC_JP),  // Japanese EUC-JP

        // ISO 8859 series (Latin and others)
        28591 => Some(encoding_rs::WINDOWS_1252), // ISO-8859-1 approximation
        28592 => Some(encoding_rs::ISO_8859_2),   // Latin 2 (Central European)
        28593 => Some(encoding_rs::ISO_8859_3),   // Latin 3 (South European)
        28594 => Some(encoding_rs::ISO_8859_4),   // Latin 4 (North European)
        28595 => Some(encoding_rs::ISO_8859_5),   // Cyrillic
        28596 => Some(encoding_rs::ISO_8859_6),   // Arabic
        28597 => Some(encoding_rs::ISO_8859_7),   // Greek
        28598 => Some(encoding_rs::ISO_8859_8),   // Hebrew
        28603 => Some(encoding_rs::ISO_8859_13),  // Baltic
        28605 => Some(encoding_rs::ISO_8859_15),  // Latin 9 (Western European with Euro)

        // KOI8 series
        20866 => Some(encoding_rs::KOI8_R), // KOI8-R (Russian)
        21866 => Some(encoding_rs::KOI8_U), // KOI8-U (Ukrainian)

        // Macintosh
        10000 => Some(encoding_rs::MACINTOSH), // Macintosh Roman
        10001 => Some(encoding_rs::SHIFT_JIS), // Mac Japanese
        10004 => Some(encoding_rs::ISO_8859_6), // Mac Arabic (approximation)
        10005 => Some(encoding_rs::WINDOWS_1255), // Mac Hebrew (approximation)
        10007 => Some(encoding_rs::KOI8_R),    // Mac Cyrillic (approximation)

        // Unicode
        1200 => Some(encoding_rs::UTF_16LE), // UTF-16 Little Endian
        1201 => Some(encoding_rs::UTF_16BE), // UTF-16 Big Endian
        65000 => Some(encoding_rs::UTF_8),   // UTF-7 (use UTF-8 as fallback)
        65001 => Some(encoding_rs::UTF_8),   // UTF-8

        // Unsupported codepage
        _ => None,
    }
}

/// Decode UTF-16 LE bytes to a String.
///
/// This function efficiently decodes UTF-16 Little Endian byte sequences
/// into Rust strings, handling null terminators and invalid sequences.
///
/// # Arguments
/// * `bytes` - The byte sequence containing UTF-16LE encoded text
///
/// # Returns
/// Returns a String with invalid sequences replaced by U+FFFD (lossy conversion).
///
/// # Examples
/// ```
/// use rtfdom::common::encoding::decode_utf16le;
///
/// let bytes = b"H\x00e\x00l\x00l\x00o\x00";
/// let text = decode_utf16le(bytes);
/// assert_eq!(text, "Hello");
/// ```
#[inline]
pub fn decode_utf16le(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    // Ensure we have complete UTF-16 code units (pairs of bytes)
    let byte_len = bytes.len() & !1; // Round down to even number
    let bytes = &bytes[..byte_len];

    // Convert to u16 slice
    let utf16_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .take_while(|&c| c != 0) // Stop at null terminator
        .collect();

    // Decode UTF-16 to String (lossy - replaces invalid sequences)
    String::from_utf16_lossy(&utf16_units)
}

/// Strip null terminators from the end of a byte slice.
///
/// This is a zero-copy operation that returns a slice view.
#[inline]
pub fn strip_null_terminators(bytes: &[u8]) -> &[u8] {
    // Find the position of the first null terminator
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

/// Decode bytes using the specified Windows codepage
///
/// This function converts byte sequences encoded with various Windows codepages
/// to UTF-8 strings. It handles null terminators and supports a wide range of
/// legacy codepages commonly used in Office documents.
///
/// # Arguments
///
/// * `bytes` - The byte sequence to decode
/// * `codepage` - Optional Windows codepage identifier (e.g., 1252 for Western European)
///
/// # Returns
///
/// Returns `Some(String)` if the codepage is supported and decoding succeeds,
/// `None` if the codepage is not supported or decoding fails.
///
/// # Examples
///
/// ```
/// use rtfdom::common::encoding::decode_bytes;
///
/// // Decode Windows-1252 (Western European) text
/// let bytes = b"Hello, World!";
/// let text = decode_bytes(bytes, Some(1252));
/// assert_eq!(text, Some("Hello, World!".to_string()));
///
/// // Unsupported codepage returns None
/// let text = decode_bytes(bytes, Some(99999));
/// assert_eq!(text, None);
/// ```
///
/// # Supported Codepages
///
/// See the [Microsoft codepage documentation](https://learn.microsoft.com/en-us/windows/win32/intl/code-page-identifiers)
/// for a complete list of Windows codepage identifiers.
#[inline]
pub fn decode_bytes(bytes: &[u8], codepage: Option<u32>) -> Option<String> {
    // Remove null terminators efficiently
    let bytes = strip_null_terminators(bytes);

    // Return empty string for empty input
    if bytes.is_empty() {
        return Some(String::new());
    }

    // Determine encoding from codepage
    let encoding = codepage_to_encoding(codepage?)?;

    // Decode using the determined encoding
    // encoding_rs guarantees valid UTF-8 output
    Some(encoding.decode(bytes).0.into_owned())
}

/// Decode a hex-encoded `\pict` payload to bytes.
///
/// Whitespace (the line-wrapping RTF writers insert into hex dumps) is
/// stripped before decoding.
///
/// # Errors
///
/// Returns an error if the hex string (after removing whitespace) has an
/// odd number of characters, or contains a non-hex-digit character.
///
/// # Examples
///
/// ```
/// use rtfdom::common::encoding::decode_hex_data;
///
/// let hex = "48656C6C6F"; // "Hello"
/// let decoded = decode_hex_data(hex).unwrap();
/// assert_eq!(decoded, b"Hello");
///
/// // Whitespace is automatically stripped
/// let hex_with_spaces = "48 65 6C 6C 6F";
/// let decoded = decode_hex_data(hex_with_spaces).unwrap();
/// assert_eq!(decoded, b"Hello");
/// ```
#[inline]
pub fn decode_hex_data(hex_str: &str) -> Result<Vec<u8>> {
    let hex_clean: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();

    if !hex_clean.len().is_multiple_of(2) {
        return Err(Error::ParserError(
            "Hex data must have even number of characters".to_string(),
        ));
    }

    let mut result = Vec::with_capacity(hex_clean.len() / 2);
    for chunk in hex_clean.as_bytes().chunks_exact(2) {
        let hi = hex_char_to_nibble(chunk[0])?;
        let lo = hex_char_to_nibble(chunk[1])?;
        result.push((hi << 4) | lo);
    }
    Ok(result)
}

/// Convert a hex character to its nibble value (0-15).
#[inline(always)]
fn hex_char_to_nibble(c: u8) -> Result<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(Error::ParserError(format!(
            "Invalid hex character: '{}'",
            c as char
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codepage_to_encoding_common() {
        assert!(codepage_to_encoding(1252).is_some()); // Windows-1252
        assert!(codepage_to_encoding(932).is_some()); // Shift-JIS
        assert!(codepage_to_encoding(936).is_some()); // GBK
        assert!(codepage_to_encoding(950).is_some()); // Big5
        assert!(codepage_to_encoding(65001).is_some()); // UTF-8
    }

    #[test]
    fn test_codepage_to_encoding_chinese() {
        assert_eq!(codepage_to_encoding(936).unwrap().name(), "GBK");
        assert_eq!(codepage_to_encoding(950).unwrap().name(), "Big5");
    }

    #[test]
    fn test_codepage_to_encoding_unsupported() {
        assert!(codepage_to_encoding(99999).is_none());
    }

    #[test]
    fn test_decode_utf16le() {
        let bytes = b"H\x00e\x00l\x00l\x00o\x00";
        let result = decode_utf16le(bytes);
        assert_eq!(result, "Hello");
    }

    #[test]
    fn test_decode_utf16le_with_null() {
        let bytes = b"H\x00e\x00l\x00l\x00o\x00\x00\x00W\x00o\x00r\x00l\x00d\x00";
        let result = decode_utf16le(bytes);
        assert_eq!(result, "Hello");
    }

    #[test]
    fn test_decode_utf16le_empty() {
        let bytes = b"";
        let result = decode_utf16le(bytes);
        assert_eq!(result, "");
    }

    #[test]
    fn test_strip_null_terminators() {
        let bytes = b"Hello\x00World";
        let result = strip_null_terminators(bytes);
        assert_eq!(result, b"Hello");
    }

    #[test]
    fn test_strip_null_terminators_no_null() {
        let bytes = b"Hello";
        let result = strip_null_terminators(bytes);
        assert_eq!(result, b"Hello");
    }

    #[test]
    fn test_decode_hex_data_basic() {
        let hex = "48656C6C6F"; // "Hello"
        let decoded = decode_hex_data(hex).unwrap();
        assert_eq!(decoded, b"Hello");
    }

    #[test]
    fn test_decode_hex_data_with_whitespace() {
        let hex = "48 65 6C 6C 6F"; // "Hello" with spaces
        let decoded = decode_hex_data(hex).unwrap();
        assert_eq!(decoded, b"Hello");
    }

    #[test]
    fn test_decode_hex_data_lowercase() {
        let hex = "48656c6c6f"; // "Hello" with lowercase hex
        let decoded = decode_hex_data(hex).unwrap();
        assert_eq!(decoded, b"Hello");
    }

    #[test]
    fn test_decode_hex_data_mixed_case() {
        let hex = "48656C6c6F"; // Mixed case
        let decoded = decode_hex_data(hex).unwrap();
        assert_eq!(decoded, b"Hello");
    }

    #[test]
    fn test_decode_hex_data_empty() {
        let hex = "";
        let decoded = decode_hex_data(hex).unwrap();
        assert_eq!(decoded, b"");
    }

    #[test]
    fn test_decode_hex_data_invalid_length() {
        let hex = "48656C6C6"; // Odd number of characters
        assert!(decode_hex_data(hex).is_err());
    }

    #[test]
    fn test_decode_hex_data_invalid_char() {
        let hex = "48656C6C6Z"; // Invalid character 'Z'
        assert!(decode_hex_data(hex).is_err());
    }

    #[test]
    fn test_decode_hex_data_large() {
        let hex = "48656C6C6F576F726C64".repeat(100); // "HelloWorld" repeated
        let decoded = decode_hex_data(&hex).unwrap();
        let expected = b"HelloWorld".repeat(100);
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_hex_char_to_nibble() {
        assert_eq!(hex_char_to_nibble(b'0').unwrap(), 0);
        assert_eq!(hex_char_to_nibble(b'9').unwrap(), 9);
        assert_eq!(hex_char_to_nibble(b'a').unwrap(), 10);
        assert_eq!(hex_char_to_nibble(b'f').unwrap(), 15);
        assert_eq!(hex_char_to_nibble(b'A').unwrap(), 10);
        assert_eq!(hex_char_to_nibble(b'F').unwrap(), 15);
        assert!(hex_char_to_nibble(b'G').is_err());
        assert!(hex_char_to_nibble(b'g').is_err());
    }
}
