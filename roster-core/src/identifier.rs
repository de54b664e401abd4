//! Login contact identifier derivation.
//!
//! The agent desktop registers its voice client under an id derived from the
//! worker's display name. [`contact_uri`] reproduces that derivation so the
//! `contact_uri` attribute matches what the desktop will register with.

use std::fmt::Write;

/// Character written before the hex code of every escaped character.
pub const ESCAPE_PREFIX: char = '_';

/// Escape every character outside `[A-Za-z0-9]` as `_` followed by its
/// UTF-16 code unit in uppercase hex, zero-padded to two digits.
///
/// Characters outside the Basic Multilingual Plane produce one escape per
/// surrogate. The mapping is not idempotent: escaping an escaped string
/// escapes the `_` prefixes again.
pub fn escape_non_alphanumeric(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut units = [0u16; 2];
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            continue;
        }
        for unit in ch.encode_utf16(&mut units) {
            // Writing to a String cannot fail.
            let _ = write!(out, "{ESCAPE_PREFIX}{unit:02X}");
        }
    }
    out
}

/// `client:<escaped display name>`.
pub fn contact_uri(display_name: &str) -> String {
    format!("client:{}", escape_non_alphanumeric(display_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_becomes_hex_20() {
        assert_eq!(contact_uri("Jo Smith"), "client:Jo_20Smith");
    }

    #[test]
    fn alphanumerics_pass_through() {
        assert_eq!(escape_non_alphanumeric("abcXYZ019"), "abcXYZ019");
    }

    #[test]
    fn email_like_names() {
        assert_eq!(
            escape_non_alphanumeric("jo.smith@acme.com"),
            "jo_2Esmith_40acme_2Ecom"
        );
    }

    #[test]
    fn control_characters_are_zero_padded() {
        assert_eq!(escape_non_alphanumeric("a\tb"), "a_09b");
    }

    #[test]
    fn latin1_letters_are_escaped() {
        assert_eq!(escape_non_alphanumeric("José"), "Jos_E9");
    }

    #[test]
    fn wide_characters_use_full_code_unit() {
        assert_eq!(escape_non_alphanumeric("中"), "_4E2D");
        assert_eq!(escape_non_alphanumeric("😀"), "_D83D_DE00");
    }

    #[test]
    fn escaping_twice_is_not_idempotent() {
        let once = escape_non_alphanumeric("a b");
        assert_eq!(once, "a_20b");
        assert_eq!(escape_non_alphanumeric(&once), "a_5F20b");
    }

    #[test]
    fn every_ascii_symbol_expands_to_three_characters() {
        for byte in 0u8..=0x7F {
            let ch = byte as char;
            let escaped = escape_non_alphanumeric(&ch.to_string());
            if ch.is_ascii_alphanumeric() {
                assert_eq!(escaped, ch.to_string());
            } else {
                assert_eq!(escaped.len(), 3, "{ch:?} -> {escaped}");
                assert!(escaped.starts_with(ESCAPE_PREFIX));
                assert!(escaped[1..]
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
            }
        }
    }
}
