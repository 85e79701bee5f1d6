//! Field instruction parsing helpers (§4.6 onField).
//!
//! The parser hands the DOM builder raw `fldinst`/`fldrslt` strings; field
//! drivers (the HYPERLINK driver in particular) interpret `fldinst` by
//! splitting it on whitespace and looking at the first token.

/// Split a field instruction into whitespace-separated tokens.
pub fn split_fldinst(fldinst: &str) -> Vec<&str> {
    fldinst.split_whitespace().collect()
}

/// Strip one layer of surrounding double quotes, if present.
pub fn strip_quotes(token: &str) -> &str {
    token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_hyperlink_instruction() {
        let tokens = split_fldinst(r#"HYPERLINK "http://example.com""#);
        assert_eq!(tokens, vec!["HYPERLINK", "\"http://example.com\""]);
    }

    #[test]
    fn strips_surrounding_quotes() {
        assert_eq!(strip_quotes("\"http://x\""), "http://x");
        assert_eq!(strip_quotes("noquotes"), "noquotes");
    }
}
