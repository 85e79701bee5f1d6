//! Byte-level RTF tokenizer.
//!
//! The scanner is pure: a given `(buffer, cursor)` pair yields a deterministic
//! token and an advanced cursor. It does not interpret control words, track
//! brace depth, or know about the active codepage — those are the parser's
//! job. Raw newlines in the source are literal [`Token::Character`] tokens;
//! only `\line` produces an embedded `\n`, and that translation happens one
//! layer up.

/// A single lexical token produced by [`Lexer::next_token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    OpenBrace,
    CloseBrace,
    /// Raw control word or control symbol text, including the leading `\`.
    /// Use [`split_control_word`] to separate the word from its parameter.
    ControlWordOrSymbol(&'a str),
    /// A single raw input byte that is not part of any escape or control.
    Character(u8),
    Eof,
}

/// A control word or symbol split into its name and optional signed parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlWord<'a> {
    /// The word itself, without the leading `\` and without the parameter
    /// digits. For control symbols this is the single symbol character
    /// (e.g. `"~"`, `"*"`, `"'"`).
    pub word: &'a str,
    pub param: Option<i32>,
}

/// Split a raw `ControlWordOrSymbol` token's text into word and parameter.
///
/// `\'HH` is treated specially: the word is `"'"` and the parameter is the
/// value of the up-to-two hex digits that follow (not a decimal integer).
pub fn split_control_word(raw: &str) -> ControlWord<'_> {
    let body = &raw[1..]; // drop leading backslash
    if let Some(hex) = body.strip_prefix('\'') {
        let hex: String = hex.chars().take(2).collect();
        let param = i32::from_str_radix(&hex, 16).ok();
        return ControlWord { word: "'", param };
    }
    let alpha_len = body
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_alphabetic())
        .count();
    if alpha_len == 0 {
        // Control symbol: a single non-alphabetic byte.
        return ControlWord {
            word: &body[..body.len().min(1)],
            param: None,
        };
    }
    let word = &body[..alpha_len];
    let rest = &body[alpha_len..];
    let digits_len = rest
        .char_indices()
        .take_while(|&(i, c)| c.is_ascii_digit() || (i == 0 && c == '-'))
        .count();
    let param = if digits_len > 0 {
        rest[..digits_len].parse::<i32>().ok()
    } else {
        None
    };
    ControlWord { word, param }
}

/// Streaming scanner over an RTF byte buffer.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    #[inline]
    fn current_byte(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Scan and return the next token, advancing the internal cursor.
    pub fn next_token(&mut self) -> Token<'a> {
        let Some(byte) = self.current_byte() else {
            return Token::Eof;
        };
        match byte {
            b'{' => {
                self.advance();
                Token::OpenBrace
            },
            b'}' => {
                self.advance();
                Token::CloseBrace
            },
            b'\\' => self.scan_control_word_or_symbol(),
            other => {
                self.advance();
                Token::Character(other)
            },
        }
    }

    fn scan_control_word_or_symbol(&mut self) -> Token<'a> {
        let start = self.pos;
        self.advance(); // consume '\'
        match self.current_byte() {
            Some(b'\'') => {
                // \'HH hex escape: exactly up to two hex digits.
                self.advance();
                let mut digits = 0;
                while digits < 2 && self.current_byte().is_some_and(|b| b.is_ascii_hexdigit()) {
                    self.advance();
                    digits += 1;
                }
            },
            Some(b) if b.is_ascii_alphabetic() => {
                while self.current_byte().is_some_and(|b| b.is_ascii_alphabetic()) {
                    self.advance();
                }
                if self.current_byte() == Some(b'-') {
                    self.advance();
                }
                while self.current_byte().is_some_and(|b| b.is_ascii_digit()) {
                    self.advance();
                }
                // A single trailing space delimits the control word and is
                // consumed here, but it is not part of the token text.
                if self.current_byte() == Some(b' ') {
                    self.advance();
                }
            },
            Some(_) => {
                // Control symbol: exactly one following byte.
                self.advance();
            },
            None => {},
        }
        let end = self.pos;
        let text = std::str::from_utf8(&self.input[start..end]).unwrap_or("\\");
        // Strip a trailing consumed space from the token text itself.
        let text = text.strip_suffix(' ').unwrap_or(text);
        Token::ControlWordOrSymbol(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_braces_and_text() {
        let mut lexer = Lexer::new(b"{\\rtf1 hi}");
        assert_eq!(lexer.next_token(), Token::OpenBrace);
        assert_eq!(lexer.next_token(), Token::ControlWordOrSymbol("\\rtf1"));
        assert_eq!(lexer.next_token(), Token::Character(b'h'));
        assert_eq!(lexer.next_token(), Token::Character(b'i'));
        assert_eq!(lexer.next_token(), Token::CloseBrace);
        assert_eq!(lexer.next_token(), Token::Eof);
    }

    #[test]
    fn control_word_trailing_space_is_a_delimiter() {
        let mut lexer = Lexer::new(b"\\b1 bold");
        assert_eq!(lexer.next_token(), Token::ControlWordOrSymbol("\\b1"));
        // the space was consumed as a delimiter, not emitted as a Character
        assert_eq!(lexer.next_token(), Token::Character(b'b'));
    }

    #[test]
    fn control_symbol_is_two_bytes() {
        let mut lexer = Lexer::new(b"\\~\\*\\\\");
        assert_eq!(lexer.next_token(), Token::ControlWordOrSymbol("\\~"));
        assert_eq!(lexer.next_token(), Token::ControlWordOrSymbol("\\*"));
        assert_eq!(lexer.next_token(), Token::ControlWordOrSymbol("\\\\"));
    }

    #[test]
    fn hex_escape_token() {
        let mut lexer = Lexer::new(b"\\'e9x");
        assert_eq!(lexer.next_token(), Token::ControlWordOrSymbol("\\'e9"));
        assert_eq!(lexer.next_token(), Token::Character(b'x'));
    }

    #[test]
    fn split_control_word_parses_word_and_param() {
        assert_eq!(
            split_control_word("\\b1"),
            ControlWord {
                word: "b",
                param: Some(1)
            }
        );
        assert_eq!(
            split_control_word("\\par"),
            ControlWord {
                word: "par",
                param: None
            }
        );
        assert_eq!(
            split_control_word("\\'e9"),
            ControlWord {
                word: "'",
                param: Some(0xe9)
            }
        );
        assert_eq!(
            split_control_word("\\~"),
            ControlWord {
                word: "~",
                param: None
            }
        );
        assert_eq!(
            split_control_word("\\u-8217"),
            ControlWord {
                word: "u",
                param: Some(-8217)
            }
        );
    }
}
