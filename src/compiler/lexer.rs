//! Tokenizer for the predicate language.
//!
//! Scanning never fails: characters that do not start any token are skipped,
//! so `x = 1` lexes as `[x, 1]` and the parser decides what that means.

/// The category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    Str,
    Bool,
    Ident,
    Operator,
}

/// A token and its byte offset in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The raw lexeme, quotes and escapes included for string literals.
    pub text: String,
    pub position: usize,
}

impl Token {
    pub fn is_operator(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == symbol
    }
}

// Longest operators first so `===` is never read as `==` followed by `=`.
const MULTI_CHAR_OPERATORS: [&str; 8] = ["===", "!==", "==", "!=", "<=", ">=", "&&", "||"];
const SINGLE_CHAR_OPERATORS: &[u8] = b"()!<>+-*/%";

/// Splits a predicate source string into tokens.
pub fn tokenize(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        match scan_token(source, pos) {
            Some((kind, end)) => {
                tokens.push(Token {
                    kind,
                    text: source[pos..end].to_string(),
                    position: pos,
                });
                pos = end;
            }
            None => pos += char_len(source, pos),
        }
    }

    tokens
}

/// Tries every token form at `start`, returning the kind and end offset of the first match.
fn scan_token(source: &str, start: usize) -> Option<(TokenKind, usize)> {
    let bytes = source.as_bytes();
    let rest = &source[start..];
    let c = bytes[start];

    if c.is_ascii_digit() {
        return Some((TokenKind::Number, scan_number(bytes, start)));
    }
    if let Some(op) = MULTI_CHAR_OPERATORS.iter().find(|op| rest.starts_with(**op)) {
        return Some((TokenKind::Operator, start + op.len()));
    }
    if SINGLE_CHAR_OPERATORS.contains(&c) {
        return Some((TokenKind::Operator, start + 1));
    }
    if c == b'"' || c == b'\'' {
        return scan_string(bytes, start).map(|end| (TokenKind::Str, end));
    }
    if c.is_ascii_alphabetic() || c == b'_' {
        let end = scan_while(bytes, start, |b| b.is_ascii_alphanumeric() || b == b'_');
        let kind = match &source[start..end] {
            "true" | "false" => TokenKind::Bool,
            _ => TokenKind::Ident,
        };
        return Some((kind, end));
    }
    None
}

/// `[0-9]+(\.[0-9]+)?`; a trailing `.` without digits is not part of the number.
fn scan_number(bytes: &[u8], start: usize) -> usize {
    let end = scan_while(bytes, start, |b| b.is_ascii_digit());
    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        return scan_while(bytes, end + 1, |b| b.is_ascii_digit());
    }
    end
}

/// Scans a quoted literal, honoring backslash escapes. Returns `None` when unterminated.
fn scan_string(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if bytes.get(pos + 1).is_some_and(|b| *b != b'\n') => pos += 2,
            b'\\' => return None,
            b if b == quote => return Some(pos + 1),
            _ => pos += 1,
        }
    }
    None
}

fn scan_while(bytes: &[u8], start: usize, pred: impl Fn(u8) -> bool) -> usize {
    let mut pos = start;
    while pos < bytes.len() && pred(bytes[pos]) {
        pos += 1;
    }
    pos
}

fn char_len(source: &str, pos: usize) -> usize {
    source[pos..].chars().next().map_or(1, char::len_utf8)
}

/// Strips the quotes from a string literal and resolves backslash escapes
/// (`\x` becomes `x`).
pub fn unescape_string(lexeme: &str) -> String {
    let inner = if lexeme.len() >= 2 {
        &lexeme[1..lexeme.len() - 1]
    } else {
        ""
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
