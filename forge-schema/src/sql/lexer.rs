//! SQL tokenizer.

use crate::{Result, error::SourceContext};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
    /// Bare word: keyword or unquoted identifier, case preserved.
    Word(String),
    /// Quoted identifier (`"x"`, `` `x` ``, `[x]`).
    Quoted(String),
    Number(String),
    /// String literal (single-quoted or dollar-quoted).
    Str(String),
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,
    /// `::`
    Cast,
    /// `[]` array type suffix
    ArraySuffix,
    Punct(char),
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub tok: Tok,
    pub offset: usize,
    pub len: usize,
}

impl Token {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Case-insensitive keyword match on bare words.
    pub fn is_kw(&self, kw: &str) -> bool {
        matches!(&self.tok, Tok::Word(w) if w.eq_ignore_ascii_case(kw))
    }

    /// Identifier text for bare or quoted words.
    pub fn ident(&self) -> Option<&str> {
        match &self.tok {
            Tok::Word(w) | Tok::Quoted(w) => Some(w),
            _ => None,
        }
    }
}

pub(crate) fn tokenize(ctx: &SourceContext) -> Result<Vec<Token>> {
    let src = ctx.src();
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        // Line comments
        if (c == b'-' && bytes.get(i + 1) == Some(&b'-')) || c == b'#' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        // Block comments
        if c == b'/' && bytes.get(i + 1) == Some(&b'*') {
            match src[i + 2..].find("*/") {
                Some(end) => i += end + 4,
                None => {
                    return Err(ctx.sql_error(
                        "unterminated block comment",
                        (start, 2),
                        Some("close the comment with '*/'".into()),
                    ));
                }
            }
            continue;
        }

        let tok = match c {
            b'\'' => {
                let (value, end) = scan_quoted(src, i, b'\'').ok_or_else(|| {
                    ctx.sql_error("unterminated string literal", (start, 1), None)
                })?;
                i = end;
                Tok::Str(value)
            }
            b'"' | b'`' => {
                let (value, end) = scan_quoted(src, i, c).ok_or_else(|| {
                    ctx.sql_error("unterminated quoted identifier", (start, 1), None)
                })?;
                i = end;
                Tok::Quoted(value)
            }
            b'[' if bytes.get(i + 1) == Some(&b']') => {
                i += 2;
                Tok::ArraySuffix
            }
            b'[' => {
                let end = src[i + 1..].find(']').ok_or_else(|| {
                    ctx.sql_error("unterminated quoted identifier", (start, 1), None)
                })?;
                let value = src[i + 1..i + 1 + end].to_string();
                i += end + 2;
                Tok::Quoted(value)
            }
            b'$' => {
                let (value, end) = scan_dollar_quoted(src, i).ok_or_else(|| {
                    ctx.sql_error("unterminated dollar-quoted string", (start, 1), None)
                })?;
                i = end;
                Tok::Str(value)
            }
            b'(' => {
                i += 1;
                Tok::LParen
            }
            b')' => {
                i += 1;
                Tok::RParen
            }
            b',' => {
                i += 1;
                Tok::Comma
            }
            b';' => {
                i += 1;
                Tok::Semicolon
            }
            b'.' if !bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => {
                i += 1;
                Tok::Dot
            }
            b':' if bytes.get(i + 1) == Some(&b':') => {
                i += 2;
                Tok::Cast
            }
            b'0'..=b'9' | b'.' => {
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                Tok::Number(src[start..i].to_string())
            }
            c if c.is_ascii_alphabetic() || c == b'_' || c >= 0x80 => {
                while i < bytes.len() {
                    let b = bytes[i];
                    if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80 {
                        i += 1;
                    } else {
                        break;
                    }
                }
                Tok::Word(src[start..i].to_string())
            }
            _ => {
                let ch = src[i..].chars().next().unwrap_or('?');
                i += ch.len_utf8();
                Tok::Punct(ch)
            }
        };

        tokens.push(Token {
            tok,
            offset: start,
            len: i - start,
        });
    }

    Ok(tokens)
}

/// Scan a quoted run starting at `start`. Doubled quotes and backslashes escape.
/// Returns the unescaped value and the index just past the closing quote.
fn scan_quoted(src: &str, start: usize, quote: u8) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    let mut value = Vec::new();
    let mut i = start + 1;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' && quote == b'\'' && i + 1 < bytes.len() {
            value.push(bytes[i + 1]);
            i += 2;
            continue;
        }
        if b == quote {
            if bytes.get(i + 1) == Some(&quote) {
                value.push(quote);
                i += 2;
                continue;
            }
            return Some((String::from_utf8_lossy(&value).into_owned(), i + 1));
        }
        value.push(b);
        i += 1;
    }
    None
}

/// Scan `$tag$ ... $tag$`.
fn scan_dollar_quoted(src: &str, start: usize) -> Option<(String, usize)> {
    let rest = &src[start + 1..];
    let tag_len = rest.find('$')?;
    let tag = &rest[..tag_len];
    if !tag.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    let delimiter = format!("${}$", tag);
    let body_start = start + tag_len + 2;
    let body_len = src[body_start..].find(&delimiter)?;
    Some((
        src[body_start..body_start + body_len].to_string(),
        body_start + body_len + delimiter.len(),
    ))
}
