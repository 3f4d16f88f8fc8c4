//! Tokenizer for code-model parameter and connection text.
//!
//! Whitespace, `=`, `(`, `)` and `,` are layout and only separate tokens.
//! `<`, `>`, `[`, `]`, `~` and `%` are single-character tokens. A `"`
//! starts a quoted run that ends at the next `"`. Anything else is a bare
//! run ending at the next layout or structural character.
//!
//! The tokenizer never fails; malformed text shows up as an unexpected
//! token kind to whoever consumes the tokens.

use crate::error::{Error, Result};

/// Token types for code-model text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare or quoted run of text
    String,
    /// `[`
    LArray,
    /// `]`
    RArray,
    /// `<`
    LComplex,
    /// `>`
    RComplex,
    /// `%`
    Percent,
    /// `~`
    Tilde,
    /// The reserved bare word `null`
    Null,
}

/// A token borrowed from the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Token text, without quotes for quoted runs.
    pub text: &'a str,
}

impl<'a> Token<'a> {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Cursor over a text fragment producing [`Token`]s.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

fn is_layout(c: char) -> bool {
    c.is_whitespace() || matches!(c, '=' | '(' | ')' | ',')
}

fn is_structural(c: char) -> bool {
    matches!(c, '<' | '>' | '[' | ']' | '~' | '%')
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Text not yet consumed.
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Check if all tokens have been consumed.
    pub fn is_at_end(&self) -> bool {
        self.peek_token().is_none()
    }

    /// Fail if any token is left after a complete value or connection.
    pub fn finish(&self) -> Result<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(Error::TrailingText(self.rest().trim().to_string()))
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&self) -> Option<Token<'a>> {
        self.clone().next_token()
    }

    /// Get the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        self.skip_layout();

        let rest = self.rest();
        let c = rest.chars().next()?;

        let token = if is_structural(c) {
            self.pos += c.len_utf8();
            let kind = match c {
                '[' => TokenKind::LArray,
                ']' => TokenKind::RArray,
                '<' => TokenKind::LComplex,
                '>' => TokenKind::RComplex,
                '%' => TokenKind::Percent,
                _ => TokenKind::Tilde,
            };
            Token {
                kind,
                text: &rest[..c.len_utf8()],
            }
        } else if c == '"' {
            let body = &rest[1..];
            let end = body.find('"').unwrap_or(body.len());
            let closed = end < body.len();
            self.pos += 1 + end + usize::from(closed);
            Token {
                kind: TokenKind::String,
                text: &body[..end],
            }
        } else {
            let end = rest
                .find(|c: char| is_layout(c) || is_structural(c))
                .unwrap_or(rest.len());
            self.pos += end;
            let text = &rest[..end];
            let kind = if text == "null" {
                TokenKind::Null
            } else {
                TokenKind::String
            };
            Token { kind, text }
        };

        self.skip_layout();
        Some(token)
    }

    /// Tokenize the remaining input.
    pub fn tokenize(mut self) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn skip_layout(&mut self) {
        let rest = self.rest();
        let skipped = rest
            .find(|c: char| !is_layout(c))
            .unwrap_or(rest.len());
        self.pos += skipped;
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}
