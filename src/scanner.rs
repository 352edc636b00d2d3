//! One-pass, streaming lexer for Kin.
//!
//! Transforms source text into a sequence of [`Token`]s, skipping whitespace
//! and `#` line comments, and emitting exactly one `EOF` token at the end.
//! Designed as a `FusedIterator` so it can be chained with other iterator
//! adapters; [`Scanner::tokenize`] collects the whole stream or the first
//! lexing error.
//!
//! Lexical rules:
//!
//! - Whitespace (space, tab, carriage return) is skipped; `\n` increments
//!   the 1-based line counter used in diagnostics.
//! - `#` starts a comment consumed to end of line (bulk-skipped via
//!   `memchr`).
//! - Numbers are a digit run; a `.` followed by at least one digit continues
//!   the lexeme as a `FLOAT`, otherwise it is an `INTEGER`. Both carry the
//!   parsed `f64`.
//! - Strings are `"`-delimited with no escape processing; a newline or end
//!   of input before the closing quote is a lex error on the current line.
//! - Identifiers are `[A-Za-z_][A-Za-z0-9_]*`, resolved against a
//!   perfect-hash keyword map.
//! - Two-character operators are greedily preferred over their
//!   one-character prefix (`==` before `=`, `&&` before `&`, ...). A bare
//!   `|` has no single-character meaning and is a lex error.

use crate::error::{KinError, Result};
use crate::token::{Token, TokenType};
use log::info;
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile-time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "reka"             => TokenType::REKA,
    "ntahinduka"       => TokenType::NTAHINDUKA,
    "niba"             => TokenType::NIBA,
    "nanone_niba"      => TokenType::NANONE_NIBA,
    "niba_byanze"      => TokenType::NIBA_BYANZE,
    "subiramo_niba"    => TokenType::SUBIRAMO_NIBA,
    "porogaramu_ntoya" => TokenType::POROGARAMU_NTOYA,
    "tanga"            => TokenType::TANGA,
    "gereranya"        => TokenType::GERERANYA,
    "usanze"           => TokenType::USANZE,
    "ibindi"           => TokenType::IBINDI,
};

/// A single-pass **scanner / lexer** that converts source text into a
/// sequence of [`Token`]s. The lifetime `'a` ties every emitted token's
/// `lexeme` slice back to the original source buffer.
pub struct Scanner<'a> {
    src: &'a str,               // entire source file
    bytes: &'a [u8],            // byte view for fast peeking
    start: usize,               // index of the *first* byte of the current lexeme
    curr: usize,                // index *one past* the last byte examined
    line: usize,                // 1-based line counter (\n increments)
    pending: Option<TokenType>, // recognized token kind waiting to be emitted
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    #[inline]
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            bytes: src.as_bytes(),
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
        }
    }

    /// Drain the whole stream into a token vector, or fail with the first
    /// lexing error. The result always terminates with exactly one `EOF`.
    pub fn tokenize(self) -> Result<Vec<Token<'a>>> {
        self.collect()
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Are we at (or past) the end of input?
    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it. Callers guard with [`is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.bytes[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it. Returns `0` past EOF
    /// to avoid branching at the call site.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.bytes[self.curr]
        }
    }

    /// Peek one byte beyond [`peek`]. Safe at EOF.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.len() {
            0
        } else {
            self.bytes[self.curr + 1]
        }
    }

    /// Conditionally consume a byte **iff** it matches `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* token starting at `self.curr`. If the lexeme produces
    /// an actual token the kind is stored in `self.pending`. Whitespace and
    /// comments are skipped by returning `Ok(())` with `pending = None`.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            // ── single-character punctuators ──────────────────────────────
            b'(' => self.pending = Some(TokenType::LEFT_PAREN),
            b')' => self.pending = Some(TokenType::RIGHT_PAREN),
            b'{' => self.pending = Some(TokenType::LEFT_BRACE),
            b'}' => self.pending = Some(TokenType::RIGHT_BRACE),
            b'[' => self.pending = Some(TokenType::LEFT_BRACKET),
            b']' => self.pending = Some(TokenType::RIGHT_BRACKET),
            b',' => self.pending = Some(TokenType::COMMA),
            b'.' => self.pending = Some(TokenType::DOT),
            b':' => self.pending = Some(TokenType::COLON),
            b';' => self.pending = Some(TokenType::SEMICOLON),
            b'*' => self.pending = Some(TokenType::STAR),
            b'/' => self.pending = Some(TokenType::SLASH),
            b'^' => self.pending = Some(TokenType::CARET),
            b'%' => self.pending = Some(TokenType::PERCENT),

            // ── one-or-two-character operators ────────────────────────────
            b'+' => {
                let tt = if self.match_byte(b'+') {
                    TokenType::INCREMENT
                } else {
                    TokenType::PLUS
                };

                self.pending = Some(tt);
            }

            b'-' => {
                let tt = if self.match_byte(b'-') {
                    TokenType::DECREMENT
                } else {
                    TokenType::MINUS
                };

                self.pending = Some(tt);
            }

            b'!' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::BANG_EQUAL
                } else {
                    TokenType::BANG
                };

                self.pending = Some(tt);
            }

            b'=' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::EQUAL_EQUAL
                } else {
                    TokenType::EQUAL
                };

                self.pending = Some(tt);
            }

            b'<' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::LESS_EQUAL
                } else {
                    TokenType::LESS
                };

                self.pending = Some(tt);
            }

            b'>' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::GREATER_EQUAL
                } else {
                    TokenType::GREATER
                };

                self.pending = Some(tt);
            }

            b'&' => {
                let tt = if self.match_byte(b'&') {
                    TokenType::AND
                } else {
                    TokenType::AMPERSAND
                };

                self.pending = Some(tt);
            }

            b'|' => {
                if self.match_byte(b'|') {
                    self.pending = Some(TokenType::OR);
                } else {
                    return Err(KinError::lex(self.line, "Unexpected character: |"));
                }
            }

            // ── whitespace / newline ─────────────────────────────────────
            b' ' | b'\r' | b'\t' => {
                return Ok(()); // skip insignificants
            }

            b'\n' => {
                self.line += 1; // track for diagnostics

                return Ok(());
            }

            // ── comments (# ... until newline) ───────────────────────────
            b'#' => {
                // Fast-forward to the next newline with `memchr`; if none is
                // found, skip to EOF.
                if let Some(pos) = memchr(b'\n', &self.bytes[self.curr..]) {
                    self.curr += pos;
                } else {
                    self.curr = self.len();
                }

                return Ok(());
            }

            // ── string literal " ... " ───────────────────────────────────
            b'"' => {
                return self.parse_string();
            }

            // ── number literal (digit-leading) ───────────────────────────
            b'0'..=b'9' => {
                self.parse_number();
            }

            // ── identifiers / keywords (alpha or underscore-leading) ─────
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.parse_identifier();
            }

            // ── unexpected character ─────────────────────────────────────
            _ => {
                return Err(KinError::lex(
                    self.line,
                    format!("Unexpected character: {}", b as char),
                ));
            }
        }

        Ok(())
    }

    /// Parse a double-quoted string literal.
    ///
    /// * `self.start` still points to the opening `"`.
    /// * When we return, `self.curr` points **past** the closing `"`.
    ///
    /// Kin strings are single-line: a newline before the closing quote is
    /// as much an error as running off the end of the source.
    fn parse_string(&mut self) -> Result<()> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.peek() == b'\n' {
                return Err(KinError::lex(self.line, "Unterminated string literal"));
            }

            self.advance();
        }

        if self.is_at_end() {
            return Err(KinError::lex(self.line, "Unterminated string literal"));
        }

        self.advance(); // consume closing quote

        // Slice excluding the surrounding quotes. Both bounds sit on ASCII
        // quote bytes, so they are valid UTF-8 boundaries.
        let s: &str = &self.src[self.start + 1..self.curr - 1];

        self.pending = Some(TokenType::STRING(s.to_owned()));

        Ok(())
    }

    /// Parse a numeric literal (`123` -> INTEGER, `3.14` -> FLOAT).
    fn parse_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let mut is_float = false;

        // Optional fractional part: only if the '.' is followed by a digit,
        // so `arr.0`-style member access never swallows the dot.
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            is_float = true;

            self.advance(); // consume "."

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let s: &str = &self.src[self.start..self.curr];
        let n: f64 = s.parse::<f64>().unwrap_or(0.0); // parse never fails (checked digits)

        self.pending = Some(if is_float {
            TokenType::FLOAT(n)
        } else {
            TokenType::INTEGER(n)
        });
    }

    /// Parse an identifier and decide if it is a **keyword** or a generic
    /// `IDENTIFIER` token.
    fn parse_identifier(&mut self) {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }

        let lexeme: &str = &self.src[self.start..self.curr];

        let tt: TokenType = KEYWORDS
            .get(lexeme)
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER);

        self.pending = Some(tt);
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        // Loop until we either emit a token, hit EOF, or see an error.
        while self.curr <= self.len() {
            // 1. EOF guard - emit exactly one EOF then terminate.
            if self.curr == self.len() {
                self.curr += 1; // ensure fused semantics
                return Some(Ok(Token::new(TokenType::EOF, "", self.line)));
            }

            // 2. Reset per-token state.
            self.start = self.curr;
            self.pending = None;

            // 3. Attempt to scan a token.
            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            // 4. If a real token was recognized, build and return it.
            if let Some(tt) = self.pending.take() {
                let lex: &str = &self.src[self.start..self.curr];

                return Some(Ok(Token::new(tt, lex, self.line)));
            }
            // Otherwise it was whitespace / comment -> continue loop.
        }

        None // already yielded EOF
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
