use log::debug;
use serde::Serialize;
use std::fmt;
use std::mem;

/// The different kinds of tokens recognized by the Kin scanner.
///
/// Variants without data represent single/two-character operators or
/// keywords. `STRING(String)`, `INTEGER(f64)` and `FLOAT(f64)` carry their
/// literal values (both numeric kinds normalize to `f64`, Kin's single
/// numeric runtime type). `IDENTIFIER` is used for user-defined names.
/// `EOF` marks the end of input.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Serialize)]
pub enum TokenType {
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// '{'
    LEFT_BRACE,

    /// '}'
    RIGHT_BRACE,

    /// '['
    LEFT_BRACKET,

    /// ']'
    RIGHT_BRACKET,

    /// ','
    COMMA,

    /// '.'
    DOT,

    /// ':'
    COLON,

    /// ';'
    SEMICOLON,

    /// '-'
    MINUS,

    /// '+'
    PLUS,

    /// '/'
    SLASH,

    /// '*'
    STAR,

    /// '^' (exponentiation)
    CARET,

    /// '%'
    PERCENT,

    /// '&' (scanned but rejected by the parser; only '&&' is meaningful)
    AMPERSAND,

    /// '!'
    BANG,

    /// '!='
    BANG_EQUAL,

    /// '='
    EQUAL,

    /// '=='
    EQUAL_EQUAL,

    /// '&&'
    AND,

    /// '||'
    OR,

    /// '++'
    INCREMENT,

    /// '--'
    DECREMENT,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// A user-defined identifier
    IDENTIFIER,

    /// A string literal (contents without quotes)
    STRING(String),

    /// An integer literal, already normalized to f64
    INTEGER(f64),

    /// A float literal
    FLOAT(f64),

    /// 'reka' - mutable variable declaration
    REKA,

    /// 'ntahinduka' - constant variable declaration
    NTAHINDUKA,

    /// 'niba' - conditional
    NIBA,

    /// 'nanone_niba' - alternate conditional ("else if")
    NANONE_NIBA,

    /// 'niba_byanze' - final else
    NIBA_BYANZE,

    /// 'subiramo_niba' - pre-test loop
    SUBIRAMO_NIBA,

    /// 'porogaramu_ntoya' - function declaration
    POROGARAMU_NTOYA,

    /// 'tanga' - return
    TANGA,

    /// 'gereranya' - switch
    GERERANYA,

    /// 'usanze' - switch case
    USANZE,

    /// 'ibindi' - switch default
    IBINDI,

    /// End-of-file marker
    EOF,
}

impl TokenType {
    /// Variant name without payloads, used by `Display` and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::LEFT_PAREN => "LEFT_PAREN",
            TokenType::RIGHT_PAREN => "RIGHT_PAREN",
            TokenType::LEFT_BRACE => "LEFT_BRACE",
            TokenType::RIGHT_BRACE => "RIGHT_BRACE",
            TokenType::LEFT_BRACKET => "LEFT_BRACKET",
            TokenType::RIGHT_BRACKET => "RIGHT_BRACKET",
            TokenType::COMMA => "COMMA",
            TokenType::DOT => "DOT",
            TokenType::COLON => "COLON",
            TokenType::SEMICOLON => "SEMICOLON",
            TokenType::MINUS => "MINUS",
            TokenType::PLUS => "PLUS",
            TokenType::SLASH => "SLASH",
            TokenType::STAR => "STAR",
            TokenType::CARET => "CARET",
            TokenType::PERCENT => "PERCENT",
            TokenType::AMPERSAND => "AMPERSAND",
            TokenType::BANG => "BANG",
            TokenType::BANG_EQUAL => "BANG_EQUAL",
            TokenType::EQUAL => "EQUAL",
            TokenType::EQUAL_EQUAL => "EQUAL_EQUAL",
            TokenType::AND => "AND",
            TokenType::OR => "OR",
            TokenType::INCREMENT => "INCREMENT",
            TokenType::DECREMENT => "DECREMENT",
            TokenType::GREATER => "GREATER",
            TokenType::GREATER_EQUAL => "GREATER_EQUAL",
            TokenType::LESS => "LESS",
            TokenType::LESS_EQUAL => "LESS_EQUAL",
            TokenType::IDENTIFIER => "IDENTIFIER",
            TokenType::STRING(_) => "STRING",
            TokenType::INTEGER(_) => "INTEGER",
            TokenType::FLOAT(_) => "FLOAT",
            TokenType::REKA => "REKA",
            TokenType::NTAHINDUKA => "NTAHINDUKA",
            TokenType::NIBA => "NIBA",
            TokenType::NANONE_NIBA => "NANONE_NIBA",
            TokenType::NIBA_BYANZE => "NIBA_BYANZE",
            TokenType::SUBIRAMO_NIBA => "SUBIRAMO_NIBA",
            TokenType::POROGARAMU_NTOYA => "POROGARAMU_NTOYA",
            TokenType::TANGA => "TANGA",
            TokenType::GERERANYA => "GERERANYA",
            TokenType::USANZE => "USANZE",
            TokenType::IBINDI => "IBINDI",
            TokenType::EOF => "EOF",
        }
    }
}

impl PartialEq for TokenType {
    /// Two TokenTypes are equal if they share the same variant
    /// (ignoring any inner data). Uses `mem::discriminant` to compare.
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

/// A scanned token, including its type, the original lexeme,
/// and the line number where it was found.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token<'a> {
    /// The category of this token.
    pub token_type: TokenType,

    /// The exact substring from the source that produced this token.
    pub lexeme: &'a str,

    /// 1-based line number in the source.
    pub line: usize,
}

impl<'a> Token<'a> {
    /// Create a new Token with the given type, lexeme, and line.
    pub fn new(token_type: TokenType, lexeme: &'a str, line: usize) -> Self {
        debug!(
            "Creating new token: type={:?}, lexeme={}, line={}",
            token_type, lexeme, line
        );

        Self {
            token_type,
            lexeme,
            line,
        }
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token_type {
            TokenType::STRING(s) => {
                write!(f, "{} {} {}", self.token_type.name(), self.lexeme, s)
            }

            TokenType::INTEGER(n) | TokenType::FLOAT(n) => {
                // 3 -> "3.0", 3.14 -> "3.14" (integral values keep one digit
                // of fraction so the normalized f64 stays visible)
                if n.fract() == 0.0 {
                    let mut buf: itoa::Buffer = itoa::Buffer::new();

                    write!(
                        f,
                        "{} {} {}.0",
                        self.token_type.name(),
                        self.lexeme,
                        buf.format(*n as i64)
                    )
                } else {
                    write!(f, "{} {} {}", self.token_type.name(), self.lexeme, n)
                }
            }

            _ => write!(f, "{} {} null", self.token_type.name(), self.lexeme),
        }
    }
}
