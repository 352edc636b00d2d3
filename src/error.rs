//! Centralised error hierarchy for the **Kin interpreter**.
//!
//! All subsystems (scanner, parser, runtime, natives, CLI) convert their
//! internal failure modes into one of the variants defined here. This
//! enables a uniform `Result<T>` alias throughout the crate and ergonomic
//! inter-operation with `anyhow`, while still preserving rich diagnostic
//! detail.
//!
//! Every variant is unrecoverable at the point of evaluation: it propagates
//! up through the evaluator call stack to the top-level caller. Function
//! return unwinding is **not** represented here - that is ordinary control
//! flow and travels on the interpreter's completion channel instead.
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::info;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KinError {
    /// Lexical (scanner) error with source line information:
    /// unterminated string literal or unrecognized character.
    #[error("[line {line}] Kin Error: {message}")]
    Lex {
        /// Human-readable description.
        message: String,

        /// 1-based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error: unexpected token, missing expected token
    /// kind, or a malformed declaration.
    #[error("[line {line}] Kin Error: {message}")]
    Parse { message: String, line: usize },

    /// Name-resolution failure: undeclared identifier referenced or
    /// assigned, same-scope redeclaration, or assignment to a constant.
    #[error("Kin Error: {0}")]
    Resolution(String),

    /// Runtime type failure: operator applied to incompatible operand
    /// kinds, calling a non-callable value, arity mismatch, or member
    /// access on a non-object.
    #[error("Kin Error: {0}")]
    Type(String),

    /// Opaque failure surfaced by a native function (file not found,
    /// subprocess failure, ...).
    #[error("Kin Error: {0}")]
    Native(String),

    /// Wrapper around `std::io::Error` (transparent). Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl KinError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        KinError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", line, message);

        KinError::Parse { message, line }
    }

    /// Helper constructor for **name-resolution** failures.
    pub fn resolution<S: Into<String>>(msg: S) -> Self {
        KinError::Resolution(msg.into())
    }

    /// Helper constructor for **runtime type** failures.
    pub fn type_error<S: Into<String>>(msg: S) -> Self {
        KinError::Type(msg.into())
    }

    /// Helper constructor for **native function** failures.
    pub fn native<S: Into<String>>(msg: S) -> Self {
        KinError::Native(msg.into())
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, KinError>;
