//! Centralised error hierarchy for the **Rox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) convert their
//! internal failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow`, while still preserving rich diagnostic detail.
//!
//! The module **does not** print diagnostics itself; [`Diagnostics`] only
//! collects them for the driver.

use std::io;
use thiserror::Error;

use log::debug;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.  `context` is `" at 'lexeme'"`, `" at end"`
    /// or empty.
    #[error("[line {line}] Error{context}: {message}")]
    Parse {
        message: String,
        context: String,
        line: usize,
    },

    /// Static‑analysis failure found by the resolver.
    #[error("[line {line}] Error{context}: {message}")]
    Resolve {
        message: String,
        context: String,
        line: usize,
    },

    /// Runtime evaluation error.  Native functions may raise one without a
    /// source location.
    #[error("{message}{}", line_suffix(.line))]
    Runtime { message: String, line: Option<usize> },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("\n[line {}]", line),
        None => String::new(),
    }
}

fn context_of(token: &Token<'_>) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**, located at `token`.
    pub fn parse<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Parse error: line={}, msg={}", token.line, message);

        LoxError::Parse {
            message,
            context: context_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **resolver**, located at `token`.
    pub fn resolve<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        debug!(
            "Creating Resolve error: line={}, msg={}",
            token.line, message
        );

        LoxError::Resolve {
            message,
            context: context_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: Option<&Token<'_>>, msg: S) -> Self {
        let message: String = msg.into();
        let line: Option<usize> = token.map(|t| t.line);

        debug!("Creating Runtime error: line={:?}, msg={}", line, message);

        LoxError::Runtime { message, line }
    }

    /// Message without location decoration.
    pub fn message(&self) -> String {
        match self {
            LoxError::Lex { message, .. }
            | LoxError::Parse { message, .. }
            | LoxError::Resolve { message, .. }
            | LoxError::Runtime { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// `true` for errors that are detected before execution starts.
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            LoxError::Lex { .. } | LoxError::Parse { .. } | LoxError::Resolve { .. }
        )
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

/// Process exit code after a lex, parse or resolve error.
pub const EXIT_STATIC_ERROR: i32 = 65;

/// Process exit code after a runtime error.
pub const EXIT_RUNTIME_ERROR: i32 = 70;

/// Error sink shared by the driver and the pipeline stages.
///
/// Static errors (lex/parse/resolve) and runtime errors are tracked with
/// separate flags; [`Diagnostics::exit_code`] maps them to exit codes.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<LoxError>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error, raising the static or the runtime flag by its kind.
    pub fn report(&mut self, error: LoxError) {
        debug!("Reporting: {}", error);

        if error.is_static() {
            self.had_error = true;
        } else {
            self.had_runtime_error = true;
        }
        self.errors.push(error);
    }

    /// Record a batch of static errors.
    pub fn extend<I: IntoIterator<Item = LoxError>>(&mut self, errors: I) {
        for error in errors {
            self.report(error);
        }
    }

    /// Record an error raised while interpreting.  I/O failures during a
    /// run count as runtime errors too.
    pub fn runtime_error(&mut self, error: LoxError) {
        debug!("Reporting runtime error: {}", error);

        self.had_runtime_error = true;
        self.errors.push(error);
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Exit code for the errors seen so far; static errors win.
    pub fn exit_code(&self) -> Option<i32> {
        if self.had_error {
            Some(EXIT_STATIC_ERROR)
        } else if self.had_runtime_error {
            Some(EXIT_RUNTIME_ERROR)
        } else {
            None
        }
    }

    pub fn errors(&self) -> &[LoxError] {
        &self.errors
    }

    /// Forget everything reported so far (the REPL calls this per line).
    pub fn reset(&mut self) {
        self.errors.clear();
        self.had_error = false;
        self.had_runtime_error = false;
    }
}
