//! Lox scanner - tokenization for the Lox scripting language.
//!
//! This crate turns Lox source text into the token sequence consumed by a
//! parser. Lexical errors are reported through an [`ErrorSink`] and never
//! stop the scan, so one call surfaces every problem in the input.
//!
//! # Example
//!
//! ```
//! use lox_scanner::{tokenize, Literal, TokenKind};
//!
//! let (tokens, errors) = tokenize("var x = 10;");
//! assert!(errors.is_empty());
//! assert_eq!(tokens[0].kind, TokenKind::Var);
//! assert_eq!(tokens[3].literal, Some(Literal::Number(10.0)));
//! assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
//! ```

pub mod diagnostics;
pub mod scanner;
pub mod token;

pub use diagnostics::{Diagnostic, ErrorSink};
pub use scanner::{scan_tokens, tokenize, LexError, Scanner};
pub use token::{keyword, lookup_identifier, Literal, Token, TokenKind};
