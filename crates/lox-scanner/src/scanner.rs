//! Scanner for the Lox scripting language.

use crate::diagnostics::{Diagnostic, ErrorSink};
use crate::token::{lookup_identifier, Literal, Token, TokenKind};
use thiserror::Error;
use tracing::{debug, trace};
use unicode_general_category::{get_general_category, GeneralCategory};

/// Errors that can occur during scanning.
///
/// None of these stop the scan. They are forwarded to the [`ErrorSink`]
/// and scanning resumes with the next character.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unexpected character.")]
    UnexpectedCharacter { ch: char, line: usize },

    #[error("Unterminated string.")]
    UnterminatedString { line: usize },

    #[error("Invalid number literal: {lexeme}")]
    InvalidNumber { lexeme: String, line: usize },
}

impl LexError {
    /// The 1-indexed line the error is reported at.
    pub fn line(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { line, .. }
            | LexError::UnterminatedString { line }
            | LexError::InvalidNumber { line, .. } => *line,
        }
    }
}

/// Position bookkeeping for a single scan.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    /// Offset of the first character of the token being scanned.
    start: usize,
    /// Offset of the next unread character.
    current: usize,
    /// 1-indexed line of `current`.
    line: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            start: 0,
            current: 0,
            line: 1,
        }
    }
}

/// Scanner turns Lox source into tokens.
///
/// A scanner is single-use: [`Scanner::scan_tokens`] consumes it.
pub struct Scanner<S> {
    chars: Vec<char>,
    cursor: Cursor,
    tokens: Vec<Token>,
    sink: S,
    errors: usize,
}

impl<S: ErrorSink> Scanner<S> {
    /// Create a new scanner that reports errors to `sink`.
    pub fn new(source: &str, sink: S) -> Self {
        Self {
            chars: source.chars().collect(),
            cursor: Cursor::default(),
            tokens: Vec::new(),
            sink,
            errors: 0,
        }
    }

    /// Scan the whole source. The result always ends with a single EOF token.
    #[tracing::instrument(level = "debug", skip_all, fields(chars = self.chars.len()))]
    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.cursor.start = self.cursor.current;
            match self.scan_token() {
                Ok(Some(token)) => {
                    trace!(line = token.line, %token, "token");
                    self.tokens.push(token);
                }
                Ok(None) => {}
                Err(err) => self.report(err),
            }
        }
        self.tokens.push(Token::eof(self.cursor.line));
        debug!(
            tokens = self.tokens.len(),
            errors = self.errors,
            "scan complete"
        );
        self.tokens
    }

    fn report(&mut self, err: LexError) {
        debug!(line = err.line(), %err, "lexical error");
        self.errors += 1;
        self.sink.record(err.line(), &err.to_string());
    }

    /// Scan one lexeme starting at `cursor.start`.
    ///
    /// Returns `Ok(None)` for input that produces no token (whitespace,
    /// newlines, comments).
    fn scan_token(&mut self) -> Result<Option<Token>, LexError> {
        let ch = self.advance();
        let token = match ch {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            '{' => self.make_token(TokenKind::LeftBrace),
            '}' => self.make_token(TokenKind::RightBrace),
            ',' => self.make_token(TokenKind::Comma),
            '.' => self.make_token(TokenKind::Dot),
            '-' => self.make_token(TokenKind::Minus),
            '+' => self.make_token(TokenKind::Plus),
            ';' => self.make_token(TokenKind::Semicolon),
            '*' => self.make_token(TokenKind::Star),
            '!' => self.read_operator(TokenKind::BangEqual, TokenKind::Bang),
            '=' => self.read_operator(TokenKind::EqualEqual, TokenKind::Equal),
            '<' => self.read_operator(TokenKind::LessEqual, TokenKind::Less),
            '>' => self.read_operator(TokenKind::GreaterEqual, TokenKind::Greater),
            '/' => {
                if self.match_char('/') {
                    self.skip_to_end_of_line();
                    return Ok(None);
                }
                self.make_token(TokenKind::Slash)
            }
            ' ' | '\r' | '\t' => return Ok(None),
            '\n' => {
                self.cursor.line += 1;
                return Ok(None);
            }
            '"' => return self.read_string().map(Some),
            ch if ch.is_ascii_digit() => self.read_number()?,
            ch if is_alpha(ch) => self.read_identifier(),
            ch => {
                return Err(LexError::UnexpectedCharacter {
                    ch,
                    line: self.cursor.line,
                });
            }
        };
        Ok(Some(token))
    }

    fn is_at_end(&self) -> bool {
        self.cursor.current >= self.chars.len()
    }

    /// Consume and return the next character. Callers check `is_at_end` first.
    fn advance(&mut self) -> char {
        let ch = self.chars[self.cursor.current];
        self.cursor.current += 1;
        ch
    }

    /// Consume the next character only if it is `expected`.
    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() != expected || self.is_at_end() {
            return false;
        }
        self.cursor.current += 1;
        true
    }

    /// Peek at the next character without consuming it.
    fn peek(&self) -> char {
        self.chars.get(self.cursor.current).copied().unwrap_or('\0')
    }

    /// Peek one character past `peek`.
    fn peek_next(&self) -> char {
        self.chars.get(self.cursor.current + 1).copied().unwrap_or('\0')
    }

    fn skip_to_end_of_line(&mut self) {
        while self.peek() != '\n' && !self.is_at_end() {
            self.advance();
        }
    }

    fn lexeme(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    /// Create a token spanning `[start, current)` on the current line.
    fn make_token(&self, kind: TokenKind) -> Token {
        let lexeme = self.lexeme(self.cursor.start, self.cursor.current);
        Token::new(kind, lexeme, None, self.cursor.line)
    }

    fn make_literal(&self, kind: TokenKind, literal: Literal, line: usize) -> Token {
        let lexeme = self.lexeme(self.cursor.start, self.cursor.current);
        Token::new(kind, lexeme, Some(literal), line)
    }

    /// Pick the `=`-suffixed form when the next character is `=`.
    fn read_operator(&mut self, long: TokenKind, short: TokenKind) -> Token {
        let kind = if self.match_char('=') { long } else { short };
        self.make_token(kind)
    }

    /// Read a double-quoted string. The opening quote is already consumed.
    fn read_string(&mut self) -> Result<Token, LexError> {
        let line = self.cursor.line;
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.cursor.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return Err(LexError::UnterminatedString {
                line: self.cursor.line,
            });
        }

        self.advance(); // closing quote
        let value = self.lexeme(self.cursor.start + 1, self.cursor.current - 1);
        Ok(self.make_literal(TokenKind::String, Literal::String(value), line))
    }

    /// Read an integer or decimal number literal.
    fn read_number(&mut self) -> Result<Token, LexError> {
        self.skip_digits();

        // A trailing `.` without digits is left for the next token.
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            self.skip_digits();
        }

        let lexeme = self.lexeme(self.cursor.start, self.cursor.current);
        let value: f64 = lexeme.parse().map_err(|_| LexError::InvalidNumber {
            lexeme: lexeme.clone(),
            line: self.cursor.line,
        })?;
        Ok(self.make_literal(TokenKind::Number, Literal::Number(value), self.cursor.line))
    }

    fn skip_digits(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
    }

    /// Read an identifier or keyword.
    fn read_identifier(&mut self) -> Token {
        while is_alphanumeric(self.peek()) {
            self.advance();
        }
        let lexeme = self.lexeme(self.cursor.start, self.cursor.current);
        let kind = lookup_identifier(&lexeme);
        Token::new(kind, lexeme, None, self.cursor.line)
    }
}

/// Characters that may start an identifier: any letter category (L*).
/// Letter-numbers such as `Ⅻ` and `_` are not letters.
fn is_alpha(ch: char) -> bool {
    matches!(
        get_general_category(ch),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

/// Any decimal digit (Nd), not only ASCII.
fn is_digit(ch: char) -> bool {
    matches!(get_general_category(ch), GeneralCategory::DecimalNumber)
}

/// Characters that may continue an identifier.
fn is_alphanumeric(ch: char) -> bool {
    is_alpha(ch) || is_digit(ch) || ch == '_'
}

/// Scan `source`, reporting lexical errors to `sink`.
pub fn scan_tokens<S: ErrorSink>(source: &str, sink: S) -> Vec<Token> {
    Scanner::new(source, sink).scan_tokens()
}

/// Scan `source` and collect any lexical errors alongside the tokens.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let tokens = scan_tokens(source, &mut diagnostics);
    (tokens, diagnostics)
}
