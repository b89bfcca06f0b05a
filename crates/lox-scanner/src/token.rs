//! Token types for the Lox scanner.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Token kinds for the Lox language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    Eof,
}

impl TokenKind {
    /// Returns true for kinds whose tokens carry a decoded literal.
    pub fn has_literal(self) -> bool {
        matches!(self, TokenKind::String | TokenKind::Number)
    }

    /// Returns true for reserved words.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::And
                | TokenKind::Class
                | TokenKind::Else
                | TokenKind::False
                | TokenKind::Fun
                | TokenKind::For
                | TokenKind::If
                | TokenKind::Nil
                | TokenKind::Or
                | TokenKind::Print
                | TokenKind::Return
                | TokenKind::Super
                | TokenKind::This
                | TokenKind::True
                | TokenKind::Var
                | TokenKind::While
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::LeftParen => "LEFT_PAREN",
            TokenKind::RightParen => "RIGHT_PAREN",
            TokenKind::LeftBrace => "LEFT_BRACE",
            TokenKind::RightBrace => "RIGHT_BRACE",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Minus => "MINUS",
            TokenKind::Plus => "PLUS",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Slash => "SLASH",
            TokenKind::Star => "STAR",
            TokenKind::Bang => "BANG",
            TokenKind::BangEqual => "BANG_EQUAL",
            TokenKind::Equal => "EQUAL",
            TokenKind::EqualEqual => "EQUAL_EQUAL",
            TokenKind::Greater => "GREATER",
            TokenKind::GreaterEqual => "GREATER_EQUAL",
            TokenKind::Less => "LESS",
            TokenKind::LessEqual => "LESS_EQUAL",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::And => "AND",
            TokenKind::Class => "CLASS",
            TokenKind::Else => "ELSE",
            TokenKind::False => "FALSE",
            TokenKind::Fun => "FUN",
            TokenKind::For => "FOR",
            TokenKind::If => "IF",
            TokenKind::Nil => "NIL",
            TokenKind::Or => "OR",
            TokenKind::Print => "PRINT",
            TokenKind::Return => "RETURN",
            TokenKind::Super => "SUPER",
            TokenKind::This => "THIS",
            TokenKind::True => "TRUE",
            TokenKind::Var => "VAR",
            TokenKind::While => "WHILE",
            TokenKind::Eof => "EOF",
        };
        write!(f, "{}", s)
    }
}

/// Reserved words, built on first use and never mutated.
static KEYWORDS: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    HashMap::from([
        ("and", TokenKind::And),
        ("class", TokenKind::Class),
        ("else", TokenKind::Else),
        ("false", TokenKind::False),
        ("for", TokenKind::For),
        ("fun", TokenKind::Fun),
        ("if", TokenKind::If),
        ("nil", TokenKind::Nil),
        ("or", TokenKind::Or),
        ("print", TokenKind::Print),
        ("return", TokenKind::Return),
        ("super", TokenKind::Super),
        ("this", TokenKind::This),
        ("true", TokenKind::True),
        ("var", TokenKind::Var),
        ("while", TokenKind::While),
    ])
});

/// Returns the reserved kind for `text`, if it is a keyword.
pub fn keyword(text: &str) -> Option<TokenKind> {
    KEYWORDS.get(text).copied()
}

/// Look up an identifier to see if it's a keyword.
pub fn lookup_identifier(ident: &str) -> TokenKind {
    keyword(ident).unwrap_or(TokenKind::Identifier)
}

/// Decoded value of a string or number token.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{}", s),
            // Integral values keep a trailing `.0` so numbers read as floats.
            Literal::Number(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{:.1}", n),
            Literal::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A token produced by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The exact source text the token was scanned from.
    pub lexeme: String,
    /// Decoded value, present only for string and number tokens.
    pub literal: Option<Literal>,
    /// 1-indexed line of the token's first character.
    pub line: usize,
}

impl Token {
    /// Create a new Token.
    pub fn new(kind: TokenKind, lexeme: String, literal: Option<Literal>, line: usize) -> Self {
        Self {
            kind,
            lexeme,
            literal,
            line,
        }
    }

    /// Create the end-of-input marker.
    pub fn eof(line: usize) -> Self {
        Self::new(TokenKind::Eof, String::new(), None, line)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Some(literal) => write!(f, "{} {} {}", self.kind, self.lexeme, literal),
            None => write!(f, "{} {} null", self.kind, self.lexeme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_identifier() {
        assert_eq!(lookup_identifier("var"), TokenKind::Var);
        assert_eq!(lookup_identifier("while"), TokenKind::While);
        assert_eq!(lookup_identifier("foo"), TokenKind::Identifier);
        assert_eq!(lookup_identifier("Var"), TokenKind::Identifier);
        assert_eq!(lookup_identifier("classy"), TokenKind::Identifier);
    }

    #[test]
    fn test_keyword_table_is_complete() {
        for word in [
            "and", "class", "else", "false", "for", "fun", "if", "nil", "or", "print", "return",
            "super", "this", "true", "var", "while",
        ] {
            let kind = keyword(word).unwrap();
            assert!(kind.is_keyword(), "{word} mapped to non-keyword {kind}");
        }
        assert_eq!(keyword("let"), None);
    }

    #[test]
    fn test_kind_classes() {
        assert!(TokenKind::String.has_literal());
        assert!(TokenKind::Number.has_literal());
        assert!(!TokenKind::Identifier.has_literal());
        assert!(!TokenKind::Identifier.is_keyword());
        assert!(!TokenKind::Eof.is_keyword());
        assert!(TokenKind::And.is_keyword());
        assert!(TokenKind::While.is_keyword());
        assert!(!TokenKind::Number.is_keyword());
        assert!(!TokenKind::Star.is_keyword());
    }

    #[test]
    fn test_token_display() {
        let num = Token::new(TokenKind::Number, "10".into(), Some(Literal::Number(10.0)), 1);
        assert_eq!(num.to_string(), "NUMBER 10 10.0");

        let frac = Token::new(TokenKind::Number, "1.5".into(), Some(Literal::Number(1.5)), 1);
        assert_eq!(frac.to_string(), "NUMBER 1.5 1.5");

        let s = Token::new(TokenKind::String, "\"hi\"".into(), Some(Literal::String("hi".into())), 1);
        assert_eq!(s.to_string(), "STRING \"hi\" hi");

        assert_eq!(Token::eof(3).to_string(), "EOF  null");
    }
}
