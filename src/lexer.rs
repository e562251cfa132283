//! Lexical analysis for MicroScala.
//!
//! This module provides tokenization of MicroScala source text into a
//! stream of tokens that can be consumed by the parser. Productions are
//! tried in a fixed priority order with longest-match tie breaking, so
//! `::` wins over `:`, `<=` over `<`, and `!=` over `!`.
//!
//! Keywords are only recognized at word boundaries: `iffy` is an
//! identifier, not `if` followed by `fy`.
//!
//! # Example
//!
//! ```rust
//! use microscala::lexer::{Lexer, TokenKind};
//!
//! let mut lexer = Lexer::new("object Main { }");
//!
//! assert_eq!(lexer.next_token().kind, TokenKind::Object);
//! assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
//! assert_eq!(lexer.next_token().kind, TokenKind::LeftBrace);
//! assert_eq!(lexer.next_token().kind, TokenKind::RightBrace);
//! assert_eq!(lexer.next_token().kind, TokenKind::Eof);
//! ```
//!
//! # Token Types
//!
//! The lexer recognizes:
//! - **Keywords**: `object`, `def`, `main`, `var`, `if`, `else`, `while`,
//!   `println`, `return`, `Int`, `List`, `Array`, `String`, `Nil`, `args`
//! - **List methods**: `head`, `tail`, `isEmpty`
//! - **Operators**: `:: || && ! == != < <= > >= + - * / =`
//! - **Delimiters**: `{ } [ ] ( ) ; : . ,`
//! - **Identifiers**: a letter followed by groups of an optional
//!   underscore and one or more alphanumerics
//! - **Integers**: decimal digit runs
//!
//! Whitespace and `//` line comments are consumed but never emitted.

use crate::ast::Span;
use crate::error::LexError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A lexical token produced by the lexer.
///
/// Tokens carry their kind, the exact matched source text (lexeme), and
/// source location information for error reporting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    /// The category of this token
    pub kind: TokenKind,

    /// The original source text that produced this token
    pub lexeme: String,

    /// Source location for error reporting
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }
}

impl Default for Token {
    fn default() -> Self {
        Self {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            span: Span::default(),
        }
    }
}

/// The category of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenKind {
    // === Keywords ===
    /// The `args` keyword
    Args,
    /// The `Array` keyword
    Array,
    /// The `def` keyword
    Def,
    /// The `else` keyword
    Else,
    /// The `if` keyword
    If,
    /// The `Int` keyword
    Int,
    /// The `List` keyword
    List,
    /// The `main` keyword
    Main,
    /// The `Nil` keyword
    Nil,
    /// The `object` keyword
    Object,
    /// The `println` keyword
    Println,
    /// The `return` keyword
    Return,
    /// The `String` keyword
    String,
    /// The `var` keyword
    Var,
    /// The `while` keyword
    While,

    // === List Methods ===
    /// The `head` method name
    Head,
    /// The `tail` method name
    Tail,
    /// The `isEmpty` method name
    IsEmpty,

    // === Operators ===
    /// List construction `::`
    Cons,
    /// Logical or `||`
    Or,
    /// Logical and `&&`
    And,
    /// Logical not `!`
    Not,
    /// Assignment `=`
    Assign,
    /// Plus `+`
    Plus,
    /// Minus `-`
    Minus,
    /// Star/multiply `*`
    Star,
    /// Slash/divide `/`
    Slash,
    /// Less than `<`
    Lt,
    /// Less than or equal `<=`
    Le,
    /// Greater than `>`
    Gt,
    /// Greater than or equal `>=`
    Ge,
    /// Equality `==`
    Eq,
    /// Not equal `!=`
    Ne,

    // === Delimiters ===
    /// Left brace `{`
    LeftBrace,
    /// Right brace `}`
    RightBrace,
    /// Left bracket `[`
    LeftBracket,
    /// Right bracket `]`
    RightBracket,
    /// Left parenthesis `(`
    LeftParen,
    /// Right parenthesis `)`
    RightParen,
    /// Semicolon `;`
    Semicolon,
    /// Colon `:`
    Colon,
    /// Member access `.`
    Dot,
    /// Comma `,`
    Comma,

    // === Literals ===
    /// An identifier
    Identifier,
    /// An integer literal
    Integer,

    // === Special ===
    /// End of file
    Eof,
    /// Unrecognized input
    Unknown,
}

impl TokenKind {
    /// Returns true if this is a reserved word.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Args
                | TokenKind::Array
                | TokenKind::Def
                | TokenKind::Else
                | TokenKind::If
                | TokenKind::Int
                | TokenKind::List
                | TokenKind::Main
                | TokenKind::Nil
                | TokenKind::Object
                | TokenKind::Println
                | TokenKind::Return
                | TokenKind::String
                | TokenKind::Var
                | TokenKind::While
                | TokenKind::Head
                | TokenKind::Tail
                | TokenKind::IsEmpty
        )
    }

    /// Returns true if this is one of the `head`/`tail`/`isEmpty` method
    /// names.
    pub fn is_list_method(&self) -> bool {
        matches!(self, TokenKind::Head | TokenKind::Tail | TokenKind::IsEmpty)
    }

    /// Returns true if this is a relational operator.
    pub fn is_relop(&self) -> bool {
        matches!(
            self,
            TokenKind::Lt
                | TokenKind::Le
                | TokenKind::Gt
                | TokenKind::Ge
                | TokenKind::Eq
                | TokenKind::Ne
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Args => write!(f, "args"),
            TokenKind::Array => write!(f, "Array"),
            TokenKind::Def => write!(f, "def"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Int => write!(f, "Int"),
            TokenKind::List => write!(f, "List"),
            TokenKind::Main => write!(f, "main"),
            TokenKind::Nil => write!(f, "Nil"),
            TokenKind::Object => write!(f, "object"),
            TokenKind::Println => write!(f, "println"),
            TokenKind::Return => write!(f, "return"),
            TokenKind::String => write!(f, "String"),
            TokenKind::Var => write!(f, "var"),
            TokenKind::While => write!(f, "while"),
            TokenKind::Head => write!(f, "head"),
            TokenKind::Tail => write!(f, "tail"),
            TokenKind::IsEmpty => write!(f, "isEmpty"),
            TokenKind::Cons => write!(f, "::"),
            TokenKind::Or => write!(f, "||"),
            TokenKind::And => write!(f, "&&"),
            TokenKind::Not => write!(f, "!"),
            TokenKind::Assign => write!(f, "="),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::Le => write!(f, "<="),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::Ge => write!(f, ">="),
            TokenKind::Eq => write!(f, "=="),
            TokenKind::Ne => write!(f, "!="),
            TokenKind::LeftBrace => write!(f, "{{"),
            TokenKind::RightBrace => write!(f, "}}"),
            TokenKind::LeftBracket => write!(f, "["),
            TokenKind::RightBracket => write!(f, "]"),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Integer => write!(f, "integer"),
            TokenKind::Eof => write!(f, "end of file"),
            TokenKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// The lexer for MicroScala source text.
///
/// The lexer maintains internal state as it scans through source text,
/// producing tokens on demand. Whitespace and `//` comments are consumed
/// automatically. The column counter resets at every line boundary, so a
/// token's column is its character offset within its own line, which the
/// caret diagnostics rely on.
///
/// # Example
///
/// ```rust
/// use microscala::lexer::Lexer;
///
/// let lexer = Lexer::new("println(1 :: 2 :: Nil);");
/// let tokens: Vec<_> = lexer.collect();
///
/// assert_eq!(tokens.len(), 9);
/// ```
pub struct Lexer<'a> {
    /// The source text being tokenized
    source: &'a str,

    /// Remaining source to process
    remaining: &'a str,

    /// Current byte position in source
    position: usize,

    /// Current line number (1-indexed)
    line: usize,

    /// Current column number (1-indexed, reset at line boundaries)
    column: usize,

    /// Accumulated errors
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text.
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            remaining: source,
            position: 0,
            line: 1,
            column: 1,
            errors: Vec::new(),
        }
    }

    /// Returns any errors accumulated during lexing.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// Returns true if only whitespace and comments remain.
    pub fn at_end(&self) -> bool {
        let mut rest = self.remaining;
        loop {
            rest = rest.trim_start_matches([' ', '\t', '\n']);
            match rest.strip_prefix("//") {
                Some(stripped) => {
                    rest = stripped.split_once('\n').map_or("", |(_, tail)| tail);
                }
                None => return rest.is_empty(),
            }
        }
    }

    /// Produces the next token from the source.
    ///
    /// Advances the lexer position and returns the next token. Returns a
    /// `TokenKind::Eof` token once the source is exhausted, and a
    /// `TokenKind::Unknown` token for input no production matches.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        if self.remaining.is_empty() {
            return Token::new(
                TokenKind::Eof,
                "",
                Span::new(self.position, self.position, self.line, self.column),
            );
        }

        let start_pos = self.position;
        let start_line = self.line;
        let start_col = self.column;

        if let Some(token) = self.try_operator() {
            return token;
        }

        if let Some(token) = self.try_keyword_or_identifier() {
            return token;
        }

        if let Some(token) = self.try_integer() {
            return token;
        }

        // No production matches: emit Unknown, which the parser treats as
        // fatal at its next expectation.
        let ch = match self.remaining.chars().next() {
            Some(ch) => ch,
            None => {
                return Token::new(
                    TokenKind::Eof,
                    "",
                    Span::new(self.position, self.position, self.line, self.column),
                )
            }
        };
        self.advance(ch.len_utf8());

        let span = Span::new(start_pos, self.position, start_line, start_col);
        self.errors.push(LexError::UnexpectedChar { ch, span });

        Token::new(TokenKind::Unknown, ch.to_string(), span)
    }

    /// Skips whitespace and `//` line comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            let before = self.remaining.len();
            self.skip_whitespace();

            if self.remaining.starts_with("//") {
                self.skip_line_comment();
            }

            if self.remaining.len() == before {
                break;
            }
        }
    }

    /// Skips space, tab, and newline characters.
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.remaining.chars().next() {
            if matches!(ch, ' ' | '\t' | '\n') {
                self.advance(1);
            } else {
                break;
            }
        }
    }

    /// Skips a single-line comment up to (not including) the newline.
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.remaining.chars().next() {
            if ch == '\n' {
                break;
            }
            self.advance(ch.len_utf8());
        }
    }

    /// Tries to lex an operator or delimiter.
    ///
    /// Multi-character operators are checked before their single-character
    /// prefixes, preserving the priority order of the token table: `::`
    /// before `:`, `<=`/`>=`/`==`/`!=` before `<`/`>`/`=`/`!`.
    fn try_operator(&mut self) -> Option<Token> {
        let start_pos = self.position;
        let start_line = self.line;
        let start_col = self.column;

        let (kind, len) = if self.remaining.starts_with("::") {
            (TokenKind::Cons, 2)
        } else if self.remaining.starts_with("||") {
            (TokenKind::Or, 2)
        } else if self.remaining.starts_with("&&") {
            (TokenKind::And, 2)
        } else if self.remaining.starts_with("<=") {
            (TokenKind::Le, 2)
        } else if self.remaining.starts_with(">=") {
            (TokenKind::Ge, 2)
        } else if self.remaining.starts_with("==") {
            (TokenKind::Eq, 2)
        } else if self.remaining.starts_with("!=") {
            (TokenKind::Ne, 2)
        } else if self.remaining.starts_with(';') {
            (TokenKind::Semicolon, 1)
        } else if self.remaining.starts_with(':') {
            (TokenKind::Colon, 1)
        } else if self.remaining.starts_with('.') {
            (TokenKind::Dot, 1)
        } else if self.remaining.starts_with(',') {
            (TokenKind::Comma, 1)
        } else if self.remaining.starts_with('{') {
            (TokenKind::LeftBrace, 1)
        } else if self.remaining.starts_with('}') {
            (TokenKind::RightBrace, 1)
        } else if self.remaining.starts_with('[') {
            (TokenKind::LeftBracket, 1)
        } else if self.remaining.starts_with(']') {
            (TokenKind::RightBracket, 1)
        } else if self.remaining.starts_with('(') {
            (TokenKind::LeftParen, 1)
        } else if self.remaining.starts_with(')') {
            (TokenKind::RightParen, 1)
        } else if self.remaining.starts_with('<') {
            (TokenKind::Lt, 1)
        } else if self.remaining.starts_with('>') {
            (TokenKind::Gt, 1)
        } else if self.remaining.starts_with('!') {
            (TokenKind::Not, 1)
        } else if self.remaining.starts_with('+') {
            (TokenKind::Plus, 1)
        } else if self.remaining.starts_with('-') {
            (TokenKind::Minus, 1)
        } else if self.remaining.starts_with('*') {
            (TokenKind::Star, 1)
        } else if self.remaining.starts_with('/') {
            // A comment start never reaches here, but keep division safe
            if self.remaining.starts_with("//") {
                return None;
            }
            (TokenKind::Slash, 1)
        } else if self.remaining.starts_with('=') {
            (TokenKind::Assign, 1)
        } else {
            return None;
        };

        let lexeme = self.remaining[..len].to_string();
        self.advance(len);

        Some(Token::new(
            kind,
            lexeme,
            Span::new(start_pos, self.position, start_line, start_col),
        ))
    }

    /// Tries to lex a keyword or identifier.
    ///
    /// Identifiers follow `[A-Za-z](_?[A-Za-z0-9]+)*`: a letter, then
    /// groups of an optional underscore and at least one alphanumeric.
    /// Trailing or doubled underscores stop the match. The matched lexeme
    /// is then checked against the reserved-word table, so keywords only
    /// apply at word boundaries.
    fn try_keyword_or_identifier(&mut self) -> Option<Token> {
        let bytes = self.remaining.as_bytes();
        if !bytes.first()?.is_ascii_alphabetic() {
            return None;
        }

        let mut len = 1;
        loop {
            let mut probe = len;
            if probe < bytes.len() && bytes[probe] == b'_' {
                probe += 1;
            }
            let run_start = probe;
            while probe < bytes.len() && bytes[probe].is_ascii_alphanumeric() {
                probe += 1;
            }
            if probe == run_start {
                break;
            }
            len = probe;
        }

        let start_pos = self.position;
        let start_line = self.line;
        let start_col = self.column;

        let lexeme = self.remaining[..len].to_string();
        self.advance(len);

        let kind = keyword_kind(&lexeme).unwrap_or(TokenKind::Identifier);

        Some(Token::new(
            kind,
            lexeme,
            Span::new(start_pos, self.position, start_line, start_col),
        ))
    }

    /// Tries to lex an integer literal.
    fn try_integer(&mut self) -> Option<Token> {
        let bytes = self.remaining.as_bytes();
        if !bytes.first()?.is_ascii_digit() {
            return None;
        }

        let mut len = 1;
        while len < bytes.len() && bytes[len].is_ascii_digit() {
            len += 1;
        }

        let start_pos = self.position;
        let start_line = self.line;
        let start_col = self.column;

        let lexeme = self.remaining[..len].to_string();
        self.advance(len);

        Some(Token::new(
            TokenKind::Integer,
            lexeme,
            Span::new(start_pos, self.position, start_line, start_col),
        ))
    }

    /// Advances the lexer by the given number of bytes.
    fn advance(&mut self, bytes: usize) {
        let consumed = &self.remaining[..bytes];
        for ch in consumed.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position += bytes;
        self.remaining = &self.source[self.position..];
    }
}

/// Returns the keyword kind for a lexeme, if it is a reserved word.
fn keyword_kind(lexeme: &str) -> Option<TokenKind> {
    match lexeme {
        "args" => Some(TokenKind::Args),
        "Array" => Some(TokenKind::Array),
        "def" => Some(TokenKind::Def),
        "else" => Some(TokenKind::Else),
        "if" => Some(TokenKind::If),
        "Int" => Some(TokenKind::Int),
        "List" => Some(TokenKind::List),
        "main" => Some(TokenKind::Main),
        "Nil" => Some(TokenKind::Nil),
        "object" => Some(TokenKind::Object),
        "println" => Some(TokenKind::Println),
        "return" => Some(TokenKind::Return),
        "String" => Some(TokenKind::String),
        "var" => Some(TokenKind::Var),
        "while" => Some(TokenKind::While),
        "head" => Some(TokenKind::Head),
        "tail" => Some(TokenKind::Tail),
        "isEmpty" => Some(TokenKind::IsEmpty),
        _ => None,
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let mut lexer = Lexer::new("object def var while");
        assert_eq!(lexer.next_token().kind, TokenKind::Object);
        assert_eq!(lexer.next_token().kind, TokenKind::Def);
        assert_eq!(lexer.next_token().kind, TokenKind::Var);
        assert_eq!(lexer.next_token().kind, TokenKind::While);
    }

    #[test]
    fn test_keyword_word_boundary() {
        let mut lexer = Lexer::new("iffy mainframe Nile");
        for expected in ["iffy", "mainframe", "Nile"] {
            let token = lexer.next_token();
            assert_eq!(token.kind, TokenKind::Identifier);
            assert_eq!(token.lexeme, expected);
        }
    }

    #[test]
    fn test_identifier_shape() {
        let mut lexer = Lexer::new("a_b_c x1 y");
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.lexeme, "a_b_c");
        assert_eq!(lexer.next_token().lexeme, "x1");
        assert_eq!(lexer.next_token().lexeme, "y");
    }

    #[test]
    fn test_identifier_rejects_trailing_underscore() {
        // "a_" matches only "a"; the stray underscore is Unknown
        let mut lexer = Lexer::new("a_");
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.lexeme, "a");
        assert_eq!(lexer.next_token().kind, TokenKind::Unknown);
        assert_eq!(lexer.errors().len(), 1);
    }

    #[test]
    fn test_cons_vs_colon() {
        let mut lexer = Lexer::new(":: : ::");
        assert_eq!(lexer.next_token().kind, TokenKind::Cons);
        assert_eq!(lexer.next_token().kind, TokenKind::Colon);
        assert_eq!(lexer.next_token().kind, TokenKind::Cons);
    }

    #[test]
    fn test_relops_before_not_and_assign() {
        let mut lexer = Lexer::new("!= ! == = <= < >= >");
        assert_eq!(lexer.next_token().kind, TokenKind::Ne);
        assert_eq!(lexer.next_token().kind, TokenKind::Not);
        assert_eq!(lexer.next_token().kind, TokenKind::Eq);
        assert_eq!(lexer.next_token().kind, TokenKind::Assign);
        assert_eq!(lexer.next_token().kind, TokenKind::Le);
        assert_eq!(lexer.next_token().kind, TokenKind::Lt);
        assert_eq!(lexer.next_token().kind, TokenKind::Ge);
        assert_eq!(lexer.next_token().kind, TokenKind::Gt);
    }

    #[test]
    fn test_comments_skipped() {
        let mut lexer = Lexer::new("var // trailing words ; { }\nx");
        assert_eq!(lexer.next_token().kind, TokenKind::Var);
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.lexeme, "x");
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_integer() {
        let mut lexer = Lexer::new("0 42 007");
        for expected in ["0", "42", "007"] {
            let token = lexer.next_token();
            assert_eq!(token.kind, TokenKind::Integer);
            assert_eq!(token.lexeme, expected);
        }
    }

    #[test]
    fn test_unknown_char() {
        let mut lexer = Lexer::new("x $ y");
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Unknown);
        assert_eq!(token.lexeme, "$");
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
        assert_eq!(lexer.errors().len(), 1);
    }

    #[test]
    fn test_column_resets_per_line() {
        let mut lexer = Lexer::new("var x\nvar y");
        assert_eq!(lexer.next_token().span.column, 1);
        assert_eq!(lexer.next_token().span.column, 5);
        let second_var = lexer.next_token();
        assert_eq!(second_var.span.line, 2);
        assert_eq!(second_var.span.column, 1);
        assert_eq!(lexer.next_token().span.column, 5);
    }

    #[test]
    fn test_at_end() {
        let mut lexer = Lexer::new("x  // comment\n  ");
        assert!(!lexer.at_end());
        lexer.next_token();
        assert!(lexer.at_end());
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_eof_is_repeated() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_method_call_lexing() {
        let mut lexer = Lexer::new("xs.head.isEmpty");
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
        assert_eq!(lexer.next_token().kind, TokenKind::Dot);
        assert_eq!(lexer.next_token().kind, TokenKind::Head);
        assert_eq!(lexer.next_token().kind, TokenKind::Dot);
        assert_eq!(lexer.next_token().kind, TokenKind::IsEmpty);
    }
}
