//! C2: the token scanner.
//!
//! Hand-written, character-at-a-time scanner (peek/advance over a char cursor, longest-match
//! operators, position-tagged tokens), matching the hand-rolled recursive-descent front ends
//! seen elsewhere in the corpus rather than reaching for a lexer-generator crate. §4.1 of the
//! design document pins down the exact lexical grammar this implements.

use std::fmt;

use crate::error::XoomonkError;

/// A source position: 1-indexed line and column, plus the byte offset used internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub(crate) offset: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The kind of a token, matching §4.1's closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Operator,
    Integer,
    String,
    Identifier,
    Unknown,
    Eof,
}

/// A scanned token: its kind, its lexeme, and where it started in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }
}

/// Operators recognised by the scanner, longest lexeme first so `:=` is not mistaken for
/// two single-character tokens.
const OPERATORS: &[&str] = &[":=", ";", "{", "}", "*", ".", "^", "$"];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Produces tokens lazily, one at a time, from a source string.
pub struct Lexer<'src> {
    source: &'src str,
    chars: Vec<(usize, char)>,
    index: usize,
    line: u32,
    column: u32,
    current: Token,
    /// One token of lookahead beyond `current`, filled on demand by `peek2`. The parser
    /// needs this to disambiguate a leading `print` keyword from a variable named `print`
    /// (see the `stmt` production in §4.2): both start with an `Identifier("print")`
    /// token, and only the token after it tells them apart.
    lookahead: Option<Token>,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer positioned at the first token of `source`.
    ///
    /// # Errors
    /// Returns a `SyntaxError` if the very first token is an unterminated string literal.
    pub fn new(source: &'src str) -> Result<Self, XoomonkError> {
        let chars: Vec<(usize, char)> = source.char_indices().collect();
        let mut lexer = Self {
            source,
            chars,
            index: 0,
            line: 1,
            column: 1,
            current: Token::new(TokenKind::Eof, "", Position { line: 1, column: 1, offset: 0 }),
            lookahead: None,
        };
        lexer.current = lexer.scan()?;
        Ok(lexer)
    }

    /// The current token, without consuming it.
    #[must_use]
    pub fn peek(&self) -> &Token {
        &self.current
    }

    #[must_use]
    pub fn peek_kind(&self) -> TokenKind {
        self.current.kind
    }

    /// The token after the current one, without consuming either.
    ///
    /// # Errors
    /// Returns a `SyntaxError` if scanning that token fails (e.g. an unterminated string).
    pub fn peek2(&mut self) -> Result<&Token, XoomonkError> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.scan()?);
        }
        Ok(self.lookahead.as_ref().expect("just filled"))
    }

    /// Consumes the current token and scans the next one.
    ///
    /// # Errors
    /// Returns a `SyntaxError` if the next token is an unterminated string literal.
    pub fn advance(&mut self) -> Result<Token, XoomonkError> {
        let next = match self.lookahead.take() {
            Some(token) => token,
            None => self.scan()?,
        };
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Advances iff the current token's lexeme matches `lexeme`, else returns a syntax error.
    ///
    /// # Errors
    /// Returns a `SyntaxError` naming the expected lexeme and the one actually found.
    pub fn expect(&mut self, lexeme: &str) -> Result<Token, XoomonkError> {
        if self.current.lexeme == lexeme {
            self.advance()
        } else {
            Err(XoomonkError::syntax(
                format!("expected '{lexeme}' but found '{}'", self.current.lexeme),
                self.current.position,
            ))
        }
    }

    /// Advances and returns `true` iff the current token's lexeme matches `lexeme`.
    ///
    /// # Errors
    /// Returns a `SyntaxError` only if scanning the next token fails.
    pub fn consume(&mut self, lexeme: &str) -> Result<bool, XoomonkError> {
        if self.current.lexeme == lexeme {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Asserts the current token has the given kind.
    ///
    /// # Errors
    /// Returns a `SyntaxError` if the kind does not match.
    pub fn check_type(&self, kind: TokenKind) -> Result<(), XoomonkError> {
        if self.current.kind == kind {
            Ok(())
        } else {
            Err(XoomonkError::syntax(
                format!("expected a token of kind {kind:?} but found '{}'", self.current.lexeme),
                self.current.position,
            ))
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.index).map(|&(_, c)| c)
    }

    fn peek_char_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.index + ahead).map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = *self.chars.get(self.index)?;
        self.index += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn current_position(&self) -> Position {
        let offset = self.chars.get(self.index).map_or(self.source.len(), |&(o, _)| o);
        Position {
            line: self.line,
            column: self.column,
            offset,
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(' ' | '\t' | '\r' | '\n')) {
            self.bump();
        }
    }

    fn scan(&mut self) -> Result<Token, XoomonkError> {
        self.skip_whitespace();
        let start = self.current_position();

        let Some(c) = self.peek_char() else {
            return Ok(Token::new(TokenKind::Eof, "", start));
        };

        if c == '"' {
            return self.scan_string(start);
        }
        if c.is_ascii_digit() {
            return Ok(self.scan_integer(start));
        }
        if is_word_char(c) {
            return Ok(self.scan_identifier(start));
        }
        if let Some(op) = self.match_operator() {
            return Ok(Token::new(TokenKind::Operator, op, start));
        }

        self.bump();
        Ok(Token::new(TokenKind::Unknown, c.to_string(), start))
    }

    fn match_operator(&mut self) -> Option<&'static str> {
        for &op in OPERATORS {
            let mut chars = op.chars();
            let matches = chars.enumerate().all(|(i, expected)| self.peek_char_at(i) == Some(expected));
            if matches {
                for _ in 0..op.len() {
                    self.bump();
                }
                return Some(op);
            }
        }
        None
    }

    fn scan_string(&mut self, start: Position) -> Result<Token, XoomonkError> {
        self.bump(); // opening quote
        let mut literal = String::new();
        loop {
            match self.peek_char() {
                None => {
                    return Err(XoomonkError::syntax("unterminated string literal", start));
                }
                Some('"') => {
                    self.bump();
                    break;
                }
                Some(c) => {
                    literal.push(c);
                    self.bump();
                }
            }
        }
        Ok(Token::new(TokenKind::String, literal, start))
    }

    fn scan_integer(&mut self, start: Position) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Integer, lexeme, start)
    }

    fn scan_identifier(&mut self, start: Position) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.peek_char() {
            if is_word_char(c) {
                lexeme.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Identifier, lexeme, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> Vec<(TokenKind, String)> {
        let mut lexer = Lexer::new(source).unwrap();
        let mut tokens = Vec::new();
        loop {
            let token = lexer.peek().clone();
            let done = token.kind == TokenKind::Eof;
            tokens.push((token.kind, token.lexeme));
            if done {
                break;
            }
            lexer.advance().unwrap();
        }
        tokens
    }

    #[test]
    fn skips_whitespace_between_tokens() {
        let tokens = lex_all("  a   :=  1  ");
        assert_eq!(tokens[0], (TokenKind::Identifier, "a".to_owned()));
        assert_eq!(tokens[1], (TokenKind::Operator, ":=".to_owned()));
        assert_eq!(tokens[2], (TokenKind::Integer, "1".to_owned()));
        assert_eq!(tokens[3].0, TokenKind::Eof);
    }

    #[test]
    fn colon_equals_is_not_two_tokens() {
        let tokens = lex_all(":=");
        assert_eq!(tokens[0], (TokenKind::Operator, ":=".to_owned()));
    }

    #[test]
    fn string_literal_strips_quotes() {
        let tokens = lex_all("\"hi there\"");
        assert_eq!(tokens[0], (TokenKind::String, "hi there".to_owned()));
    }

    #[test]
    fn unterminated_string_is_syntax_error() {
        let err = Lexer::new("\"abc").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::SyntaxError);
    }

    #[test]
    fn keywords_are_scanned_as_identifiers() {
        let tokens = lex_all("print string char");
        assert!(tokens.iter().all(|(kind, _)| *kind == TokenKind::Identifier || *kind == TokenKind::Eof));
    }

    #[test]
    fn unknown_character_is_reported() {
        let tokens = lex_all("@");
        assert_eq!(tokens[0], (TokenKind::Unknown, "@".to_owned()));
    }

    #[test]
    fn dotted_ref_tokenises_as_identifiers_and_dots() {
        let tokens = lex_all("r.b.c");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Identifier, "r".to_owned()),
                (TokenKind::Operator, ".".to_owned()),
                (TokenKind::Identifier, "b".to_owned()),
                (TokenKind::Operator, ".".to_owned()),
                (TokenKind::Identifier, "c".to_owned()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }
}
