//! Lexer for Hash source files
//!
//! Produces a flat token stream. Whitespace and comments (`// line`, nested `/* block */`) are
//! skipped; newlines carry no meaning because every top-level item ends with `;`.
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token)

pub mod tokens;

pub use tokens::{Token, TokenKind};

use crate::ast::Span;
use crate::diagnostics::SyntaxError;

/// Lexer for Hash source code.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    tokens: Vec<Token>,
    errors: Vec<SyntaxError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source code.
    ///
    /// The token stream always ends with an `Eof` token. All lexical errors are collected before
    /// returning.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<SyntaxError>> {
        while !self.is_at_end() {
            self.scan_token();
        }

        self.tokens.push(Token::new(
            TokenKind::Eof,
            Span::new(self.current_pos, self.current_pos),
        ));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos..].chars();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((pos, c)) = self.chars.next() {
            self.current_pos = pos + c.len_utf8();
            Some(c)
        } else {
            None
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn add_token(&mut self, kind: TokenKind, start: usize) {
        self.tokens
            .push(Token::new(kind, Span::new(start, self.current_pos)));
    }

    fn error(&mut self, message: impl Into<String>, start: usize) {
        self.errors
            .push(SyntaxError::new(message, Span::new(start, self.current_pos)));
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    fn scan_token(&mut self) {
        let start = self.current_pos;
        let Some(c) = self.advance() else {
            return;
        };

        match c {
            c if c.is_whitespace() => {}

            '/' => {
                if self.match_char('/') {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                } else if self.match_char('*') {
                    self.scan_block_comment(start);
                } else {
                    self.add_token(TokenKind::Op('/'), start);
                }
            }

            ':' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::ColonEq, start);
                } else if self.match_char(':') {
                    self.add_token(TokenKind::ColonColon, start);
                } else {
                    self.add_token(TokenKind::Colon, start);
                }
            }
            '=' => {
                if self.match_char('>') {
                    self.add_token(TokenKind::FatArrow, start);
                } else if self.match_char('=') {
                    self.add_token(TokenKind::Op('='), start);
                } else {
                    self.add_token(TokenKind::Eq, start);
                }
            }
            '-' => {
                if self.match_char('>') {
                    self.add_token(TokenKind::Arrow, start);
                } else {
                    self.add_token(TokenKind::Op('-'), start);
                }
            }
            ';' => self.add_token(TokenKind::Semi, start),
            ',' => self.add_token(TokenKind::Comma, start),
            '.' => self.add_token(TokenKind::Dot, start),
            '(' => self.add_token(TokenKind::LParen, start),
            ')' => self.add_token(TokenKind::RParen, start),
            '[' => self.add_token(TokenKind::LBracket, start),
            ']' => self.add_token(TokenKind::RBracket, start),
            '{' => self.add_token(TokenKind::LBrace, start),
            '}' => self.add_token(TokenKind::RBrace, start),
            '+' | '*' | '%' | '<' | '>' | '!' | '&' | '|' | '^' | '~' | '?' | '#' | '@' => {
                self.add_token(TokenKind::Op(c), start)
            }

            '"' => self.scan_string(start),
            '\'' => self.scan_char(start),

            c if c.is_ascii_digit() => self.scan_number(start),
            c if is_ident_start(c) => self.scan_identifier(start),

            other => self.error(format!("Unexpected character '{other}'"), start),
        }
    }

    // ========================================================================
    // Comments
    // ========================================================================

    fn scan_block_comment(&mut self, start: usize) {
        let mut depth = 1usize;
        while depth > 0 {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    depth -= 1;
                }
                Some('/') if self.peek() == Some('*') => {
                    self.advance();
                    depth += 1;
                }
                Some(_) => {}
                None => {
                    self.error("Unterminated block comment", start);
                    return;
                }
            }
        }
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn scan_escape(&mut self, start: usize) -> Option<char> {
        let escaped = match self.advance()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            other => {
                self.error(format!("Unknown escape sequence '\\{other}'"), start);
                other
            }
        };
        Some(escaped)
    }

    fn scan_string(&mut self, start: usize) {
        let mut value = String::new();
        loop {
            match self.advance() {
                Some('"') => break,
                Some('\\') => {
                    let escape_start = self.current_pos - 1;
                    match self.scan_escape(escape_start) {
                        Some(c) => value.push(c),
                        None => {
                            self.error("Unterminated string literal", start);
                            return;
                        }
                    }
                }
                Some(c) => value.push(c),
                None => {
                    self.error("Unterminated string literal", start);
                    return;
                }
            }
        }
        self.add_token(TokenKind::String(value), start);
    }

    fn scan_char(&mut self, start: usize) {
        let value = match self.advance() {
            Some('\\') => self.scan_escape(start),
            Some('\'') | None => None,
            Some(c) => Some(c),
        };
        match value {
            Some(c) if self.match_char('\'') => self.add_token(TokenKind::Char(c), start),
            _ => self.error("Malformed character literal", start),
        }
    }

    fn scan_number(&mut self, start: usize) {
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_alphanumeric() || c == '_' => {
                    self.advance();
                }
                Some('.') if self.peek_next().is_some_and(|c| c.is_ascii_digit()) => {
                    self.advance();
                }
                _ => break,
            }
        }
        let spelling = self.source[start..self.current_pos].to_string();
        self.add_token(TokenKind::Number(spelling), start);
    }

    fn scan_identifier(&mut self, start: usize) {
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.advance();
            } else {
                break;
            }
        }
        let spelling = self.source[start..self.current_pos].to_string();
        self.add_token(TokenKind::Ident(spelling), start);
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Check if a character can start an identifier (ASCII-only).
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier (ASCII-only).
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Convenience function to lex a source string.
///
/// This is a shorthand for `Lexer::new(source).tokenize()`.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Result<Vec<Token>, Vec<SyntaxError>> {
    Lexer::new(source).tokenize()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_destructuring_import_tokens() {
        let tokens = lex("{Point: P} := import(\"lib/a\");").unwrap();
        let dump = tokens
            .iter()
            .map(|t| t.kind.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        insta::assert_snapshot!(dump, @r#"
        `{`
        identifier `Point`
        `:`
        identifier `P`
        `}`
        `:=`
        identifier `import`
        `(`
        string "lib/a"
        `)`
        `;`
        end of file
        "#);
    }

    #[test]
    fn test_colon_variants() {
        assert_eq!(
            kinds(": := ::"),
            vec![TokenKind::Colon, TokenKind::ColonEq, TokenKind::ColonColon, TokenKind::Eof]
        );
    }

    #[test]
    fn test_arrows() {
        assert_eq!(
            kinds("=> -> = - =="),
            vec![
                TokenKind::FatArrow,
                TokenKind::Arrow,
                TokenKind::Eq,
                TokenKind::Op('-'),
                TokenKind::Op('='),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "// line\na /* block /* nested */ still */ b";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Ident("a".to_string()),
                TokenKind::Ident("b".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let errs = lex("a /* never closed").unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("Unterminated block comment"));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\n""#),
            vec![TokenKind::String("a\"b\n".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let errs = lex("\"lib/a").unwrap_err();
        assert!(errs[0].message.contains("Unterminated string literal"));
        assert_eq!(errs[0].span.start, 0);
    }

    #[test]
    fn test_char_literal() {
        assert_eq!(kinds("'x'"), vec![TokenKind::Char('x'), TokenKind::Eof]);
        assert!(lex("'xy'").is_err());
    }

    #[test]
    fn test_numbers_keep_spelling() {
        assert_eq!(
            kinds("1_000u32 3.25 x.0"),
            vec![
                TokenKind::Number("1_000u32".to_string()),
                TokenKind::Number("3.25".to_string()),
                TokenKind::Ident("x".to_string()),
                TokenKind::Dot,
                TokenKind::Number("0".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unexpected_character_reports_all() {
        let errs = lex("a $ b $").unwrap_err();
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].span, Span::new(2, 3));
    }

    #[test]
    fn test_spans() {
        let tokens = lex("ab := c").unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[1].span, Span::new(3, 5));
        assert_eq!(tokens[2].span, Span::new(6, 7));
    }
}
