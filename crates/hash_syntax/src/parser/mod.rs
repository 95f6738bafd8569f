//! Top-level parser for Hash modules
//!
//! Converts a token stream into a [`Program`]: the ordered list of top-level bindings and imports.
//!
//! ## Grammar (top level only)
//!
//! ```text
//! program  := item* EOF
//! item     := "import" "(" STRING ")" ";"
//!           | "{" entries? "}" ":=" "import" "(" STRING ")" ";"
//!           | IDENT ":=" rhs ";"
//!           | IDENT ":" type "=" rhs ";"
//! entries  := IDENT (":" IDENT)? ("," IDENT (":" IDENT)?)* ","?
//! rhs      := "import" "(" STRING ")" | <opaque expression tokens>
//! ```
//!
//! ## Examples
//!
//! ```rust,no_run
//! use hash_syntax::{lexer, parser};
//!
//! let tokens = lexer::lex("c := import(\"lib/sub/c\");\nx := c::Foo { a = 1; };\n").unwrap();
//! let program = parser::parse(&tokens).unwrap();
//! assert_eq!(program.items.len(), 2);
//! ```

use crate::ast::*;
use crate::diagnostics::SyntaxError;
use crate::lexer::{Token, TokenKind};

#[cfg(test)]
mod tests;

/// The identifier that introduces an import expression.
const IMPORT: &str = "import";

/// Parser state.
///
/// ## Notes
/// - The parser is single-pass and recovers from errors by synchronizing at the next top-level `;`
///   so that several independent mistakes are reported together.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Token,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for a token stream produced by [`crate::lexer::lex`].
    pub fn new(tokens: &'a [Token]) -> Self {
        let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
        Self {
            tokens,
            pos: 0,
            eof: Token::new(TokenKind::Eof, Span::new(end, end)),
            errors: Vec::new(),
        }
    }

    /// Parse the entire token stream into a [`Program`].
    ///
    /// ## Errors
    /// Returns every [`SyntaxError`] found; parsing continues after each error.
    pub fn parse(mut self) -> Result<Program, Vec<SyntaxError>> {
        let mut items = Vec::new();

        while !self.is_at_end() {
            // Stray semicolons between items are harmless.
            if self.match_token(&TokenKind::Semi) {
                continue;
            }
            match self.item() {
                Ok(item) => items.push(item),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }

        if self.errors.is_empty() {
            Ok(Program { items })
        } else {
            Err(self.errors)
        }
    }

    // ========================================================================
    // Items
    // ========================================================================

    fn item(&mut self) -> Result<Spanned<Item>, SyntaxError> {
        let start = self.current_span();
        match &self.peek().kind {
            TokenKind::Ident(name) if name == IMPORT && self.peek_at(1) == &TokenKind::LParen => {
                let path = self.import_call()?;
                let end = self.expect(&TokenKind::Semi, "after import")?;
                Ok(Spanned::new(
                    Item::Import(ImportDecl {
                        path,
                        target: ImportTarget::Bare,
                    }),
                    start.merge(end),
                ))
            }
            TokenKind::LBrace => self.destructuring_import(start),
            TokenKind::Ident(_) => self.binding(start),
            other => Err(SyntaxError::new(
                format!("Expected a top-level binding, found {other}"),
                start,
            )
            .with_hint("top-level items look like `name := value;`")),
        }
    }

    /// `{a, b: c} := import("path");`
    fn destructuring_import(&mut self, start: Span) -> Result<Spanned<Item>, SyntaxError> {
        self.advance(); // {
        let mut entries = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let name = self.identifier_spanned()?;
            let alias = if self.match_token(&TokenKind::Colon) {
                Some(self.identifier_spanned()?)
            } else {
                None
            };
            entries.push(DestructureEntry { name, alias });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace, "to close the destructuring pattern")?;
        self.expect(&TokenKind::ColonEq, "after the destructuring pattern")?;

        if !self.at_import_call() {
            return Err(SyntaxError::new(
                format!(
                    "Expected `import(...)` on the right of a destructuring pattern, found {}",
                    self.peek().kind
                ),
                self.current_span(),
            )
            .with_hint("only modules can be destructured at the top level"));
        }
        let path = self.import_call()?;
        let end = self.expect(&TokenKind::Semi, "after import")?;
        Ok(Spanned::new(
            Item::Import(ImportDecl {
                path,
                target: ImportTarget::Destructure(entries),
            }),
            start.merge(end),
        ))
    }

    /// `name := rhs;` or `name: Type = rhs;`
    fn binding(&mut self, start: Span) -> Result<Spanned<Item>, SyntaxError> {
        let name = self.identifier_spanned()?;
        let mut qualified_refs = Vec::new();

        if self.match_token(&TokenKind::Colon) {
            self.scan_until(&TokenKind::Eq, &mut qualified_refs)?;
            self.expect(&TokenKind::Eq, "after the type annotation")?;
        } else {
            self.expect(&TokenKind::ColonEq, &format!("after `{}`", name.node))?;
        }

        if self.at_import_call() {
            let path = self.import_call()?;
            let end = self.expect(&TokenKind::Semi, "after import")?;
            return Ok(Spanned::new(
                Item::Import(ImportDecl {
                    path,
                    target: ImportTarget::Alias(name),
                }),
                start.merge(end),
            ));
        }

        let kind = self.classify();
        let body = self.scan_until(&TokenKind::Semi, &mut qualified_refs)?;
        if body.is_empty() {
            return Err(SyntaxError::new(
                format!("Expected a value for `{}`", name.node),
                self.current_span(),
            ));
        }
        let end = self.expect(&TokenKind::Semi, &format!("after the declaration of `{}`", name.node))?;

        Ok(Spanned::new(
            Item::Decl(Decl {
                name,
                kind,
                body,
                qualified_refs,
            }),
            start.merge(end),
        ))
    }

    /// `import("path")`, returning the path literal.
    fn import_call(&mut self) -> Result<Spanned<String>, SyntaxError> {
        self.advance(); // import
        self.expect(&TokenKind::LParen, "after `import`")?;
        let path = match &self.peek().kind {
            TokenKind::String(path) => Spanned::new(path.clone(), self.current_span()),
            _ => {
                return Err(SyntaxError::new(
                    "Expected an import path which should be a string",
                    self.current_span(),
                ));
            }
        };
        self.advance();
        self.expect(&TokenKind::RParen, "to close `import(`")?;
        Ok(path)
    }

    // ========================================================================
    // Declaration bodies
    // ========================================================================

    /// Judge the declaration kind from the first tokens of the right-hand side.
    fn classify(&self) -> DeclKind {
        match &self.peek().kind {
            TokenKind::Ident(word)
                if matches!(word.as_str(), "struct" | "enum" | "trait")
                    && matches!(self.peek_at(1), TokenKind::LParen | TokenKind::LBrace) =>
            {
                DeclKind::TypeDef
            }
            TokenKind::Ident(word) if word == "type" && matches!(self.peek_at(1), TokenKind::Ident(_)) => {
                DeclKind::TypeDef
            }
            TokenKind::LParen => {
                let mut depth = 0usize;
                let mut offset = 0;
                loop {
                    match self.peek_at(offset) {
                        TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                        TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                break;
                            }
                        }
                        TokenKind::Eof => return DeclKind::Variable,
                        _ => {}
                    }
                    offset += 1;
                }
                match self.peek_at(offset + 1) {
                    TokenKind::FatArrow | TokenKind::Arrow => DeclKind::Function,
                    _ => DeclKind::Variable,
                }
            }
            _ => DeclKind::Variable,
        }
    }

    /// Consume opaque tokens up to (not including) `stop` at bracket depth zero, recording every
    /// `alias::Name` or `a::b::Name` path on the way. Returns the span of the consumed tokens.
    fn scan_until(
        &mut self,
        stop: &TokenKind,
        refs: &mut Vec<Spanned<QualifiedRef>>,
    ) -> Result<Span, SyntaxError> {
        let start = self.current_span().start;
        let mut end = start;
        let mut openers: Vec<Span> = Vec::new();

        loop {
            let token = self.peek().clone();
            match &token.kind {
                TokenKind::Eof => {
                    if let Some(open) = openers.last() {
                        return Err(SyntaxError::new("Unclosed delimiter", *open));
                    }
                    return Err(SyntaxError::new(
                        format!("Expected {stop}, found end of file"),
                        token.span,
                    ));
                }
                kind if openers.is_empty() && kind == stop => break,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    openers.push(token.span);
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if openers.pop().is_none() {
                        return Err(SyntaxError::new(
                            format!("Unmatched {}", token.kind),
                            token.span,
                        ));
                    }
                }
                TokenKind::Ident(name) if name == IMPORT && self.peek_at(1) == &TokenKind::LParen => {
                    return Err(SyntaxError::new(
                        "`import(...)` must be bound directly at the top level",
                        token.span,
                    )
                    .with_hint("write `alias := import(\"path\");` and refer to `alias::Name`"));
                }
                TokenKind::Ident(root) => {
                    if let (TokenKind::ColonColon, TokenKind::Ident(_)) = (self.peek_at(1), self.peek_at(2)) {
                        let mut path = vec![root.clone()];
                        let mut last = 0;
                        while let (TokenKind::ColonColon, TokenKind::Ident(segment)) =
                            (self.peek_at(last + 1), self.peek_at(last + 2))
                        {
                            path.push(segment.clone());
                            last += 2;
                        }
                        let last_span = self.span_at(last);
                        let constructs = self.peek_at(last + 1) == &TokenKind::LBrace;
                        refs.push(Spanned::new(
                            QualifiedRef { path, constructs },
                            token.span.merge(last_span),
                        ));
                        for _ in 0..=last {
                            self.advance();
                        }
                        end = last_span.end;
                        continue;
                    }
                }
                _ => {}
            }
            end = token.span.end;
            self.advance();
        }

        Ok(Span::new(start, end))
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| &t.kind)
            .unwrap_or(&self.eof.kind)
    }

    fn span_at(&self, offset: usize) -> Span {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.span)
            .unwrap_or(self.eof.span)
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, context: &str) -> Result<Span, SyntaxError> {
        if self.check(kind) {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(SyntaxError::new(
                format!("Expected {kind} {context}, found {}", self.peek().kind),
                self.current_span(),
            ))
        }
    }

    fn at_import_call(&self) -> bool {
        self.peek().kind.is_ident(IMPORT) && self.peek_at(1) == &TokenKind::LParen
    }

    fn identifier_spanned(&mut self) -> Result<Spanned<Ident>, SyntaxError> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let spanned = Spanned::new(name.clone(), self.current_span());
                self.advance();
                Ok(spanned)
            }
            other => Err(SyntaxError::new(
                format!("Expected identifier, found {other}"),
                self.current_span(),
            )),
        }
    }

    /// Skip to just past the next top-level `;` (or to EOF).
    fn synchronize(&mut self) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            match self.peek().kind {
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.advance();
        }
    }
}

/// Parse a token stream into a [`Program`].
///
/// This is the main public entrypoint for parsing.
///
/// ## Errors
/// Returns `Err(Vec<SyntaxError>)` if parsing fails.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse(tokens: &[Token]) -> Result<Program, Vec<SyntaxError>> {
    Parser::new(tokens).parse()
}
