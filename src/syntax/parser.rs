//! Recursive-descent parser for Go declarations.
//!
//! The whole file is parsed, but only the declaration level is kept: function
//! bodies are skipped by brace balancing and `var`/`const` specs keep only
//! their names. Type expressions are parsed completely.

use crate::syntax::ast::{
    ChanDir, Decl, FieldDecl, FuncDecl, ImportSpec, InterfaceElem, Signature, SourceFile,
    TypeExpr, TypeSpec, UnionTerm, ValueKeyword,
};
use crate::syntax::error::SyntaxError;
use crate::syntax::lexer::{tokenize, Token, TokenKind};

type PResult<T> = Result<T, SyntaxError>;

/// Parse one Go source file. `file` is only used to label errors.
pub fn parse_file(file: &str, src: &str) -> PResult<SourceFile> {
    let tokens = tokenize(src).map_err(|e| SyntaxError::from_lex(file, src, &e))?;
    Parser {
        file,
        src,
        tokens,
        pos: 0,
    }
    .source_file()
}

fn starts_type(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident
            | TokenKind::Star
            | TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Func
            | TokenKind::Struct
            | TokenKind::Interface
            | TokenKind::LParen
            | TokenKind::Arrow
    )
}

/// A parameter list entry before Go's grouping rule is applied.
enum Param {
    Named(String, TypeExpr),
    Bare(TypeExpr),
}

struct Parser<'src> {
    file: &'src str,
    src: &'src str,
    tokens: Vec<Token<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    // --- token cursor ---

    fn peek(&self) -> Option<TokenKind> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn bump(&mut self) -> PResult<Token<'src>> {
        match self.tokens.get(self.pos) {
            Some(tok) => {
                self.pos += 1;
                Ok(tok.clone())
            }
            None => Err(self.error("unexpected end of file")),
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token<'src>> {
        if self.peek() == Some(kind) {
            self.bump()
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_ident(&mut self) -> PResult<String> {
        Ok(self.expect(TokenKind::Ident, "identifier")?.text.to_string())
    }

    fn expect_semi(&mut self) -> PResult<()> {
        if self.peek().is_none() || self.eat(TokenKind::Semicolon) {
            Ok(())
        } else {
            Err(self.unexpected("';' or newline"))
        }
    }

    /// Terminator after an element of a `{...}` or `(...)` list; the `;` may be
    /// omitted before the closing token.
    fn end_element(&mut self, close: TokenKind) -> PResult<()> {
        if self.eat(TokenKind::Semicolon) || self.peek() == Some(close) {
            Ok(())
        } else {
            Err(self.unexpected("';' or newline"))
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        let offset = self
            .tokens
            .get(self.pos)
            .map_or(self.src.len(), |t| t.span.start);
        SyntaxError::at(self.file, self.src, offset, message)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        match self.tokens.get(self.pos) {
            Some(tok) if tok.kind == TokenKind::Semicolon && tok.text == "\n" => {
                self.error(format!("expected {expected}, found newline"))
            }
            Some(tok) => self.error(format!("expected {expected}, found '{}'", tok.text)),
            None => self.error(format!("expected {expected}, found EOF")),
        }
    }

    /// Index of the token closing the bracket opened at `open`.
    fn matching_close(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, tok) in self.tokens.iter().enumerate().skip(open) {
            match tok.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// With the cursor on `Ident [`, decide whether the identifier names a
    /// field/parameter of slice or array type (`buf [4]byte`) rather than being
    /// an instantiated generic type (`List[int]`).
    fn ident_then_array_type(&self) -> bool {
        if self.peek_at(2) == Some(TokenKind::RBracket) {
            return true;
        }
        self.matching_close(self.pos + 1)
            .and_then(|close| self.tokens.get(close + 1))
            .is_some_and(|t| starts_type(t.kind))
    }

    /// With the cursor on the `[` after a type name, decide between a type
    /// parameter list (`[T any]`) and an array length (`[N]int`).
    fn looks_like_type_params(&self) -> bool {
        self.peek_at(1) == Some(TokenKind::Ident)
            && matches!(
                self.peek_at(2),
                Some(
                    TokenKind::Ident
                        | TokenKind::Comma
                        | TokenKind::Interface
                        | TokenKind::Tilde
                        | TokenKind::LBracket
                        | TokenKind::Func
                        | TokenKind::Map
                        | TokenKind::Chan
                        | TokenKind::Struct
                        | TokenKind::LParen
                )
            )
    }

    // --- file level ---

    fn source_file(mut self) -> PResult<SourceFile> {
        while self.eat(TokenKind::Semicolon) {}
        self.expect(TokenKind::Package, "package clause")?;
        let package = self.expect_ident()?;
        self.expect_semi()?;

        let mut imports = Vec::new();
        while self.eat(TokenKind::Import) {
            imports.extend(self.group(Self::import_spec)?);
            self.expect_semi()?;
        }

        let mut decls = Vec::new();
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::Semicolon => {
                    self.pos += 1;
                    continue;
                }
                TokenKind::Type => {
                    self.pos += 1;
                    decls.extend(self.group(Self::type_spec)?.into_iter().map(Decl::Type));
                }
                TokenKind::Func => decls.push(Decl::Func(self.func_decl()?)),
                TokenKind::Var | TokenKind::Const => {
                    self.pos += 1;
                    let keyword = if kind == TokenKind::Var {
                        ValueKeyword::Var
                    } else {
                        ValueKeyword::Const
                    };
                    let names = self.group(Self::value_spec)?.into_iter().flatten().collect();
                    decls.push(Decl::Value { keyword, names });
                }
                TokenKind::Import => {
                    return Err(self.error("imports must appear before other declarations"))
                }
                _ => return Err(self.error("non-declaration statement outside function body")),
            }
            self.expect_semi()?;
        }

        Ok(SourceFile {
            package,
            imports,
            decls,
        })
    }

    /// `spec` or `( spec; spec; ... )`
    fn group<T>(&mut self, mut spec: impl FnMut(&mut Self) -> PResult<T>) -> PResult<Vec<T>> {
        if !self.eat(TokenKind::LParen) {
            return Ok(vec![spec(self)?]);
        }
        let mut out = Vec::new();
        while !self.eat(TokenKind::RParen) {
            out.push(spec(self)?);
            self.end_element(TokenKind::RParen)?;
        }
        Ok(out)
    }

    fn import_spec(&mut self) -> PResult<ImportSpec> {
        let name = match self.peek() {
            Some(TokenKind::Ident | TokenKind::Dot) => Some(self.bump()?.text.to_string()),
            _ => None,
        };
        let path = match self.peek() {
            Some(TokenKind::String | TokenKind::RawString) => unquote(self.bump()?.text),
            _ => return Err(self.unexpected("import path")),
        };
        Ok(ImportSpec { name, path })
    }

    fn type_spec(&mut self) -> PResult<TypeSpec> {
        let name = self.expect_ident()?;
        let type_params = if self.peek() == Some(TokenKind::LBracket) && self.looks_like_type_params()
        {
            self.pos += 1;
            self.params(TokenKind::RBracket)?
        } else {
            Vec::new()
        };
        let alias = self.eat(TokenKind::Assign);
        let ty = self.type_expr()?;
        Ok(TypeSpec {
            name,
            type_params,
            alias,
            ty,
        })
    }

    fn func_decl(&mut self) -> PResult<FuncDecl> {
        self.expect(TokenKind::Func, "'func'")?;
        let receiver = if self.eat(TokenKind::LParen) {
            let mut recv = self.params(TokenKind::RParen)?;
            match (recv.pop(), recv.is_empty()) {
                (Some(r), true) if r.names.len() <= 1 => Some(r),
                (None, _) => return Err(self.error("method has no receiver")),
                _ => return Err(self.error("method has multiple receivers")),
            }
        } else {
            None
        };
        let name = self.expect_ident()?;
        let type_params = if self.eat(TokenKind::LBracket) {
            self.params(TokenKind::RBracket)?
        } else {
            Vec::new()
        };
        let signature = self.signature()?;
        if self.peek() == Some(TokenKind::LBrace) {
            self.skip_block()?;
        }
        Ok(FuncDecl {
            name,
            receiver,
            type_params,
            signature,
        })
    }

    fn value_spec(&mut self) -> PResult<Vec<String>> {
        let mut names = vec![self.expect_ident()?];
        while self.eat(TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        // Type and initialiser are not needed; skip to the end of the spec.
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::Semicolon if depth == 0 => break,
                TokenKind::RParen if depth == 0 => break,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.pos += 1;
        }
        Ok(names)
    }

    fn skip_block(&mut self) -> PResult<()> {
        match self.matching_close(self.pos) {
            Some(close) => {
                self.pos = close + 1;
                Ok(())
            }
            None => Err(self.error("unbalanced '{'")),
        }
    }

    // --- signatures and parameter lists ---

    fn signature(&mut self) -> PResult<Signature> {
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.params(TokenKind::RParen)?;
        let results = if self.eat(TokenKind::LParen) {
            self.params(TokenKind::RParen)?
        } else if self.peek().is_some_and(starts_type) {
            vec![FieldDecl::new(Vec::new(), self.type_expr()?)]
        } else {
            Vec::new()
        };
        Ok(Signature { params, results })
    }

    /// Parameter, result or type parameter list; the opening token has already
    /// been consumed. Applies Go's grouping rule: `a, b int` is one slot with
    /// two names, while `int, string` are two anonymous slots.
    fn params(&mut self, close: TokenKind) -> PResult<Vec<FieldDecl>> {
        let mut entries = Vec::new();
        while self.peek() != Some(close) {
            entries.push(self.param(close)?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(close, if close == TokenKind::RParen { "')'" } else { "']'" })?;

        if !entries.iter().any(|e| matches!(e, Param::Named(..))) {
            return Ok(entries
                .into_iter()
                .map(|e| match e {
                    Param::Bare(ty) | Param::Named(_, ty) => FieldDecl::new(Vec::new(), ty),
                })
                .collect());
        }

        let mut out = Vec::new();
        let mut pending = Vec::new();
        for entry in entries {
            match entry {
                Param::Bare(TypeExpr::Ident(name)) => pending.push(name),
                Param::Named(name, ty) => {
                    pending.push(name);
                    out.push(FieldDecl::new(std::mem::take(&mut pending), ty));
                }
                Param::Bare(_) => return Err(self.error("mixed named and unnamed parameters")),
            }
        }
        if !pending.is_empty() {
            return Err(self.error("mixed named and unnamed parameters"));
        }
        Ok(out)
    }

    fn param(&mut self, close: TokenKind) -> PResult<Param> {
        let constraint = close == TokenKind::RBracket;
        if self.peek() == Some(TokenKind::Ident) {
            let named = match self.peek_at(1) {
                Some(TokenKind::LBracket) => self.ident_then_array_type(),
                Some(TokenKind::Ellipsis) => true,
                Some(TokenKind::Tilde) => constraint,
                Some(kind) => starts_type(kind),
                None => false,
            };
            if named {
                let name = self.expect_ident()?;
                let ty = if constraint {
                    self.constraint()?
                } else {
                    self.param_type()?
                };
                return Ok(Param::Named(name, ty));
            }
        }
        Ok(Param::Bare(self.param_type()?))
    }

    fn param_type(&mut self) -> PResult<TypeExpr> {
        if self.eat(TokenKind::Ellipsis) {
            Ok(TypeExpr::Ellipsis(Box::new(self.type_expr()?)))
        } else {
            self.type_expr()
        }
    }

    /// Type-set element: `T`, `~T` or a union of those.
    fn constraint(&mut self) -> PResult<TypeExpr> {
        let mut terms = Vec::new();
        loop {
            let tilde = self.eat(TokenKind::Tilde);
            let ty = self.type_expr()?;
            terms.push(UnionTerm { tilde, ty });
            if !self.eat(TokenKind::Pipe) {
                break;
            }
        }
        match terms.pop() {
            Some(only) if terms.is_empty() && !only.tilde => Ok(only.ty),
            Some(last) => {
                terms.push(last);
                Ok(TypeExpr::Union(terms))
            }
            None => Err(self.unexpected("type")),
        }
    }

    // --- type expressions ---

    fn type_expr(&mut self) -> PResult<TypeExpr> {
        let Some(kind) = self.peek() else {
            return Err(self.unexpected("type"));
        };
        match kind {
            TokenKind::Ident => {
                let name = self.bump()?.text.to_string();
                let base = if self.eat(TokenKind::Dot) {
                    TypeExpr::Qualified {
                        package: name,
                        name: self.expect_ident()?,
                    }
                } else {
                    TypeExpr::Ident(name)
                };
                if self.eat(TokenKind::LBracket) {
                    let args = self.type_list(TokenKind::RBracket)?;
                    Ok(TypeExpr::Generic {
                        base: Box::new(base),
                        args,
                    })
                } else {
                    Ok(base)
                }
            }
            TokenKind::Star => {
                self.pos += 1;
                Ok(TypeExpr::Pointer(Box::new(self.type_expr()?)))
            }
            TokenKind::LBracket => {
                self.pos += 1;
                if self.eat(TokenKind::RBracket) {
                    return Ok(TypeExpr::Slice(Box::new(self.type_expr()?)));
                }
                let len = self.array_len()?;
                Ok(TypeExpr::Array {
                    len,
                    elem: Box::new(self.type_expr()?),
                })
            }
            TokenKind::Map => {
                self.pos += 1;
                self.expect(TokenKind::LBracket, "'['")?;
                let key = self.type_expr()?;
                self.expect(TokenKind::RBracket, "']'")?;
                let value = self.type_expr()?;
                Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                })
            }
            TokenKind::Chan => {
                self.pos += 1;
                let dir = if self.eat(TokenKind::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Ok(TypeExpr::Chan {
                    dir,
                    elem: Box::new(self.type_expr()?),
                })
            }
            TokenKind::Arrow => {
                self.pos += 1;
                self.expect(TokenKind::Chan, "'chan'")?;
                Ok(TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(self.type_expr()?),
                })
            }
            TokenKind::Func => {
                self.pos += 1;
                Ok(TypeExpr::Func(self.signature()?))
            }
            TokenKind::Struct => {
                self.pos += 1;
                Ok(TypeExpr::Struct(self.struct_body()?))
            }
            TokenKind::Interface => {
                self.pos += 1;
                Ok(TypeExpr::Interface(self.interface_body()?))
            }
            TokenKind::LParen => {
                self.pos += 1;
                let inner = self.type_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(TypeExpr::Paren(Box::new(inner)))
            }
            _ => Err(self.unexpected("type")),
        }
    }

    fn type_list(&mut self, close: TokenKind) -> PResult<Vec<TypeExpr>> {
        let mut out = Vec::new();
        while self.peek() != Some(close) {
            out.push(self.type_expr()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(close, "']'")?;
        Ok(out)
    }

    /// Source text of an array length, with the cursor just past `[`.
    fn array_len(&mut self) -> PResult<String> {
        let open = self.pos - 1;
        let close = self
            .matching_close(open)
            .ok_or_else(|| self.error("unbalanced '['"))?;
        if close == self.pos {
            return Err(self.unexpected("array length"));
        }
        let start = self.tokens[self.pos].span.start;
        let end = self.tokens[close - 1].span.end;
        self.pos = close + 1;
        Ok(self.src[start..end].to_string())
    }

    fn struct_body(&mut self) -> PResult<Vec<FieldDecl>> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.eat(TokenKind::RBrace) {
            fields.push(self.field_decl()?);
            self.end_element(TokenKind::RBrace)?;
        }
        Ok(fields)
    }

    fn field_decl(&mut self) -> PResult<FieldDecl> {
        let embedded = match (self.peek(), self.peek_at(1)) {
            (Some(TokenKind::Star), _) => true,
            (
                Some(TokenKind::Ident),
                Some(
                    TokenKind::Semicolon
                    | TokenKind::RBrace
                    | TokenKind::String
                    | TokenKind::RawString
                    | TokenKind::Dot,
                ),
            ) => true,
            (Some(TokenKind::Ident), Some(TokenKind::LBracket)) => !self.ident_then_array_type(),
            (Some(TokenKind::Ident), _) => false,
            _ => return Err(self.unexpected("field name or embedded type")),
        };

        let mut field = if embedded {
            FieldDecl::new(Vec::new(), self.type_expr()?)
        } else {
            let mut names = vec![self.expect_ident()?];
            while self.eat(TokenKind::Comma) {
                names.push(self.expect_ident()?);
            }
            FieldDecl::new(names, self.type_expr()?)
        };
        if let Some(TokenKind::String | TokenKind::RawString) = self.peek() {
            field.tag = Some(unquote(self.bump()?.text));
        }
        Ok(field)
    }

    fn interface_body(&mut self) -> PResult<Vec<InterfaceElem>> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut elems = Vec::new();
        while !self.eat(TokenKind::RBrace) {
            let elem = if self.peek() == Some(TokenKind::Ident)
                && self.peek_at(1) == Some(TokenKind::LParen)
            {
                let name = self.expect_ident()?;
                InterfaceElem::Method {
                    name,
                    signature: self.signature()?,
                }
            } else {
                InterfaceElem::Embedded(self.constraint()?)
            };
            elems.push(elem);
            self.end_element(TokenKind::RBrace)?;
        }
        Ok(elems)
    }
}

/// Strip the delimiters of a string literal, resolving the escapes that can
/// appear in struct tags and import paths.
fn unquote(lit: &str) -> String {
    let inner = lit.get(1..lit.len().saturating_sub(1)).unwrap_or_default();
    if lit.starts_with('`') {
        return inner.to_string();
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other @ ('"' | '\\')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
