//! Go tokenizer.
//!
//! Raw tokens come from a `logos` DFA; [`tokenize`] then applies Go's automatic
//! semicolon insertion so the parser sees the same `;` terminators the Go
//! grammar is written against.

use logos::{Lexer as LogosLexer, Logos};

use crate::syntax::error::{LexError, LexErrorKind, Span};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\x0C]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    #[token("\n")]
    Newline,

    /// Block comment; the payload records whether it spans a newline.
    #[token("/*", block_comment)]
    BlockComment(bool),

    // --- Keywords ---
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("chan")]
    Chan,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("default")]
    Default,
    #[token("defer")]
    Defer,
    #[token("else")]
    Else,
    #[token("fallthrough")]
    Fallthrough,
    #[token("for")]
    For,
    #[token("func")]
    Func,
    #[token("go")]
    Go,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("import")]
    Import,
    #[token("interface")]
    Interface,
    #[token("map")]
    Map,
    #[token("package")]
    Package,
    #[token("range")]
    Range,
    #[token("return")]
    Return,
    #[token("select")]
    Select,
    #[token("struct")]
    Struct,
    #[token("switch")]
    Switch,
    #[token("type")]
    Type,
    #[token("var")]
    Var,

    #[regex(r"[_\p{XID_Start}][_\p{XID_Continue}]*")]
    Ident,

    // --- Literals ---
    // Integer, float and imaginary literals share one token; the parser only
    // ever copies their text.
    #[regex(r"[0-9]", number)]
    #[regex(r"\.[0-9]", number)]
    Number,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,
    #[regex(r"`[^`]*`")]
    RawString,
    #[regex(r"'([^'\\\n]|\\.)+'")]
    Rune,

    // --- Operators and delimiters ---
    #[token("...")]
    Ellipsis,
    #[token("<<=")]
    ShlAssign,
    #[token(">>=")]
    ShrAssign,
    #[token("&^=")]
    AndNotAssign,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    DivAssign,
    #[token("%=")]
    ModAssign,
    #[token("&=")]
    AndAssign,
    #[token("|=")]
    OrAssign,
    #[token("^=")]
    XorAssign,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("&^")]
    AndNot,
    #[token("&&")]
    LAnd,
    #[token("||")]
    LOr,
    #[token("<-")]
    Arrow,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token(":=")]
    Define,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Assign,
    #[token("!")]
    Not,
    #[token("~")]
    Tilde,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
}

impl TokenKind {
    /// Whether a line break after this token terminates the statement.
    fn ends_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::RawString
                | TokenKind::Rune
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fallthrough
                | TokenKind::Return
                | TokenKind::Inc
                | TokenKind::Dec
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }
}

fn block_comment(lex: &mut LogosLexer<TokenKind>) -> Result<bool, LexErrorKind> {
    match lex.remainder().find("*/") {
        Some(end) => {
            let spans_newline = lex.remainder()[..end].contains('\n');
            lex.bump(end + 2);
            Ok(spans_newline)
        }
        None => {
            lex.bump(lex.remainder().len());
            Err(LexErrorKind::UnterminatedComment)
        }
    }
}

/// Consume the tail of a numeric literal: digits, letters (prefixes, exponents,
/// the imaginary suffix), `_`, `.` and an exponent sign.
fn number(lex: &mut LogosLexer<TokenKind>) -> bool {
    let head = lex.slice();
    let hex = head.starts_with('0')
        && matches!(lex.remainder().as_bytes().first(), Some(b'x' | b'X'));
    let mut prev = head.as_bytes()[head.len() - 1];
    let mut len = 0;
    for &b in lex.remainder().as_bytes() {
        let exponent_sign = matches!(b, b'+' | b'-')
            && (matches!(prev, b'p' | b'P') || (!hex && matches!(prev, b'e' | b'E')));
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || exponent_sign {
            prev = b;
            len += 1;
        } else {
            break;
        }
    }
    lex.bump(len);
    true
}

/// A lexed token borrowing its text from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub span: Span,
}

/// Tokenize `src`, inserting `;` where Go's semicolon rule requires one.
///
/// Newline and comment tokens never reach the caller.
/// Byte order mark Go ignores at the very start of a file.
pub(crate) const BOM: char = '\u{feff}';

pub fn tokenize(src: &str) -> Result<Vec<Token<'_>>, LexError> {
    let mut out: Vec<Token<'_>> = Vec::new();
    let mut lex = TokenKind::lexer(src);
    // Spans stay relative to `src`.
    if src.starts_with(BOM) {
        lex.bump(BOM.len_utf8());
    }

    while let Some(next) = lex.next() {
        let span = lex.span();
        let kind = next.map_err(|kind| LexError {
            kind,
            span: span.clone(),
        })?;
        match kind {
            TokenKind::Newline | TokenKind::BlockComment(true) => {
                insert_semicolon(&mut out, span);
            }
            TokenKind::BlockComment(false) => {}
            kind => out.push(Token {
                kind,
                text: &src[span.clone()],
                span,
            }),
        }
    }
    insert_semicolon(&mut out, src.len()..src.len());
    Ok(out)
}

fn insert_semicolon<'src>(out: &mut Vec<Token<'src>>, span: Span) {
    if out.last().is_some_and(|t| t.kind.ends_statement()) {
        out.push(Token {
            kind: TokenKind::Semicolon,
            text: "\n",
            span,
        });
    }
}
