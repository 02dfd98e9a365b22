//! # Syntax Module
//!
//! Go front end for the generator: a `logos` tokenizer with automatic
//! semicolon insertion, a recursive-descent parser for declarations, and the
//! tagged-variant tree it produces.
//!
//! Nothing here resolves types; the tree is purely syntactic.
//!
//! ```rust
//! use gonerate::syntax::{parse_file, Decl, DeclKind};
//!
//! let file = parse_file("point.go", "package geo\n\ntype Point struct { X, Y int }\n").unwrap();
//! assert_eq!(file.package, "geo");
//! match &file.decls[0] {
//!     Decl::Type(spec) => assert_eq!(spec.kind(), DeclKind::Struct),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

mod ast;
mod error;
mod lexer;
mod parser;
mod walk;

pub use ast::*;
pub use error::{LexError, LexErrorKind, Span, SyntaxError};
pub use lexer::{tokenize, Token, TokenKind};
pub(crate) use lexer::BOM;
pub use parser::parse_file;
pub use walk::{walk_decl, walk_source_file, Visitor};
