//! Declaration tree for one Go source file.
//!
//! Only the shapes the generator needs are modelled in full: type declarations
//! and type expressions. Function bodies and value initialisers are skipped by
//! the parser.

use std::fmt;

/// A parsed `.go` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Name from the `package` clause.
    pub package: String,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit local name (`.` and `_` included), if any.
    pub name: Option<String>,
    /// Import path without quotes.
    pub path: String,
}

/// A top-level declaration. Grouped `type ( ... )` declarations are flattened
/// into one [`Decl::Type`] per spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Type(TypeSpec),
    Func(FuncDecl),
    Value { keyword: ValueKeyword, names: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKeyword {
    Var,
    Const,
}

/// Shape of a declared type, as far as code generation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Struct,
    Interface,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    /// Type parameters; each entry binds one or more names to a constraint.
    pub type_params: Vec<FieldDecl>,
    /// `type A = B`
    pub alias: bool,
    pub ty: TypeExpr,
}

impl TypeSpec {
    pub fn kind(&self) -> DeclKind {
        match &self.ty {
            TypeExpr::Struct(_) => DeclKind::Struct,
            TypeExpr::Interface(_) => DeclKind::Interface,
            _ => DeclKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    pub receiver: Option<FieldDecl>,
    pub type_params: Vec<FieldDecl>,
    pub signature: Signature,
}

/// A struct field, parameter slot, result slot or type parameter group.
///
/// `names` is empty for embedded fields and anonymous parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub names: Vec<String>,
    pub ty: TypeExpr,
    /// Struct tag without its quotes.
    pub tag: Option<String>,
}

impl FieldDecl {
    pub fn new(names: Vec<String>, ty: TypeExpr) -> Self {
        Self {
            names,
            ty,
            tag: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    pub params: Vec<FieldDecl>,
    pub results: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceElem {
    Method { name: String, signature: Signature },
    /// Embedded interface or type-set constraint (`io.Reader`, `~int | string`).
    Embedded(TypeExpr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionTerm {
    /// `~T`
    pub tilde: bool,
    pub ty: TypeExpr,
}

/// A Go type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Ident(String),
    /// `pkg.Name`
    Qualified { package: String, name: String },
    /// `Base[A, B]`
    Generic { base: Box<TypeExpr>, args: Vec<TypeExpr> },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    /// `[len]T`; `len` is the source text of the length expression.
    Array { len: String, elem: Box<TypeExpr> },
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    Func(Signature),
    Struct(Vec<FieldDecl>),
    Interface(Vec<InterfaceElem>),
    Union(Vec<UnionTerm>),
    /// Variadic parameter type `...T`.
    Ellipsis(Box<TypeExpr>),
    Paren(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn ident(name: &str) -> Self {
        TypeExpr::Ident(name.to_string())
    }

    /// Field name Go gives an embedded field of this type: the unqualified
    /// type name with pointers and type arguments stripped.
    pub fn embedded_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Ident(name) => Some(name.as_str()),
            TypeExpr::Qualified { name, .. } => Some(name.as_str()),
            TypeExpr::Pointer(inner) | TypeExpr::Paren(inner) => inner.embedded_name(),
            TypeExpr::Generic { base, .. } => base.embedded_name(),
            _ => None,
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.names.is_empty() {
            write_list(f, &self.names, ", ")?;
            f.write_str(" ")?;
        }
        write!(f, "{}", self.ty)?;
        if let Some(tag) = &self.tag {
            write!(f, " `{tag}`")?;
        }
        Ok(())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        write_list(f, &self.params, ", ")?;
        f.write_str(")")?;
        match self.results.as_slice() {
            [] => Ok(()),
            [single] if single.names.is_empty() => write!(f, " {}", single.ty),
            results => {
                f.write_str(" (")?;
                write_list(f, results, ", ")?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for InterfaceElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceElem::Method { name, signature } => write!(f, "{name}{signature}"),
            InterfaceElem::Embedded(ty) => write!(f, "{ty}"),
        }
    }
}

impl fmt::Display for UnionTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tilde {
            f.write_str("~")?;
        }
        write!(f, "{}", self.ty)
    }
}

/// Canonical Go source text, spaced the way gofmt prints it.
impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Ident(name) => f.write_str(name),
            TypeExpr::Qualified { package, name } => write!(f, "{package}.{name}"),
            TypeExpr::Generic { base, args } => {
                write!(f, "{base}[")?;
                write_list(f, args, ", ")?;
                f.write_str("]")
            }
            TypeExpr::Pointer(inner) => write!(f, "*{inner}"),
            TypeExpr::Slice(elem) => write!(f, "[]{elem}"),
            TypeExpr::Array { len, elem } => write!(f, "[{len}]{elem}"),
            TypeExpr::Map { key, value } => write!(f, "map[{key}]{value}"),
            TypeExpr::Chan { dir, elem } => match dir {
                ChanDir::Both => write!(f, "chan {elem}"),
                ChanDir::Send => write!(f, "chan<- {elem}"),
                ChanDir::Recv => write!(f, "<-chan {elem}"),
            },
            TypeExpr::Func(sig) => write!(f, "func{sig}"),
            TypeExpr::Struct(fields) if fields.is_empty() => f.write_str("struct{}"),
            TypeExpr::Struct(fields) => {
                f.write_str("struct{ ")?;
                write_list(f, fields, "; ")?;
                f.write_str(" }")
            }
            TypeExpr::Interface(elems) if elems.is_empty() => f.write_str("interface{}"),
            TypeExpr::Interface(elems) => {
                f.write_str("interface{ ")?;
                write_list(f, elems, "; ")?;
                f.write_str(" }")
            }
            TypeExpr::Union(terms) => write_list(f, terms, " | "),
            TypeExpr::Ellipsis(elem) => write!(f, "...{elem}"),
            TypeExpr::Paren(inner) => write!(f, "({inner})"),
        }
    }
}
