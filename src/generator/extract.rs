use std::fmt;

use serde::Serialize;

use super::stringify::type_string;
use crate::package::SyntaxForest;
use crate::syntax::{FieldDecl, InterfaceElem, TypeExpr, TypeSpec, Visitor};

/// A struct member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Tag text without its quotes.
    pub tag: Option<String>,
    pub embedded: bool,
}

/// One parameter or result slot of a method signature.
///
/// `(a, b int)` is a single slot with two names; an unnamed parameter is a
/// slot with no names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodField {
    pub names: Vec<String>,
    #[serde(rename = "type")]
    pub ty: String,
}

/// An interface method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method {
    pub name: String,
    pub params: Vec<MethodField>,
    pub results: Vec<MethodField>,
}

impl fmt::Display for MethodField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.names.is_empty() {
            write!(f, "{} ", self.names.join(", "))?;
        }
        f.write_str(&self.ty)
    }
}

fn write_slots(f: &mut fmt::Formatter<'_>, slots: &[MethodField]) -> fmt::Result {
    for (i, slot) in slots.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{slot}")?;
    }
    Ok(())
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        write_slots(f, &self.params)?;
        f.write_str(")")?;
        match self.results.as_slice() {
            [] => Ok(()),
            [only] if only.names.is_empty() => write!(f, " {}", only.ty),
            results => {
                f.write_str(" (")?;
                write_slots(f, results)?;
                f.write_str(")")
            }
        }
    }
}

/// Structural description of one named type.
///
/// At most one of the two lists is non-empty for a given declaration, but
/// both are empty when the type is missing or is neither a struct nor an
/// interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

impl TypeDescriptor {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.methods.is_empty()
    }
}

/// Collects fields and methods of every type declaration named `type_name`.
struct Extractor<'a> {
    type_name: &'a str,
    out: TypeDescriptor,
}

impl<'ast> Visitor<'ast> for Extractor<'_> {
    fn visit_type_spec(&mut self, spec: &'ast TypeSpec) {
        if spec.name != self.type_name {
            return;
        }
        match &spec.ty {
            TypeExpr::Struct(members) => {
                for member in members {
                    push_fields(&mut self.out.fields, member);
                }
            }
            TypeExpr::Interface(elems) => {
                for elem in elems {
                    if let InterfaceElem::Method { name, signature } = elem {
                        self.out.methods.push(Method {
                            name: name.clone(),
                            params: slots(&signature.params),
                            results: slots(&signature.results),
                        });
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_fields(out: &mut Vec<Field>, member: &FieldDecl) {
    let ty = type_string(&member.ty);
    if member.names.is_empty() {
        let name = member
            .ty
            .embedded_name()
            .map(str::to_string)
            .unwrap_or_else(|| member.ty.to_string());
        out.push(Field {
            name,
            ty,
            tag: member.tag.clone(),
            embedded: true,
        });
        return;
    }
    for name in &member.names {
        out.push(Field {
            name: name.clone(),
            ty: ty.clone(),
            tag: member.tag.clone(),
            embedded: false,
        });
    }
}

fn slots(decls: &[FieldDecl]) -> Vec<MethodField> {
    decls
        .iter()
        .map(|decl| MethodField {
            names: decl.names.clone(),
            ty: type_string(&decl.ty),
        })
        .collect()
}

/// Describe `type_name` from every declaration of it in the forest, in file
/// and declaration order. Matches from several files are concatenated.
pub fn extract(forest: &SyntaxForest, type_name: &str) -> TypeDescriptor {
    let mut extractor = Extractor {
        type_name,
        out: TypeDescriptor::default(),
    };
    forest.walk(&mut extractor);
    extractor.out
}

pub fn extract_fields(forest: &SyntaxForest, type_name: &str) -> Vec<Field> {
    extract(forest, type_name).fields
}

pub fn extract_methods(forest: &SyntaxForest, type_name: &str) -> Vec<Method> {
    extract(forest, type_name).methods
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn forest(sources: &[(&str, &str)]) -> SyntaxForest {
        SyntaxForest::from_sources(sources.iter().copied()).unwrap()
    }

    fn slot(names: &[&str], ty: &str) -> MethodField {
        MethodField {
            names: names.iter().map(|n| n.to_string()).collect(),
            ty: ty.to_string(),
        }
    }

    #[test]
    fn struct_fields_in_declared_order() {
        let f = forest(&[(
            "point.go",
            "package geo\n\ntype Point struct {\n\tX int\n\tY int `json:\"y\"`\n\tLabels, Tags []string\n\tio.Reader\n\t*Base\n}\n",
        )]);
        let fields = extract_fields(&f, "Point");
        let summary: Vec<_> = fields
            .iter()
            .map(|f| (f.name.as_str(), f.ty.as_str(), f.embedded))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("X", "int", false),
                ("Y", "int", false),
                ("Labels", "[]string", false),
                ("Tags", "[]string", false),
                ("Reader", "io.Reader", true),
                ("Base", "*Base", true),
            ]
        );
        assert_eq!(fields[1].tag.as_deref(), Some("json:\"y\""));
        assert!(fields[0].tag.is_none());
        assert!(extract_methods(&f, "Point").is_empty());
    }

    #[test]
    fn interface_methods_keep_slot_shape() {
        let f = forest(&[(
            "reader.go",
            "package io\n\ntype Reader interface {\n\tRead(p []byte) (n int, err error)\n\tfmt.Stringer\n\tSeek(int64, int) (int64, error)\n\tCopy(dst, src *Buffer)\n}\n",
        )]);
        let methods = extract_methods(&f, "Reader");
        assert_eq!(methods.len(), 3);

        assert_eq!(methods[0].name, "Read");
        assert_eq!(methods[0].params, vec![slot(&["p"], "[]byte")]);
        assert_eq!(
            methods[0].results,
            vec![slot(&["n"], "int"), slot(&["err"], "error")]
        );

        assert_eq!(methods[1].params, vec![slot(&[], "int64"), slot(&[], "int")]);
        assert_eq!(methods[1].results, vec![slot(&[], "int64"), slot(&[], "error")]);

        assert_eq!(methods[2].params, vec![slot(&["dst", "src"], "*Buffer")]);
        assert!(methods[2].results.is_empty());
    }

    #[test]
    fn matches_across_files_are_concatenated() {
        let f = forest(&[
            ("a.go", "package p\n\ntype T struct { A int }\n"),
            ("b.go", "package p\n\ntype T struct { B string }\n"),
        ]);
        let names: Vec<_> = extract_fields(&f, "T").into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn missing_or_other_types_are_empty() {
        let f = forest(&[(
            "a.go",
            "package p\n\ntype ID int\ntype Fn func() error\nfunc (ID) Get() {}\n",
        )]);
        assert!(extract(&f, "ID").is_empty());
        assert!(extract(&f, "Fn").is_empty());
        assert!(extract(&f, "Nope").is_empty());
    }

    #[test]
    fn grouped_and_generic_declarations() {
        let f = forest(&[(
            "a.go",
            "package p\n\ntype (\n\tPair[K comparable, V any] struct {\n\t\tKey K\n\t\tVal map[K][]V\n\t}\n\tStore interface {\n\t\tGet(key string) (*Pair[string, int], bool)\n\t}\n)\n",
        )]);
        let fields = extract_fields(&f, "Pair");
        assert_eq!(fields[1].ty, "map[K][]V");
        let methods = extract_methods(&f, "Store");
        assert_eq!(methods[0].results[0].ty, "*Pair[string, int]");
    }

    #[test]
    fn method_display() {
        let f = forest(&[(
            "a.go",
            "package p\n\ntype R interface {\n\tRead(p []byte) (n int, err error)\n\tClose() error\n}\n",
        )]);
        let methods = extract_methods(&f, "R");
        assert_eq!(methods[0].to_string(), "Read(p []byte) (n int, err error)");
        assert_eq!(methods[1].to_string(), "Close() error");
    }
}
