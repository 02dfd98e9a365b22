use crate::syntax::TypeExpr;

/// Render a type expression as the text a template receives.
///
/// Slices, arrays, pointers and qualified names are rendered recursively.
/// Arrays come out as slices (`[4]byte` becomes `[]byte`). Map keys and
/// values are substituted as written rather than recursed into, and every
/// other shape falls back to its canonical source text. Never fails.
pub fn type_string(expr: &TypeExpr) -> String {
    match expr {
        TypeExpr::Slice(elem) | TypeExpr::Array { elem, .. } => format!("[]{}", type_string(elem)),
        TypeExpr::Map { key, value } => format!("map[{key}]{value}"),
        TypeExpr::Qualified { package, name } => format!("{package}.{name}"),
        TypeExpr::Pointer(inner) => format!("*{}", type_string(inner)),
        TypeExpr::Ellipsis(elem) => format!("...{elem}"),
        other => other.to_string(),
    }
}
