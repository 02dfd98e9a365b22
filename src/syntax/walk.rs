use crate::syntax::ast::{Decl, FuncDecl, SourceFile, TypeSpec};

/// Read-only traversal over the declaration tree.
///
/// Every `visit_*` method has a default that keeps descending, so an
/// implementation only overrides the nodes it cares about.
pub trait Visitor<'ast> {
    fn visit_source_file(&mut self, file: &'ast SourceFile) {
        walk_source_file(self, file);
    }

    fn visit_decl(&mut self, decl: &'ast Decl) {
        walk_decl(self, decl);
    }

    fn visit_type_spec(&mut self, _spec: &'ast TypeSpec) {}

    fn visit_func_decl(&mut self, _func: &'ast FuncDecl) {}

    fn visit_value_names(&mut self, _names: &'ast [String]) {}
}

pub fn walk_source_file<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, file: &'ast SourceFile) {
    for decl in &file.decls {
        v.visit_decl(decl);
    }
}

pub fn walk_decl<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, decl: &'ast Decl) {
    match decl {
        Decl::Type(spec) => v.visit_type_spec(spec),
        Decl::Func(func) => v.visit_func_decl(func),
        Decl::Value { names, .. } => v.visit_value_names(names),
    }
}
