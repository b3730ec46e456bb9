//! Mutable tree traversal.
//!
//! Implement [`VisitorMut`] and override the hooks of interest; the default
//! of every `visit_*` method calls the matching `walk_*` function, which
//! visits the node's children. Name hooks receive `&mut String` so a pass
//! can rename in place.
//!
//! Scopes are reported with [`VisitorMut::enter_scope`] and
//! [`VisitorMut::exit_scope`]. A function definition opens one scope for
//! its parameters and body; compound statements and `for` loops open a
//! block scope.

use alloc::{string::String, vec::Vec};

use crate::ast::{
    ArraySize, Conditional, DeclScope, Declaration, Declarator, Directive, Expr,
    ExternalDeclaration, FullySpecifiedType, FunctionDefinition, FunctionPrototype, Parameter,
    Statement, StructSpecifier, TranslationUnit, TypeSpecifier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Parameters and body of a function definition.
    Function,
    /// Parameters of a prototype without a body.
    Prototype,
    /// Compound statement or `for` loop.
    Block,
}

pub trait VisitorMut {
    fn visit_translation_unit(&mut self, unit: &mut TranslationUnit) {
        walk_translation_unit(self, unit);
    }

    fn visit_external_declaration(&mut self, item: &mut ExternalDeclaration) {
        walk_external_declaration(self, item);
    }

    fn visit_directive(&mut self, _directive: &mut Directive) {}

    fn visit_conditional(&mut self, cond: &mut Conditional) {
        walk_conditional(self, cond);
    }

    /// Names listed in `invariant a, b;`.
    fn visit_invariant(&mut self, names: &mut Vec<String>) {
        for name in names {
            self.visit_variable_name(name);
        }
    }

    fn visit_declaration(&mut self, decl: &mut Declaration, scope: DeclScope) {
        walk_declaration(self, decl, scope);
    }

    fn visit_declarator(
        &mut self,
        ty: &FullySpecifiedType,
        declarator: &mut Declarator,
        scope: DeclScope,
    ) {
        walk_declarator(self, ty, declarator, scope);
    }

    /// A variable name at its declaration.
    fn visit_declared_name(
        &mut self,
        _ty: &FullySpecifiedType,
        _name: &mut String,
        _scope: DeclScope,
    ) {
    }

    fn visit_type_specifier(&mut self, spec: &mut TypeSpecifier) {
        walk_type_specifier(self, spec);
    }

    fn visit_struct_specifier(&mut self, spec: &mut StructSpecifier) {
        walk_struct_specifier(self, spec);
    }

    /// A type name, either declared by a struct or referenced.
    fn visit_type_name(&mut self, _name: &mut String) {}

    /// A struct member, at its declaration or after `.`.
    fn visit_field_name(&mut self, _name: &mut String) {}

    fn visit_function_prototype(&mut self, proto: &mut FunctionPrototype) {
        walk_function_prototype(self, proto);
    }

    fn visit_function_definition(&mut self, def: &mut FunctionDefinition) {
        walk_function_definition(self, def);
    }

    /// The name of a function being declared or defined.
    fn visit_function_name(&mut self, _name: &mut String, _arity: usize) {}

    fn visit_parameter(&mut self, param: &mut Parameter) {
        walk_parameter(self, param);
    }

    fn visit_parameter_name(&mut self, _name: &mut String) {}

    fn visit_statement(&mut self, stmt: &mut Statement) {
        walk_statement(self, stmt);
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        walk_expr(self, expr);
    }

    /// A name used as a value.
    fn visit_variable_name(&mut self, _name: &mut String) {}

    /// The name in a call: a function, struct or built-in constructor.
    fn visit_callee(&mut self, _name: &mut String, _arity: usize) {}

    fn enter_scope(&mut self, _kind: ScopeKind) {}

    fn exit_scope(&mut self) {}
}

pub fn walk_translation_unit<V: VisitorMut + ?Sized>(v: &mut V, unit: &mut TranslationUnit) {
    for item in &mut unit.items {
        v.visit_external_declaration(item);
    }
}

pub fn walk_external_declaration<V: VisitorMut + ?Sized>(
    v: &mut V,
    item: &mut ExternalDeclaration,
) {
    match item {
        ExternalDeclaration::Directive(directive) => v.visit_directive(directive),
        ExternalDeclaration::Conditional(cond) => v.visit_conditional(cond),
        ExternalDeclaration::Precision(decl) => v.visit_type_name(&mut decl.ty),
        ExternalDeclaration::Invariant(names) => v.visit_invariant(names),
        ExternalDeclaration::Declaration(decl) => v.visit_declaration(decl, DeclScope::Global),
        ExternalDeclaration::FunctionPrototype(proto) => v.visit_function_prototype(proto),
        ExternalDeclaration::FunctionDefinition(def) => v.visit_function_definition(def),
    }
}

/// Visits every branch; conditions are never evaluated.
pub fn walk_conditional<V: VisitorMut + ?Sized>(v: &mut V, cond: &mut Conditional) {
    for branch in cond.branches_mut() {
        for item in branch {
            v.visit_external_declaration(item);
        }
    }
}

pub fn walk_declaration<V: VisitorMut + ?Sized>(
    v: &mut V,
    decl: &mut Declaration,
    scope: DeclScope,
) {
    let Declaration { ty, declarators } = decl;
    v.visit_type_specifier(&mut ty.specifier);
    for declarator in declarators {
        v.visit_declarator(ty, declarator, scope);
    }
}

/// Visits the array size and initializer before the name, which is not in
/// scope until its declarator is complete.
pub fn walk_declarator<V: VisitorMut + ?Sized>(
    v: &mut V,
    ty: &FullySpecifiedType,
    declarator: &mut Declarator,
    scope: DeclScope,
) {
    if let Some(ArraySize::Sized(size)) = &mut declarator.array {
        v.visit_expr(size);
    }
    if let Some(init) = &mut declarator.initializer {
        v.visit_expr(init);
    }
    v.visit_declared_name(ty, &mut declarator.name, scope);
}

pub fn walk_type_specifier<V: VisitorMut + ?Sized>(v: &mut V, spec: &mut TypeSpecifier) {
    match spec {
        TypeSpecifier::Named(name) => v.visit_type_name(name),
        TypeSpecifier::Struct(spec) => v.visit_struct_specifier(spec),
    }
}

pub fn walk_struct_specifier<V: VisitorMut + ?Sized>(v: &mut V, spec: &mut StructSpecifier) {
    if let Some(name) = &mut spec.name {
        v.visit_type_name(name);
    }
    for member in &mut spec.members {
        v.visit_type_name(&mut member.ty);
        for declarator in &mut member.declarators {
            if let Some(size) = &mut declarator.array_size {
                v.visit_expr(size);
            }
            v.visit_field_name(&mut declarator.name);
        }
    }
}

pub fn walk_function_prototype<V: VisitorMut + ?Sized>(v: &mut V, proto: &mut FunctionPrototype) {
    v.visit_type_specifier(&mut proto.return_type.specifier);
    let arity = proto.params.len();
    v.visit_function_name(&mut proto.name, arity);
    v.enter_scope(ScopeKind::Prototype);
    for param in &mut proto.params {
        v.visit_parameter(param);
    }
    v.exit_scope();
}

pub fn walk_function_definition<V: VisitorMut + ?Sized>(v: &mut V, def: &mut FunctionDefinition) {
    let proto = &mut def.prototype;
    v.visit_type_specifier(&mut proto.return_type.specifier);
    let arity = proto.params.len();
    v.visit_function_name(&mut proto.name, arity);
    v.enter_scope(ScopeKind::Function);
    for param in &mut proto.params {
        v.visit_parameter(param);
    }
    for stmt in &mut def.body {
        v.visit_statement(stmt);
    }
    v.exit_scope();
}

pub fn walk_parameter<V: VisitorMut + ?Sized>(v: &mut V, param: &mut Parameter) {
    v.visit_type_name(&mut param.ty);
    if let Some(size) = &mut param.array_size {
        v.visit_expr(size);
    }
    if let Some(name) = &mut param.name {
        v.visit_parameter_name(name);
    }
}

pub fn walk_statement<V: VisitorMut + ?Sized>(v: &mut V, stmt: &mut Statement) {
    match stmt {
        Statement::Compound(body) => {
            v.enter_scope(ScopeKind::Block);
            for stmt in body {
                v.visit_statement(stmt);
            }
            v.exit_scope();
        }
        Statement::Declaration(decl) => v.visit_declaration(decl, DeclScope::Local),
        Statement::Expression(expr) => {
            if let Some(expr) = expr {
                v.visit_expr(expr);
            }
        }
        Statement::If {
            condition,
            then,
            otherwise,
        } => {
            v.visit_expr(condition);
            v.visit_statement(then);
            if let Some(otherwise) = otherwise {
                v.visit_statement(otherwise);
            }
        }
        Statement::While { condition, body } => {
            v.visit_expr(condition);
            v.visit_statement(body);
        }
        Statement::DoWhile { body, condition } => {
            v.visit_statement(body);
            v.visit_expr(condition);
        }
        Statement::For {
            init,
            condition,
            step,
            body,
        } => {
            v.enter_scope(ScopeKind::Block);
            v.visit_statement(init);
            if let Some(condition) = condition {
                v.visit_expr(condition);
            }
            if let Some(step) = step {
                v.visit_expr(step);
            }
            v.visit_statement(body);
            v.exit_scope();
        }
        Statement::Return(value) => {
            if let Some(value) = value {
                v.visit_expr(value);
            }
        }
        Statement::Continue | Statement::Break | Statement::Discard => {}
    }
}

pub fn walk_expr<V: VisitorMut + ?Sized>(v: &mut V, expr: &mut Expr) {
    match expr {
        Expr::Identifier(name) => v.visit_variable_name(name),
        Expr::IntConst(_) | Expr::FloatConst(_) | Expr::BoolConst(_) => {}
        Expr::Unary { operand, .. } | Expr::Postfix { operand, .. } => v.visit_expr(operand),
        Expr::Binary { left, right, .. } | Expr::Assignment { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        Expr::Ternary {
            condition,
            then,
            otherwise,
        } => {
            v.visit_expr(condition);
            v.visit_expr(then);
            v.visit_expr(otherwise);
        }
        Expr::Index { base, index } => {
            v.visit_expr(base);
            v.visit_expr(index);
        }
        Expr::Field { base, field } => {
            v.visit_expr(base);
            v.visit_field_name(field);
        }
        Expr::Call { callee, args } => {
            let arity = args.len();
            v.visit_callee(callee, arity);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        Expr::Sequence(items) => {
            for item in items {
                v.visit_expr(item);
            }
        }
    }
}
