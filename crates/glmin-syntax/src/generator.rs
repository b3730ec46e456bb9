//! Canonical source generator.
//!
//! Emits the shortest text the parser reads back as the same tree: no
//! insignificant whitespace, parentheses only where precedence needs them,
//! and each preprocessor directive on a line of its own.

use alloc::string::{String, ToString};
use core::fmt;

use crate::ast::{
    ArraySize, Ast, Conditional, Declaration, Declarator, Directive, Expr, ExternalDeclaration,
    FullySpecifiedType, FunctionPrototype, Parameter, Precedence, Statement, StructSpecifier,
    TranslationUnit, TypeSpecifier,
};

/// Emit `ast` in canonical form.
pub fn emit(ast: &Ast) -> String {
    let mut generator = Generator::new();
    generator.ast(ast);
    generator.finish()
}

pub fn emit_translation_unit(unit: &TranslationUnit) -> String {
    let mut generator = Generator::new();
    generator.translation_unit(unit);
    generator.finish()
}

pub fn emit_expr(expr: &Expr) -> String {
    let mut generator = Generator::new();
    generator.expr(expr);
    generator.finish()
}

pub fn emit_statement(stmt: &Statement) -> String {
    let mut generator = Generator::new();
    generator.statement(stmt);
    generator.finish()
}

/// Output buffer that separates tokens only where the lexer needs it.
#[derive(Debug, Default)]
pub struct Generator {
    out: String,
    /// The last token was a numeric literal.
    after_number: bool,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn token(&mut self, text: &str) {
        if let (Some(last), Some(first)) = (self.out.chars().last(), text.chars().next()) {
            if needs_space(last, first) || (self.after_number && first == '.') {
                self.out.push(' ');
            }
        }
        self.out.push_str(text);
        self.after_number = false;
    }

    fn number(&mut self, text: &str) {
        self.token(text);
        self.after_number = true;
    }

    fn line(&mut self, text: &str) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.out.push_str(text);
        self.out.push('\n');
        self.after_number = false;
    }

    pub fn ast(&mut self, ast: &Ast) {
        match ast {
            Ast::TranslationUnit(unit) => self.translation_unit(unit),
            Ast::Statement(stmt) => self.statement(stmt),
            Ast::Expression(expr) => self.expr(expr),
        }
    }

    pub fn translation_unit(&mut self, unit: &TranslationUnit) {
        self.external_list(&unit.items);
    }

    fn external_list(&mut self, items: &[ExternalDeclaration]) {
        for item in items {
            self.external_declaration(item);
        }
    }

    fn external_declaration(&mut self, item: &ExternalDeclaration) {
        match item {
            ExternalDeclaration::Directive(directive) => self.directive(directive),
            ExternalDeclaration::Conditional(cond) => self.conditional(cond),
            ExternalDeclaration::Precision(decl) => {
                self.token("precision");
                self.token(decl.precision.as_str());
                self.token(&decl.ty);
                self.token(";");
            }
            ExternalDeclaration::Invariant(names) => {
                self.token("invariant");
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        self.token(",");
                    }
                    self.token(name);
                }
                self.token(";");
            }
            ExternalDeclaration::Declaration(decl) => self.declaration(decl),
            ExternalDeclaration::FunctionPrototype(proto) => {
                self.function_prototype(proto);
                self.token(";");
            }
            ExternalDeclaration::FunctionDefinition(def) => {
                self.function_prototype(&def.prototype);
                self.block(&def.body);
            }
        }
    }

    fn directive(&mut self, directive: &Directive) {
        let mut text = String::from("#");
        text.push_str(&directive.name);
        if !directive.value.is_empty() {
            text.push(' ');
            text.push_str(&directive.value);
        }
        self.line(&text);
    }

    fn conditional(&mut self, cond: &Conditional) {
        let mut head = String::from("#");
        head.push_str(cond.kind.as_str());
        head.push(' ');
        head.push_str(&cond.condition);
        self.line(&head);
        self.external_list(&cond.body);

        for branch in &cond.elifs {
            let mut head = String::from("#elif ");
            head.push_str(&branch.condition);
            self.line(&head);
            self.external_list(&branch.body);
        }
        if let Some(otherwise) = &cond.otherwise {
            self.line("#else");
            self.external_list(otherwise);
        }
        self.line("#endif");
    }

    fn fully_specified_type(&mut self, ty: &FullySpecifiedType) {
        if let Some(qualifier) = ty.qualifier {
            self.token(qualifier.as_str());
        }
        if let Some(precision) = ty.precision {
            self.token(precision.as_str());
        }
        match &ty.specifier {
            TypeSpecifier::Named(name) => self.token(name),
            TypeSpecifier::Struct(spec) => self.struct_specifier(spec),
        }
    }

    fn struct_specifier(&mut self, spec: &StructSpecifier) {
        self.token("struct");
        if let Some(name) = &spec.name {
            self.token(name);
        }
        self.token("{");
        for member in &spec.members {
            if let Some(precision) = member.precision {
                self.token(precision.as_str());
            }
            self.token(&member.ty);
            for (i, declarator) in member.declarators.iter().enumerate() {
                if i > 0 {
                    self.token(",");
                }
                self.token(&declarator.name);
                if let Some(size) = &declarator.array_size {
                    self.array_size(size);
                }
            }
            self.token(";");
        }
        self.token("}");
    }

    fn array_size(&mut self, size: &Expr) {
        self.token("[");
        self.expr_at(size, Precedence::Conditional);
        self.token("]");
    }

    /// Declaration including its `;`.
    fn declaration(&mut self, decl: &Declaration) {
        self.fully_specified_type(&decl.ty);
        for (i, declarator) in decl.declarators.iter().enumerate() {
            if i > 0 {
                self.token(",");
            }
            self.declarator(declarator);
        }
        self.token(";");
    }

    fn declarator(&mut self, declarator: &Declarator) {
        self.token(&declarator.name);
        match &declarator.array {
            Some(ArraySize::Unsized) => {
                self.token("[");
                self.token("]");
            }
            Some(ArraySize::Sized(size)) => self.array_size(size),
            None => {}
        }
        if let Some(init) = &declarator.initializer {
            self.token("=");
            self.expr_at(init, Precedence::Assignment);
        }
    }

    fn function_prototype(&mut self, proto: &FunctionPrototype) {
        self.fully_specified_type(&proto.return_type);
        self.token(&proto.name);
        self.token("(");
        for (i, param) in proto.params.iter().enumerate() {
            if i > 0 {
                self.token(",");
            }
            self.parameter(param);
        }
        self.token(")");
    }

    fn parameter(&mut self, param: &Parameter) {
        if param.constant {
            self.token("const");
        }
        if let Some(direction) = param.direction {
            self.token(direction.as_str());
        }
        if let Some(precision) = param.precision {
            self.token(precision.as_str());
        }
        self.token(&param.ty);
        if let Some(name) = &param.name {
            self.token(name);
        }
        if let Some(size) = &param.array_size {
            self.array_size(size);
        }
    }

    fn block(&mut self, body: &[Statement]) {
        self.token("{");
        for stmt in body {
            self.statement(stmt);
        }
        self.token("}");
    }

    pub fn statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Compound(body) => self.block(body),
            Statement::Declaration(decl) => self.declaration(decl),
            Statement::Expression(expr) => {
                if let Some(expr) = expr {
                    self.expr(expr);
                }
                self.token(";");
            }
            Statement::If {
                condition,
                then,
                otherwise,
            } => {
                self.token("if");
                self.parenthesized(condition);
                self.statement(then);
                if let Some(otherwise) = otherwise {
                    self.token("else");
                    self.statement(otherwise);
                }
            }
            Statement::While { condition, body } => {
                self.token("while");
                self.parenthesized(condition);
                self.statement(body);
            }
            Statement::DoWhile { body, condition } => {
                self.token("do");
                self.statement(body);
                self.token("while");
                self.parenthesized(condition);
                self.token(";");
            }
            Statement::For {
                init,
                condition,
                step,
                body,
            } => {
                self.token("for");
                self.token("(");
                self.statement(init);
                if let Some(condition) = condition {
                    self.expr(condition);
                }
                self.token(";");
                if let Some(step) = step {
                    self.expr(step);
                }
                self.token(")");
                self.statement(body);
            }
            Statement::Continue => {
                self.token("continue");
                self.token(";");
            }
            Statement::Break => {
                self.token("break");
                self.token(";");
            }
            Statement::Return(value) => {
                self.token("return");
                if let Some(value) = value {
                    self.expr(value);
                }
                self.token(";");
            }
            Statement::Discard => {
                self.token("discard");
                self.token(";");
            }
        }
    }

    fn parenthesized(&mut self, expr: &Expr) {
        self.token("(");
        self.expr(expr);
        self.token(")");
    }

    /// Emit `expr` in a slot that binds at least as tight as `min`.
    fn expr_at(&mut self, expr: &Expr, min: Precedence) {
        if expr.precedence() < min {
            self.parenthesized(expr);
        } else {
            self.expr(expr);
        }
    }

    pub fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Identifier(name) => self.token(name),
            Expr::IntConst(value) => self.number(&value.to_string()),
            Expr::FloatConst(value) => self.number(value.as_str()),
            Expr::BoolConst(value) => self.token(if *value { "true" } else { "false" }),
            Expr::Unary { op, operand } => {
                self.token(op.as_str());
                self.expr_at(operand, Precedence::Unary);
            }
            Expr::Postfix { op, operand } => {
                // `x++++` does not parse, so a stepped operand keeps its parentheses.
                if matches!(**operand, Expr::Postfix { .. }) {
                    self.parenthesized(operand);
                } else {
                    self.expr_at(operand, Precedence::Postfix);
                }
                self.token(op.as_str());
            }
            Expr::Binary { left, op, right } => {
                let level = op.precedence();
                self.expr_at(left, level);
                self.token(op.as_str());
                self.expr_at(right, level.tighter());
            }
            Expr::Assignment { left, op, right } => {
                self.expr_at(left, Precedence::Unary);
                self.token(op.as_str());
                self.expr_at(right, Precedence::Assignment);
            }
            Expr::Ternary {
                condition,
                then,
                otherwise,
            } => {
                self.expr_at(condition, Precedence::LogicalOr);
                self.token("?");
                self.expr(then);
                self.token(":");
                self.expr_at(otherwise, Precedence::Assignment);
            }
            Expr::Index { base, index } => {
                self.expr_at(base, Precedence::Postfix);
                self.token("[");
                self.expr(index);
                self.token("]");
            }
            Expr::Field { base, field } => {
                self.expr_at(base, Precedence::Postfix);
                self.token(".");
                self.token(field);
            }
            Expr::Call { callee, args } => {
                self.token(callee);
                self.token("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.token(",");
                    }
                    self.expr_at(arg, Precedence::Assignment);
                }
                self.token(")");
            }
            Expr::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.token(",");
                    }
                    self.expr_at(item, Precedence::Assignment);
                }
            }
        }
    }
}

/// Whether two adjacent characters from different tokens would lex as one.
fn needs_space(last: char, first: char) -> bool {
    let word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    (word(last) && word(first))
        || (last == first && matches!(last, '+' | '-'))
        || (last == '/' && matches!(first, '/' | '*'))
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&emit(self))
    }
}

impl fmt::Display for TranslationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&emit_translation_unit(self))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&emit_statement(self))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&emit_expr(self))
    }
}
