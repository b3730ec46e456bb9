//! Abstract syntax tree for GLSL ES shaders.
//!
//! Every node category is a closed enum or plain struct; consumers match
//! exhaustively so adding a node kind is a compile error everywhere it must
//! be handled.

mod decl;
mod expr;
mod stmt;

use alloc::{string::String, vec::Vec};

pub use decl::{
    ArraySize, DeclScope, Declaration, Declarator, FullySpecifiedType, FunctionDefinition,
    FunctionPrototype, Parameter, ParameterDirection, Precision, PrecisionDeclaration,
    StructDeclarator, StructMember, StructSpecifier, TypeQualifier, TypeSpecifier,
};
pub use expr::{AssignOp, BinaryOp, Expr, FloatLiteral, PostfixOp, Precedence, UnaryOp};
pub use stmt::Statement;

/// Pipeline stage a shader runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; 2] = [ShaderStage::Vertex, ShaderStage::Fragment];

    pub fn as_str(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl core::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-conditional preprocessor directive, kept verbatim.
///
/// `#define FOO 1` has name `define` and value `FOO 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionalKind {
    If,
    IfDef,
    IfNDef,
}

impl ConditionalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionalKind::If => "if",
            ConditionalKind::IfDef => "ifdef",
            ConditionalKind::IfNDef => "ifndef",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBranch {
    /// Condition text exactly as written after `#elif`.
    pub condition: String,
    pub body: Vec<ExternalDeclaration>,
}

/// `#if`/`#ifdef`/`#ifndef` ... `#endif` around top-level items.
///
/// The condition is never evaluated; every branch is part of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub kind: ConditionalKind,
    pub condition: String,
    pub body: Vec<ExternalDeclaration>,
    pub elifs: Vec<ConditionalBranch>,
    pub otherwise: Option<Vec<ExternalDeclaration>>,
}

impl Conditional {
    /// All branch bodies in source order.
    pub fn branches(&self) -> impl Iterator<Item = &Vec<ExternalDeclaration>> {
        core::iter::once(&self.body)
            .chain(self.elifs.iter().map(|branch| &branch.body))
            .chain(self.otherwise.iter())
    }

    pub fn branches_mut(&mut self) -> impl Iterator<Item = &mut Vec<ExternalDeclaration>> {
        core::iter::once(&mut self.body)
            .chain(self.elifs.iter_mut().map(|branch| &mut branch.body))
            .chain(self.otherwise.iter_mut())
    }
}

/// A top-level item.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalDeclaration {
    Directive(Directive),
    Conditional(Conditional),
    Precision(PrecisionDeclaration),
    /// `invariant a, b;` applied to already declared varyings.
    Invariant(Vec<String>),
    Declaration(Declaration),
    FunctionPrototype(FunctionPrototype),
    FunctionDefinition(FunctionDefinition),
}

/// A whole shader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationUnit {
    pub items: Vec<ExternalDeclaration>,
}

impl TranslationUnit {
    pub fn new(items: Vec<ExternalDeclaration>) -> Self {
        Self { items }
    }
}

/// Result of parsing under any start rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    TranslationUnit(TranslationUnit),
    Statement(Statement),
    Expression(Expr),
}

impl Ast {
    pub fn as_translation_unit(&self) -> Option<&TranslationUnit> {
        match self {
            Ast::TranslationUnit(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn into_translation_unit(self) -> Option<TranslationUnit> {
        match self {
            Ast::TranslationUnit(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&Expr> {
        match self {
            Ast::Expression(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn as_statement(&self) -> Option<&Statement> {
        match self {
            Ast::Statement(stmt) => Some(stmt),
            _ => None,
        }
    }
}

impl From<TranslationUnit> for Ast {
    fn from(unit: TranslationUnit) -> Self {
        Ast::TranslationUnit(unit)
    }
}

impl From<Statement> for Ast {
    fn from(stmt: Statement) -> Self {
        Ast::Statement(stmt)
    }
}

impl From<Expr> for Ast {
    fn from(expr: Expr) -> Self {
        Ast::Expression(expr)
    }
}
