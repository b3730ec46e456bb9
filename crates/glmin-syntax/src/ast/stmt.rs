//! Statements.

use alloc::{boxed::Box, vec::Vec};

use super::{decl::Declaration, expr::Expr};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `{ ... }`, which opens a new scope.
    Compound(Vec<Statement>),
    Declaration(Declaration),
    /// Expression statement; `None` is the empty statement `;`.
    Expression(Option<Expr>),
    If {
        condition: Expr,
        then: Box<Statement>,
        otherwise: Option<Box<Statement>>,
    },
    While {
        condition: Expr,
        body: Box<Statement>,
    },
    DoWhile {
        body: Box<Statement>,
        condition: Expr,
    },
    For {
        /// Always a `Declaration` or `Expression` statement.
        init: Box<Statement>,
        condition: Option<Expr>,
        step: Option<Expr>,
        body: Box<Statement>,
    },
    Continue,
    Break,
    Return(Option<Expr>),
    Discard,
}
