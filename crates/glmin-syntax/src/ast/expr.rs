//! Expression nodes.

use alloc::{
    boxed::Box,
    string::{String, ToString},
    vec::Vec,
};

/// Binding strength of an expression, from loosest to tightest.
///
/// The parser and the generator share this ordering: the generator wraps a
/// child in parentheses exactly when its precedence is lower than the slot
/// it is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    Sequence,
    Assignment,
    Conditional,
    LogicalOr,
    LogicalXor,
    LogicalAnd,
    BitOr,
    BitXor,
    BitAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Unary,
    Postfix,
    Primary,
}

impl Precedence {
    /// The next tighter level. Used for the right operand of left-associative
    /// operators.
    pub fn tighter(self) -> Precedence {
        use Precedence::*;
        match self {
            Sequence => Assignment,
            Assignment => Conditional,
            Conditional => LogicalOr,
            LogicalOr => LogicalXor,
            LogicalXor => LogicalAnd,
            LogicalAnd => BitOr,
            BitOr => BitXor,
            BitXor => BitAnd,
            BitAnd => Equality,
            Equality => Relational,
            Relational => Shift,
            Shift => Additive,
            Additive => Multiplicative,
            Multiplicative => Unary,
            Unary => Postfix,
            Postfix | Primary => Primary,
        }
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Inc,
    Dec,
    Not,
    BitNot,
}

impl UnaryOp {
    /// The operator token as written in source.
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Inc => "++",
            UnaryOp::Dec => "--",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => UnaryOp::Plus,
            "-" => UnaryOp::Minus,
            "++" => UnaryOp::Inc,
            "--" => UnaryOp::Dec,
            "!" => UnaryOp::Not,
            "~" => UnaryOp::BitNot,
            _ => return None,
        })
    }
}

/// Postfix increment and decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostfixOp {
    Inc,
    Dec,
}

impl PostfixOp {
    pub fn as_str(self) -> &'static str {
        match self {
            PostfixOp::Inc => "++",
            PostfixOp::Dec => "--",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "++" => Some(PostfixOp::Inc),
            "--" => Some(PostfixOp::Dec),
            _ => None,
        }
    }
}

/// Binary operators, all left-associative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Xor,
    Or,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::And => "&&",
            BinaryOp::Xor => "^^",
            BinaryOp::Or => "||",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "&" => BinaryOp::BitAnd,
            "^" => BinaryOp::BitXor,
            "|" => BinaryOp::BitOr,
            "&&" => BinaryOp::And,
            "^^" => BinaryOp::Xor,
            "||" => BinaryOp::Or,
            _ => return None,
        })
    }

    pub fn precedence(self) -> Precedence {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => Precedence::Multiplicative,
            BinaryOp::Add | BinaryOp::Sub => Precedence::Additive,
            BinaryOp::Shl | BinaryOp::Shr => Precedence::Shift,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => Precedence::Relational,
            BinaryOp::Eq | BinaryOp::Ne => Precedence::Equality,
            BinaryOp::BitAnd => Precedence::BitAnd,
            BinaryOp::BitXor => Precedence::BitXor,
            BinaryOp::BitOr => Precedence::BitOr,
            BinaryOp::And => Precedence::LogicalAnd,
            BinaryOp::Xor => Precedence::LogicalXor,
            BinaryOp::Or => Precedence::LogicalOr,
        }
    }
}

/// Assignment operators, all right-associative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BitAnd,
    BitXor,
    BitOr,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitXor => "^=",
            AssignOp::BitOr => "|=",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "=" => AssignOp::Assign,
            "+=" => AssignOp::Add,
            "-=" => AssignOp::Sub,
            "*=" => AssignOp::Mul,
            "/=" => AssignOp::Div,
            "%=" => AssignOp::Mod,
            "<<=" => AssignOp::Shl,
            ">>=" => AssignOp::Shr,
            "&=" => AssignOp::BitAnd,
            "^=" => AssignOp::BitXor,
            "|=" => AssignOp::BitOr,
            _ => return None,
        })
    }
}

/// A floating point literal in canonical text form.
///
/// The value is kept as text so that emitting it never changes the digits
/// the author wrote; only insignificant zeros and exponent decoration are
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FloatLiteral(String);

impl FloatLiteral {
    /// Normalize a float literal as matched by the lexer.
    ///
    /// `42.0` becomes `42.`, `0.50` becomes `.5`, `1E+05` becomes `1e5`.
    pub fn new(text: &str) -> Self {
        let (mantissa, exponent) = match text.find(['e', 'E']) {
            Some(at) => (&text[..at], Some(&text[at + 1..])),
            None => (text, None),
        };

        let mut out = String::new();
        match mantissa.find('.') {
            Some(dot) => {
                let whole = mantissa[..dot].trim_start_matches('0');
                let fraction = mantissa[dot + 1..].trim_end_matches('0');
                if whole.is_empty() && fraction.is_empty() {
                    out.push_str("0.");
                } else {
                    out.push_str(whole);
                    out.push('.');
                    out.push_str(fraction);
                }
            }
            None => {
                let whole = mantissa.trim_start_matches('0');
                out.push_str(if whole.is_empty() { "0" } else { whole });
            }
        }

        if let Some(exponent) = exponent {
            let (negative, digits) = match exponent.as_bytes().first() {
                Some(b'-') => (true, &exponent[1..]),
                Some(b'+') => (false, &exponent[1..]),
                _ => (false, exponent),
            };
            let digits = digits.trim_start_matches('0');
            out.push('e');
            if negative && !digits.is_empty() {
                out.push('-');
            }
            out.push_str(if digits.is_empty() { "0" } else { digits });
        }

        FloatLiteral(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for FloatLiteral {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A variable, or any other name used as a value.
    Identifier(String),
    /// Integer constant, normalized from any radix.
    IntConst(u64),
    FloatConst(FloatLiteral),
    BoolConst(bool),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Assignment {
        left: Box<Expr>,
        op: AssignOp,
        right: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    /// Struct member or swizzle selection.
    Field {
        base: Box<Expr>,
        field: String,
    },
    /// Function call or type constructor.
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    /// Comma-separated expressions, evaluated left to right.
    Sequence(Vec<Expr>),
}

impl Expr {
    pub fn identifier(name: impl Into<String>) -> Expr {
        Expr::Identifier(name.into())
    }

    pub fn float(text: &str) -> Expr {
        Expr::FloatConst(FloatLiteral::new(text))
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn call(callee: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            callee: callee.to_string(),
            args,
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            Expr::Identifier(_)
            | Expr::IntConst(_)
            | Expr::FloatConst(_)
            | Expr::BoolConst(_)
            | Expr::Call { .. } => Precedence::Primary,
            Expr::Postfix { .. } | Expr::Index { .. } | Expr::Field { .. } => Precedence::Postfix,
            Expr::Unary { .. } => Precedence::Unary,
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Ternary { .. } => Precedence::Conditional,
            Expr::Assignment { .. } => Precedence::Assignment,
            Expr::Sequence(_) => Precedence::Sequence,
        }
    }
}
