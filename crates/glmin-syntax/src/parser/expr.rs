//! Expression parsers.
//!
//! Binary operators are parsed by precedence climbing over the levels in
//! [`Precedence`]; unary, postfix and primary expressions are plain
//! recursive descent.

use alloc::{boxed::Box, vec, vec::Vec};

use nom::{branch::alt, combinator::{cut, map}, multi::separated_list1};

use super::{
    error::{expected, fail, PResult},
    primitives::{
        bool_literal, field_name, float_literal, int_literal, kw, peek_kw, punct, sym, word,
    },
    whitespace::blank,
    ParseContext,
};
use crate::{
    ast::{AssignOp, BinaryOp, Expr, PostfixOp, Precedence, UnaryOp},
    keywords,
};

/// Full expression, including comma sequences.
pub(crate) fn expression(ctx: ParseContext, input: &str) -> PResult<Expr> {
    let (mut input, first) = assignment(ctx, input)?;
    let mut items = vec![first];
    while let Ok((rest, _)) = sym(",")(input) {
        let (rest, next) = cut(|i| assignment(ctx, i))(rest)?;
        items.push(next);
        input = rest;
    }
    if items.len() == 1 {
        Ok((input, items.remove(0)))
    } else {
        Ok((input, Expr::Sequence(items)))
    }
}

/// Assignment expression: the operand of calls, initializers and sequences.
pub(crate) fn assignment(ctx: ParseContext, input: &str) -> PResult<Expr> {
    let ctx = ctx.nested(input)?;
    let (after_left, left) = conditional(ctx, input)?;
    if let Ok((rest, token)) = punct(after_left) {
        if let Some(op) = AssignOp::from_token(token) {
            if left.precedence() < Precedence::Unary {
                return fail(
                    after_left,
                    "left side of an assignment must be a unary expression",
                );
            }
            let (rest, _) = blank(rest)?;
            let (rest, right) = cut(|i| assignment(ctx, i))(rest)?;
            return Ok((
                rest,
                Expr::Assignment {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
            ));
        }
    }
    Ok((after_left, left))
}

/// `a ? b : c`, also used for constant array sizes.
pub(crate) fn conditional(ctx: ParseContext, input: &str) -> PResult<Expr> {
    let (input, condition) = binary(ctx, input, Precedence::LogicalOr)?;
    match sym("?")(input) {
        Ok((rest, _)) => {
            let (rest, then) = cut(|i| expression(ctx, i))(rest)?;
            let (rest, _) = cut(sym(":"))(rest)?;
            let (rest, otherwise) = cut(|i| assignment(ctx, i))(rest)?;
            Ok((
                rest,
                Expr::Ternary {
                    condition: Box::new(condition),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                },
            ))
        }
        Err(_) => Ok((input, condition)),
    }
}

/// Left-associative binary operators binding at least as tight as `min`.
fn binary(ctx: ParseContext, input: &str, min: Precedence) -> PResult<Expr> {
    let (mut input, mut left) = unary(ctx, input)?;
    loop {
        let Ok((rest, token)) = punct(input) else {
            break;
        };
        let Some(op) = BinaryOp::from_token(token) else {
            break;
        };
        let level = op.precedence();
        if level < min {
            break;
        }
        let (rest, _) = blank(rest)?;
        let (rest, right) = cut(|i| binary(ctx, i, level.tighter()))(rest)?;
        left = Expr::binary(left, op, right);
        input = rest;
    }
    Ok((input, left))
}

fn unary(ctx: ParseContext, input: &str) -> PResult<Expr> {
    let ctx = ctx.nested(input)?;
    if let Ok((rest, token)) = punct(input) {
        if let Some(op) = UnaryOp::from_token(token) {
            let (rest, _) = blank(rest)?;
            let (rest, operand) = cut(|i| unary(ctx, i))(rest)?;
            return Ok((
                rest,
                Expr::Unary {
                    op,
                    operand: Box::new(operand),
                },
            ));
        }
    }
    postfix(ctx, input)
}

/// Primary expression followed by any number of `[i]`, `.field`, `++`, `--`.
///
/// An increment or decrement may not directly follow another one: `x++++`
/// and `x++--` are rejected.
fn postfix(ctx: ParseContext, input: &str) -> PResult<Expr> {
    let (mut input, mut expr) = primary(ctx, input)?;
    let mut after_step = false;
    loop {
        let Ok((rest, token)) = punct(input) else {
            break;
        };
        match token {
            "[" => {
                let (rest, _) = blank(rest)?;
                let (rest, index) = cut(|i| expression(ctx, i))(rest)?;
                let (rest, _) = cut(sym("]"))(rest)?;
                expr = Expr::Index {
                    base: Box::new(expr),
                    index: Box::new(index),
                };
                after_step = false;
                input = rest;
            }
            "." => {
                let (rest, _) = blank(rest)?;
                let (rest, field) = cut(field_name)(rest)?;
                expr = Expr::Field {
                    base: Box::new(expr),
                    field,
                };
                after_step = false;
                input = rest;
            }
            "++" | "--" => {
                if after_step {
                    return fail(input, "'++' and '--' can't be repeated on one operand");
                }
                let op = match PostfixOp::from_token(token) {
                    Some(op) => op,
                    None => break,
                };
                let (rest, _) = blank(rest)?;
                expr = Expr::Postfix {
                    op,
                    operand: Box::new(expr),
                };
                after_step = true;
                input = rest;
            }
            _ => break,
        }
    }
    Ok((input, expr))
}

fn primary(ctx: ParseContext, input: &str) -> PResult<Expr> {
    alt((
        map(float_literal, Expr::FloatConst),
        map(int_literal, Expr::IntConst),
        map(bool_literal, Expr::BoolConst),
        |i| parenthesized(ctx, i),
        |i| call(ctx, i),
        variable,
    ))(input)
}

fn parenthesized(ctx: ParseContext, input: &str) -> PResult<Expr> {
    let (input, _) = sym("(")(input)?;
    let (input, expr) = cut(|i| expression(ctx, i))(input)?;
    let (input, _) = cut(sym(")"))(input)?;
    Ok((input, expr))
}

/// `name(args)` where `name` is a function, struct or built-in type.
fn call(ctx: ParseContext, input: &str) -> PResult<Expr> {
    let (rest, callee) = word(input)?;
    if keywords::is_reserved(callee) && !keywords::is_builtin_type(callee) {
        return expected(input, "a function or constructor name");
    }
    let (rest, _) = blank(rest)?;
    let (rest, _) = sym("(")(rest)?;
    let (rest, args) = cut(|i| arguments(ctx, i))(rest)?;
    Ok((
        rest,
        Expr::Call {
            callee: callee.into(),
            args,
        },
    ))
}

/// Call arguments after `(`, through the closing `)`. `(void)` is the empty list.
fn arguments(ctx: ParseContext, input: &str) -> PResult<Vec<Expr>> {
    if let Ok((rest, _)) = sym(")")(input) {
        return Ok((rest, Vec::new()));
    }
    if peek_kw(input, "void") {
        let (rest, _) = kw("void")(input)?;
        if let Ok((rest, _)) = sym(")")(rest) {
            return Ok((rest, Vec::new()));
        }
    }
    let (input, args) = separated_list1(sym(","), |i| assignment(ctx, i))(input)?;
    let (input, _) = sym(")")(input)?;
    Ok((input, args))
}

fn variable(input: &str) -> PResult<Expr> {
    let (rest, name) = word(input)?;
    if keywords::is_reserved(name) {
        return expected(input, "an expression");
    }
    let (rest, _) = blank(rest)?;
    Ok((rest, Expr::Identifier(name.into())))
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;
    use crate::ast::ShaderStage;

    const CTX: ParseContext = ParseContext::new(ShaderStage::Vertex);

    fn parse_all(input: &str) -> Expr {
        let (rest, expr) = expression(CTX, input).unwrap();
        assert_eq!(rest, "", "unparsed input");
        expr
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let expr = parse_all("a+b*c");
        match expr {
            Expr::Binary { op: BinaryOp::Add, right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_left_associative() {
        let expr = parse_all("a-b-c");
        match expr {
            Expr::Binary { op: BinaryOp::Sub, left, right } => {
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::Sub, .. }));
                assert_eq!(*right, Expr::identifier("c"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_assignment_right_associative() {
        let expr = parse_all("a=b+=c");
        match expr {
            Expr::Assignment { op: AssignOp::Assign, right, .. } => {
                assert!(matches!(*right, Expr::Assignment { op: AssignOp::Add, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_logical_levels() {
        let expr = parse_all("a||b^^c&&d");
        match expr {
            Expr::Binary { op: BinaryOp::Or, right, .. } => match *right {
                Expr::Binary { op: BinaryOp::Xor, right, .. } => {
                    assert!(matches!(*right, Expr::Binary { op: BinaryOp::And, .. }));
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_greedy_increment() {
        let expr = parse_all("x+++y");
        match expr {
            Expr::Binary { op: BinaryOp::Add, left, .. } => {
                assert!(matches!(*left, Expr::Postfix { op: PostfixOp::Inc, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_repeated_postfix_fails() {
        assert!(matches!(expression(CTX, "x++++"), Err(nom::Err::Failure(_))));
        assert!(matches!(expression(CTX, "x++--"), Err(nom::Err::Failure(_))));
    }

    #[test]
    fn test_postfix_chain() {
        let expr = parse_all("x[1]++.rgba");
        match expr {
            Expr::Field { base, field } => {
                assert_eq!(field, "rgba");
                assert!(matches!(*base, Expr::Postfix { .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_call_void_arguments() {
        assert_eq!(parse_all("f(void)"), Expr::call("f", vec![]));
        assert_eq!(parse_all("f()"), Expr::call("f", vec![]));
        assert_eq!(
            parse_all("vec2(1,x)"),
            Expr::call("vec2", vec![Expr::IntConst(1), Expr::identifier("x")])
        );
    }

    #[test]
    fn test_sequence() {
        assert!(matches!(parse_all("i++,j++"), Expr::Sequence(items) if items.len() == 2));
    }

    #[test]
    fn test_ternary() {
        assert!(matches!(parse_all("a?b:c"), Expr::Ternary { .. }));
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert!(expression(CTX, "a+b=c").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}x{}", "(".repeat(5000), ")".repeat(5000));
        match expression(CTX, &deep) {
            Err(nom::Err::Failure(e)) => assert_eq!(e.message.as_deref(), Some("nesting is too deep")),
            other => panic!("unexpected {:?}", other.map(|(rest, _)| rest.len())),
        }
        assert!(matches!(expression(CTX, &"-".repeat(5000)), Err(nom::Err::Failure(_))));

        let shallow = format!("{}x{}", "(".repeat(32), ")".repeat(32));
        assert_eq!(parse_all(&shallow), Expr::identifier("x"));
    }

    #[test]
    fn test_keyword_is_not_an_expression() {
        assert!(expression(CTX, "highp").is_err());
    }
}
