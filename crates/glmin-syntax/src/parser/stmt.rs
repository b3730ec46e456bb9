//! Statement parsers.

use alloc::{boxed::Box, vec::Vec};

use nom::combinator::cut;

use super::{
    decl::local_declaration,
    error::{fail, PResult},
    expr::expression,
    primitives::{kw, sym, word},
    ParseContext,
};
use crate::ast::Statement;

pub(crate) fn statement(ctx: ParseContext, input: &str) -> PResult<Statement> {
    let ctx = ctx.nested(input)?;
    if input.starts_with('#') {
        return fail(input, "preprocessor directives are only allowed at top level");
    }
    if sym("{")(input).is_ok() {
        let (input, body) = compound_body(ctx, input)?;
        return Ok((input, Statement::Compound(body)));
    }

    if let Ok((_, keyword)) = word(input) {
        match keyword {
            "if" => return selection(ctx, input),
            "while" => return while_loop(ctx, input),
            "do" => return do_while_loop(ctx, input),
            "for" => return for_loop(ctx, input),
            "continue" => return jump(input, "continue", Statement::Continue),
            "break" => return jump(input, "break", Statement::Break),
            "discard" => return jump(input, "discard", Statement::Discard),
            "return" => return return_statement(ctx, input),
            _ => {}
        }
    }

    simple_statement(ctx, input)
}

/// `{ statements }`, returning the statements.
pub(crate) fn compound_body(ctx: ParseContext, input: &str) -> PResult<Vec<Statement>> {
    let (mut input, _) = sym("{")(input)?;
    let mut body = Vec::new();
    loop {
        if let Ok((rest, _)) = sym("}")(input) {
            return Ok((rest, body));
        }
        let (rest, stmt) = cut(|i| statement(ctx, i))(input)?;
        body.push(stmt);
        input = rest;
    }
}

/// A declaration or expression statement.
fn simple_statement(ctx: ParseContext, input: &str) -> PResult<Statement> {
    match local_declaration(ctx, input) {
        Ok((rest, decl)) => return Ok((rest, Statement::Declaration(decl))),
        Err(nom::Err::Error(_)) => {}
        Err(e) => return Err(e),
    }
    expression_statement(ctx, input)
}

fn expression_statement(ctx: ParseContext, input: &str) -> PResult<Statement> {
    if let Ok((rest, _)) = sym(";")(input) {
        return Ok((rest, Statement::Expression(None)));
    }
    let (input, expr) = expression(ctx, input)?;
    let (input, _) = cut(sym(";"))(input)?;
    Ok((input, Statement::Expression(Some(expr))))
}

fn parenthesized_condition(ctx: ParseContext, input: &str) -> PResult<crate::ast::Expr> {
    let (input, _) = cut(sym("("))(input)?;
    let (input, condition) = cut(|i| expression(ctx, i))(input)?;
    let (input, _) = cut(sym(")"))(input)?;
    Ok((input, condition))
}

fn selection(ctx: ParseContext, input: &str) -> PResult<Statement> {
    let (input, _) = kw("if")(input)?;
    let (input, condition) = parenthesized_condition(ctx, input)?;
    let (input, then) = cut(|i| statement(ctx, i))(input)?;
    let (input, otherwise) = match kw("else")(input) {
        Ok((rest, _)) => {
            let (rest, otherwise) = cut(|i| statement(ctx, i))(rest)?;
            (rest, Some(Box::new(otherwise)))
        }
        Err(_) => (input, None),
    };
    Ok((
        input,
        Statement::If {
            condition,
            then: Box::new(then),
            otherwise,
        },
    ))
}

fn while_loop(ctx: ParseContext, input: &str) -> PResult<Statement> {
    let (input, _) = kw("while")(input)?;
    let (input, condition) = parenthesized_condition(ctx, input)?;
    let (input, body) = cut(|i| statement(ctx, i))(input)?;
    Ok((
        input,
        Statement::While {
            condition,
            body: Box::new(body),
        },
    ))
}

fn do_while_loop(ctx: ParseContext, input: &str) -> PResult<Statement> {
    let (input, _) = kw("do")(input)?;
    let (input, body) = cut(|i| statement(ctx, i))(input)?;
    let (input, _) = cut(kw("while"))(input)?;
    let (input, condition) = parenthesized_condition(ctx, input)?;
    let (input, _) = cut(sym(";"))(input)?;
    Ok((
        input,
        Statement::DoWhile {
            body: Box::new(body),
            condition,
        },
    ))
}

/// `for (init; condition; step) body`; condition and step may be empty.
fn for_loop(ctx: ParseContext, input: &str) -> PResult<Statement> {
    let (input, _) = kw("for")(input)?;
    let (input, _) = cut(sym("("))(input)?;
    let (input, init) = cut(|i| simple_statement(ctx, i))(input)?;
    let (input, condition) = match sym(";")(input) {
        Ok(_) => (input, None),
        Err(_) => {
            let (input, condition) = cut(|i| expression(ctx, i))(input)?;
            (input, Some(condition))
        }
    };
    let (input, _) = cut(sym(";"))(input)?;
    let (input, step) = match sym(")")(input) {
        Ok(_) => (input, None),
        Err(_) => {
            let (input, step) = cut(|i| expression(ctx, i))(input)?;
            (input, Some(step))
        }
    };
    let (input, _) = cut(sym(")"))(input)?;
    let (input, body) = cut(|i| statement(ctx, i))(input)?;
    Ok((
        input,
        Statement::For {
            init: Box::new(init),
            condition,
            step,
            body: Box::new(body),
        },
    ))
}

fn jump<'a>(input: &'a str, keyword: &'static str, stmt: Statement) -> PResult<'a, Statement> {
    let (input, _) = kw(keyword)(input)?;
    let (input, _) = cut(sym(";"))(input)?;
    Ok((input, stmt))
}

fn return_statement(ctx: ParseContext, input: &str) -> PResult<Statement> {
    let (input, _) = kw("return")(input)?;
    if let Ok((rest, _)) = sym(";")(input) {
        return Ok((rest, Statement::Return(None)));
    }
    let (input, value) = cut(|i| expression(ctx, i))(input)?;
    let (input, _) = cut(sym(";"))(input)?;
    Ok((input, Statement::Return(Some(value))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, ShaderStage};

    const CTX: ParseContext = ParseContext::new(ShaderStage::Fragment);

    fn parse_all(input: &str) -> Statement {
        let (rest, stmt) = statement(CTX, input).unwrap();
        assert_eq!(rest, "", "unparsed input");
        stmt
    }

    #[test]
    fn test_expression_vs_declaration() {
        assert!(matches!(parse_all("x;"), Statement::Expression(Some(Expr::Identifier(_)))));
        assert!(matches!(parse_all("x=1;"), Statement::Expression(Some(_))));
        assert!(matches!(parse_all("s x;"), Statement::Declaration(_)));
        assert!(matches!(parse_all("vec4(1.);"), Statement::Expression(Some(Expr::Call { .. }))));
        assert!(matches!(parse_all(";"), Statement::Expression(None)));
    }

    #[test]
    fn test_for_loop_parts() {
        match parse_all("for(int i=0;;)x;") {
            Statement::For { init, condition, step, .. } => {
                assert!(matches!(*init, Statement::Declaration(_)));
                assert!(condition.is_none());
                assert!(step.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(parse_all("for(;i<3;i++){}"), Statement::For { .. }));
    }

    #[test]
    fn test_dangling_else_binds_inner() {
        match parse_all("if(a)if(b)x;else y;") {
            Statement::If { then, otherwise, .. } => {
                assert!(otherwise.is_none());
                assert!(matches!(*then, Statement::If { otherwise: Some(_), .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_do_while() {
        assert!(matches!(parse_all("do{x++;}while(x<3);"), Statement::DoWhile { .. }));
    }

    #[test]
    fn test_jumps() {
        assert_eq!(parse_all("return;"), Statement::Return(None));
        assert_eq!(parse_all("break;"), Statement::Break);
        assert_eq!(parse_all("discard;"), Statement::Discard);
        assert!(statement(CTX, "break").is_err());
    }

    #[test]
    fn test_directive_in_body_fails() {
        match statement(CTX, "{x=1.;\n#ifdef A\nx=2.;\n#endif\n}") {
            Err(nom::Err::Failure(e)) => assert_eq!(
                e.message.as_deref(),
                Some("preprocessor directives are only allowed at top level")
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_local_storage_qualifier_fails() {
        assert!(matches!(statement(CTX, "uniform float x;"), Err(nom::Err::Failure(_))));
        assert!(statement(CTX, "const highp int x[],y;").is_ok());
    }
}
