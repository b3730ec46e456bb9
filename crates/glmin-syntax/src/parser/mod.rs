//! GLSL ES parser.
//!
//! Parses shader source into the tree in [`crate::ast`]. The grammar is
//! written with `nom` combinators over `&str`; every token parser consumes
//! the blank space and comments that follow it.

mod decl;
mod error;
mod expr;
mod primitives;
mod stmt;
mod unit;
mod whitespace;

use core::fmt;

pub use error::SyntaxError;

use crate::ast::{Ast, Expr, ShaderStage, Statement, TranslationUnit};
use error::{syntax_error, GrammarError, PResult};

/// Grammar entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StartRule {
    /// A whole vertex shader. Accepts `attribute` declarations.
    #[default]
    Vertex,
    /// A whole fragment shader.
    Fragment,
    /// A single expression.
    Condition,
    /// A single statement.
    Statement,
}

impl StartRule {
    /// Look up a rule by name: `vertex`, `fragment`, `condition` or
    /// `statement`, optionally with a `_start` suffix.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_suffix("_start").unwrap_or(name);
        match name {
            "vertex" => Some(StartRule::Vertex),
            "fragment" => Some(StartRule::Fragment),
            "condition" => Some(StartRule::Condition),
            "statement" => Some(StartRule::Statement),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StartRule::Vertex => "vertex",
            StartRule::Fragment => "fragment",
            StartRule::Condition => "condition",
            StartRule::Statement => "statement",
        }
    }

    /// The stage whose constraints apply under this rule.
    ///
    /// Sub-rules are parsed as if inside a vertex shader, the most
    /// permissive stage.
    pub fn stage(self) -> ShaderStage {
        match self {
            StartRule::Fragment => ShaderStage::Fragment,
            _ => ShaderStage::Vertex,
        }
    }
}

impl From<ShaderStage> for StartRule {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => StartRule::Vertex,
            ShaderStage::Fragment => StartRule::Fragment,
        }
    }
}

impl fmt::Display for StartRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deepest nesting of expressions, statements and conditionals accepted.
const MAX_NESTING: u32 = 128;

/// State threaded through the parsers that depends on the start rule and on
/// how deeply the cursor is nested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParseContext {
    pub stage: ShaderStage,
    depth: u32,
}

impl ParseContext {
    pub const fn new(stage: ShaderStage) -> Self {
        ParseContext { stage, depth: 0 }
    }

    /// The context one level further in. Fails at `input` once
    /// [`MAX_NESTING`] levels are open.
    pub fn nested<'a>(self, input: &'a str) -> Result<Self, nom::Err<GrammarError<'a>>> {
        if self.depth >= MAX_NESTING {
            return Err(nom::Err::Failure(GrammarError::new(
                input,
                "nesting is too deep",
            )));
        }
        Ok(ParseContext {
            depth: self.depth + 1,
            ..self
        })
    }
}

/// Parse `source` with the grammar selected by `rule`.
pub fn parse(source: &str, rule: StartRule) -> Result<Ast, SyntaxError> {
    match rule {
        StartRule::Vertex | StartRule::Fragment => {
            parse_translation_unit(source, rule.stage()).map(Ast::TranslationUnit)
        }
        StartRule::Condition => parse_expression(source).map(Ast::Expression),
        StartRule::Statement => parse_statement(source).map(Ast::Statement),
    }
}

/// Parse a whole shader for `stage`.
pub fn parse_translation_unit(
    source: &str,
    stage: ShaderStage,
) -> Result<TranslationUnit, SyntaxError> {
    let ctx = ParseContext::new(stage);
    finish(source, unit::translation_unit(ctx, source))
}

pub fn parse_expression(source: &str) -> Result<Expr, SyntaxError> {
    let ctx = ParseContext::new(StartRule::Condition.stage());
    finish(source, leading_blank(source, |i| expr::expression(ctx, i)))
}

/// Parse one statement, with the constraints of a vertex shader body.
pub fn parse_statement(source: &str) -> Result<Statement, SyntaxError> {
    let ctx = ParseContext::new(StartRule::Statement.stage());
    finish(source, leading_blank(source, |i| stmt::statement(ctx, i)))
}

fn leading_blank<'a, T>(
    input: &'a str,
    mut parser: impl FnMut(&'a str) -> PResult<'a, T>,
) -> PResult<'a, T> {
    let (input, _) = whitespace::blank(input)?;
    parser(input)
}

/// Convert a parser result, requiring that all input was consumed.
fn finish<T>(source: &str, result: PResult<'_, T>) -> Result<T, SyntaxError> {
    match result {
        Ok(("", value)) => Ok(value),
        Ok((rest, _)) => Err(GrammarError::new(rest, "unexpected input remaining")
            .into_syntax_error(source)),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e.into_syntax_error(source)),
        Err(nom::Err::Incomplete(_)) => Err(syntax_error(source, "", "unexpected end of input")),
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn test_start_rule_names() {
        assert_eq!(StartRule::from_name("vertex_start"), Some(StartRule::Vertex));
        assert_eq!(StartRule::from_name("fragment"), Some(StartRule::Fragment));
        assert_eq!(StartRule::from_name("condition"), Some(StartRule::Condition));
        assert_eq!(StartRule::from_name("nope"), None);
        assert_eq!(StartRule::default(), StartRule::Vertex);
    }

    #[test]
    fn test_attribute_stage_gate() {
        assert!(parse("attribute vec2 a;", StartRule::Vertex).is_ok());
        let err = parse("attribute vec2 a;", StartRule::Fragment).unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 1);
    }

    #[test]
    fn test_trailing_input_is_error() {
        let err = parse("x y", StartRule::Condition).unwrap_err();
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_deep_nesting_is_syntax_error() {
        let deep = format!("{}x{}", "(".repeat(5000), ")".repeat(5000));
        let err = parse(&deep, StartRule::Condition).unwrap_err();
        assert_eq!(err.message, "nesting is too deep");

        let blocks = format!("{}{}", "{".repeat(5000), "}".repeat(5000));
        let err = parse(&blocks, StartRule::Statement).unwrap_err();
        assert_eq!(err.message, "nesting is too deep");

        let conditionals = "#ifdef A\n".repeat(500) + &"#endif\n".repeat(500);
        let err = parse(&conditionals, StartRule::Vertex).unwrap_err();
        assert_eq!(err.message, "nesting is too deep");
    }

    #[test]
    fn test_leading_comment_allowed() {
        assert!(parse("/* c */ x+1", StartRule::Condition).is_ok());
        assert!(parse("// c\nreturn;", StartRule::Statement).is_ok());
    }
}
