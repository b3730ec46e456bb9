//! Top-level items and preprocessor structure.
//!
//! Conditionals are parsed structurally: each `#if`/`#ifdef`/`#ifndef` owns
//! the items up to its `#elif`, `#else` and `#endif` lines. Nesting is
//! tracked by recursion, so an orphaned terminator is reported where it
//! appears and an unterminated conditional is reported at its opener.

use alloc::{format, string::{String, ToString}, vec::Vec};

use nom::{
    character::complete::{char, space0},
    combinator::cut,
};

use super::{
    decl::{
        bare_declaration, finish_declaration, fully_specified_type, invariant_declaration,
        parameter_list, precision_declaration,
    },
    error::{expected, fail, PResult},
    primitives::{declared_name, peek_kw, sym, word},
    stmt::compound_body,
    whitespace::blank,
    ParseContext,
};
use crate::ast::{
    Conditional, ConditionalBranch, ConditionalKind, DeclScope, Directive, ExternalDeclaration,
    FunctionDefinition, FunctionPrototype, TranslationUnit,
};

/// Directives kept verbatim in the tree.
const PLAIN_DIRECTIVES: &[&str] = &[
    "define",
    "undef",
    "pragma",
    "version",
    "error",
    "extension",
    "line",
];

/// A line that ends the current conditional branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BranchMarker {
    Elif,
    Else,
    EndIf,
}

impl BranchMarker {
    fn as_str(self) -> &'static str {
        match self {
            BranchMarker::Elif => "#elif",
            BranchMarker::Else => "#else",
            BranchMarker::EndIf => "#endif",
        }
    }
}

pub(crate) fn translation_unit(ctx: ParseContext, input: &str) -> PResult<TranslationUnit> {
    let (input, _) = blank(input)?;
    let (input, (items, marker)) = external_list(ctx, input)?;
    if let Some(marker) = marker {
        return fail(
            input,
            format!("{} without matching #if", marker.as_str()),
        );
    }
    Ok((input, TranslationUnit::new(items)))
}

/// `#` followed by the directive name.
fn directive_head(input: &str) -> PResult<&str> {
    let (input, _) = char('#')(input)?;
    let (input, _) = space0(input)?;
    match word(input) {
        Ok(ok) => Ok(ok),
        Err(_) => fail(input, "expected a preprocessor directive name"),
    }
}

/// The rest of the directive line, honoring `\` continuations.
fn directive_value(input: &str) -> PResult<String> {
    let mut end = 0;
    loop {
        match input[end..].find('\n') {
            Some(at) => {
                let newline = end + at;
                if input[..newline].ends_with('\\') {
                    end = newline + 1;
                    continue;
                }
                end = newline;
                break;
            }
            None => {
                end = input.len();
                break;
            }
        }
    }
    let value = input[..end].trim().to_string();
    let (rest, _) = blank(&input[end..])?;
    Ok((rest, value))
}

/// Items up to end of input or a branch marker, which is left unconsumed.
fn external_list(
    ctx: ParseContext,
    mut input: &str,
) -> PResult<(Vec<ExternalDeclaration>, Option<BranchMarker>)> {
    let mut items = Vec::new();
    loop {
        if input.is_empty() {
            return Ok((input, (items, None)));
        }

        if input.starts_with('#') {
            let (after_name, name) = directive_head(input)?;
            let marker = match name {
                "elif" => Some(BranchMarker::Elif),
                "else" => Some(BranchMarker::Else),
                "endif" => Some(BranchMarker::EndIf),
                _ => None,
            };
            if let Some(marker) = marker {
                return Ok((input, (items, Some(marker))));
            }

            if matches!(name, "if" | "ifdef" | "ifndef") {
                let (rest, cond) = conditional(ctx, input)?;
                items.push(ExternalDeclaration::Conditional(cond));
                input = rest;
            } else if PLAIN_DIRECTIVES.contains(&name) {
                let (rest, value) = directive_value(after_name)?;
                items.push(ExternalDeclaration::Directive(Directive {
                    name: name.to_string(),
                    value,
                }));
                input = rest;
            } else {
                return fail(
                    input,
                    format!("unknown preprocessor directive '#{}'", name),
                );
            }
            continue;
        }

        let (rest, item) = cut(|i| external_declaration(ctx, i))(input)?;
        items.push(item);
        input = rest;
    }
}

fn conditional(ctx: ParseContext, input: &str) -> PResult<Conditional> {
    let ctx = ctx.nested(input)?;
    let opener = input;
    let (rest, name) = directive_head(input)?;
    let kind = match name {
        "if" => ConditionalKind::If,
        "ifdef" => ConditionalKind::IfDef,
        "ifndef" => ConditionalKind::IfNDef,
        _ => return expected(input, "a conditional directive"),
    };
    let (rest, condition) = directive_value(rest)?;
    if condition.is_empty() {
        return fail(opener, format!("#{} needs a condition", kind.as_str()));
    }

    let (mut input, (body, mut marker)) = external_list(ctx, rest)?;
    let mut elifs = Vec::new();
    let mut otherwise: Option<Vec<ExternalDeclaration>> = None;

    loop {
        let Some(current) = marker else {
            return fail(opener, format!("unterminated #{}", kind.as_str()));
        };
        let (rest, _) = directive_head(input)?;
        let (rest, value) = directive_value(rest)?;
        match current {
            BranchMarker::EndIf => {
                return Ok((
                    rest,
                    Conditional {
                        kind,
                        condition,
                        body,
                        elifs,
                        otherwise,
                    },
                ));
            }
            BranchMarker::Elif => {
                if otherwise.is_some() {
                    return fail(input, "#elif after #else");
                }
                if value.is_empty() {
                    return fail(input, "#elif needs a condition");
                }
                let (rest, (branch, next)) = external_list(ctx, rest)?;
                elifs.push(ConditionalBranch {
                    condition: value,
                    body: branch,
                });
                input = rest;
                marker = next;
            }
            BranchMarker::Else => {
                if otherwise.is_some() {
                    return fail(input, "duplicate #else");
                }
                let (rest, (branch, next)) = external_list(ctx, rest)?;
                otherwise = Some(branch);
                input = rest;
                marker = next;
            }
        }
    }
}

fn external_declaration(ctx: ParseContext, input: &str) -> PResult<ExternalDeclaration> {
    if peek_kw(input, "precision") {
        let (rest, decl) = precision_declaration(input)?;
        return Ok((rest, ExternalDeclaration::Precision(decl)));
    }
    if peek_kw(input, "invariant") {
        match invariant_declaration(input) {
            Ok((rest, names)) => return Ok((rest, ExternalDeclaration::Invariant(names))),
            Err(nom::Err::Error(_)) => {}
            Err(e) => return Err(e),
        }
    }

    let start = input;
    let (input, ty) = fully_specified_type(ctx, input)?;
    if sym(";")(input).is_ok() {
        let (rest, decl) = bare_declaration(ctx, DeclScope::Global, start, ty, input)?;
        return Ok((rest, ExternalDeclaration::Declaration(decl)));
    }

    let (input, name) = declared_name(input)?;
    let Ok((after_paren, _)) = sym("(")(input) else {
        let (rest, decl) = finish_declaration(ctx, DeclScope::Global, start, ty, name, input)?;
        return Ok((rest, ExternalDeclaration::Declaration(decl)));
    };

    if let Some(qualifier) = ty.qualifier {
        return fail(
            start,
            format!(
                "function return types can't use the '{}' qualifier",
                qualifier.as_str()
            ),
        );
    }
    let (input, params) = cut(|i| parameter_list(ctx, i))(after_paren)?;
    let prototype = FunctionPrototype {
        return_type: ty,
        name,
        params,
    };

    if let Ok((rest, _)) = sym(";")(input) {
        return Ok((rest, ExternalDeclaration::FunctionPrototype(prototype)));
    }
    if sym("{")(input).is_ok() {
        let (rest, body) = compound_body(ctx, input)?;
        return Ok((
            rest,
            ExternalDeclaration::FunctionDefinition(FunctionDefinition { prototype, body }),
        ));
    }
    fail(input, "expected ';' or a function body")
}
