//! Declaration, type and function signature parsers.
//!
//! The grammar here is context-free; the qualifier rules that depend on where
//! a declaration appears are checked by [`validate_declaration`] and
//! [`parameter`] and reported as hard failures.

use alloc::{format, string::String, vec::Vec};

use nom::{
    branch::alt,
    combinator::{cut, map, opt, value},
    multi::{many1, separated_list1},
    sequence::pair,
};

use super::{
    error::{expected, fail, PResult},
    expr::{assignment, conditional},
    primitives::{declared_name, identifier, kw, peek_kw, sym, type_name, word},
    whitespace::blank,
    ParseContext,
};
use crate::ast::{
    ArraySize, DeclScope, Declaration, Declarator, FullySpecifiedType, Parameter, ParameterDirection,
    Precision, PrecisionDeclaration, ShaderStage, StructDeclarator, StructMember,
    StructSpecifier, TypeQualifier, TypeSpecifier,
};

pub(crate) fn type_qualifier(input: &str) -> PResult<Option<TypeQualifier>> {
    opt(alt((
        value(TypeQualifier::Const, kw("const")),
        value(TypeQualifier::Attribute, kw("attribute")),
        value(TypeQualifier::Varying, kw("varying")),
        value(
            TypeQualifier::InvariantVarying,
            pair(kw("invariant"), kw("varying")),
        ),
        value(TypeQualifier::Uniform, kw("uniform")),
    )))(input)
}

pub(crate) fn precision_qualifier(input: &str) -> PResult<Option<Precision>> {
    match word(input) {
        Ok((rest, w)) => match Precision::from_keyword(w) {
            Some(precision) => {
                let (rest, _) = blank(rest)?;
                Ok((rest, Some(precision)))
            }
            None => Ok((input, None)),
        },
        Err(_) => Ok((input, None)),
    }
}

pub(crate) fn type_specifier(ctx: ParseContext, input: &str) -> PResult<TypeSpecifier> {
    alt((
        map(|i| struct_specifier(ctx, i), TypeSpecifier::Struct),
        map(type_name, TypeSpecifier::Named),
    ))(input)
}

pub(crate) fn fully_specified_type(
    ctx: ParseContext,
    input: &str,
) -> PResult<FullySpecifiedType> {
    let (input, qualifier) = type_qualifier(input)?;
    let (input, precision) = precision_qualifier(input)?;
    let (input, specifier) = if qualifier.is_some() || precision.is_some() {
        cut(|i| type_specifier(ctx, i))(input)?
    } else {
        type_specifier(ctx, input)?
    };
    Ok((
        input,
        FullySpecifiedType {
            qualifier,
            precision,
            specifier,
        },
    ))
}

/// `struct name { members }`
fn struct_specifier(ctx: ParseContext, input: &str) -> PResult<StructSpecifier> {
    let (input, _) = kw("struct")(input)?;
    let (input, name) = if sym("{")(input).is_ok() {
        (input, None)
    } else {
        let (input, name) = cut(declared_name)(input)?;
        (input, Some(name))
    };
    let (input, _) = cut(sym("{"))(input)?;
    let (input, members) = cut(many1(|i| struct_member(ctx, i)))(input)?;
    let (input, _) = cut(sym("}"))(input)?;
    Ok((input, StructSpecifier { name, members }))
}

fn struct_member(ctx: ParseContext, input: &str) -> PResult<StructMember> {
    let (input, precision) = precision_qualifier(input)?;
    if peek_kw(input, "struct") {
        return fail(input, "structs can't be embedded in structs");
    }
    let (input, ty) = type_name(input)?;
    let (input, declarators) =
        cut(separated_list1(sym(","), |i| struct_declarator(ctx, i)))(input)?;
    let (input, _) = cut(sym(";"))(input)?;
    Ok((
        input,
        StructMember {
            precision,
            ty,
            declarators,
        },
    ))
}

fn struct_declarator(ctx: ParseContext, input: &str) -> PResult<StructDeclarator> {
    let (input, name) = declared_name(input)?;
    let (input, array_size) = match sym("[")(input) {
        Ok((rest, _)) => {
            if sym("]")(rest).is_ok() {
                return fail(input, "arrays in structs must have a size");
            }
            let (rest, size) = cut(|i| conditional(ctx, i))(rest)?;
            let (rest, _) = cut(sym("]"))(rest)?;
            (rest, Some(size))
        }
        Err(_) => (input, None),
    };
    Ok((input, StructDeclarator { name, array_size }))
}

/// Array suffix and initializer of a declarator whose name is already parsed.
pub(crate) fn declarator_rest(
    ctx: ParseContext,
    name: String,
    input: &str,
) -> PResult<Declarator> {
    let (input, array) = match sym("[")(input) {
        Ok((rest, _)) => match sym("]")(rest) {
            Ok((rest, _)) => (rest, Some(ArraySize::Unsized)),
            Err(_) => {
                let (rest, size) = cut(|i| conditional(ctx, i))(rest)?;
                let (rest, _) = cut(sym("]"))(rest)?;
                (rest, Some(ArraySize::Sized(size)))
            }
        },
        Err(_) => (input, None),
    };
    let (input, initializer) = match sym("=")(input) {
        Ok((rest, _)) => {
            let (rest, value) = cut(|i| assignment(ctx, i))(rest)?;
            (rest, Some(value))
        }
        Err(_) => (input, None),
    };
    Ok((
        input,
        Declarator {
            name,
            array,
            initializer,
        },
    ))
}

/// The declarators after the first one, through the closing `;`.
pub(crate) fn remaining_declarators(
    ctx: ParseContext,
    first: Declarator,
    input: &str,
) -> PResult<Vec<Declarator>> {
    let mut declarators = alloc::vec![first];
    let mut input = input;
    while let Ok((rest, _)) = sym(",")(input) {
        let (rest, name) = cut(declared_name)(rest)?;
        let (rest, declarator) = declarator_rest(ctx, name, rest)?;
        declarators.push(declarator);
        input = rest;
    }
    let (input, _) = cut(sym(";"))(input)?;
    Ok((input, declarators))
}

/// Everything after `type name` in a variable declaration, through `;`.
pub(crate) fn finish_declaration<'a>(
    ctx: ParseContext,
    scope: DeclScope,
    start: &'a str,
    ty: FullySpecifiedType,
    name: String,
    input: &'a str,
) -> PResult<'a, Declaration> {
    let (input, first) = declarator_rest(ctx, name, input)?;
    let (input, declarators) = remaining_declarators(ctx, first, input)?;
    let decl = Declaration { ty, declarators };
    validate_declaration(ctx, scope, &decl, start)?;
    Ok((input, decl))
}

/// A bare `struct s { ... };` with no declarators.
///
/// Any other type followed by `;` is a mismatch, so `x;` can still be read as
/// an expression statement.
pub(crate) fn bare_declaration<'a>(
    ctx: ParseContext,
    scope: DeclScope,
    start: &'a str,
    ty: FullySpecifiedType,
    input: &'a str,
) -> PResult<'a, Declaration> {
    if !matches!(ty.specifier, TypeSpecifier::Struct(_)) {
        return expected(start, "a declaration");
    }
    let (input, _) = sym(";")(input)?;
    let decl = Declaration {
        ty,
        declarators: Vec::new(),
    };
    validate_declaration(ctx, scope, &decl, start)?;
    Ok((input, decl))
}

/// A variable declaration inside a function body.
pub(crate) fn local_declaration(ctx: ParseContext, input: &str) -> PResult<Declaration> {
    let start = input;
    let (input, ty) = fully_specified_type(ctx, input)?;
    if sym(";")(input).is_ok() {
        return bare_declaration(ctx, DeclScope::Local, start, ty, input);
    }
    let (input, name) = declared_name(input)?;
    finish_declaration(ctx, DeclScope::Local, start, ty, name, input)
}

/// Check the qualifier rules that depend on stage and scope.
///
/// `start` is the input at the beginning of the declaration and is where
/// errors are reported.
pub(crate) fn validate_declaration<'a>(
    ctx: ParseContext,
    scope: DeclScope,
    decl: &Declaration,
    start: &'a str,
) -> PResult<'a, ()> {
    if decl.ty.specifier.is_void() && !decl.declarators.is_empty() {
        return fail(start, "variables can't be declared as void");
    }

    match (scope, decl.ty.qualifier) {
        (DeclScope::Local, Some(qualifier)) if qualifier != TypeQualifier::Const => {
            return fail(
                start,
                format!(
                    "local declarations can't use the '{}' qualifier",
                    qualifier.as_str()
                ),
            );
        }
        (_, Some(TypeQualifier::Attribute)) => {
            if ctx.stage != ShaderStage::Vertex {
                return fail(start, "attributes can only be declared in vertex shaders");
            }
            if decl.declarators.iter().any(|d| d.initializer.is_some()) {
                return fail(start, "attributes can't be initialized");
            }
            if decl.declarators.iter().any(|d| d.array.is_some()) {
                return fail(start, "attributes can't be declared as arrays");
            }
            if matches!(decl.ty.specifier, TypeSpecifier::Struct(_)) {
                return fail(start, "attributes can't be structs");
            }
        }
        _ => {}
    }

    Ok((start, ()))
}

/// `precision highp float;`
pub(crate) fn precision_declaration(input: &str) -> PResult<PrecisionDeclaration> {
    let (input, _) = kw("precision")(input)?;
    let (input, precision) = cut(precision_qualifier)(input)?;
    let Some(precision) = precision else {
        return fail(input, "expected a precision qualifier");
    };
    let (input, ty) = cut(type_name)(input)?;
    let (input, _) = cut(sym(";"))(input)?;
    Ok((input, PrecisionDeclaration { precision, ty }))
}

/// Parameter list after `(`, through the closing `)`.
///
/// `()` and `(void)` both produce an empty list.
pub(crate) fn parameter_list(ctx: ParseContext, input: &str) -> PResult<Vec<Parameter>> {
    if let Ok((rest, _)) = sym(")")(input) {
        return Ok((rest, Vec::new()));
    }
    if peek_kw(input, "void") {
        let (rest, _) = kw("void")(input)?;
        if let Ok((rest, _)) = sym(")")(rest) {
            return Ok((rest, Vec::new()));
        }
    }
    let (input, params) = separated_list1(sym(","), |i| parameter(ctx, i))(input)?;
    let (input, _) = cut(sym(")"))(input)?;
    Ok((input, params))
}

/// `[const] [in|out|inout] [precision] type [name] [[size]]`
fn parameter(ctx: ParseContext, input: &str) -> PResult<Parameter> {
    let start = input;
    let (input, constant) = map(opt(kw("const")), |c| c.is_some())(input)?;

    if let Ok((_, w)) = word(input) {
        if matches!(w, "attribute" | "varying" | "uniform" | "invariant" | "const") {
            return fail(
                input,
                format!("function parameters can't use the '{}' qualifier", w),
            );
        }
    }

    let (input, direction) = match word(input) {
        Ok((rest, w)) => match ParameterDirection::from_keyword(w) {
            Some(direction) => {
                let (rest, _) = blank(rest)?;
                (rest, Some(direction))
            }
            None => (input, None),
        },
        Err(_) => (input, None),
    };
    if constant && matches!(direction, Some(ParameterDirection::Out | ParameterDirection::InOut)) {
        return fail(start, "only 'in' parameters can be declared const");
    }

    let (input, precision) = precision_qualifier(input)?;
    let (input, ty) = match type_name(input) {
        Ok(ok) => ok,
        Err(nom::Err::Error(_)) => return fail(input, "expected a parameter type"),
        Err(e) => return Err(e),
    };
    let (input, name) = match declared_name(input) {
        Ok((rest, name)) => (rest, Some(name)),
        Err(nom::Err::Error(_)) => (input, None),
        Err(e) => return Err(e),
    };
    if ty == "void" {
        return fail(start, "parameters can't be declared as void");
    }
    let (input, array_size) = match sym("[")(input) {
        Ok((rest, _)) => {
            let (rest, size) = cut(|i| conditional(ctx, i))(rest)?;
            let (rest, _) = cut(sym("]"))(rest)?;
            (rest, Some(size))
        }
        Err(_) => (input, None),
    };

    Ok((
        input,
        Parameter {
            constant,
            direction,
            precision,
            ty,
            name,
            array_size,
        },
    ))
}

/// `invariant a, b;` at the top level.
pub(crate) fn invariant_declaration(input: &str) -> PResult<Vec<String>> {
    let (input, _) = kw("invariant")(input)?;
    if peek_kw(input, "varying") {
        return expected(input, "an identifier");
    }
    let (input, names) = separated_list1(sym(","), identifier)(input)?;
    let (input, _) = cut(sym(";"))(input)?;
    Ok((input, names))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTX: ParseContext = ParseContext::new(ShaderStage::Vertex);

    #[test]
    fn test_fully_specified_type() {
        let (rest, ty) = fully_specified_type(CTX, "invariant varying highp vec4 x").unwrap();
        assert_eq!(rest, "x");
        assert_eq!(ty.qualifier, Some(TypeQualifier::InvariantVarying));
        assert_eq!(ty.precision, Some(Precision::High));
        assert_eq!(ty.specifier, TypeSpecifier::Named("vec4".into()));
    }

    #[test]
    fn test_struct_specifier() {
        let (rest, spec) = struct_specifier(CTX, "struct s{int x[2],y;highp float z;}q").unwrap();
        assert_eq!(rest, "q");
        assert_eq!(spec.name.as_deref(), Some("s"));
        assert_eq!(spec.members.len(), 2);
        assert_eq!(spec.members[0].declarators.len(), 2);
        assert_eq!(spec.members[1].precision, Some(Precision::High));
    }

    #[test]
    fn test_struct_unsized_array_fails() {
        assert!(matches!(
            struct_specifier(CTX, "struct{int x[];}"),
            Err(nom::Err::Failure(_))
        ));
    }

    #[test]
    fn test_struct_nested_fails() {
        assert!(matches!(
            struct_specifier(CTX, "struct{int x;struct {int y;}a;}"),
            Err(nom::Err::Failure(_))
        ));
    }

    #[test]
    fn test_parameter_list() {
        let (_, params) = parameter_list(CTX, "in sampler2D a,inout highp float b)").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].direction, Some(ParameterDirection::In));
        assert_eq!(params[1].direction, Some(ParameterDirection::InOut));
        assert_eq!(params[1].precision, Some(Precision::High));

        let (_, params) = parameter_list(CTX, "void)").unwrap();
        assert!(params.is_empty());

        let (_, params) = parameter_list(CTX, "float,vec2)").unwrap();
        assert_eq!(params.len(), 2);
        assert!(params[0].name.is_none());
    }

    #[test]
    fn test_parameter_const_out_fails() {
        assert!(parameter_list(CTX, "const out float a)").is_err());
        assert!(parameter_list(CTX, "const inout float a)").is_err());
        assert!(parameter_list(CTX, "const in float a)").is_ok());
        assert!(parameter_list(CTX, "const float a)").is_ok());
    }

    #[test]
    fn test_parameter_storage_qualifier_fails() {
        assert!(parameter_list(CTX, "varying out float a)").is_err());
        assert!(parameter_list(CTX, "uniform float a)").is_err());
    }

    #[test]
    fn test_precision_declaration() {
        let (_, decl) = precision_declaration("precision mediump float;").unwrap();
        assert_eq!(decl.precision, Precision::Medium);
        assert_eq!(decl.ty, "float");
    }
}
