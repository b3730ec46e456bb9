//! Token-level parsers: words, punctuation and literals.
//!
//! Every parser here consumes the blank space that follows its token.

use alloc::{format, string::{String, ToString}};

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit0, digit1, hex_digit1, oct_digit1, one_of, satisfy},
    combinator::{map, map_res, opt, recognize, verify},
    sequence::{pair, preceded, tuple},
};

use super::{
    error::{expected, fail, GrammarError, PResult},
    whitespace::blank,
};
use crate::{ast::FloatLiteral, keywords};

/// Operator and punctuation tokens, longest first so that matching is greedy.
const PUNCTUATION: &[&str] = &[
    "<<=", ">>=", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "^^", "+=", "-=",
    "*=", "/=", "%=", "&=", "^=", "|=", "+", "-", "*", "/", "%", "<", ">", "&", "^", "|", "=",
    "!", "~", "?", ":", "(", ")", "[", "]", "{", "}", ";", ",", ".",
];

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A raw word: identifier or keyword. Does not skip trailing blank space.
pub(crate) fn word(input: &str) -> PResult<&str> {
    recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(is_word_char),
    ))(input)
}

/// The longest punctuation token at the cursor. Does not skip trailing blank space.
pub(crate) fn punct(input: &str) -> PResult<&'static str> {
    for token in PUNCTUATION {
        if let Some(rest) = input.strip_prefix(token) {
            return Ok((rest, token));
        }
    }
    expected(input, "an operator")
}

/// Match exactly the punctuation token `token`.
///
/// `sym("+")` does not match the start of `++` or `+=`.
pub(crate) fn sym<'a>(token: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'static str> {
    move |input: &'a str| match punct(input) {
        Ok((rest, found)) if found == token => {
            let (rest, _) = blank(rest)?;
            Ok((rest, found))
        }
        _ => expected(input, &format!("'{}'", token)),
    }
}

/// Match the keyword `keyword` as a whole word.
pub(crate) fn kw<'a>(keyword: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    move |input: &'a str| {
        let (rest, found) = verify(word, |w: &str| w == keyword)(input)
            .or_else(|_: nom::Err<GrammarError<'a>>| expected(input, &format!("'{}'", keyword)))?;
        let (rest, _) = blank(rest)?;
        Ok((rest, found))
    }
}

/// Whether the next word at the cursor is `keyword`, without consuming it.
pub(crate) fn peek_kw(input: &str, keyword: &str) -> bool {
    matches!(word(input), Ok((_, w)) if w == keyword)
}

/// A name used as a value: any word that is not reserved.
pub(crate) fn identifier(input: &str) -> PResult<String> {
    let (rest, name) = verify(word, |w: &str| !keywords::is_reserved(w))(input)?;
    let (rest, _) = blank(rest)?;
    Ok((rest, name.to_string()))
}

/// A name being declared.
///
/// A reserved word or a `gl_` name in this position is a hard error rather
/// than a mismatch: `int lowp;` can never be anything but a bad declaration.
pub(crate) fn declared_name(input: &str) -> PResult<String> {
    let (rest, name) = word(input)?;
    if keywords::is_reserved(name) {
        return fail(
            input,
            format!("'{}' is a reserved word and can't be used as a name", name),
        );
    }
    if keywords::is_builtin_variable(name) {
        return fail(input, format!("'{}' uses the reserved 'gl_' prefix", name));
    }
    let (rest, _) = blank(rest)?;
    Ok((rest, name.to_string()))
}

/// A type name: a built-in type keyword or a user struct name.
pub(crate) fn type_name(input: &str) -> PResult<String> {
    let (rest, name) = verify(word, |w: &str| {
        keywords::is_builtin_type(w) || !keywords::is_reserved(w)
    })(input)?;
    let (rest, _) = blank(rest)?;
    Ok((rest, name.to_string()))
}

/// Struct member or swizzle after `.`.
pub(crate) fn field_name(input: &str) -> PResult<String> {
    let (rest, name) = word(input)?;
    let (rest, _) = blank(rest)?;
    Ok((rest, name.to_string()))
}

fn exponent(input: &str) -> PResult<&str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

/// `1.5`, `1.`, `.5`, `1e5`, `1.5e-3`.
pub(crate) fn float_literal(input: &str) -> PResult<FloatLiteral> {
    let (rest, text) = alt((
        recognize(tuple((digit1, char('.'), digit0, opt(exponent)))),
        recognize(tuple((char('.'), digit1, opt(exponent)))),
        recognize(pair(digit1, exponent)),
    ))(input)?;
    let (rest, _) = blank(rest)?;
    Ok((rest, FloatLiteral::new(text)))
}

/// Decimal, `0x` hexadecimal or `0` octal integer, normalized to its value.
pub(crate) fn int_literal(input: &str) -> PResult<u64> {
    let (rest, value) = alt((
        map_res(
            preceded(alt((tag("0x"), tag("0X"))), hex_digit1),
            |digits: &str| u64::from_str_radix(digits, 16),
        ),
        map_res(preceded(char('0'), oct_digit1), |digits: &str| {
            u64::from_str_radix(digits, 8)
        }),
        map_res(
            verify(digit1, |digits: &str| digits == "0" || !digits.starts_with('0')),
            |digits: &str| digits.parse::<u64>(),
        ),
    ))(input)?;
    if let Some(c) = rest.chars().next() {
        if is_word_char(c) {
            return fail(rest, format!("invalid character '{}' in number", c));
        }
    }
    let (rest, _) = blank(rest)?;
    Ok((rest, value))
}

/// `true` or `false`.
pub(crate) fn bool_literal(input: &str) -> PResult<bool> {
    alt((map(kw("true"), |_| true), map(kw("false"), |_| false)))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word() {
        assert_eq!(word("main()"), Ok(("()", "main")));
        assert_eq!(word("_x1 "), Ok((" ", "_x1")));
        assert!(word("1x").is_err());
    }

    #[test]
    fn test_punct_is_greedy() {
        assert_eq!(punct("++x"), Ok(("x", "++")));
        assert_eq!(punct("<<=1"), Ok(("1", "<<=")));
        assert_eq!(punct("+ +"), Ok((" +", "+")));
        assert_eq!(punct("^^b"), Ok(("b", "^^")));
        assert!(punct("a").is_err());
    }

    #[test]
    fn test_sym_exact() {
        assert_eq!(sym("+")("+ x"), Ok(("x", "+")));
        assert!(sym("+")("++x").is_err());
        assert!(sym("=")("==").is_err());
    }

    #[test]
    fn test_kw_whole_word() {
        assert_eq!(kw("int")("int x"), Ok(("x", "int")));
        assert!(kw("int")("integer").is_err());
    }

    #[test]
    fn test_identifier_rejects_keywords() {
        assert_eq!(identifier("foo bar"), Ok(("bar", "foo".to_string())));
        assert!(identifier("lowp").is_err());
    }

    #[test]
    fn test_declared_name_reserved_is_failure() {
        assert!(matches!(declared_name("highp;"), Err(nom::Err::Failure(_))));
        assert!(matches!(declared_name("=1;"), Err(nom::Err::Error(_))));
        assert!(matches!(declared_name("gl_foo;"), Err(nom::Err::Failure(_))));
        assert_eq!(declared_name("glow;"), Ok((";", "glow".to_string())));
    }

    #[test]
    fn test_int_literal_radix() {
        assert_eq!(int_literal("128").map(|(_, v)| v), Ok(128));
        assert_eq!(int_literal("0x80").map(|(_, v)| v), Ok(128));
        assert_eq!(int_literal("0X80").map(|(_, v)| v), Ok(128));
        assert_eq!(int_literal("0200").map(|(_, v)| v), Ok(128));
        assert_eq!(int_literal("0").map(|(_, v)| v), Ok(0));
    }

    #[test]
    fn test_int_literal_invalid() {
        assert!(int_literal("08").is_err());
        assert!(int_literal("12abc").is_err());
        assert!(int_literal("99999999999999999999999").is_err());
    }

    #[test]
    fn test_float_literal() {
        assert_eq!(float_literal("42.0;").map(|(r, v)| (r, v.as_str().to_string())), Ok((";", "42.".to_string())));
        assert_eq!(float_literal(".5").map(|(_, v)| v.as_str().to_string()), Ok(".5".to_string()));
        assert_eq!(float_literal("1e23").map(|(_, v)| v.as_str().to_string()), Ok("1e23".to_string()));
        assert!(float_literal("128").is_err());
    }
}
