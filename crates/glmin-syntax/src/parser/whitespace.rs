//! Whitespace and comment skipping.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{multispace1, not_line_ending},
    combinator::{map, recognize},
    multi::many0_count,
    sequence::{pair, tuple},
};

use super::error::PResult;

/// Skip whitespace, comments and line continuations - returns the skipped text.
pub(crate) fn blank_space(input: &str) -> PResult<&str> {
    recognize(many0_count(alt((
        map(multispace1, |_| ()),
        map(pair(tag("//"), not_line_ending), |_| ()),
        map(tuple((tag("/*"), take_until("*/"), tag("*/"))), |_| ()),
        map(tag("\\\n"), |_| ()), // Line continuation
    ))))(input)
}

/// Skip insignificant text and discard it.
/// Every token parser calls this after its token.
pub(crate) fn blank(input: &str) -> PResult<()> {
    map(blank_space, |_| ())(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_space() {
        assert_eq!(blank_space("   "), Ok(("", "   ")));
        assert_eq!(blank_space("\n\t  "), Ok(("", "\n\t  ")));
        assert_eq!(blank_space("  x"), Ok(("x", "  ")));
        assert_eq!(blank_space(""), Ok(("", "")));
    }

    #[test]
    fn test_comments() {
        assert_eq!(blank("// line\nx"), Ok(("x", ())));
        assert_eq!(blank("/* a\n b */ x"), Ok(("x", ())));
        assert_eq!(blank(" // a\n /* b */ // c\n\ty"), Ok(("y", ())));
    }

    #[test]
    fn test_unterminated_block_comment_is_left() {
        assert_eq!(blank("  /* open"), Ok(("/* open", ())));
    }

    #[test]
    fn test_does_not_consume_directive() {
        assert_eq!(blank("\n#define X"), Ok(("#define X", ())));
    }
}
