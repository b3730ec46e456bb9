//! Shared helpers for parser and generator integration tests.

#![allow(dead_code)]

use glmin_syntax::{emit, parse, Ast, StartRule};

/// Parse `source`, panicking with the syntax error on failure.
pub fn parse_ok(source: &str, rule: StartRule) -> Ast {
    match parse(source, rule) {
        Ok(ast) => ast,
        Err(err) => panic!("failed to parse {:?} as {}: {}", source, rule, err),
    }
}

/// Canonical text of `source`.
pub fn canonical(source: &str, rule: StartRule) -> String {
    emit(&parse_ok(source, rule))
}

/// `source` is already canonical: parsing and emitting gives it back.
pub fn assert_round_trip(source: &str, rule: StartRule) {
    assert_eq!(canonical(source, rule), source, "rule {}", rule);
    assert_stable(source, rule);
}

pub fn assert_canonical(source: &str, rule: StartRule, expected: &str) {
    assert_eq!(canonical(source, rule), expected, "rule {}", rule);
    assert_stable(source, rule);
}

/// The emitted text parses back to the same tree, and emitting that tree
/// changes nothing.
pub fn assert_stable(source: &str, rule: StartRule) {
    let tree = parse_ok(source, rule);
    let text = emit(&tree);
    let reparsed = parse_ok(&text, rule);
    assert_eq!(reparsed, tree, "tree changed after emitting {:?}", text);
    assert_eq!(emit(&reparsed), text);
}

pub fn assert_rejects(source: &str, rule: StartRule, why: &str) {
    if let Ok(ast) = parse(source, rule) {
        panic!("{}: {:?} parsed as {:?}", why, source, ast);
    }
}
