//! Words the preprocessor can see.
//!
//! Macro bodies and conditional expressions are kept as text, so any name
//! they mention must survive renaming unchanged.

use alloc::{collections::BTreeSet, string::String};

use glmin_syntax::ast::{ExternalDeclaration, TranslationUnit};

/// Every identifier-like word in directive text and conditional conditions.
pub fn directive_words(unit: &TranslationUnit) -> BTreeSet<String> {
    let mut words = BTreeSet::new();
    collect(&unit.items, &mut words);
    words
}

fn collect(items: &[ExternalDeclaration], words: &mut BTreeSet<String>) {
    for item in items {
        match item {
            ExternalDeclaration::Directive(directive) => split_words(&directive.value, words),
            ExternalDeclaration::Conditional(cond) => {
                split_words(&cond.condition, words);
                for branch in &cond.elifs {
                    split_words(&branch.condition, words);
                }
                for branch in cond.branches() {
                    collect(branch, words);
                }
            }
            _ => {}
        }
    }
}

fn split_words(text: &str, words: &mut BTreeSet<String>) {
    for word in text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_')) {
        if word.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            words.insert(word.into());
        }
    }
}
