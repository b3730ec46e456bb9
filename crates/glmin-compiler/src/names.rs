//! Short identifier allocation.

use alloc::{string::String, vec::Vec};

use glmin_syntax::keywords;

/// Characters allowed at the start of a generated name.
const LEADING: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// Characters allowed after the first.
const TRAILING: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Candidate names, shortest first: `a`..`z`, `A`..`Z`, `aa`, `ab`, ...
///
/// Keywords and built-in function names are never produced. The sequence is
/// fixed, so the n-th candidate is the same on every run.
#[derive(Debug, Clone, Default)]
pub struct NameGenerator {
    index: u64,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `index`-th name of the raw sequence, before keywords are skipped.
    pub fn name_at(index: u64) -> String {
        let leading = LEADING.len() as u64;
        let trailing = TRAILING.len() as u64;

        let mut rest = index;
        let mut length = 1;
        let mut block = leading;
        while rest >= block {
            rest -= block;
            block *= trailing;
            length += 1;
        }

        let mut tail = Vec::with_capacity(length - 1);
        for _ in 1..length {
            tail.push(TRAILING[(rest % trailing) as usize]);
            rest /= trailing;
        }

        let mut name = String::with_capacity(length);
        name.push(LEADING[rest as usize] as char);
        name.extend(tail.iter().rev().map(|&b| b as char));
        name
    }

    /// First name not in `taken`, starting from the beginning of the sequence.
    pub fn first_free(taken: impl Fn(&str) -> bool) -> String {
        let mut names = NameGenerator::new();
        loop {
            let name = names.next_name();
            if !taken(&name) {
                return name;
            }
        }
    }

    fn next_name(&mut self) -> String {
        loop {
            let name = Self::name_at(self.index);
            self.index += 1;
            if !is_unusable(&name) {
                return name;
            }
        }
    }
}

impl Iterator for NameGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_name())
    }
}

fn is_unusable(name: &str) -> bool {
    keywords::is_reserved(name) || keywords::is_builtin_function(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_order() {
        assert_eq!(NameGenerator::name_at(0), "a");
        assert_eq!(NameGenerator::name_at(25), "z");
        assert_eq!(NameGenerator::name_at(26), "A");
        assert_eq!(NameGenerator::name_at(51), "Z");
        assert_eq!(NameGenerator::name_at(52), "aa");
        assert_eq!(NameGenerator::name_at(53), "ab");
        assert_eq!(NameGenerator::name_at(52 + 61), "a9");
        assert_eq!(NameGenerator::name_at(52 + 62), "ba");
        assert_eq!(NameGenerator::name_at(52 + 52 * 62), "aaa");
    }

    #[test]
    fn test_skips_keywords() {
        let names: Vec<String> = NameGenerator::new().take(52 * 62).collect();
        assert!(!names.iter().any(|n| n == "do" || n == "if" || n == "in"));
        assert!(names.iter().any(|n| n == "dp"));
    }

    #[test]
    fn test_first_free() {
        assert_eq!(NameGenerator::first_free(|_| false), "a");
        assert_eq!(NameGenerator::first_free(|n| n == "a" || n == "b"), "c");
    }
}
