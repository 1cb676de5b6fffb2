// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Glob-style pattern matching: exact, prefix, suffix, middle, and arbitrary
//! `*` patterns, compiled to an anchored regex.

use regex::Regex;

/// Compile a glob-style pattern into an anchored regex.
///
/// Supports exact matches, `*` (match-any), prefix (`foo*`), suffix
/// (`*foo`), middle (`foo*bar`), and patterns with arbitrary interior `*`s.
/// Every non-`*` segment is regex-escaped before being joined, so the glob
/// author never has to think about regex metacharacters.
pub fn compile_glob(glob: &str) -> Result<Regex, regex::Error> {
    if glob == "*" {
        return Regex::new(".*");
    }

    let mut out = String::from("^");
    for segment in glob.split('*').enumerate() {
        let (i, part) = segment;
        if i > 0 {
            out.push_str(".*");
        }
        out.push_str(&regex::escape(part));
    }
    out.push('$');
    Regex::new(&out)
}

/// Match `text` against a glob pattern, compiling it fresh each call.
///
/// Callers matching the same glob repeatedly should compile once via
/// [`compile_glob`] and reuse the `Regex`.
pub fn glob_match(glob: &str, text: &str) -> bool {
    compile_glob(glob).map(|re| re.is_match(text)).unwrap_or(false)
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
