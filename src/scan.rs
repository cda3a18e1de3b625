// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Static scanning of factory source text
//!
//! Regex heuristics over raw source, not a parse: comment boundaries,
//! escaped quotes and scoping are invisible here. Good enough for the
//! module authoring format, and deliberately no stronger.

use regex::Regex;
use std::sync::LazyLock;

/// `require(...)` with a quoted string-literal argument. Unquoted arguments
/// are computed ids and cannot be collected statically.
static DEPENDENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\s*\(\s*['"]([^'"]+)['"]"#).expect("dependency pattern")
});

/// Assignment to the `exports` binding itself. The leading boundary keeps
/// `module.exports = v` out; requiring a non-`=`, non-`>` token after the
/// operator keeps `==` comparisons and `=>` arrows out.
static EXPORTS_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w$.])exports\s*=\s*[^=>\s]").expect("exports-assignment pattern")
});

/// Collects the dependency ids a factory body requests.
///
/// Scans for call-like `require('<id>')` occurrences and returns the literal
/// ids in source order. Duplicates are preserved, non-literal and empty
/// arguments are skipped.
pub fn parse_dependencies(source: &str) -> Vec<String> {
    DEPENDENCY
        .captures_iter(source)
        .map(|captures| captures[1].to_string())
        .collect()
}

/// True if the source reassigns its `exports` binding.
///
/// Rebinding `exports` detaches the author's value from the container the
/// runtime hands to requesters, so definitions doing it are rejected.
pub fn has_exports_assignment(source: &str) -> bool {
    EXPORTS_ASSIGNMENT.is_match(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_requires_yields_no_dependencies() {
        let source = "function(require, exports) { exports.answer = 42; }";
        assert!(parse_dependencies(source).is_empty());
    }

    #[test]
    fn test_collects_string_literals_in_order() {
        let source = r#"
            var a = require('a');
            var b = require("b");
            var c = require(c);
        "#;
        assert_eq!(parse_dependencies(source), vec!["a", "b"]);
    }

    #[test]
    fn test_preserves_duplicates() {
        let source = "require('x'); require('y'); require('x');";
        assert_eq!(parse_dependencies(source), vec!["x", "y", "x"]);
    }

    #[test]
    fn test_skips_empty_literal() {
        assert!(parse_dependencies("require('')").is_empty());
    }

    #[test]
    fn test_whitespace_in_call() {
        assert_eq!(parse_dependencies("require ( './a/b' )"), vec!["./a/b"]);
    }

    #[test]
    fn test_detects_exports_assignment() {
        assert!(has_exports_assignment("function(require, exports) { exports = {}; }"));
        assert!(has_exports_assignment("\nexports = value;"));
        assert!(has_exports_assignment("{exports=1}"));
    }

    #[test]
    fn test_module_exports_is_allowed() {
        assert!(!has_exports_assignment("module.exports = {};"));
    }

    #[test]
    fn test_comparison_is_allowed() {
        assert!(!has_exports_assignment("if (exports == null) {}"));
        assert!(!has_exports_assignment("if (exports === undefined) {}"));
    }

    #[test]
    fn test_property_write_is_allowed() {
        assert!(!has_exports_assignment("exports.name = 'x';"));
        assert!(!has_exports_assignment("reexports = 3;"));
    }
}
