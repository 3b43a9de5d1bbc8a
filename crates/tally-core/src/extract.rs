//! Textual import extraction.
//!
//! Package references are found with a handful of independent regex scans
//! over the raw source text. There is no parsing: references inside comments
//! or strings are picked up, and unusual formatting may be missed. Every scan
//! is total, so any input (truncated syntax, binary garbage) simply yields
//! fewer matches.

use crate::error::{Error, Result};
use crate::types::{FileAnalysis, PackageName};
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

/// `require("x")` / `require('x')`
fn regex_require() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\brequire\s*\(\s*(?:"([^"\r\n]*)"|'([^'\r\n]*)')\s*\)"#)
            .expect("require pattern is valid")
    })
}

/// `import <bindings> from "x"`, bindings may span several lines or be
/// packed with no whitespace at all.
fn regex_import_from() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\bimport\b\s*[^;'"`]*?\bfrom\s*(?:"([^"\r\n]*)"|'([^'\r\n]*)')"#)
            .expect("import-from pattern is valid")
    })
}

/// `import("x")` / `import('x')`
fn regex_dynamic_import() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\bimport\s*\(\s*(?:"([^"\r\n]*)"|'([^'\r\n]*)')\s*\)"#)
            .expect("dynamic import pattern is valid")
    })
}

/// `import "x"` side-effect imports.
fn regex_side_effect_import() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\bimport\s*(?:"([^"\r\n]*)"|'([^'\r\n]*)')"#)
            .expect("side-effect import pattern is valid")
    })
}

fn quoted_literal<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Returns every quoted specifier matched by the import scans.
///
/// Specifiers are returned raw (relative paths included), grouped by scan in
/// the order `require`, `import … from`, dynamic `import()`, side-effect
/// `import`, each group in source order. Duplicates are kept.
pub fn extract_specifiers(text: &str) -> Vec<&str> {
    let scans = [
        regex_require(),
        regex_import_from(),
        regex_dynamic_import(),
        regex_side_effect_import(),
    ];

    scans
        .iter()
        .flat_map(|re| re.captures_iter(text).filter_map(|caps| quoted_literal(&caps)))
        .collect()
}

/// Extracts the distinct registry packages referenced by a source text.
///
/// Relative (`./`, `../`) and absolute (`/`) specifiers are dropped; the
/// rest are normalized with [`PackageName::from_specifier`].
///
/// ```
/// use tally_core::extract::extract_packages;
///
/// let packages = extract_packages(r#"
///     const _ = require("lodash/fp");
///     import { parse } from '@babel/parser';
///     import("./local");
/// "#);
///
/// let names: Vec<_> = packages.iter().map(|p| p.as_str()).collect();
/// assert_eq!(names, ["@babel/parser", "lodash"]);
/// ```
pub fn extract_packages(text: &str) -> BTreeSet<PackageName> {
    extract_specifiers(text)
        .into_iter()
        .filter_map(PackageName::from_specifier)
        .collect()
}

/// Reads one file and extracts its packages.
///
/// The contents are decoded lossily, so non-UTF-8 files are still scanned.
pub fn analyze_file(path: &Path) -> Result<FileAnalysis> {
    let bytes = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);

    Ok(FileAnalysis::new(path, extract_packages(&text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(text: &str) -> Vec<String> {
        extract_packages(text)
            .into_iter()
            .map(|p| p.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_require_calls() {
        assert_eq!(names(r#"const a = require("express");"#), ["express"]);
        assert_eq!(names("const a = require('express');"), ["express"]);
        assert_eq!(names("const a = require ( 'express' );"), ["express"]);
    }

    #[test]
    fn test_static_import_binding_forms() {
        let src = r#"
            import React from "react";
            import { useState, useEffect } from 'react';
            import * as path from "pathe";
            import type { Config } from "vite";
            import Default, { named } from "zod";
            import {
                a,
                b,
            } from "multi-line";
        "#;

        assert_eq!(names(src), ["multi-line", "pathe", "react", "vite", "zod"]);
    }

    #[test]
    fn test_minified_imports() {
        let src = r#"import{a as b}from"preact";import*as c from'htm';import d from"clsx";"#;

        assert_eq!(names(src), ["clsx", "htm", "preact"]);
    }

    #[test]
    fn test_dynamic_and_side_effect_imports() {
        let src = r#"
            const mod = await import("chart.js/auto");
            import('dayjs');
            import "reflect-metadata";
            import 'zone.js';
        "#;

        assert_eq!(names(src), ["chart.js", "dayjs", "reflect-metadata", "zone.js"]);
    }

    #[test]
    fn test_sub_path_collapses_and_scope_is_kept() {
        let src = r#"
            require("pkg");
            import x from "pkg/sub";
            import("@scope/pkg");
        "#;

        assert_eq!(names(src), ["@scope/pkg", "pkg"]);
    }

    #[test]
    fn test_relative_and_absolute_specifiers_are_dropped() {
        let src = r#"
            require("./local");
            import a from "../parent/thing";
            import("/abs/module.js");
            import "./styles.css";
        "#;

        assert!(extract_packages(src).is_empty());
    }

    #[test]
    fn test_same_package_counts_once() {
        let src = r#"
            const a = require("lodash");
            import b from "lodash/merge";
            import("lodash");
        "#;

        assert_eq!(names(src), ["lodash"]);
        assert_eq!(extract_specifiers(src).len(), 3);
    }

    #[test]
    fn test_specifiers_in_scan_order() {
        let src = r#"
            import("c");
            import b from "b";
            require("a");
        "#;

        assert_eq!(extract_specifiers(src), ["a", "b", "c"]);
    }

    #[test]
    fn test_textual_matching_accepts_comments() {
        let src = r#"// const legacy = require("moment");"#;
        assert_eq!(names(src), ["moment"]);
    }

    #[test]
    fn test_malformed_input_never_panics() {
        let inputs = [
            "",
            "require(",
            "require(\"",
            "import from",
            "import x from \"unterminated",
            "import(\"\")",
            "require('')",
            "\u{0}\u{1}\u{fffd}import\u{0}(\"x\u{0}",
            "import { a, b from 'c'",
        ];

        for input in inputs {
            let _ = extract_packages(input);
        }
        assert!(extract_packages("import(\"\")").is_empty());
        assert!(extract_packages("require('')").is_empty());
    }

    #[test]
    fn test_computed_paths_are_ignored() {
        let src = r#"
            require(name);
            import(`./pages/${page}`);
        "#;

        assert!(extract_packages(src).is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let src = r#"import a from "a"; require("@b/c/d"); import("e");"#;
        assert_eq!(extract_packages(src), extract_packages(src));
    }

    #[test]
    fn test_analyze_file_reads_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.js");
        let mut bytes = b"require(\"axios\");\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, 0x00]);
        std::fs::write(&path, bytes).unwrap();

        let analysis = analyze_file(&path).unwrap();
        assert_eq!(analysis.path, path);
        assert_eq!(analysis.packages.len(), 1);
        assert!(analysis.packages.contains("axios"));
    }

    #[test]
    fn test_analyze_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = analyze_file(&dir.path().join("missing.ts"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
