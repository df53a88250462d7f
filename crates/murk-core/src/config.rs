//! The options record and keep-list matching.
//!
//! Configuration is an explicit record passed down from the CLI; nothing in
//! murk reads process-wide state. The keep list accepts three pattern forms:
//!
//! - `Name` — keep every identifier with that bare name
//! - `pkg.Name` — keep `Name` in any package whose basename is `pkg`
//! - `path/to/pkg.Name` — keep `Name` in exactly that package path

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Seeds used when the caller supplies none.
pub const DEFAULT_SEEDS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Options for a murk run.
#[derive(Debug, Clone, Serialize)]
pub struct Options {
    /// Output directory for rewritten packages.
    pub out_dir: PathBuf,
    /// Overwrite existing output files.
    pub overwrite: bool,
    /// Rename exported symbols in internal packages and propagate.
    pub obfuscate_internal_exports: bool,
    /// Whether test files participate in the rename.
    pub include_tests: bool,
    /// Names excluded from renaming.
    pub keep: KeepSet,
    /// Seed strings feeding the identifier generator.
    pub seeds: Vec<String>,
    /// Optional file whose whitespace-separated tokens augment the seeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,
}

impl Options {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Options {
            out_dir: out_dir.into(),
            overwrite: false,
            obfuscate_internal_exports: false,
            include_tests: false,
            keep: KeepSet::default(),
            seeds: Vec::new(),
            seed_file: None,
        }
    }
}

/// Split a seed flag value into one seed per character, dropping whitespace.
pub fn seed_chars(value: &str) -> Vec<String> {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_string())
        .collect()
}

// ============================================================================
// Keep list
// ============================================================================

/// Error for malformed keep patterns.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid keep pattern: {pattern}")]
pub struct KeepPatternError {
    pub pattern: String,
}

// ((path_seg/)*(pkg.))?id
static RE_KEEP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:((?:\w[\w.\-_]+/)*(?:\p{L}[\p{L}\p{Nd}]*))\.)?(\p{L}[\p{L}\p{Nd}]*)$")
        .expect("keep pattern regex")
});

/// The set of names excluded from renaming.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeepSet {
    names: HashSet<String>,
    pkgs: HashMap<String, HashSet<String>>,
}

impl KeepSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add patterns from a comma-separated flag value.
    pub fn add_list(&mut self, value: &str) -> Result<(), KeepPatternError> {
        for pattern in value.split(',') {
            self.add(pattern)?;
        }
        Ok(())
    }

    /// Add a single `Name`, `pkg.Name` or `path/pkg.Name` pattern.
    pub fn add(&mut self, pattern: &str) -> Result<(), KeepPatternError> {
        let pattern = pattern.trim();
        let caps = RE_KEEP.captures(pattern).ok_or_else(|| KeepPatternError {
            pattern: pattern.to_string(),
        })?;
        let name = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        if name.is_empty() {
            return Err(KeepPatternError {
                pattern: pattern.to_string(),
            });
        }
        match caps.get(1) {
            None => {
                self.names.insert(name.to_string());
            }
            Some(pkg) => {
                self.pkgs
                    .entry(pkg.as_str().to_string())
                    .or_default()
                    .insert(name.to_string());
            }
        }
        Ok(())
    }

    /// Whether `name` in the package at `pkg_path` is kept.
    ///
    /// Matches bare names, the full package path, and the package basename.
    pub fn contains(&self, pkg_path: &str, name: &str) -> bool {
        if self.names.contains(name) {
            return true;
        }
        if let Some(names) = self.pkgs.get(pkg_path) {
            if names.contains(name) {
                return true;
            }
        }
        let base = pkg_path.rsplit('/').next().unwrap_or(pkg_path);
        if let Some(names) = self.pkgs.get(base) {
            return names.contains(name);
        }
        false
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.pkgs.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod keep_patterns {
        use super::*;

        #[test]
        fn bare_name() {
            let mut keep = KeepSet::new();
            keep.add("Foo").unwrap();
            assert!(keep.contains("any/pkg", "Foo"));
            assert!(!keep.contains("any/pkg", "Bar"));
        }

        #[test]
        fn pkg_qualified_matches_basename() {
            let mut keep = KeepSet::new();
            keep.add("util.Helper").unwrap();
            assert!(keep.contains("example.com/mod/util", "Helper"));
            assert!(keep.contains("util", "Helper"));
            assert!(!keep.contains("example.com/mod/other", "Helper"));
        }

        #[test]
        fn path_qualified_matches_full_path() {
            let mut keep = KeepSet::new();
            keep.add("example.com/mod/util.Helper").unwrap();
            assert!(keep.contains("example.com/mod/util", "Helper"));
            assert!(!keep.contains("other.com/util2", "Helper"));
        }

        #[test]
        fn comma_separated_list() {
            let mut keep = KeepSet::new();
            keep.add_list("main.main, Foo").unwrap();
            assert!(keep.contains("example.com/cmd/main", "main"));
            assert!(keep.contains("x", "Foo"));
        }

        #[test]
        fn rejects_garbage() {
            let mut keep = KeepSet::new();
            assert!(keep.add("1notaname").is_err());
            assert!(keep.add("").is_err());
        }
    }

    mod seeds {
        use super::*;

        #[test]
        fn splits_chars_and_drops_whitespace() {
            assert_eq!(seed_chars("ab c"), vec!["a", "b", "c"]);
        }

        #[test]
        fn default_seeds_are_alphanumeric() {
            assert_eq!(seed_chars(DEFAULT_SEEDS).len(), 62);
        }
    }
}
