//! Run orchestration.
//!
//! A run loads the typed-package bundles, refuses to proceed when the type
//! checker reported errors, renames each package in path order, propagates
//! renamed exports of internal packages into the importers the path rule
//! admits, and finally emits everything plus the rename report.
//!
//! Packages are processed sequentially; the scope graph, selector model
//! and identifier arenas of different packages are disjoint, so nothing
//! here needs guarding.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;

use murk_core::config::{seed_chars, Options, DEFAULT_SEEDS};
use murk_core::error::MurkError;
use murk_engine::crosspkg::{can_import, is_internal_package, rename_used_exports};
use murk_engine::idgen::Generator;
use murk_engine::rename::{rename_package, RenameOptions};
use murk_syntax::load::{load_bundle, validate_disjoint, LoadError};
use murk_syntax::{Package, Pos};

use crate::emit::emit_package;
use crate::report::{PackageReport, RunReport};

/// Name of the report file written into the output directory.
pub const REPORT_FILE: &str = "murk-report.json";

/// Run the whole pipeline over the given bundles.
pub fn run(opts: &Options, bundle_paths: &[PathBuf]) -> Result<RunReport, MurkError> {
    if bundle_paths.is_empty() {
        return Err(MurkError::invalid_args("no bundles given"));
    }

    let mut packages = Vec::new();
    for path in bundle_paths {
        let pkg = load_bundle(path).map_err(|e| bridge_load_error(path, e))?;
        packages.push((pkg, parent_dir(path)));
    }

    let error_count: usize = packages.iter().map(|(p, _)| p.errors.len()).sum();
    if error_count > 0 {
        for (pkg, _) in &packages {
            for err in &pkg.errors {
                tracing::error!(pkg = %pkg.path, "{err}");
            }
        }
        return Err(MurkError::InputErrors { count: error_count });
    }

    validate_disjoint(packages.iter().map(|(p, _)| p)).map_err(|e| MurkError::LoadError {
        path: String::new(),
        reason: e.to_string(),
    })?;

    let mut packages = filter_test_packages(packages, opts.include_tests);
    packages.sort_by(|(a, _), (b, _)| a.path.cmp(&b.path));

    let generator = build_generator(opts)?;
    let mut keep = opts.keep.clone();
    // The program entry point must keep its name.
    keep.add("main.main")
        .map_err(|e| MurkError::invalid_args(e.to_string()))?;

    // Pass 1: per-package rename.
    let mut export_maps: Vec<(usize, HashMap<Pos, String>)> = Vec::new();
    let mut reports = Vec::new();
    for (idx, (pkg, _)) in packages.iter_mut().enumerate() {
        tracing::info!(pkg = %pkg.path, "processing package");
        let rename_exported =
            opts.obfuscate_internal_exports && is_internal_package(&pkg.path);
        if rename_exported {
            tracing::info!(pkg = %pkg.path, "renaming exported ids");
        } else {
            tracing::debug!(
                pkg = %pkg.path,
                internal = is_internal_package(&pkg.path),
                oie = opts.obfuscate_internal_exports,
                "skipping exported id renaming"
            );
        }

        let old_names = def_name_snapshot(pkg);
        let rename_opts = RenameOptions {
            rename_exported,
            keep: &keep,
            forbid: intrinsic_import_names(pkg),
        };
        let mut exports = HashMap::new();
        let renamed = rename_package(pkg, &generator, &rename_opts, &mut exports);
        reports.push(PackageReport::new(pkg, &old_names, &renamed));
        if !exports.is_empty() {
            export_maps.push((idx, exports));
        }
    }

    // Pass 2: rewrite importers of each internal package's exports.
    for (internal_idx, exports) in &export_maps {
        let internal_path = packages[*internal_idx].0.path.clone();
        for (idx, (pkg, _)) in packages.iter_mut().enumerate() {
            if idx == *internal_idx {
                continue;
            }
            if !can_import(&internal_path, &pkg.path) {
                tracing::debug!(internal = %internal_path, target = %pkg.path, "cannot import; skipping");
                continue;
            }
            tracing::info!(internal = %internal_path, target = %pkg.path, "renaming usage");
            rename_used_exports(pkg, exports);
        }
    }

    // Emit.
    for (pkg, src_dir) in &packages {
        tracing::info!(pkg = %pkg.path, dest = %opts.out_dir.join(&pkg.dir).display(), "writing package");
        emit_package(pkg, src_dir, opts)?;
    }

    let report = RunReport { packages: reports };
    let report_path = opts.out_dir.join(REPORT_FILE);
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| MurkError::internal(e.to_string()))?;
    fs::write(&report_path, json)?;

    Ok(report)
}

fn parent_dir(bundle: &Path) -> PathBuf {
    bundle.parent().unwrap_or(Path::new(".")).to_path_buf()
}

fn bridge_load_error(path: &Path, e: LoadError) -> MurkError {
    MurkError::LoadError {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// The generator seeds: the configured characters (defaulting to ASCII
/// alphanumerics) plus the whitespace-separated tokens of the seed file.
fn build_generator(opts: &Options) -> Result<Generator, MurkError> {
    let mut seeds = if opts.seeds.is_empty() {
        tracing::info!("no seeds, using default");
        seed_chars(DEFAULT_SEEDS)
    } else {
        opts.seeds.clone()
    };
    if let Some(seed_file) = &opts.seed_file {
        let contents = fs::read_to_string(seed_file).map_err(|e| MurkError::LoadError {
            path: seed_file.display().to_string(),
            reason: e.to_string(),
        })?;
        seeds.extend(contents.split_whitespace().map(str::to_string));
    }
    Ok(Generator::new(seeds))
}

/// Identifiers introduced by unnamed (and dot) import clauses; the
/// generator must not produce them for this package.
fn intrinsic_import_names(pkg: &Package) -> HashSet<String> {
    pkg.imports
        .iter()
        .filter(|i| matches!(i.alias.as_deref(), None | Some(".")))
        .map(|i| i.path.rsplit('/').next().unwrap_or(&i.path).to_string())
        .collect()
}

/// Snapshot of every definition's current name, taken before renaming.
fn def_name_snapshot(pkg: &Package) -> Vec<(Pos, String)> {
    pkg.info
        .defs
        .iter()
        .map(|(id, _)| {
            let ident = pkg.ident(*id);
            (ident.pos, ident.name.clone())
        })
        .unique_by(|(pos, _)| *pos)
        .collect()
}

/// Drop synthesized test-binary packages and let a black-box test package
/// supersede the package it tests (it contains all of its files).
fn filter_test_packages(
    packages: Vec<(Package, PathBuf)>,
    include_tests: bool,
) -> Vec<(Package, PathBuf)> {
    if !include_tests {
        return packages;
    }
    let mut result = Vec::with_capacity(packages.len());
    let mut superseded = Vec::new();
    for (pkg, dir) in packages {
        if pkg.id.ends_with(".test") {
            continue;
        }
        let testing = pkg.id.ends_with(".test]");
        if testing {
            if let Some(for_test) = &pkg.for_test {
                if pkg.id.starts_with(&format!("{for_test} ")) {
                    superseded.push(for_test.clone());
                }
            }
        }
        result.push((pkg, dir));
    }
    for path in superseded {
        result.retain(|(p, _)| p.id != path);
    }
    result
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use murk_syntax::builder::PackageBuilder;

    #[test]
    fn intrinsic_names_cover_unnamed_and_dot_imports() {
        let mut b = PackageBuilder::new("p");
        b.import("fmt", None);
        b.import("example.com/x/util", None);
        b.import("strings", Some("str"));
        b.import("math", Some("."));
        b.import("unsafe", Some("_"));
        let pkg = b.build();
        let names = intrinsic_import_names(&pkg);
        assert!(names.contains("fmt"));
        assert!(names.contains("util"));
        assert!(names.contains("math"));
        assert!(!names.contains("strings"), "aliased import keeps its alias");
        assert!(!names.contains("unsafe"), "blank import introduces nothing");
    }

    #[test]
    fn test_binary_packages_are_dropped() {
        let make = |id: &str, for_test: Option<&str>| {
            let mut b = PackageBuilder::new("m/p");
            b.set_id(id);
            if let Some(ft) = for_test {
                b.set_for_test(ft);
            }
            (b.build(), PathBuf::from("."))
        };
        let packages = vec![
            make("m/p", None),
            make("m/p.test", None),
            make("m/p [m/p.test]", Some("m/p")),
        ];

        let kept = filter_test_packages(packages, true);
        let ids: Vec<&str> = kept.iter().map(|(p, _)| p.id.as_str()).collect();
        assert_eq!(ids, vec!["m/p [m/p.test]"], "black-box package supersedes");
    }

    #[test]
    fn without_include_tests_packages_pass_through() {
        let mut b = PackageBuilder::new("m/p");
        b.set_id("m/p.test");
        let packages = vec![(b.build(), PathBuf::from("."))];
        assert_eq!(filter_test_packages(packages, false).len(), 1);
    }

    #[test]
    fn empty_bundle_list_is_an_argument_error() {
        let opts = Options::new("/tmp/unused-out");
        let err = run(&opts, &[]).unwrap_err();
        assert_eq!(err.exit_code().code(), 2);
    }
}
