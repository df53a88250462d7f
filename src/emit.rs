//! Emission: splice the committed renames into the original sources and
//! mirror the package layout under the output directory.
//!
//! Source files get a generated-file header, the rename overlay, and the
//! comment trim applied; everything else the package carries (module
//! manifests, embedded files, other assets) is copied byte-identically.
//! Existing output files are an error unless `--overwrite` is set.

use std::fs;
use std::path::{Path, PathBuf};

use murk_core::config::Options;
use murk_core::error::MurkError;
use murk_core::patch::{apply_edits, Edit, Span};
use murk_syntax::{Package, SourceFile};

use crate::comments;

const HEADER: &str = "// Code generated by murk. DO NOT EDIT.\n\n";

/// Emit one package. `src_dir` is where the package's assets live on disk.
/// Returns the paths written.
pub fn emit_package(
    pkg: &Package,
    src_dir: &Path,
    opts: &Options,
) -> Result<Vec<PathBuf>, MurkError> {
    let dest_dir = opts.out_dir.join(&pkg.dir);
    fs::create_dir_all(&dest_dir)?;

    let mut written = Vec::new();
    for file in &pkg.files {
        let dest = dest_dir.join(&file.name);
        tracing::info!(path = %dest.display(), "writing source file");
        let content = render_file(pkg, file)?;
        write_new(&dest, content.as_bytes(), opts.overwrite)?;
        written.push(dest);
    }

    for rel in pkg.other_files.iter().chain(&pkg.embed_files) {
        let from = src_dir.join(rel);
        let dest = dest_dir.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        tracing::info!(from = %from.display(), to = %dest.display(), "copying asset");
        if dest.exists() && !opts.overwrite {
            return Err(exists_error(&dest));
        }
        fs::copy(&from, &dest).map_err(|e| MurkError::EmitError {
            path: from.display().to_string(),
            message: e.to_string(),
        })?;
        written.push(dest);
    }

    Ok(written)
}

/// The rewritten text of one source file: header, rename overlay, comments
/// trimmed.
pub fn render_file(pkg: &Package, file: &SourceFile) -> Result<String, MurkError> {
    let mut edits = comments::trim_edits(file);
    edits.extend(rename_edits(pkg, file));
    let body = apply_edits(&file.source, &edits).map_err(|e| MurkError::EmitError {
        path: file.name.clone(),
        message: e.to_string(),
    })?;
    Ok(format!("{HEADER}{body}"))
}

/// Replacement edits for every identifier in `file` whose name no longer
/// matches its original spelling.
fn rename_edits(pkg: &Package, file: &SourceFile) -> Vec<Edit> {
    let mut edits = Vec::new();
    for ident in &pkg.idents {
        if !file.contains(ident.pos) {
            continue;
        }
        let start = file.offset(ident.pos);
        let end = start + ident.orig_len;
        if end as usize > file.source.len() {
            continue;
        }
        let original = &file.source[start as usize..end as usize];
        if original != ident.name {
            edits.push(Edit::replace(Span::new(start, end), ident.name.clone()));
        }
    }
    edits
}

fn write_new(dest: &Path, content: &[u8], overwrite: bool) -> Result<(), MurkError> {
    if dest.exists() && !overwrite {
        return Err(exists_error(dest));
    }
    fs::write(dest, content).map_err(|e| MurkError::EmitError {
        path: dest.display().to_string(),
        message: e.to_string(),
    })
}

fn exists_error(dest: &Path) -> MurkError {
    MurkError::EmitError {
        path: dest.display().to_string(),
        message: "output file exists (use --overwrite)".to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
