//! Bundle loading.
//!
//! A bundle is one JSON-serialized [`Package`] as produced by the upstream
//! frontend. Several bundles loaded together share one position space, so
//! their file bases must not overlap.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::package::Package;

/// Errors from bundle loading and validation.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed bundle {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("bundle {path}: scope tree is empty (package scope required)")]
    NoPackageScope { path: String },

    #[error("file bases overlap: {a} and {b}")]
    OverlappingFiles { a: String, b: String },
}

/// Load one bundle from disk.
pub fn load_bundle(path: &Path) -> Result<Package, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut pkg: Package = serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.display().to_string(),
        source,
    })?;
    if pkg.scopes.is_empty() {
        return Err(LoadError::NoPackageScope {
            path: path.display().to_string(),
        });
    }
    pkg.normalize();
    Ok(pkg)
}

/// Check that no two files across the loaded packages share positions.
pub fn validate_disjoint<'a>(
    pkgs: impl IntoIterator<Item = &'a Package>,
) -> Result<(), LoadError> {
    let mut ranges: Vec<(u32, u32, String)> = pkgs
        .into_iter()
        .flat_map(|p| {
            p.files
                .iter()
                .map(move |f| (f.base, f.base + f.len, format!("{}:{}", p.path, f.name)))
        })
        .collect();
    ranges.sort();
    for pair in ranges.windows(2) {
        if pair[1].0 <= pair[0].1 {
            return Err(LoadError::OverlappingFiles {
                a: pair[0].2.clone(),
                b: pair[1].2.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PackageBuilder;

    #[test]
    fn round_trips_through_json() {
        let mut b = PackageBuilder::new("example.com/p");
        let f = b.file("a.go", "package p\n");
        let int = b.basic(crate::types::BasicKind::Int);
        let scope = f.scope;
        let v = b.var("x", f.pos(4), int, scope);
        b.def(v);
        let pkg = b.build();

        let json = serde_json::to_string(&pkg).unwrap();
        let back: Package = serde_json::from_str(&json).unwrap();
        assert_eq!(back.path, "example.com/p");
        assert_eq!(back.idents.len(), 1);
        assert_eq!(back.ident(pkg.info.defs[0].0).name, "x");
    }

    #[test]
    fn disjoint_validation_catches_overlap() {
        let mut a = PackageBuilder::new("a");
        a.file_sized("a.go", 100);
        let mut b = PackageBuilder::new("b");
        b.file_sized("b.go", 100);
        let pa = a.build();
        let mut pb = b.build();
        assert!(validate_disjoint([&pa, &pb]).is_err());

        for f in &mut pb.files {
            f.base += 200;
        }
        assert!(validate_disjoint([&pa, &pb]).is_ok());
    }
}
