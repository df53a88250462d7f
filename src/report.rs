//! The machine-readable rename report.
//!
//! One record per renamed definition, with the old spelling and the
//! location in the original sources. Written next to the emitted packages
//! as `murk-report.json`.

use serde::Serialize;

use murk_core::text::line_col;
use murk_syntax::{Package, Pos};

/// The whole run's report.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub packages: Vec<PackageReport>,
}

/// Renames of one package.
#[derive(Debug, Serialize)]
pub struct PackageReport {
    pub path: String,
    pub renames: Vec<RenameRecord>,
}

/// One committed rename.
#[derive(Debug, Serialize)]
pub struct RenameRecord {
    pub old: String,
    pub new: String,
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl PackageReport {
    /// Assemble the report for one package from the pre-rename name
    /// snapshot and the committed rename map, sorted by location.
    pub fn new(
        pkg: &Package,
        old_names: &[(Pos, String)],
        renamed: &std::collections::HashMap<Pos, String>,
    ) -> PackageReport {
        let mut renames = Vec::new();
        for (pos, old) in old_names {
            let Some(new) = renamed.get(pos) else { continue };
            let (file, line, col) = match pkg.file_containing(*pos) {
                Some(f) => {
                    let lc = line_col(&f.source, f.offset(*pos) as usize);
                    (f.name.clone(), lc.line, lc.col)
                }
                None => (String::new(), 0, 0),
            };
            renames.push(RenameRecord {
                old: old.clone(),
                new: new.clone(),
                file,
                line,
                col,
            });
        }
        renames.sort_by(|a, b| (&a.file, a.line, a.col).cmp(&(&b.file, b.line, b.col)));
        PackageReport {
            path: pkg.path.clone(),
            renames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use murk_syntax::builder::PackageBuilder;
    use murk_syntax::BasicKind;

    #[test]
    fn report_pairs_old_and_new_names() {
        let mut b = PackageBuilder::new("example.com/p");
        let f = b.file("a.go", "package p\nvar alpha = 1\n");
        let int = b.basic(BasicKind::Int);
        let alpha_pos = f.pos(14);
        let v = b.var("alpha", alpha_pos, int, murk_syntax::ScopeId::PACKAGE);
        b.def(v);
        let pkg = b.build();

        let old_names = vec![(alpha_pos, "alpha".to_string())];
        let mut renamed = HashMap::new();
        renamed.insert(alpha_pos, "a".to_string());

        let report = PackageReport::new(&pkg, &old_names, &renamed);
        assert_eq!(report.renames.len(), 1);
        let r = &report.renames[0];
        assert_eq!((r.old.as_str(), r.new.as_str()), ("alpha", "a"));
        assert_eq!((r.file.as_str(), r.line, r.col), ("a.go", 2, 5));
    }
}
