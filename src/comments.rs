//! Comment trimming.
//!
//! Emitted sources drop every comment except build and compiler
//! directives, which must survive byte-for-byte: `//extern`, `//export`,
//! `//tool:directive` forms, and `line` position directives.

use std::sync::LazyLock;

use regex::Regex;

use murk_core::patch::{Edit, Span};
use murk_syntax::SourceFile;

static RE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^//(extern |export |[a-z0-9]+:[a-z0-9])").expect("directive regex")
});

static RE_LINE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(//|/\*)line .*:.*$").expect("line directive regex"));

/// Whether a comment is a directive that must be kept.
pub fn is_directive(comment: &str) -> bool {
    RE_DIRECTIVE.is_match(comment) || RE_LINE_DIRECTIVE.is_match(comment)
}

/// Deletion edits (file-local offsets) for every non-directive comment.
pub fn trim_edits(file: &SourceFile) -> Vec<Edit> {
    file.comments
        .iter()
        .filter(|c| !is_directive(&c.text))
        .map(|c| {
            let start = file.offset(c.pos);
            Edit::delete(Span::new(start, start + c.text.len() as u32))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use murk_syntax::builder::PackageBuilder;

    #[test]
    fn directives_are_recognized() {
        assert!(is_directive("//go:generate stringer"));
        assert!(is_directive("//export MyFunc"));
        assert!(is_directive("//extern something"));
        assert!(is_directive("//line file.go:10"));
        assert!(is_directive("/*line file.go:10:2*/"));
    }

    #[test]
    fn ordinary_comments_are_not_directives() {
        assert!(!is_directive("// a plain comment"));
        assert!(!is_directive("/* block */"));
        assert!(!is_directive("//not a directive: see above"));
        assert!(!is_directive("// go:generate spaced out"));
    }

    #[test]
    fn trim_deletes_only_non_directives() {
        let mut b = PackageBuilder::new("p");
        let src = "package p // doc\n//go:embed data\nvar x int\n";
        let f = b.file("a.go", src);
        let doc_off = src.find("// doc").unwrap() as u32;
        b.comment(f, doc_off, "// doc");
        let dir_off = src.find("//go:embed").unwrap() as u32;
        b.comment(f, dir_off, "//go:embed data");
        let pkg = b.build();

        let edits = trim_edits(&pkg.files[0]);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].span.start, doc_off);
        assert_eq!(edits[0].span.len(), "// doc".len() as u32);
        assert!(edits[0].text.is_empty());
    }
}
