//! Unique identifier generation.
//!
//! A [`Generator`] is built from seed strings. Each seed is classified by
//! its leading character: upper-case letters may start exported names,
//! underscore and lower-case-like letters may start unexported names, and
//! digit-like seeds are continuation-only. All accepted seeds participate
//! in continuation positions.
//!
//! A stream walks an odometer over the seed lists: position 0 draws from
//! the case-appropriate leading class, higher positions from the full list.
//! Candidates found in the forbid set are skipped, so the stream is
//! infinite, duplicate-free, and deterministic for a given seed order.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use murk_syntax::universe;

// ids starting with Lu
static RE_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{Lu}[_\p{L}\p{Nd}]*$").expect("upper seed regex"));

// ids starting with _, Ll, Lm, Lo or Lt
static RE_LOWER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[_\p{Ll}\p{Lm}\p{Lo}\p{Lt}]+[_\p{L}\p{Nd}]*$").expect("lower seed regex")
});

// strings composed of letters and digits
static RE_CONT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[_\p{L}\p{Nd}]+$").expect("continuation seed regex"));

/// Language keywords; never legal identifiers, but kept out of the streams
/// together with the predeclared universe names.
const KEYWORDS: &[&str] = &[
    "break",
    "default",
    "func",
    "interface",
    "select",
    "case",
    "defer",
    "go",
    "map",
    "struct",
    "chan",
    "else",
    "goto",
    "package",
    "switch",
    "const",
    "fallthrough",
    "if",
    "range",
    "type",
    "continue",
    "for",
    "import",
    "return",
    "var",
];

/// The always-forbidden names for unexported streams: keywords plus every
/// predeclared universe name.
pub fn reserved_names() -> impl Iterator<Item = &'static str> {
    KEYWORDS
        .iter()
        .copied()
        .chain(universe::UNIVERSE_NAMES.iter().copied())
}

/// Identifier generator: classified seed lists.
#[derive(Debug, Clone)]
pub struct Generator {
    upper: Vec<String>,
    lower: Vec<String>,
    all: Vec<String>,
}

impl Generator {
    /// Build a generator from seeds. Seeds that are not letter/digit
    /// strings are discarded; duplicates are dropped; if a leading class
    /// ends up empty it gets a default (`A` for exported, `_` for
    /// unexported).
    pub fn new<I, S>(seeds: I) -> Generator
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut gen = Generator {
            upper: Vec::new(),
            lower: Vec::new(),
            all: Vec::new(),
        };
        let mut seen = HashSet::new();
        for seed in seeds {
            let seed: String = seed.into();
            if !seen.insert(seed.clone()) {
                continue;
            }
            if RE_UPPER.is_match(&seed) {
                gen.upper.push(seed.clone());
                gen.all.push(seed);
            } else if RE_LOWER.is_match(&seed) {
                gen.lower.push(seed.clone());
                gen.all.push(seed);
            } else if RE_CONT.is_match(&seed) {
                gen.all.push(seed);
            }
        }
        if gen.upper.is_empty() {
            gen.upper.push("A".to_string());
        }
        if gen.lower.is_empty() {
            gen.lower.push("_".to_string());
        }
        if gen.all.is_empty() {
            gen.all.extend(gen.upper.iter().cloned());
            gen.all.extend(gen.lower.iter().cloned());
        }
        gen
    }

    /// A stream of exported identifiers. Only the caller's forbid set
    /// applies; reserved words are all lower-case and cannot collide.
    pub fn exported(&self, forbid: HashSet<String>) -> IdStream<'_> {
        IdStream {
            leading: &self.upper,
            all: &self.all,
            odometer: vec![0],
            forbid,
        }
    }

    /// A stream of unexported identifiers; the reserved list is always
    /// added to the forbid set.
    pub fn unexported(&self, mut forbid: HashSet<String>) -> IdStream<'_> {
        forbid.extend(reserved_names().map(str::to_string));
        IdStream {
            leading: &self.lower,
            all: &self.all,
            odometer: vec![0],
            forbid,
        }
    }
}

/// A stateful stream of fresh identifiers.
#[derive(Debug)]
pub struct IdStream<'a> {
    leading: &'a [String],
    all: &'a [String],
    /// Digit 0 carries first; the last digit indexes the leading class.
    odometer: Vec<usize>,
    forbid: HashSet<String>,
}

impl IdStream<'_> {
    /// The next fresh identifier. The stream never ends.
    pub fn next_id(&mut self) -> String {
        loop {
            let last = self.odometer.len() - 1;
            let mut id = self.leading[self.odometer[last]].clone();
            for i in (0..last).rev() {
                id.push_str(&self.all[self.odometer[i]]);
            }
            self.increment();
            if !self.forbid.contains(&id) {
                return id;
            }
        }
    }

    fn increment(&mut self) {
        let last = self.odometer.len() - 1;
        self.odometer[0] += 1;
        for i in 0..last {
            if self.odometer[i] > self.all.len() - 1 {
                self.odometer[i + 1] += 1;
                self.odometer[i] = 0;
            }
        }
        if self.odometer[last] > self.leading.len() - 1 {
            self.odometer[last] = 0;
            self.odometer.push(0);
        }
    }
}

impl Iterator for IdStream<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forbid(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exported_stream_order() {
        let gen = Generator::new(["A", "b", "0"]);
        let mut next = gen.exported(forbid(&["A"]));
        assert_eq!(next.next_id(), "AA");
        assert_eq!(next.next_id(), "Ab");
        assert_eq!(next.next_id(), "A0");
        assert_eq!(next.next_id(), "AAA");
        assert_eq!(next.next_id(), "AAb");
        assert_eq!(next.next_id(), "AA0");
    }

    #[test]
    fn unexported_stream_order() {
        let gen = Generator::new(["A", "0"]);
        let mut next = gen.unexported(HashSet::new());
        assert_eq!(next.next_id(), "_");
        assert_eq!(next.next_id(), "_A");
        assert_eq!(next.next_id(), "_0");
        assert_eq!(next.next_id(), "_AA");
        assert_eq!(next.next_id(), "_A0");
        assert_eq!(next.next_id(), "_0A");
        assert_eq!(next.next_id(), "_00");
        assert_eq!(next.next_id(), "_AAA");
    }

    #[test]
    fn unexported_stream_skips_reserved() {
        // Single-letter seeds that spell reserved words must be skipped.
        let gen = Generator::new(["i", "f"]);
        let mut next = gen.unexported(HashSet::new());
        let mut produced = Vec::new();
        for _ in 0..10 {
            produced.push(next.next_id());
        }
        assert!(!produced.contains(&"if".to_string()));
        assert!(produced.contains(&"ii".to_string()));
    }

    #[test]
    fn duplicate_seeds_are_dropped() {
        let gen = Generator::new(["a", "a", "b"]);
        let mut next = gen.unexported(HashSet::new());
        assert_eq!(next.next_id(), "a");
        assert_eq!(next.next_id(), "b");
        assert_eq!(next.next_id(), "aa");
    }

    #[test]
    fn no_duplicates_in_long_prefix() {
        let gen = Generator::new(["a", "b", "1"]);
        let mut next = gen.unexported(HashSet::new());
        let mut seen = HashSet::new();
        for _ in 0..500 {
            assert!(seen.insert(next.next_id()));
        }
    }

    #[test]
    fn empty_seed_list_gets_defaults() {
        let gen = Generator::new(Vec::<String>::new());
        let mut exported = gen.exported(HashSet::new());
        assert_eq!(exported.next_id(), "A");
        let mut unexported = gen.unexported(HashSet::new());
        assert_eq!(unexported.next_id(), "_");
    }

    #[test]
    fn non_identifier_seeds_are_discarded() {
        let gen = Generator::new(["*", " ", "x"]);
        let mut next = gen.unexported(HashSet::new());
        assert_eq!(next.next_id(), "x");
        assert_eq!(next.next_id(), "xx");
    }
}
