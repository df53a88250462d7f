//! Source positions.
//!
//! A [`Pos`] is a compact offset into the run's file space: every file gets
//! a base offset and positions inside it are `base + offset`. Positions are
//! totally ordered within a file and comparable for equality across files.
//! Bases must not overlap across any of the packages loaded together.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A source position. `Pos::NONE` (zero) means "no position".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Pos(u32);

impl Pos {
    /// The invalid position.
    pub const NONE: Pos = Pos(0);

    pub fn new(raw: u32) -> Pos {
        Pos(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// The position `n` bytes further into the same file.
    pub fn add(self, n: u32) -> Pos {
        Pos(self.0 + n)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "-")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_invalid() {
        assert!(!Pos::NONE.is_valid());
        assert!(Pos::new(1).is_valid());
    }

    #[test]
    fn ordering_within_a_file() {
        assert!(Pos::new(10) < Pos::new(11));
        assert_eq!(Pos::new(5).add(3), Pos::new(8));
    }
}
