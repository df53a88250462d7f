//! murk: a source-to-source obfuscating renamer.
//!
//! The engine lives in `murk-engine`; this crate orchestrates a run:
//! loading typed-package bundles, driving the per-package rename and the
//! cross-package export propagation, trimming comments, and emitting the
//! rewritten sources plus byte-identical assets.

pub mod comments;
pub mod emit;
pub mod pipeline;
pub mod report;
