//! The murk rename engine.
//!
//! Given a typed package, the engine decides for every defining identifier
//! whether a candidate new name is safe, and commits renames consistently
//! across all use sites. Three analyses cooperate:
//!
//! - the lexical [`scope`] graph: can a name be defined or used at a
//!   position without changing what any existing identifier resolves to?
//! - the [`selection`] model: can a field or method be renamed without
//!   breaking promotion through embedded fields or interface satisfaction?
//! - the method [`group`]er: which declared methods may implement the same
//!   interface method and must therefore be renamed in lockstep?
//!
//! [`rename`] drives the three per package; [`crosspkg`] propagates renamed
//! exports of internal packages into their importers afterwards.

pub mod crosspkg;
pub mod group;
pub mod idgen;
pub mod multimap;
pub mod rename;
pub mod scope;
pub mod selection;
pub mod signature;
pub mod testkit;
