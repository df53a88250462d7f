//! Core infrastructure for murk.
//!
//! This crate provides language-agnostic infrastructure:
//! - Unified error type and exit codes
//! - Byte spans and edit splicing for source rewriting
//! - Text position utilities (byte offset to line:column)
//! - The options record and keep-list matching

pub mod config;
pub mod error;
pub mod patch;
pub mod text;
