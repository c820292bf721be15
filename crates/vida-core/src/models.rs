//! Domain models for Vida+.
//!
//! These are the core types shared across all crates.

pub mod identity;
