//! Common utilities for the Wombat parser crates.
//!
//! This crate provides shared infrastructure used by the parser components:
//! - **Warning System** - deduplicated, colored stderr output for markup
//!   features the parser accepts but does not model fully

pub mod warning;
