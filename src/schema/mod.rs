//! Input schema
//!
//! This module defines the raw record representation shared by every input
//! encoding, and the loader that validates, deduplicates and timestamps it.

mod loader;
mod raw_record;

pub use loader::*;
pub use raw_record::*;
