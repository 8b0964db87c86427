//! Configuration module for the steward reconciliation core.
//!
//! This module turns configuration documents into typed resource graphs:
//! - Grammar-level parsing is delegated to the HCL parser
//! - Per-kind decoders map block bodies onto resource fields
//! - Semantic defects across the whole document aggregate into one report

mod parser;

pub use parser::Parser;
