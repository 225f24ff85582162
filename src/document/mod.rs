//! The external JSON document: export, import, and schema migration.

pub mod export;
pub mod import;

/// Schema version written to every exported document.
pub const DOC_VERSION: u32 = 1;
