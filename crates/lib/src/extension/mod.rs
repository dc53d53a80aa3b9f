//! Extension records.
//!
//! An extension record is one entry of desired or prior state: a named unit of
//! code for the host application, fetched either from a git repository or from
//! the package registry, plus the configuration passed through to the
//! generated settings file.

mod types;

pub use types::*;
