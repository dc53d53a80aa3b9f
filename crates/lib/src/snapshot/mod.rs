//! Prior installation state.
//!
//! The snapshot is the last successfully applied extension list. It is read
//! once at the start of a run and replaced only after every other step of the
//! run has succeeded, so it always describes a known-good installation.

mod storage;
mod types;

pub use storage::*;
pub use types::*;
