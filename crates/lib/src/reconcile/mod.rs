//! Reconciliation of installed extensions against the desired state.
//!
//! A run moves through these phases:
//!
//! 1. Load the desired state (baseline + overrides) and the prior snapshot
//! 2. Stop with `NOCHANGE` if both are identical
//! 3. Sync the source of every repo extension that changed, failing fast
//! 4. Regenerate the settings file
//! 5. Sync the package manifest and run the package manager
//! 6. Replace the snapshot and report `CHANGED` with the migration requirement
//!
//! The snapshot is only written once every earlier phase has succeeded.

pub mod apply;
pub mod plan;
pub mod types;

pub use apply::*;
pub use plan::*;
pub use types::*;
