//! extsync-lib: Core types and logic for extsync
//!
//! This crate keeps a host application's extensions in line with a declared
//! catalog:
//! - `ExtensionRecord`: one extension, sourced from a git repo or a package
//! - `merge`: baseline catalog + deployment overrides → desired state
//! - `decision`: which sources to sync and where migrations must run
//! - `Reconciler`: applies the desired state and records it as a snapshot

pub mod composer;
pub mod config;
pub mod consts;
pub mod decision;
pub mod exec;
pub mod extension;
pub mod matcher;
pub mod merge;
pub mod reconcile;
pub mod settings;
pub mod snapshot;
pub mod source;
pub mod util;
