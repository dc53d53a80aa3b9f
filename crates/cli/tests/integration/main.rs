//! CLI integration tests for extsync.

mod common;

mod apply_tests;
mod plan_tests;
mod status_tests;
