//! Common test utilities and fixtures for semfora-search integration tests
//!
//! This module provides:
//! - `StubBackend`, a scripted collaborator with latency, failures and call counters
//! - `TestCatalog` builder writing catalog files and running the CLI against them
//! - Assertions for JSON CLI output

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod assertions;
pub mod stubs;
pub mod test_catalog;

pub use assertions::*;
pub use stubs::*;
pub use test_catalog::TestCatalog;
