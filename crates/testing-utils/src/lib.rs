//! # Batch Job Testing Utils
//!
//! Shared testing utilities for the batch job controller workspace.
//!
//! ## Features
//!
//! - **Fake Kubernetes capabilities**: in-memory object reader and a recording event recorder
//! - **Registry doubles**: a static execution registry that records every call
//! - **Test Data Builders**: pods, owner chains and controller configs
//! - **Helpers**: temporary report directories and file listing
//!
//! ## Usage
//!
//! ```toml
//! [dev-dependencies]
//! batch-job-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
