//! Common test utilities for HTTP testing.
//!
//! - [`harness`] - Test server over a seeded in-memory store
//! - [`fixtures`] - Book catalog and documents
//! - [`assertions`] - HTTP response assertions

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
pub mod harness;
