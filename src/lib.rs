//! foliocms - Headless portfolio CMS backend
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod content;
pub mod deploy;
pub mod enrich;
pub mod server;
