//! core
//!
//! Core domain types and rules for revscope.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Revision
//! - [`tags`] - Semantic-version tag parsing and baseline selection
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Nothing here touches the repository; it is pure and deterministic

pub mod config;
pub mod tags;
pub mod types;
