//! # minibox-common
//!
//! Shared error definitions, the launch request model, and system-wide
//! constants used across the minibox workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the foundational primitives that the core,
//! runtime, and CLI crates build upon.

pub mod config;
pub mod constants;
pub mod error;
