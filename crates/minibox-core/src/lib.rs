//! # minibox-core
//!
//! Kernel-facing primitives for the minibox container launcher: namespace
//! flag derivation, UTS identity, cgroup resource limits, the root
//! filesystem pivot, and virtual-network plumbing.
//!
//! All modules are Linux-only; the runtime crate exposes a stub entry
//! point on other platforms.

#[cfg(target_os = "linux")]
pub mod cgroup;
#[cfg(target_os = "linux")]
pub mod filesystem;
#[cfg(target_os = "linux")]
pub mod namespace;
#[cfg(target_os = "linux")]
pub mod network;
