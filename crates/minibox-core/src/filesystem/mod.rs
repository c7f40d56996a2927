//! Container filesystem setup.
//!
//! The container's view of the mount tree is replaced wholesale by the
//! caller-supplied root directory; see [`pivot`] for the move-mount
//! sequence and its ordering constraints.

pub mod pivot;
