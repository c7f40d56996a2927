//! Memory resource control via cgroups v2.
//!
//! Manages the `memory.max` and `memory.low` control files. Values are
//! written as decimal ASCII with no trailing newline.

use std::path::Path;

use minibox_common::error::{MiniboxError, Result};

/// Sets the hard memory limit for a cgroup.
///
/// Processes exceeding this limit are subject to the OOM killer.
///
/// # Errors
///
/// Returns an error if writing to `memory.max` fails.
pub fn set_memory_max(cgroup_path: &Path, bytes: u64) -> Result<()> {
    let file = cgroup_path.join("memory.max");
    std::fs::write(&file, bytes.to_string()).map_err(|e| MiniboxError::Io {
        path: file,
        source: e,
    })?;
    tracing::debug!(bytes, "memory max limit set");
    Ok(())
}

/// Sets the soft memory protection for a cgroup.
///
/// Below this usage the kernel avoids reclaiming the cgroup's memory.
///
/// # Errors
///
/// Returns an error if writing to `memory.low` fails.
pub fn set_memory_low(cgroup_path: &Path, bytes: u64) -> Result<()> {
    let file = cgroup_path.join("memory.low");
    std::fs::write(&file, bytes.to_string()).map_err(|e| MiniboxError::Io {
        path: file,
        source: e,
    })?;
    tracing::debug!(bytes, "memory soft protection set");
    Ok(())
}
