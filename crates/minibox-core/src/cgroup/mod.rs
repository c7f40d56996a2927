//! Cgroups v2 resource management.
//!
//! Creates a per-container directory under the unified hierarchy, applies
//! memory limits, and attaches the container before it starts running so
//! startup allocations are already accounted.
//!
//! The hierarchy root is a deployment precondition: it must exist with
//! all required controllers enabled, and is never created here, since
//! creating it silently would mask a misconfigured controller set.

pub mod memory;

use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

use minibox_common::error::{MiniboxError, Result};

/// Handle to the cgroup of a single container, keyed by its PID.
///
/// Owned by the agent: created before the container is released and
/// removed after the container has been reaped.
#[derive(Debug)]
pub struct Cgroup {
    path: PathBuf,
}

impl Cgroup {
    /// Creates `{root}/{pid}` with mode 0755.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, including
    /// when the hierarchy root itself is missing.
    pub fn create(root: &Path, pid: u32) -> Result<Self> {
        let path = root.join(pid.to_string());
        DirBuilder::new()
            .mode(0o755)
            .create(&path)
            .map_err(|e| MiniboxError::Io {
                path: path.clone(),
                source: e,
            })?;
        tracing::debug!(path = %path.display(), "cgroup created");
        Ok(Self { path })
    }

    /// Applies the memory cap; a zero cap leaves the cgroup unlimited.
    ///
    /// The soft-protection threshold `memory.low` is set to three quarters
    /// of the hard cap, below which the kernel should avoid reclaiming.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to a memory control file fails.
    pub fn apply_memory_limit(&self, max_ram_bytes: u64) -> Result<()> {
        if max_ram_bytes == 0 {
            return Ok(());
        }
        let low = u64::try_from(u128::from(max_ram_bytes) * 3 / 4).unwrap_or(u64::MAX);
        memory::set_memory_low(&self.path, low)?;
        memory::set_memory_max(&self.path, max_ram_bytes)?;
        Ok(())
    }

    /// Moves a process into this cgroup by writing its PID to `cgroup.procs`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `cgroup.procs` fails.
    pub fn attach(&self, pid: u32) -> Result<()> {
        let procs = self.path.join("cgroup.procs");
        std::fs::write(&procs, pid.to_string()).map_err(|e| MiniboxError::Io {
            path: procs,
            source: e,
        })?;
        tracing::debug!(pid, "process attached to cgroup");
        Ok(())
    }

    /// Removes the cgroup directory after its process has been reaped.
    ///
    /// The kernel drops dead processes from the cgroup, so the rmdir is
    /// expected to succeed once the container has exited.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    pub fn remove(self) -> Result<()> {
        std::fs::remove_dir(&self.path).map_err(|e| MiniboxError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %self.path.display(), "cgroup removed");
        Ok(())
    }

    /// Path of this cgroup's directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn create_names_directory_after_pid() {
        let root = tempfile::tempdir().expect("tempdir");
        let cgroup = Cgroup::create(root.path(), 4242).expect("create");
        assert!(root.path().join("4242").is_dir());
        assert_eq!(cgroup.path(), root.path().join("4242"));
    }

    #[test]
    fn create_fails_when_root_is_missing() {
        let root = tempfile::tempdir().expect("tempdir");
        let missing = root.path().join("no-such-root");
        assert!(Cgroup::create(&missing, 1).is_err());
    }

    #[test]
    fn memory_limit_writes_cap_and_soft_threshold() {
        let root = tempfile::tempdir().expect("tempdir");
        let cgroup = Cgroup::create(root.path(), 7).expect("create");
        cgroup.apply_memory_limit(104_857_600).expect("limits");

        let max = std::fs::read_to_string(cgroup.path().join("memory.max")).expect("memory.max");
        let low = std::fs::read_to_string(cgroup.path().join("memory.low")).expect("memory.low");
        assert_eq!(max, "104857600");
        assert_eq!(low, "78643200");
    }

    #[test]
    fn zero_cap_writes_nothing() {
        let root = tempfile::tempdir().expect("tempdir");
        let cgroup = Cgroup::create(root.path(), 8).expect("create");
        cgroup.apply_memory_limit(0).expect("no-op");
        assert!(!cgroup.path().join("memory.max").exists());
        assert!(!cgroup.path().join("memory.low").exists());
    }

    #[test]
    fn attach_writes_decimal_pid() {
        let root = tempfile::tempdir().expect("tempdir");
        let cgroup = Cgroup::create(root.path(), 9).expect("create");
        cgroup.attach(9).expect("attach");

        let procs = std::fs::read_to_string(cgroup.path().join("cgroup.procs")).expect("procs");
        assert_eq!(procs, "9");
    }

    #[test]
    fn remove_deletes_the_directory() {
        let root = tempfile::tempdir().expect("tempdir");
        let cgroup = Cgroup::create(root.path(), 10).expect("create");
        let path = cgroup.path().to_path_buf();
        cgroup.remove().expect("remove");
        assert!(!path.exists());
    }
}
