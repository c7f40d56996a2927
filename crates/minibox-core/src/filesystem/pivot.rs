//! Root filesystem switching via a move-mount into `/`.
//!
//! Runs inside the container, which already holds a private mount
//! namespace from its creation flags, so no further unshare happens here.
//! The sequence is order-critical:
//!
//! 1. Make the existing root tree a recursive slave, so nothing below
//!    leaks back to the host while host events still propagate in.
//! 2. Bind-mount the new root onto itself recursively; the source of a
//!    move-mount must be a mount point.
//! 3. Change directory into the new root.
//! 4. Move-mount the new root onto `/`.
//! 5. `chroot(".")`, then change directory to `/`.
//! 6. Make the new root recursively shared, so mounts the container makes
//!    propagate to any descendant mount namespaces.
//! 7. Mount a fresh procfs at `/proc` with `nosuid,noexec,nodev`.

use std::path::Path;

use minibox_common::error::{MiniboxError, Result};
use nix::mount::{mount, MsFlags};

/// Replaces the container's root with `rootfs` and mounts a private procfs.
///
/// Must be called exactly once, after the start gate opens and before the
/// final exec. Afterwards no path outside `rootfs` is nameable, and
/// `/proc` reflects the container's PID namespace if one was requested.
///
/// # Errors
///
/// Returns an error naming the mount, chdir, or chroot step that failed.
pub fn enter_root(rootfs: &Path) -> Result<()> {
    mount(
        None::<&str>,
        "/",
        None::<&str>,
        MsFlags::MS_SLAVE | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(|e| MiniboxError::Syscall {
        op: "mount(/, MS_SLAVE | MS_REC)",
        source: e.into(),
    })?;

    mount(
        Some(rootfs),
        rootfs,
        None::<&str>,
        MsFlags::MS_BIND | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(|e| MiniboxError::Syscall {
        op: "mount(rootfs, rootfs, MS_BIND | MS_REC)",
        source: e.into(),
    })?;

    nix::unistd::chdir(rootfs).map_err(|e| MiniboxError::Syscall {
        op: "chdir(rootfs)",
        source: e.into(),
    })?;

    mount(
        Some(rootfs),
        "/",
        None::<&str>,
        MsFlags::MS_MOVE,
        None::<&str>,
    )
    .map_err(|e| MiniboxError::Syscall {
        op: "mount(rootfs, /, MS_MOVE)",
        source: e.into(),
    })?;

    nix::unistd::chroot(".").map_err(|e| MiniboxError::Syscall {
        op: "chroot(.)",
        source: e.into(),
    })?;

    nix::unistd::chdir("/").map_err(|e| MiniboxError::Syscall {
        op: "chdir(/)",
        source: e.into(),
    })?;

    mount(
        None::<&str>,
        "/",
        None::<&str>,
        MsFlags::MS_SHARED | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(|e| MiniboxError::Syscall {
        op: "mount(/, MS_SHARED | MS_REC)",
        source: e.into(),
    })?;

    mount(
        Some("proc"),
        "/proc",
        Some("proc"),
        MsFlags::MS_NOSUID | MsFlags::MS_NOEXEC | MsFlags::MS_NODEV,
        None::<&str>,
    )
    .map_err(|e| MiniboxError::Syscall {
        op: "mount(proc, /proc)",
        source: e.into(),
    })?;

    tracing::info!(rootfs = %rootfs.display(), "root filesystem pivoted");
    Ok(())
}
