//! Namespace flag derivation for container creation.
//!
//! The launch request is mapped to a `clone(2)` flag set once, up front;
//! the child is then created with exactly those domains in a single
//! syscall rather than unsharing piecemeal afterwards.

pub mod uts;

use minibox_common::config::LaunchRequest;
use nix::sched::CloneFlags;

/// Computes the namespace flag set implied by a launch request.
///
/// Each present field contributes exactly one domain bit: rootfs → mount,
/// `enable_pid` → PID, hostname or domain → UTS, `enable_ipc` → IPC,
/// ip → network. Absent fields leave the container in the host's domain.
/// The child-termination signal is not part of this set; the clone site
/// ORs it in.
#[must_use]
pub fn isolation_flags(request: &LaunchRequest) -> CloneFlags {
    let mut flags = CloneFlags::empty();
    if request.rootfs.is_some() {
        flags |= CloneFlags::CLONE_NEWNS;
    }
    if request.enable_pid {
        flags |= CloneFlags::CLONE_NEWPID;
    }
    if request.wants_uts() {
        flags |= CloneFlags::CLONE_NEWUTS;
    }
    if request.enable_ipc {
        flags |= CloneFlags::CLONE_NEWIPC;
    }
    if request.wants_network() {
        flags |= CloneFlags::CLONE_NEWNET;
    }
    flags
}
