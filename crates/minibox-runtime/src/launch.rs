//! The launch protocol.
//!
//! Two processes cooperate: the **agent** (the invoking process) and the
//! **container** (the child created with the namespace flags). The agent
//! prepares everything that needs the container's PID as a handle (veth
//! plumbing and cgroup placement) while the container blocks on the
//! start gate; the gate byte both releases the container and reports
//! agent-side failure in a single event. The container then configures
//! its own network, pivots into its root, applies its UTS identity, and
//! execs the user command.

use std::convert::Infallible;
use std::path::Path;
use std::process;

use minibox_common::config::LaunchRequest;
use minibox_common::constants::CGROUP_ROOT;
use minibox_common::error::{MiniboxError, Result};
use minibox_core::cgroup::Cgroup;
use minibox_core::filesystem::pivot;
use minibox_core::namespace::{self, uts};
use minibox_core::network;
use nix::errno::Errno;
use nix::sched::CloneFlags;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;

use crate::process::exec_command;
use crate::sync::{AgentSide, StartGate};

/// Runs the full launch protocol and returns the container's exit status.
///
/// # Errors
///
/// Returns an error if the request is invalid, the clone fails, or any
/// agent-side preparation or cleanup step fails. Container-side failures
/// surface as the container's non-zero exit status instead.
pub fn launch(request: &LaunchRequest) -> Result<i32> {
    request.validate()?;

    let flags = namespace::isolation_flags(request);
    let gate = StartGate::new()?;

    tracing::debug!(?flags, command = %request.command.join(" "), "creating container");
    let child = clone_with_namespaces(flags)?;

    if child == 0 {
        // Container branch; never unwinds back into the agent's code.
        match container_branch(request, gate) {
            Ok(never) => match never {},
            Err(err) => {
                eprintln!("{err}");
                process::exit(1);
            }
        }
    }

    agent_branch(request, gate, child)
}

/// Forks the current process, atomically creating the requested
/// namespaces.
///
/// Returns 0 in the container and the container's PID in the agent. No
/// fork wrapper accepts namespace flags, so this is the raw `clone(2)`
/// syscall in the x86-64 argument order, with stack, parent-tid,
/// child-tid, and TLS unused. The container continues on the agent's
/// stack, which is safe because it does nothing non-async-signal-safe
/// before the start-gate read.
fn clone_with_namespaces(flags: CloneFlags) -> Result<libc::c_long> {
    #[allow(clippy::cast_sign_loss)]
    let raw_flags = libc::c_ulong::from(flags.bits() as u32) | libc::c_ulong::from(libc::SIGCHLD as u32);

    // SAFETY: all pointer arguments are null, which clone(2) permits when
    // the child shares the parent's stack and no tid/TLS options are set.
    let res = unsafe {
        libc::syscall(
            libc::SYS_clone,
            raw_flags,
            std::ptr::null_mut::<libc::c_void>(),
            std::ptr::null_mut::<libc::c_int>(),
            std::ptr::null_mut::<libc::c_int>(),
            0 as libc::c_ulong,
        )
    };
    Errno::result(res).map_err(|e| MiniboxError::Syscall {
        op: "clone",
        source: e.into(),
    })
}

/// Everything the container does between its creation and the exec.
fn container_branch(request: &LaunchRequest, gate: StartGate) -> Result<Infallible> {
    let (agent, container) = gate.split();
    drop(agent);

    tracing::info!("waiting for agent preparation");
    container.wait()?;

    if let Some(ip) = request.ip.as_deref() {
        network::container::configure(ip)?;
    }
    if let Some(rootfs) = request.rootfs.as_deref() {
        pivot::enter_root(rootfs)?;
    }
    uts::apply_identity(request.hostname.as_deref(), request.domain.as_deref())?;

    tracing::info!(
        hostname = %uts::hostname().unwrap_or_default(),
        domain = %uts::domain_name().unwrap_or_default(),
        command = %request.command.join(" "),
        "executing container command"
    );
    exec_command(&request.command)
}

/// Everything the agent does between the clone and its own exit.
fn agent_branch(request: &LaunchRequest, gate: StartGate, child: libc::c_long) -> Result<i32> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pid = child as u32;
    let (agent, container) = gate.split();
    drop(container);

    tracing::info!(
        container_pid = pid,
        agent_pid = %nix::unistd::getpid(),
        agent_hostname = %uts::hostname().unwrap_or_default(),
        agent_domain = %uts::domain_name().unwrap_or_default(),
        "container created"
    );

    let prepared = prepare_host(request, pid);
    release(agent, prepared.is_ok())?;

    let status = reap(pid)?;
    let cgroup = prepared?;
    cgroup.remove()?;
    Ok(status)
}

/// Host-side preparation: network plumbing (if requested) and cgroup
/// placement. Runs strictly before the start gate opens, so the
/// container's startup allocations are already accounted and `eth0`
/// already exists in its namespace.
fn prepare_host(request: &LaunchRequest, pid: u32) -> Result<Cgroup> {
    if request.wants_network() {
        network::host::prepare(pid)?;
    }
    let cgroup = Cgroup::create(Path::new(CGROUP_ROOT), pid)?;
    cgroup.apply_memory_limit(request.max_ram_bytes)?;
    cgroup.attach(pid)?;
    Ok(cgroup)
}

/// Writes the verdict byte, releasing (or aborting) the container.
fn release(agent: AgentSide, success: bool) -> Result<()> {
    tracing::info!(success, "releasing container");
    agent.release(success)
}

/// Waits for the container to exit and maps its wait status to an exit
/// code; signal deaths map to `128 + signo`.
fn reap(pid: u32) -> Result<i32> {
    #[allow(clippy::cast_possible_wrap)]
    let status = waitpid(Pid::from_raw(pid as i32), None).map_err(|e| MiniboxError::Syscall {
        op: "waitpid",
        source: e.into(),
    })?;
    tracing::info!(?status, "container exited");
    match status {
        WaitStatus::Exited(_, code) => Ok(code),
        WaitStatus::Signaled(_, signal, _) => Ok(128 + signal as i32),
        _ => Err(MiniboxError::Aborted {
            reason: "unexpected wait status for container",
        }),
    }
}
