//! The launch request model consumed by the coordinator.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MiniboxError, Result};

/// Everything a single container launch needs, assembled by the CLI and
/// consumed once by the coordinator.
///
/// Each optional field that implies a kernel namespace domain (rootfs →
/// mount, hostname/domain → UTS, ip → network) requests exactly that
/// domain; an absent field means the container shares the host's domain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Command tokens; the first is the path to the executable.
    pub command: Vec<String>,
    /// Root filesystem directory. Absent means no mount isolation.
    pub rootfs: Option<PathBuf>,
    /// Hostname inside the container; requests UTS isolation.
    pub hostname: Option<String>,
    /// NIS domain name inside the container; requests UTS isolation.
    pub domain: Option<String>,
    /// Isolate the PID namespace.
    pub enable_pid: bool,
    /// Isolate the System V IPC namespace.
    pub enable_ipc: bool,
    /// Container address on the bridge subnet; requests network isolation
    /// and veth plumbing.
    pub ip: Option<String>,
    /// Memory cap in bytes; zero means no cap.
    pub max_ram_bytes: u64,
    /// Diagnostic logging only; never changes launch semantics.
    pub verbose: bool,
}

impl LaunchRequest {
    /// Creates a request that runs `command` with no isolation.
    #[must_use]
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            ..Self::default()
        }
    }

    /// Checks the request before any process is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is empty, the executable path is
    /// not absolute, or the rootfs path is not absolute.
    pub fn validate(&self) -> Result<()> {
        let Some(program) = self.command.first() else {
            return Err(MiniboxError::Request {
                message: "command must not be empty".into(),
            });
        };
        if !Path::new(program).is_absolute() {
            return Err(MiniboxError::Request {
                message: format!("executable must be an absolute path: {program}"),
            });
        }
        if let Some(rootfs) = &self.rootfs {
            if !rootfs.is_absolute() {
                return Err(MiniboxError::Request {
                    message: format!("rootfs must be an absolute path: {}", rootfs.display()),
                });
            }
        }
        Ok(())
    }

    /// Whether the request asks for a private network stack.
    #[must_use]
    pub fn wants_network(&self) -> bool {
        self.ip.is_some()
    }

    /// Whether the request asks for a private hostname or domain name.
    #[must_use]
    pub fn wants_uts(&self) -> bool {
        self.hostname.is_some() || self.domain.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(command: &[&str]) -> LaunchRequest {
        LaunchRequest::new(command.iter().map(|s| (*s).to_owned()).collect())
    }

    #[test]
    fn empty_command_is_rejected() {
        let req = LaunchRequest::default();
        assert!(req.validate().is_err());
    }

    #[test]
    fn plain_command_is_accepted() {
        let req = request(&["/bin/true"]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn relative_executable_is_rejected() {
        let req = request(&["bin/true"]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn relative_rootfs_is_rejected() {
        let mut req = request(&["/bin/true"]);
        req.rootfs = Some(PathBuf::from("alpine"));
        assert!(req.validate().is_err());
    }

    #[test]
    fn absolute_rootfs_is_accepted() {
        let mut req = request(&["/bin/true"]);
        req.rootfs = Some(PathBuf::from("/var/lib/minibox/alpine"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn uts_requested_by_either_identity_field() {
        let mut req = request(&["/bin/true"]);
        assert!(!req.wants_uts());
        req.hostname = Some("demo".into());
        assert!(req.wants_uts());

        let mut req = request(&["/bin/true"]);
        req.domain = Some("d.local".into());
        assert!(req.wants_uts());
    }

    #[test]
    fn network_requested_by_ip_presence() {
        let mut req = request(&["/bin/true"]);
        assert!(!req.wants_network());
        req.ip = Some("10.0.0.2".into());
        assert!(req.wants_network());
    }
}
