//! # minibox-runtime
//!
//! The launch protocol: creating the container with its namespace flags
//! in one atomic clone, the agent/container start gate, host-side
//! preparation ordering, reaping, and cgroup cleanup.

pub mod process;
pub mod sync;

#[cfg(target_os = "linux")]
pub mod launch;

/// Stub for non-Linux platforms.
#[cfg(not(target_os = "linux"))]
pub mod launch {
    use minibox_common::config::LaunchRequest;
    use minibox_common::error::{MiniboxError, Result};

    /// Stub for non-Linux platforms.
    ///
    /// # Errors
    ///
    /// Always returns an error; container launch requires Linux.
    pub fn launch(_request: &LaunchRequest) -> Result<i32> {
        Err(MiniboxError::Request {
            message: "Linux required for container launch".into(),
        })
    }
}
