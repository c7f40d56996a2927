//! One-shot start gate between agent and container.
//!
//! A kernel pipe carries a single byte from the agent to the container:
//! a non-zero byte releases the container, zero reports agent-side
//! failure. The write end closing without a byte (agent died) reads as
//! failure too. Pipe semantics order the agent's preparation ahead of the
//! container's release: every host-side effect written before the byte is
//! visible once the read returns.

use std::os::fd::AsRawFd;
use std::os::fd::OwnedFd;

use minibox_common::error::{MiniboxError, Result};
use nix::errno::Errno;
use nix::unistd;

const RELEASE: u8 = 1;
const ABORT: u8 = 0;

/// Both ends of the gate, created before the container exists.
///
/// After the clone each process holds a copy; each side splits the gate
/// and drops the half it does not own, closing the corresponding
/// descriptor promptly so the container's blocking read cannot deadlock.
#[derive(Debug)]
pub struct StartGate {
    read: OwnedFd,
    write: OwnedFd,
}

/// The agent's half: write the verdict.
#[derive(Debug)]
pub struct AgentSide {
    write: OwnedFd,
}

/// The container's half: block until the verdict arrives.
#[derive(Debug)]
pub struct ContainerSide {
    read: OwnedFd,
}

impl StartGate {
    /// Opens the underlying pipe.
    ///
    /// # Errors
    ///
    /// Returns an error if `pipe(2)` fails.
    pub fn new() -> Result<Self> {
        let (read, write) = unistd::pipe().map_err(|e| MiniboxError::Syscall {
            op: "pipe",
            source: e.into(),
        })?;
        Ok(Self { read, write })
    }

    /// Splits the gate into its two halves. Drop the half that belongs to
    /// the other process.
    #[must_use]
    pub fn split(self) -> (AgentSide, ContainerSide) {
        (
            AgentSide { write: self.write },
            ContainerSide { read: self.read },
        )
    }
}

impl AgentSide {
    /// Writes the verdict byte and closes the channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn release(self, success: bool) -> Result<()> {
        let byte = [if success { RELEASE } else { ABORT }];
        unistd::write(&self.write, &byte).map_err(|e| MiniboxError::Syscall {
            op: "write(start gate)",
            source: e.into(),
        })?;
        Ok(())
    }
}

impl ContainerSide {
    /// Blocks until the agent's verdict arrives, retrying on `EINTR`.
    ///
    /// # Errors
    ///
    /// Returns an error if the agent reported failure, the channel closed
    /// without a verdict, or the read itself failed.
    pub fn wait(self) -> Result<()> {
        let mut byte = [0u8; 1];
        loop {
            match unistd::read(self.read.as_raw_fd(), &mut byte) {
                Ok(1) if byte[0] != ABORT => return Ok(()),
                Ok(_) => {
                    return Err(MiniboxError::Aborted {
                        reason: "agent preparation failed",
                    })
                }
                Err(Errno::EINTR) => {}
                Err(e) => {
                    return Err(MiniboxError::Syscall {
                        op: "read(start gate)",
                        source: e.into(),
                    })
                }
            }
        }
    }
}
