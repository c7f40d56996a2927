//! UTS identity inside the container.
//!
//! Applies the requested hostname and NIS domain name after the container
//! has entered its own UTS namespace, so the host values stay untouched.

use minibox_common::error::{MiniboxError, Result};
use nix::errno::Errno;

/// Upper bound on a NIS domain name, including the terminating NUL.
const NIS_DOMAIN_NAME_MAX: usize = 64;

/// Applies the requested hostname and domain name, skipping absent fields.
///
/// # Errors
///
/// Returns an error if `sethostname(2)` or `setdomainname(2)` fails.
pub fn apply_identity(hostname: Option<&str>, domain: Option<&str>) -> Result<()> {
    if let Some(hostname) = hostname {
        set_hostname(hostname)?;
    }
    if let Some(domain) = domain {
        set_domain_name(domain)?;
    }
    Ok(())
}

/// Sets the hostname of the current UTS namespace.
///
/// # Errors
///
/// Returns an error if `sethostname(2)` fails.
pub fn set_hostname(name: &str) -> Result<()> {
    nix::unistd::sethostname(name).map_err(|e| MiniboxError::Syscall {
        op: "sethostname",
        source: e.into(),
    })?;
    tracing::debug!(name, "hostname set");
    Ok(())
}

/// Sets the NIS domain name of the current UTS namespace.
///
/// # Errors
///
/// Returns an error if `setdomainname(2)` fails.
pub fn set_domain_name(name: &str) -> Result<()> {
    // SAFETY: the pointer and length describe the bytes of `name`, which
    // outlives the call; setdomainname is length-delimited and does not
    // require a trailing NUL.
    let res = unsafe { libc::setdomainname(name.as_ptr().cast(), name.len()) };
    Errno::result(res).map_err(|e| MiniboxError::Syscall {
        op: "setdomainname",
        source: e.into(),
    })?;
    tracing::debug!(name, "NIS domain name set");
    Ok(())
}

/// Reads the hostname of the current UTS namespace.
///
/// # Errors
///
/// Returns an error if `gethostname(2)` fails.
pub fn hostname() -> Result<String> {
    let name = nix::unistd::gethostname().map_err(|e| MiniboxError::Syscall {
        op: "gethostname",
        source: e.into(),
    })?;
    Ok(name.to_string_lossy().into_owned())
}

/// Reads the NIS domain name of the current UTS namespace.
///
/// # Errors
///
/// Returns an error if `getdomainname(2)` fails.
pub fn domain_name() -> Result<String> {
    let mut buf = [0u8; NIS_DOMAIN_NAME_MAX];
    // SAFETY: the pointer and length describe `buf`, which outlives the
    // call; the kernel NUL-terminates the result when it fits.
    let res = unsafe { libc::getdomainname(buf.as_mut_ptr().cast(), buf.len()) };
    Errno::result(res).map_err(|e| MiniboxError::Syscall {
        op: "getdomainname",
        source: e.into(),
    })?;
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Ok(String::from_utf8_lossy(&buf[..len]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_identity_is_readable() {
        // Read-only round trip against the host namespace; setting values
        // requires privilege and a private UTS namespace.
        let name = hostname().expect("gethostname");
        assert!(!name.is_empty());
        let _ = domain_name().expect("getdomainname");
    }

    #[test]
    fn apply_identity_with_no_fields_is_a_no_op() {
        assert!(apply_identity(None, None).is_ok());
    }
}
