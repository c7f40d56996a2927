//! System-wide constants and default paths.

/// Name of the host bridge device containers attach to.
pub const BRIDGE_NAME: &str = "br0";

/// Address bound to the host bridge; also the containers' default gateway.
pub const BRIDGE_IP: &str = "10.0.0.1";

/// Prefix length of the bridge subnet. Container addresses must lie inside it.
pub const BRIDGE_PREFIX_LEN: &str = "16";

/// Root of the unified cgroup hierarchy dedicated to minibox containers.
///
/// The directory must already exist with all required controllers enabled;
/// minibox never creates it.
pub const CGROUP_ROOT: &str = "/sys/fs/cgroup/minibox";

/// Application name used in CLI output.
pub const APP_NAME: &str = "minibox";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "mbx";
