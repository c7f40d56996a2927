//! Container-side network configuration.
//!
//! Runs after the start gate opens, once the agent has moved the veth
//! peer into this namespace as `eth0`.

use minibox_common::constants::{BRIDGE_IP, BRIDGE_PREFIX_LEN};
use minibox_common::error::Result;

use super::{run_plan, PlumbStep};

/// Builds the ordered container-side plumbing plan. Every step is fatal.
#[must_use]
pub fn plan(ip: &str) -> Vec<PlumbStep> {
    vec![
        PlumbStep::fatal("loopback up", "ip link set dev lo up".into()),
        PlumbStep::fatal(
            "address assign",
            format!("ip addr add {ip}/{BRIDGE_PREFIX_LEN} dev eth0"),
        ),
        PlumbStep::fatal("eth0 up", "ip link set dev eth0 up".into()),
        PlumbStep::fatal(
            "default route",
            format!("ip route add default via {BRIDGE_IP}"),
        ),
    ]
}

/// Brings up loopback and `eth0`, assigns the address, and installs the
/// default route via the bridge.
///
/// # Errors
///
/// Returns an error if any plumbing step fails.
pub fn configure(ip: &str) -> Result<()> {
    tracing::info!(ip, "configuring container network");
    run_plan(&plan(ip))
}
