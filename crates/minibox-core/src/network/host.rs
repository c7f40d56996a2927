//! Host-side network preparation, run by the agent.
//!
//! Sequenced after the container exists (its PID names both the veth host
//! end and the target network namespace) and before the start gate opens,
//! so the container finds `eth0` already present when it configures
//! itself.

use minibox_common::constants::{BRIDGE_IP, BRIDGE_NAME, BRIDGE_PREFIX_LEN};
use minibox_common::error::Result;

use super::{run_plan, PlumbStep};

/// Name of the veth host endpoint for a container PID.
#[must_use]
pub fn veth_name(pid: u32) -> String {
    format!("veth{pid}")
}

/// Builds the ordered host-side plumbing plan for a container.
///
/// Bridge creation and addressing are tolerated failures so an already
/// provisioned host is reusable; everything else must succeed.
#[must_use]
pub fn plan(pid: u32) -> Vec<PlumbStep> {
    let veth = veth_name(pid);
    vec![
        PlumbStep::tolerated(
            "bridge create",
            format!("ip link add name {BRIDGE_NAME} type bridge"),
        ),
        PlumbStep::fatal("bridge up", format!("ip link set {BRIDGE_NAME} up")),
        PlumbStep::tolerated(
            "bridge address",
            format!("ip addr add {BRIDGE_IP}/{BRIDGE_PREFIX_LEN} brd + dev {BRIDGE_NAME}"),
        ),
        PlumbStep::fatal(
            "veth create",
            format!("ip link add {veth} type veth peer name eth0 netns {pid}"),
        ),
        PlumbStep::fatal("veth up", format!("ip link set {veth} up")),
        PlumbStep::fatal(
            "veth enslave",
            format!("ip link set {veth} master {BRIDGE_NAME}"),
        ),
        PlumbStep::fatal("ip forwarding", "sysctl -w net.ipv4.ip_forward=1".into()),
        PlumbStep::fatal(
            "nat masquerade",
            format!("iptables -t nat -A POSTROUTING -s {BRIDGE_IP}/{BRIDGE_PREFIX_LEN} -j MASQUERADE"),
        ),
    ]
}

/// Prepares bridge, veth pair, forwarding, and NAT for the container.
///
/// # Errors
///
/// Returns an error if any fatal plumbing step fails.
pub fn prepare(pid: u32) -> Result<()> {
    tracing::info!(pid, "preparing host network");
    run_plan(&plan(pid))
}

#[cfg(test)]
mod tests {
    use super::super::FailurePolicy;
    use super::*;

    #[test]
    fn veth_is_named_after_the_container_pid() {
        assert_eq!(veth_name(1234), "veth1234");
    }

    #[test]
    fn plan_moves_the_peer_into_the_container_netns() {
        let plan = plan(1234);
        let veth_create = plan
            .iter()
            .find(|s| s.op() == "veth create")
            .expect("veth create step");
        assert_eq!(
            veth_create.command(),
            "ip link add veth1234 type veth peer name eth0 netns 1234"
        );
        assert_eq!(veth_create.policy(), FailurePolicy::Fatal);
    }

    #[test]
    fn bridge_provisioning_is_tolerated_but_bring_up_is_not() {
        let plan = plan(1);
        let create = plan.iter().find(|s| s.op() == "bridge create").expect("create");
        let up = plan.iter().find(|s| s.op() == "bridge up").expect("up");
        let addr = plan.iter().find(|s| s.op() == "bridge address").expect("addr");
        assert_eq!(create.policy(), FailurePolicy::Tolerated);
        assert_eq!(addr.policy(), FailurePolicy::Tolerated);
        assert_eq!(up.policy(), FailurePolicy::Fatal);
    }

    #[test]
    fn plan_orders_bridge_before_veth_before_nat() {
        let plan = plan(77);
        let pos = |op: &str| plan.iter().position(|s| s.op() == op).expect("step present");
        assert!(pos("bridge up") < pos("veth create"));
        assert!(pos("veth create") < pos("veth enslave"));
        assert!(pos("veth enslave") < pos("nat masquerade"));
    }

    #[test]
    fn nat_masquerades_the_bridge_subnet() {
        let plan = plan(1);
        let nat = plan
            .iter()
            .find(|s| s.op() == "nat masquerade")
            .expect("nat step");
        assert_eq!(
            nat.command(),
            "iptables -t nat -A POSTROUTING -s 10.0.0.1/16 -j MASQUERADE"
        );
    }
}
