//! # mbx — minibox CLI
//!
//! Minimal Linux container launcher. Runs a command in an isolated view
//! of the kernel namespaces under a resource-limited cgroup, optionally
//! with a private root filesystem and a bridged virtual network
//! interface.

#![allow(clippy::print_stderr)]

use std::path::PathBuf;
use std::process;

use clap::Parser;
use minibox_common::config::LaunchRequest;

/// Minibox — minimal Linux container launcher.
#[derive(Parser, Debug)]
#[command(name = "mbx", version, about, long_about = None)]
struct Cli {
    /// Root filesystem path of the container.
    #[arg(short, long)]
    rootfs: Option<PathBuf>,

    /// Isolate the PID namespace.
    #[arg(short, long)]
    pid: bool,

    /// Hostname of the container; implies UTS isolation.
    #[arg(long)]
    hostname: Option<String>,

    /// NIS domain name of the container; implies UTS isolation.
    #[arg(short, long)]
    domain: Option<String>,

    /// Isolate the System V IPC namespace.
    #[arg(short, long)]
    ipc: bool,

    /// IP of the container on the bridge subnet; implies network isolation.
    #[arg(long)]
    ip: Option<String>,

    /// The max amount of RAM (in bytes) that the container can use; 0 means no cap.
    #[arg(short = 'R', long, default_value_t = 0)]
    max_ram: u64,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Command to run in the container, tokenized on whitespace.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

impl Cli {
    /// Assembles the launch request. Positional arguments are joined and
    /// re-split on whitespace; there is no quoting.
    fn into_request(self) -> LaunchRequest {
        let command = self
            .command
            .join(" ")
            .split_whitespace()
            .map(str::to_owned)
            .collect();
        LaunchRequest {
            command,
            rootfs: self.rootfs,
            hostname: self.hostname,
            domain: self.domain,
            enable_pid: self.pid,
            enable_ipc: self.ipc,
            ip: self.ip,
            max_ram_bytes: self.max_ram,
            verbose: self.verbose,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let request = cli.into_request();
    Ok(minibox_runtime::launch::launch(&request)?)
}

fn main() {
    match run() {
        Ok(status) => process::exit(status),
        Err(err) => {
            eprintln!("{err:#}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn bare_command_builds_an_unisolated_request() {
        let cli = Cli::try_parse_from(["mbx", "/bin/true"]).expect("parse");
        let req = cli.into_request();
        assert_eq!(req.command, vec!["/bin/true"]);
        assert!(req.rootfs.is_none());
        assert!(!req.enable_pid);
        assert!(!req.enable_ipc);
        assert!(req.ip.is_none());
        assert_eq!(req.max_ram_bytes, 0);
    }

    #[test]
    fn options_map_onto_request_fields() {
        let cli = Cli::try_parse_from([
            "mbx",
            "--rootfs",
            "/var/lib/minibox/alpine",
            "--pid",
            "--hostname",
            "demo",
            "--domain",
            "d.local",
            "--ipc",
            "--ip",
            "10.0.0.2",
            "--max-ram",
            "104857600",
            "/bin/sleep",
            "1",
        ])
        .expect("parse");
        let req = cli.into_request();
        assert_eq!(req.rootfs.as_deref(), Some(std::path::Path::new("/var/lib/minibox/alpine")));
        assert!(req.enable_pid);
        assert_eq!(req.hostname.as_deref(), Some("demo"));
        assert_eq!(req.domain.as_deref(), Some("d.local"));
        assert!(req.enable_ipc);
        assert_eq!(req.ip.as_deref(), Some("10.0.0.2"));
        assert_eq!(req.max_ram_bytes, 104_857_600);
        assert_eq!(req.command, vec!["/bin/sleep", "1"]);
    }

    #[test]
    fn quoted_command_is_retokenized_on_whitespace() {
        let cli = Cli::try_parse_from(["mbx", "/bin/ls /"]).expect("parse");
        let req = cli.into_request();
        assert_eq!(req.command, vec!["/bin/ls", "/"]);
    }

    #[test]
    fn hyphenated_command_arguments_pass_through() {
        let cli = Cli::try_parse_from(["mbx", "--ip", "10.0.0.2", "/bin/ping", "-c1", "10.0.0.1"])
            .expect("parse");
        let req = cli.into_request();
        assert_eq!(req.command, vec!["/bin/ping", "-c1", "10.0.0.1"]);
    }

    #[test]
    fn missing_command_is_a_parse_error() {
        assert!(Cli::try_parse_from(["mbx", "--pid"]).is_err());
    }
}
