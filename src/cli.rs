//! CLI surface shared by every node (SPEC_FULL.md §6): `--server-url` and
//! `--domain` are mandated by the spec; `--step-ms`/`--duration-s` are this
//! core's own addition since nothing in the wire protocol or config
//! schema otherwise carries the scan rate or run length (see DESIGN.md).

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Domain {
    #[value(name = "AF_UNIX")]
    AfUnix,
    #[value(name = "AF_INET")]
    AfInet,
}

#[derive(Debug, Parser)]
pub struct NodeArgs {
    /// Host the PLC listens on / a station connects to.
    #[arg(long, default_value = "localhost")]
    pub server_url: String,

    /// Carried for interface parity with the reference crate's CLI; this
    /// core always communicates over TCP (AF_INET) regardless of this
    /// flag's value, since there is no local-socket transport here.
    #[arg(long, value_enum, default_value_t = Domain::AfUnix)]
    pub domain: Domain,

    /// Scan tick period, real wall-clock milliseconds.
    #[arg(long, default_value_t = 100)]
    pub step_ms: u64,

    /// Total run length in simulated seconds before a clean shutdown.
    #[arg(long, default_value_t = 3600)]
    pub duration_s: u64,
}
