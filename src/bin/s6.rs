use clap::Parser;
use log::{error, info, warn};
use std::net::ToSocketAddrs;
use std::time::Duration;

use lineplc::cli::NodeArgs;
use lineplc::clock::{register_signals, SimClock};
use lineplc::comm::tcp::StationLink;
use lineplc::config::LineConfig;
use lineplc::interval::ScanPacer;
use lineplc::station::s6::S6Planner;
use lineplc::station::StationEngine;
use lineplc::wire::{CommandFrame, S6Status, StatusPrefix};

const STATION_INDEX: u64 = 5;
const PORT: u16 = 6006;

fn main() {
    lineplc::init("s6");
    let args = NodeArgs::parse();
    register_signals();

    let cfg = LineConfig::load("line_config.json").unwrap_or_else(|e| {
        error!("fatal: {e}");
        std::process::exit(1);
    });

    let addr = (args.server_url.as_str(), PORT)
        .to_socket_addrs()
        .unwrap_or_else(|e| {
            error!("fatal: cannot resolve {}:{PORT}: {e}", args.server_url);
            std::process::exit(1);
        })
        .next()
        .unwrap_or_else(|| {
            error!("fatal: no address for {}:{PORT}", args.server_url);
            std::process::exit(1);
        });

    let mut link = StationLink::connect(addr, Duration::from_secs(5)).unwrap_or_else(|e| {
        error!("fatal: {e}");
        std::process::exit(1);
    });

    let clock = SimClock::new(args.step_ms * 1_000_000, args.duration_s * 1_000_000_000);
    clock.wait_for_reset();
    let mut pacer = ScanPacer::new(Duration::from_millis(args.step_ms));

    let mut engine = StationEngine::<S6Planner>::new(cfg.station_seed(STATION_INDEX));
    engine.planner.cfg = cfg.stations.s6.clone();
    let dt_s = args.step_ms as f64 / 1000.0;
    let mut last_cmd = CommandFrame::default();

    info!("S6 connected to {addr}");

    while !clock.stop_requested() {
        pacer.tick();

        match link.try_recv(CommandFrame::LEN) {
            Ok(Some(buf)) => {
                if let Some(cmd) = CommandFrame::decode(&buf) {
                    last_cmd = cmd;
                } else {
                    warn!("S6: malformed command frame");
                }
            }
            Ok(None) => {}
            Err(e) => warn!("S6: read error: {e}"),
        }

        engine.tick(&last_cmd, dt_s);

        let denom = engine.operational_time_s + engine.downtime_s;
        let availability = if denom > 0.0 {
            engine.operational_time_s / denom
        } else {
            1.0
        };

        let status = S6Status {
            prefix: StatusPrefix {
                ready: engine.ready(),
                busy: engine.busy,
                fault: engine.fault_latched,
                done: engine.done_pulse,
                cycle_time_ms: engine.last_cycle_ms,
            },
            packages_completed: engine.completed,
            arm_cycles: engine.outcome.arm_cycles,
            total_repairs: engine.outcome.total_repairs,
            operational_time_s: engine.operational_time_s,
            downtime_s: engine.downtime_s,
            availability,
        };
        info!(
            "+=S6+=\nVSI time: {} ns\nInputs: cmd_start={} cmd_stop={} cmd_reset={} batch_id={}\nOutputs: ready={} busy={} fault={} done={} packages_completed={} availability={:.3}\n",
            clock.now_ns(),
            u8::from(last_cmd.cmd_start),
            u8::from(last_cmd.cmd_stop),
            u8::from(last_cmd.cmd_reset),
            last_cmd.batch_id,
            u8::from(status.prefix.ready),
            u8::from(status.prefix.busy),
            u8::from(status.prefix.fault),
            u8::from(status.prefix.done),
            status.packages_completed,
            status.availability,
        );
        if let Err(e) = link.send(&status.encode()) {
            warn!("S6: write error: {e}");
        }

        clock.advance(clock.step_ns());
    }

    clock.advance_drain();
    let sim_seconds = clock.now_ns() as f64 / 1e9;
    let throughput_per_hour = if sim_seconds > 0.0 {
        f64::from(engine.completed) / sim_seconds * 3600.0
    } else {
        0.0
    };
    let utilization_pct = if sim_seconds > 0.0 {
        (engine.operational_time_s + engine.downtime_s) / sim_seconds * 100.0
    } else {
        0.0
    };
    let denom = engine.operational_time_s + engine.downtime_s;
    let availability = if denom > 0.0 {
        engine.operational_time_s / denom
    } else {
        1.0
    };
    if let Err(e) = lineplc::kpi::export(
        "S6",
        sim_seconds,
        serde_json::json!({
            "packages_completed": engine.completed,
            "throughput_per_hour": throughput_per_hour,
            "utilization_pct": utilization_pct,
            "availability": availability,
            "total_repairs": engine.outcome.total_repairs,
            "catastrophic_failures": engine.outcome.catastrophic_failures,
            "downtime_s": engine.downtime_s,
        }),
        serde_json::to_value(&cfg.stations.s6).unwrap_or_default(),
    ) {
        warn!("S6: KPI export failed: {e}");
    }
    let _ = args.domain;
}
