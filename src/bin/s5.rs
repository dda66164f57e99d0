use clap::Parser;
use log::{error, info, warn};
use std::net::ToSocketAddrs;
use std::time::Duration;

use lineplc::cli::NodeArgs;
use lineplc::clock::{register_signals, SimClock};
use lineplc::comm::tcp::StationLink;
use lineplc::config::LineConfig;
use lineplc::interval::ScanPacer;
use lineplc::station::s5::S5Planner;
use lineplc::station::StationEngine;
use lineplc::wire::{CommandFrame, S5Status, StatusPrefix};

const STATION_INDEX: u64 = 4;
const PORT: u16 = 6005;

fn main() {
    lineplc::init("s5");
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

    let mut engine = StationEngine::<S5Planner>::new(cfg.station_seed(STATION_INDEX));
    engine.planner.cfg = cfg.stations.s5.clone();
    let dt_s = args.step_ms as f64 / 1000.0;
    let mut last_cmd = CommandFrame::default();

    info!("S5 connected to {addr}");

    while !clock.stop_requested() {
        pacer.tick();

        match link.try_recv(CommandFrame::LEN) {
            Ok(Some(buf)) => {
                if let Some(cmd) = CommandFrame::decode(&buf) {
                    last_cmd = cmd;
                } else {
                    warn!("S5: malformed command frame");
                }
            }
            Ok(None) => {}
            Err(e) => warn!("S5: read error: {e}"),
        }

        engine.planner.recipe_id = last_cmd.recipe_id;
        engine.tick(&last_cmd, dt_s);

        let status = S5Status {
            prefix: StatusPrefix {
                ready: engine.ready(),
                busy: engine.busy,
                fault: engine.fault_latched,
                done: engine.done_pulse,
                cycle_time_ms: engine.last_cycle_ms,
            },
            accept: engine.outcome.accept,
            reject: engine.outcome.reject,
            last_accept: engine.outcome.last_accept,
        };
        info!(
            "+=S5+=\nVSI time: {} ns\nInputs: cmd_start={} cmd_stop={} cmd_reset={} recipe_id={}\nOutputs: ready={} busy={} fault={} done={} accept={} reject={}\n",
            clock.now_ns(),
            u8::from(last_cmd.cmd_start),
            u8::from(last_cmd.cmd_stop),
            u8::from(last_cmd.cmd_reset),
            last_cmd.recipe_id,
            u8::from(status.prefix.ready),
            u8::from(status.prefix.busy),
            u8::from(status.prefix.fault),
            u8::from(status.prefix.done),
            status.accept,
            status.reject,
        );
        if let Err(e) = link.send(&status.encode()) {
            warn!("S5: write error: {e}");
        }

        clock.advance(clock.step_ns());
    }

    clock.advance_drain();
    let sim_seconds = clock.now_ns() as f64 / 1e9;
    let total = engine.outcome.accept + engine.outcome.reject;
    let acceptance_rate = if total > 0 {
        f64::from(engine.outcome.accept) / f64::from(total)
    } else {
        0.0
    };
    if let Err(e) = lineplc::kpi::export(
        "S5",
        sim_seconds,
        serde_json::json!({
            "accept": engine.outcome.accept,
            "reject": engine.outcome.reject,
            "acceptance_rate": acceptance_rate,
        }),
        serde_json::to_value(&cfg.stations.s5).unwrap_or_default(),
    ) {
        warn!("S5: KPI export failed: {e}");
    }
    let _ = args.domain;
}
