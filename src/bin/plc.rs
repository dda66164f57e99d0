use clap::Parser;
use log::{error, info, warn};

use lineplc::cli::NodeArgs;
use lineplc::clock::{register_signals, SimClock};
use lineplc::comm::listener::PlcStationLink;
use lineplc::interval::ScanPacer;
use lineplc::plc::{AnyStatus, PlcCoordinator};
use lineplc::wire::{S1Status, S2Status, S3Status, S4Status, S5Status, S6Status};

const STATION_NAMES: [&str; 6] = ["S1", "S2", "S3", "S4", "S5", "S6"];
const PORTS: [u16; 6] = [6001, 6002, 6003, 6004, 6005, 6006];

fn status_len(idx: usize) -> usize {
    match idx {
        0 => S1Status::LEN,
        1 => S2Status::LEN,
        2 => S3Status::LEN,
        3 => S4Status::LEN,
        4 => S5Status::LEN,
        5 => S6Status::LEN,
        _ => unreachable!(),
    }
}

fn decode_status(idx: usize, buf: &[u8]) -> Option<AnyStatus> {
    match idx {
        0 => S1Status::decode(buf).map(|s| AnyStatus::Prefix(s.prefix)),
        1 => S2Status::decode(buf).map(|s| AnyStatus::Prefix(s.prefix)),
        2 => S3Status::decode(buf).map(|s| AnyStatus::Prefix(s.prefix)),
        3 => S4Status::decode(buf).map(|s| AnyStatus::Prefix(s.prefix)),
        4 => S5Status::decode(buf).map(AnyStatus::S5),
        5 => S6Status::decode(buf).map(|s| AnyStatus::Prefix(s.prefix)),
        _ => unreachable!(),
    }
}

fn main() {
    lineplc::init("plc");
    let args = NodeArgs::parse();
    register_signals();

    let mut links: Vec<PlcStationLink> = PORTS
        .iter()
        .map(|&port| {
            PlcStationLink::bind(port).unwrap_or_else(|e| {
                error!("fatal: {e}");
                std::process::exit(1);
            })
        })
        .collect();

    let clock = SimClock::new(args.step_ms * 1_000_000, args.duration_s * 1_000_000_000);
    clock.wait_for_reset();
    let mut pacer = ScanPacer::new(std::time::Duration::from_millis(args.step_ms));
    let mut plc = PlcCoordinator::new();

    info!("plc coordinator listening on ports 6001-6006");

    while !clock.stop_requested() {
        pacer.tick();

        for (idx, link) in links.iter_mut().enumerate() {
            if let Err(e) = link.poll_accept() {
                warn!("{}: accept error: {e}", STATION_NAMES[idx]);
                continue;
            }
            match link.try_recv(status_len(idx)) {
                Ok(Some(buf)) => {
                    if let Some(status) = decode_status(idx, &buf) {
                        plc.observe(idx, &status);
                    } else {
                        warn!("{}: malformed status frame", STATION_NAMES[idx]);
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("{}: read error: {e}", STATION_NAMES[idx]),
            }
        }

        let commands = plc.tick();

        for (idx, link) in links.iter_mut().enumerate() {
            let cmd = commands[idx];
            info!(
                "+={}+=\nVSI time: {} ns\nOutputs: start={} stop={} reset={} batch_id={} recipe_id={}\n",
                STATION_NAMES[idx],
                clock.now_ns(),
                u8::from(cmd.cmd_start),
                u8::from(cmd.cmd_stop),
                u8::from(cmd.cmd_reset),
                cmd.batch_id,
                cmd.recipe_id,
            );
            if let Err(e) = link.send(&cmd.encode()) {
                warn!("{}: write error: {e}", STATION_NAMES[idx]);
            }
        }

        clock.advance(clock.step_ns());
    }

    clock.advance_drain();
    info!("plc coordinator shutting down at mode={:?}, batch_id={}", plc.mode, plc.batch_id);
    let _ = args.server_url;
    let _ = args.domain;
}
