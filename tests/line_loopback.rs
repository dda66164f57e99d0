//! End-to-end loopback test: a real `PlcStationLink`/`StationLink` TCP pair
//! driving `PlcCoordinator` against a `StationEngine<S1Planner>`, covering
//! one full reset-pulse -> run -> done cycle over the actual wire codec.

use std::thread;
use std::time::Duration;

use lineplc::comm::listener::PlcStationLink;
use lineplc::comm::tcp::StationLink;
use lineplc::plc::{AnyStatus, Mode, PlcCoordinator};
use lineplc::station::s1::S1Planner;
use lineplc::station::StationEngine;
use lineplc::wire::{CommandFrame, S1Status, StatusPrefix};

const PORT: u16 = 17001;
const DT_S: f64 = 1.0;

fn idle_status() -> AnyStatus {
    AnyStatus::Prefix(StatusPrefix::default())
}

#[test]
fn plc_and_station_complete_one_cycle_over_real_sockets() {
    let mut plc_link = PlcStationLink::bind(PORT).expect("bind");
    let mut station_link = StationLink::connect(
        format!("127.0.0.1:{PORT}").parse().unwrap(),
        Duration::from_secs(5),
    )
    .expect("connect");

    plc_link.poll_accept().expect("accept");

    let mut plc = PlcCoordinator::new();
    let mut engine = StationEngine::<S1Planner>::new(1);
    let mut last_cmd = CommandFrame::default();

    let mut saw_reset_pulse = false;
    let mut saw_start = false;
    let mut saw_done = false;

    for _ in 0..200 {
        // Station side: consume whatever command is waiting, tick, reply.
        if let Some(buf) = station_link.try_recv(CommandFrame::LEN).unwrap() {
            if let Some(cmd) = CommandFrame::decode(&buf) {
                last_cmd = cmd;
            }
        }
        if last_cmd.cmd_reset && last_cmd.cmd_stop {
            saw_reset_pulse = true;
        }
        if last_cmd.cmd_start {
            saw_start = true;
        }
        engine.tick(&last_cmd, DT_S);
        let status = S1Status {
            prefix: StatusPrefix {
                ready: engine.ready(),
                busy: engine.busy,
                fault: engine.fault_latched,
                done: engine.done_pulse,
                cycle_time_ms: engine.last_cycle_ms,
            },
            inventory_ok: engine.outcome.inventory_ok,
            any_arm_failed: engine.outcome.any_arm_failed,
        };
        if status.prefix.done {
            saw_done = true;
        }
        station_link.send(&status.encode()).unwrap();

        // PLC side: drain this station's socket, observe, tick, reply.
        plc_link.poll_accept().unwrap();
        if let Some(buf) = plc_link.try_recv(S1Status::LEN).unwrap() {
            if let Some(decoded) = S1Status::decode(&buf) {
                plc.observe(0, &AnyStatus::Prefix(decoded.prefix));
            }
        }
        for idx in 1..6 {
            plc.observe(idx, &idle_status());
        }
        let commands = plc.tick();
        plc_link.send(&commands[0].encode()).unwrap();

        if saw_done {
            break;
        }
        thread::sleep(Duration::from_millis(1));
    }

    assert!(saw_reset_pulse, "PLC never asserted the reset pulse");
    assert_eq!(plc.mode, Mode::Run, "PLC never left RESET_ALL");
    assert!(saw_start, "PLC never issued a start pulse to S1");
    assert!(saw_done, "S1 never completed a cycle end-to-end");
    assert_eq!(engine.completed, 1);
    assert_eq!(plc.buffer(0), 1, "S1's done edge should have minted one token for S2");
}
