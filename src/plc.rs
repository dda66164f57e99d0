//! PLC supervisory coordinator (SPEC_FULL.md §4.4), grounded directly on
//! `PLC_LineCoordinator.py`'s `mainThread()`: the RESET_ALL / RUN /
//! FAULT_RESET mode machine, token-flow scheduler between station pairs,
//! and batch-id accounting on S6 done edges.

use log::{debug, info};

use crate::wire::{CommandFrame, S5Status, StatusPrefix};

pub const RESET_PULSE_TICKS: u32 = 3;
pub const STATION_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ResetAll,
    Run,
    FaultReset,
}

#[derive(Debug, Clone, Copy, Default)]
struct StationSnapshot {
    ready: bool,
    busy: bool,
    fault: bool,
    done: bool,
    last_accept: bool,
}

/// Any station's StatusFrame, reduced to what the PLC's token scheduler
/// needs: the common prefix plus S5's `last_accept` bit, which gates
/// S5->S6 token production (§4.4 step 5, §9 open question 2).
pub enum AnyStatus {
    Prefix(StatusPrefix),
    S5(S5Status),
}

impl AnyStatus {
    fn prefix(&self) -> StatusPrefix {
        match self {
            AnyStatus::Prefix(p) => *p,
            AnyStatus::S5(s) => s.prefix,
        }
    }

    fn last_accept(&self) -> bool {
        matches!(self, AnyStatus::S5(s) if s.last_accept)
    }
}

pub struct PlcCoordinator {
    pub mode: Mode,
    reset_ticks: u32,
    pub batch_id: u32,
    pub recipe_id: u16,
    /// Token counts for S1->S2, S2->S3, S3->S4, S4->S5, S5->S6, in that order.
    buffers: [u32; STATION_COUNT - 1],
    prev_busy: [bool; STATION_COUNT],
    prev_done: [bool; STATION_COUNT],
    pending_start: [bool; STATION_COUNT],
    inputs: [StationSnapshot; STATION_COUNT],
}

impl Default for PlcCoordinator {
    fn default() -> Self {
        Self {
            mode: Mode::ResetAll,
            reset_ticks: 0,
            batch_id: 0,
            recipe_id: 0,
            buffers: [0; STATION_COUNT - 1],
            prev_busy: [false; STATION_COUNT],
            prev_done: [false; STATION_COUNT],
            pending_start: [false; STATION_COUNT],
            inputs: [StationSnapshot::default(); STATION_COUNT],
        }
    }
}

impl PlcCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn buffer(&self, upstream_index: usize) -> u32 {
        self.buffers[upstream_index]
    }

    /// Folds in a freshly-decoded status frame for station `idx` (0-based,
    /// S1=0..S6=5). Stations whose socket had nothing pending this tick
    /// simply don't call this; their snapshot carries over unchanged, per
    /// the inter-node ordering guarantee in §5 (no in-tick round-trip
    /// assumed).
    pub fn observe(&mut self, idx: usize, status: &AnyStatus) {
        let prefix = status.prefix();
        self.inputs[idx] = StationSnapshot {
            ready: prefix.ready,
            busy: prefix.busy,
            fault: prefix.fault,
            done: prefix.done,
            last_accept: status.last_accept(),
        };
    }

    /// Advances the coordinator by one scan tick and returns the command
    /// frame to send to each station (index 0..6 = S1..S6).
    pub fn tick(&mut self) -> [CommandFrame; STATION_COUNT] {
        let done_edges: [bool; STATION_COUNT] =
            std::array::from_fn(|i| self.inputs[i].done && !self.prev_done[i]);
        let busy_edges: [bool; STATION_COUNT] =
            std::array::from_fn(|i| self.inputs[i].busy && !self.prev_busy[i]);

        if self.inputs.iter().any(|s| s.fault) && self.mode != Mode::FaultReset {
            info!("fault detected, entering FAULT_RESET");
            self.mode = Mode::FaultReset;
            self.reset_ticks = 0;
        }

        let commands = match self.mode {
            Mode::ResetAll | Mode::FaultReset => self.tick_reset(),
            Mode::Run => self.tick_run(&done_edges, &busy_edges),
        };

        self.prev_busy = std::array::from_fn(|i| self.inputs[i].busy);
        self.prev_done = std::array::from_fn(|i| self.inputs[i].done);

        commands
    }

    fn tick_reset(&mut self) -> [CommandFrame; STATION_COUNT] {
        self.buffers = [0; STATION_COUNT - 1];
        self.pending_start = [false; STATION_COUNT];
        self.prev_busy = [false; STATION_COUNT];
        let commands = std::array::from_fn(|_| self.command(false, true, true));
        self.reset_ticks += 1;
        if self.reset_ticks >= RESET_PULSE_TICKS {
            info!("reset pulse complete ({} ticks), entering RUN", self.reset_ticks);
            self.mode = Mode::Run;
        }
        commands
    }

    fn tick_run(
        &mut self,
        done_edges: &[bool; STATION_COUNT],
        busy_edges: &[bool; STATION_COUNT],
    ) -> [CommandFrame; STATION_COUNT] {
        // Token production.
        for i in 0..STATION_COUNT - 1 {
            if !done_edges[i] {
                continue;
            }
            if i == 4 {
                if self.inputs[4].last_accept {
                    self.buffers[4] += 1;
                }
            } else {
                self.buffers[i] += 1;
            }
        }

        // Start eligibility.
        let mut start_req = [false; STATION_COUNT];
        for i in 0..STATION_COUNT {
            let idle_ok = !self.inputs[i].busy && !self.inputs[i].fault;
            let can_start = self.inputs[i].ready || idle_ok;
            let upstream_ok = i == 0 || self.buffers[i - 1] > 0;
            start_req[i] = idle_ok && upstream_ok && !self.pending_start[i] && can_start;
            if start_req[i] {
                self.pending_start[i] = true;
            }
        }

        // Token consumption, fixed station order for deterministic replay.
        for i in 0..STATION_COUNT {
            if busy_edges[i] && self.pending_start[i] {
                if i > 0 {
                    self.buffers[i - 1] = self.buffers[i - 1].saturating_sub(1);
                }
                self.pending_start[i] = false;
            }
        }

        if done_edges[5] {
            self.batch_id += 1;
            debug!("batch_id -> {}", self.batch_id);
        }

        std::array::from_fn(|i| self.command(start_req[i], false, false))
    }

    fn command(&self, start: bool, stop: bool, reset: bool) -> CommandFrame {
        CommandFrame {
            cmd_start: start,
            cmd_stop: stop,
            cmd_reset: reset,
            batch_id: self.batch_id,
            recipe_id: self.recipe_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::StatusPrefix;

    fn idle(ready: bool) -> AnyStatus {
        AnyStatus::Prefix(StatusPrefix {
            ready,
            busy: false,
            fault: false,
            done: false,
            cycle_time_ms: 0,
        })
    }

    fn run_to_run(plc: &mut PlcCoordinator) {
        for _ in 0..RESET_PULSE_TICKS {
            let cmds = plc.tick();
            assert!(cmds.iter().all(|c| !c.cmd_start && c.cmd_stop && c.cmd_reset));
        }
    }

    #[test]
    fn reset_pulse_releases_after_fixed_ticks() {
        let mut plc = PlcCoordinator::new();
        for i in 0..STATION_COUNT {
            plc.observe(i, &idle(false));
        }
        run_to_run(&mut plc);
        assert_eq!(plc.mode, Mode::Run);
    }

    #[test]
    fn s1_starts_without_upstream_token() {
        let mut plc = PlcCoordinator::new();
        for i in 0..STATION_COUNT {
            plc.observe(i, &idle(false));
        }
        run_to_run(&mut plc);
        let cmds = plc.tick();
        assert!(cmds[0].cmd_start);
        assert!(!cmds[1].cmd_start);
    }

    #[test]
    fn s2_does_not_start_until_s1_done_edge_produces_a_token() {
        let mut plc = PlcCoordinator::new();
        for i in 0..STATION_COUNT {
            plc.observe(i, &idle(false));
        }
        run_to_run(&mut plc);
        plc.tick();
        assert_eq!(plc.buffer(0), 0);

        plc.observe(
            0,
            &AnyStatus::Prefix(StatusPrefix {
                ready: false,
                busy: false,
                fault: false,
                done: true,
                cycle_time_ms: 3000,
            }),
        );
        plc.tick();
        assert_eq!(plc.buffer(0), 1);

        plc.observe(
            1,
            &AnyStatus::Prefix(StatusPrefix {
                ready: false,
                busy: true,
                fault: false,
                done: false,
                cycle_time_ms: 0,
            }),
        );
        plc.tick();
        assert_eq!(plc.buffer(0), 0);
    }

    #[test]
    fn s5_reject_withholds_token_from_s6() {
        let mut plc = PlcCoordinator::new();
        for i in 0..STATION_COUNT {
            plc.observe(i, &idle(false));
        }
        run_to_run(&mut plc);
        plc.observe(
            4,
            &AnyStatus::S5(S5Status {
                prefix: StatusPrefix {
                    ready: false,
                    busy: false,
                    fault: false,
                    done: true,
                    cycle_time_ms: 1500,
                },
                accept: 0,
                reject: 1,
                last_accept: false,
            }),
        );
        plc.tick();
        assert_eq!(plc.buffer(4), 0);
    }

    #[test]
    fn fault_drives_mode_to_fault_reset() {
        let mut plc = PlcCoordinator::new();
        for i in 0..STATION_COUNT {
            plc.observe(i, &idle(false));
        }
        run_to_run(&mut plc);
        plc.observe(
            2,
            &AnyStatus::Prefix(StatusPrefix {
                ready: false,
                busy: false,
                fault: true,
                done: false,
                cycle_time_ms: 0,
            }),
        );
        plc.tick();
        assert_eq!(plc.mode, Mode::FaultReset);
    }
}
