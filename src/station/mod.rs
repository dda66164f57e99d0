//! Generic station runtime (SPEC_FULL.md §4.3): a handshake-driven engine
//! shared by all six stations, parameterized over a station-specific
//! [`StagePlanner`] that supplies the stage table and pass/fail outcome for
//! one cycle.

pub mod s1;
pub mod s2;
pub mod s3;
pub mod s4;
pub mod s5;
pub mod s6;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;

use crate::wire::CommandFrame;

/// One stage in a station's timed cycle. `downtime` distinguishes repair /
/// refill time from productive cycle time for the two universal
/// accumulators in §4.3.
#[derive(Debug, Clone, Copy)]
pub struct Stage {
    pub name: &'static str,
    pub duration_s: f64,
    pub downtime: bool,
}

impl Stage {
    #[must_use]
    pub fn work(name: &'static str, duration_s: f64) -> Self {
        Self {
            name,
            duration_s,
            downtime: false,
        }
    }

    #[must_use]
    pub fn downtime(name: &'static str, duration_s: f64) -> Self {
        Self {
            name,
            duration_s,
            downtime: true,
        }
    }
}

/// Builds one cycle's stage sequence and final pass/fail outcome,
/// station-specific. Stages are built eagerly at `start_edge` rather than
/// lazily stepped one at a time (§9 design notes): nothing downstream needs
/// to observe partial progress before the whole plan is known, and an
/// eager `Vec<Stage>` is simpler than a coroutine while preserving the
/// same "consume Δt across stages" tick behavior.
pub trait StagePlanner: Default {
    /// Extra per-station fields a tick needs beyond the common counters:
    /// KPI flags, running averages, accept/reject tallies, and so on.
    type Outcome: Default + Clone;

    fn plan(&mut self, rng: &mut StdRng) -> (Vec<Stage>, bool, Self::Outcome);
}

#[derive(Debug, Clone, Copy, Default)]
struct EdgeMemory {
    prev_cmd_start: bool,
    prev_cmd_stop: bool,
    prev_cmd_reset: bool,
}

impl EdgeMemory {
    fn edges(&mut self, cmd: &CommandFrame) -> (bool, bool, bool) {
        let start_edge = cmd.cmd_start && !self.prev_cmd_start;
        let stop_edge = cmd.cmd_stop && !self.prev_cmd_stop;
        let reset_edge = cmd.cmd_reset && !self.prev_cmd_reset;
        self.prev_cmd_start = cmd.cmd_start;
        self.prev_cmd_stop = cmd.cmd_stop;
        self.prev_cmd_reset = cmd.cmd_reset;
        (start_edge, stop_edge, reset_edge)
    }
}

pub struct StationEngine<P: StagePlanner> {
    pub planner: P,
    rng: StdRng,
    edges: EdgeMemory,
    stages: VecDeque<Stage>,
    stage_remaining_s: f64,
    current_stage_downtime: bool,
    cycle_elapsed_s: f64,
    passed: bool,
    enabled: bool,
    pub busy: bool,
    pub fault_latched: bool,
    pub done_pulse: bool,
    pub total: u32,
    pub completed: u32,
    pub last_cycle_ms: u32,
    pub operational_time_s: f64,
    pub downtime_s: f64,
    pub outcome: P::Outcome,
}

impl<P: StagePlanner> StationEngine<P> {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            planner: P::default(),
            rng: StdRng::seed_from_u64(seed),
            edges: EdgeMemory::default(),
            stages: VecDeque::new(),
            stage_remaining_s: 0.0,
            current_stage_downtime: false,
            cycle_elapsed_s: 0.0,
            passed: false,
            enabled: false,
            busy: false,
            fault_latched: false,
            done_pulse: false,
            total: 0,
            completed: 0,
            last_cycle_ms: 0,
            operational_time_s: 0.0,
            downtime_s: 0.0,
            outcome: P::Outcome::default(),
        }
    }

    #[must_use]
    pub fn ready(&self) -> bool {
        self.enabled && !self.busy && !self.fault_latched && !self.done_pulse
    }

    /// Advances the station by one scan tick given the freshly-decoded
    /// command frame. Mirrors SPEC_FULL.md §4.3 steps 1-6.
    pub fn tick(&mut self, cmd: &CommandFrame, dt_s: f64) {
        self.done_pulse = false;
        let (start_edge, stop_edge, reset_edge) = self.edges.edges(cmd);

        if reset_edge {
            self.fault_latched = false;
            self.enabled = false;
            self.busy = false;
            self.stages.clear();
            self.stage_remaining_s = 0.0;
            self.cycle_elapsed_s = 0.0;
        }

        if stop_edge && self.busy {
            self.enabled = false;
            self.busy = false;
            self.stages.clear();
            self.stage_remaining_s = 0.0;
            self.cycle_elapsed_s = 0.0;
        }

        if start_edge && !self.busy && !self.fault_latched {
            self.enabled = true;
            self.busy = true;
            self.total += 1;
            self.cycle_elapsed_s = 0.0;
            let (stages, passed, outcome) = self.planner.plan(&mut self.rng);
            self.stages = stages.into();
            self.passed = passed;
            self.outcome = outcome;
            self.stage_remaining_s = match self.stages.pop_front() {
                Some(s) => {
                    self.current_stage_downtime = s.downtime;
                    s.duration_s
                }
                None => 0.0,
            };
        }

        if self.busy && self.enabled && !self.fault_latched {
            self.advance_stages(dt_s);
        }
    }

    fn advance_stages(&mut self, mut remaining_dt: f64) {
        while remaining_dt > 0.0 && self.busy {
            if self.stage_remaining_s > remaining_dt {
                self.bill(remaining_dt);
                self.stage_remaining_s -= remaining_dt;
                remaining_dt = 0.0;
            } else {
                self.bill(self.stage_remaining_s);
                remaining_dt -= self.stage_remaining_s;
                match self.stages.pop_front() {
                    Some(next) => {
                        let downtime = next.downtime;
                        self.stage_remaining_s = next.duration_s;
                        self.current_stage_downtime = downtime;
                    }
                    None => {
                        self.finish_cycle();
                    }
                }
            }
        }
    }

    fn bill(&mut self, dt: f64) {
        self.cycle_elapsed_s += dt;
        if self.current_stage_downtime {
            self.downtime_s += dt;
        } else {
            self.operational_time_s += dt;
        }
    }

    fn finish_cycle(&mut self) {
        self.busy = false;
        self.enabled = false;
        if self.passed {
            self.completed += 1;
            self.last_cycle_ms = (self.cycle_elapsed_s * 1000.0).round() as u32;
            self.done_pulse = true;
        } else {
            self.fault_latched = true;
        }
    }
}
