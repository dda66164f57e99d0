//! S6 packaging/dispatch (SPEC_FULL.md §4.3 table), grounded in
//! `ST6_PackagingDispatch.py`'s per-step micro-fault/repair pattern and
//! catastrophic-failure-with-MTTR policy.

use rand::Rng;

use super::{Stage, StagePlanner};
use crate::config::S6Config;

const STEPS: [(&str, f64); 6] = [
    ("carton_erect", 1.0),
    ("pick_place", 1.5),
    ("fold", 1.0),
    ("seal", 1.0),
    ("label", 0.5),
    ("outfeed", 1.0),
];
const P_MICROFAULT: f64 = 0.05;
const REPAIR_MIN_S: f64 = 4.0;
const REPAIR_MAX_S: f64 = 6.0;

#[derive(Default)]
pub struct S6Planner {
    pub cfg: S6Config,
    arm_cycles: u32,
    total_repairs: u32,
    catastrophic_failures: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct S6Outcome {
    pub arm_cycles: u32,
    pub total_repairs: u32,
    pub catastrophic_failures: u32,
}

impl StagePlanner for S6Planner {
    type Outcome = S6Outcome;

    fn plan(&mut self, rng: &mut rand::rngs::StdRng) -> (Vec<Stage>, bool, Self::Outcome) {
        let mut stages = Vec::with_capacity(STEPS.len() + 2);
        for (name, base_s) in STEPS {
            stages.push(Stage::work(name, base_s * self.cfg.cycle_time_s));
            self.arm_cycles += 1;
            if rng.gen::<f64>() < P_MICROFAULT {
                let repair_s = rng.gen_range(REPAIR_MIN_S..=REPAIR_MAX_S);
                stages.push(Stage::downtime("repair", repair_s));
                self.total_repairs += 1;
            }
        }

        let catastrophic = rng.gen::<f64>() < self.cfg.failure_rate;
        let passed = !catastrophic;
        if catastrophic {
            stages.push(Stage::downtime("mttr", self.cfg.mttr_s));
            self.catastrophic_failures += 1;
        }

        (
            stages,
            passed,
            S6Outcome {
                arm_cycles: self.arm_cycles,
                total_repairs: self.total_repairs,
                catastrophic_failures: self.catastrophic_failures,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn zero_fault_rates_mean_six_work_stages_and_pass() {
        let mut planner = S6Planner {
            cfg: S6Config {
                cycle_time_s: 1.0,
                failure_rate: 0.0,
                mttr_s: 30.0,
                buffer_capacity: 0,
            },
            ..Default::default()
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(6);
        // P_MICROFAULT is nonzero but fixed; seed 6 happens to avoid it for
        // this assertion's purpose of checking the baseline six steps exist.
        let (stages, passed, outcome) = planner.plan(&mut rng);
        assert!(passed);
        assert!(stages.len() >= STEPS.len());
        assert_eq!(outcome.arm_cycles, 6);
    }

    #[test]
    fn certain_catastrophic_failure_appends_mttr_downtime() {
        let mut planner = S6Planner {
            cfg: S6Config {
                cycle_time_s: 1.0,
                failure_rate: 1.0,
                mttr_s: 30.0,
                buffer_capacity: 0,
            },
            ..Default::default()
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(6);
        let (stages, passed, outcome) = planner.plan(&mut rng);
        assert!(!passed);
        let mttr_stage = stages.iter().find(|s| s.name == "mttr").unwrap();
        assert!((mttr_stage.duration_s - 30.0).abs() < f64::EPSILON);
        assert!(mttr_stage.downtime);
        assert_eq!(outcome.catastrophic_failures, 1);
    }
}
