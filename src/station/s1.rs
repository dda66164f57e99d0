//! S1 kitting (SPEC_FULL.md §4.3 table). No original-source file exists for
//! this station (only the PLC coordinator and ST4/ST5 stage models were
//! present in the distillation's source tree); the stage table and outcome
//! policy below are built directly from the spec's table.

use rand::Rng;

use super::{Stage, StagePlanner};
use crate::config::S1Config;

#[derive(Default)]
pub struct S1Planner {
    pub cfg: S1Config,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct S1Outcome {
    pub inventory_ok: bool,
    pub any_arm_failed: bool,
}

impl StagePlanner for S1Planner {
    type Outcome = S1Outcome;

    fn plan(&mut self, rng: &mut rand::rngs::StdRng) -> (Vec<Stage>, bool, Self::Outcome) {
        let stages = vec![
            Stage::work("pick", 1.0),
            Stage::work("place", 1.5),
            Stage::work("verify", 0.5),
        ];
        let any_arm_failed = rng.gen::<f64>() < self.cfg.p_arm_fail;
        let passed = !any_arm_failed;
        (
            stages,
            passed,
            S1Outcome {
                inventory_ok: passed,
                any_arm_failed,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn low_fail_prob_mostly_passes() {
        let mut planner = S1Planner {
            cfg: S1Config { p_arm_fail: 0.0 },
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let (stages, passed, outcome) = planner.plan(&mut rng);
        assert_eq!(stages.len(), 3);
        assert!(passed);
        assert!(!outcome.any_arm_failed);
    }

    #[test]
    fn certain_fail_prob_always_fails() {
        let mut planner = S1Planner {
            cfg: S1Config { p_arm_fail: 1.0 },
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let (_, passed, outcome) = planner.plan(&mut rng);
        assert!(!passed);
        assert!(outcome.any_arm_failed);
    }
}
