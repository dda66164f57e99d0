//! S3 wiring (SPEC_FULL.md §4.3 table). No original-source file survived
//! distillation for this station; built directly from the spec table.

use rand::Rng;

use super::{Stage, StagePlanner};
use crate::config::S3Config;

#[derive(Default)]
pub struct S3Planner {
    pub cfg: S3Config,
    wiring_fails: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct S3Outcome {
    pub strain_relief_ok: bool,
    pub continuity_ok: bool,
    pub wiring_fails: u32,
}

impl StagePlanner for S3Planner {
    type Outcome = S3Outcome;

    fn plan(&mut self, rng: &mut rand::rngs::StdRng) -> (Vec<Stage>, bool, Self::Outcome) {
        let stages = vec![
            Stage::work("route", 2.0),
            Stage::work("crimp", 1.5),
            Stage::work("test", 1.0),
        ];
        let strain_relief_ok = rng.gen::<f64>() >= self.cfg.p_wiring_fail;
        let continuity_ok = rng.gen::<f64>() >= self.cfg.p_wiring_fail;
        let passed = strain_relief_ok && continuity_ok;
        if !passed {
            self.wiring_fails += 1;
        }
        (
            stages,
            passed,
            S3Outcome {
                strain_relief_ok,
                continuity_ok,
                wiring_fails: self.wiring_fails,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn zero_fail_prob_always_passes() {
        let mut planner = S3Planner {
            cfg: S3Config { p_wiring_fail: 0.0 },
            ..Default::default()
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let (_, passed, outcome) = planner.plan(&mut rng);
        assert!(passed);
        assert!(outcome.strain_relief_ok && outcome.continuity_ok);
    }

    #[test]
    fn certain_fail_prob_never_passes() {
        let mut planner = S3Planner {
            cfg: S3Config { p_wiring_fail: 1.0 },
            ..Default::default()
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let (_, passed, outcome) = planner.plan(&mut rng);
        assert!(!passed);
        assert_eq!(outcome.wiring_fails, 1);
    }
}
