//! S4 calibration/testing (SPEC_FULL.md §4.3 table), grounded in
//! `ST4_CalibrationTesting.py`'s stage timeouts and retry-once policy: a
//! single retry with a higher pass probability, never a second retry.

use rand::Rng;

use super::{Stage, StagePlanner};
use crate::config::S4Config;

#[derive(Default)]
pub struct S4Planner {
    pub cfg: S4Config,
}

impl StagePlanner for S4Planner {
    type Outcome = ();

    fn plan(&mut self, rng: &mut rand::rngs::StdRng) -> (Vec<Stage>, bool, Self::Outcome) {
        let mut stages = vec![
            Stage::work("motion", 2.0),
            Stage::work("thermal", 18.0),
            Stage::work("calibration", 6.0),
            Stage::work("testprint", 15.0),
        ];
        let first_try_passed = rng.gen::<f64>() < self.cfg.p_pass;
        let passed = if first_try_passed {
            true
        } else {
            stages.push(Stage::work("retry", 5.0));
            rng.gen::<f64>() < self.cfg.p_pass_after_retry
        };
        (stages, passed, ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn certain_pass_skips_retry() {
        let mut planner = S4Planner {
            cfg: S4Config {
                p_pass: 1.0,
                p_pass_after_retry: 0.0,
            },
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(4);
        let (stages, passed, _) = planner.plan(&mut rng);
        assert_eq!(stages.len(), 4);
        assert!(passed);
    }

    #[test]
    fn forced_retry_adds_stage_and_can_still_pass() {
        let mut planner = S4Planner {
            cfg: S4Config {
                p_pass: 0.0,
                p_pass_after_retry: 1.0,
            },
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(4);
        let (stages, passed, _) = planner.plan(&mut rng);
        assert_eq!(stages.len(), 5);
        assert!(passed);
        let total: f64 = stages.iter().map(|s| s.duration_s).sum();
        assert!((total - 46.0).abs() < f64::EPSILON);
    }
}
