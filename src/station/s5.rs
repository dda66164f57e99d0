//! S5 quality inspection (SPEC_FULL.md §4.3 table). Recipe-dependent accept
//! probability with a single allowed rework loop, mirroring `ST5_QualityInspection`'s
//! accept/reject tally. A reject is a routine quality outcome, not a
//! station fault: `ST5_QualityInspection.py` models a genuine inspection
//! cell fault (camera/fixture jig) as an entirely separate, independent
//! low-probability event from the accept/reject decision, and a reject
//! there still always completes the cycle (`done_pulse`, never
//! `fault_latched`). This planner always reports `passed=true`; the PLC
//! reads accept/reject only through `last_accept` (§4.4 step 5), never
//! through the station's fault bit.

use rand::Rng;

use super::{Stage, StagePlanner};
use crate::config::S5Config;

#[derive(Default)]
pub struct S5Planner {
    pub cfg: S5Config,
    pub recipe_id: u16,
    accept: u32,
    reject: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct S5Outcome {
    pub accept: u32,
    pub reject: u32,
    pub last_accept: bool,
}

impl StagePlanner for S5Planner {
    type Outcome = S5Outcome;

    fn plan(&mut self, rng: &mut rand::rngs::StdRng) -> (Vec<Stage>, bool, Self::Outcome) {
        let mut stages = vec![
            Stage::work("position", 0.4),
            Stage::work("vision", 0.8),
            Stage::work("rules", 0.3),
        ];
        let p_accept = (self.cfg.p_accept_base + self.cfg.recipe_offset * f64::from(self.recipe_id))
            .clamp(0.0, 1.0);
        let mut accepted = rng.gen::<f64>() < p_accept;
        if !accepted {
            // One rework loop allowed: re-run the vision check once.
            stages.push(Stage::work("rework_vision", 0.8));
            accepted = rng.gen::<f64>() < p_accept;
        }
        if accepted {
            self.accept += 1;
        } else {
            self.reject += 1;
        }
        (
            stages,
            true,
            S5Outcome {
                accept: self.accept,
                reject: self.reject,
                last_accept: accepted,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn certain_accept_never_reworks_tally() {
        let mut planner = S5Planner {
            cfg: S5Config {
                p_accept_base: 1.0,
                recipe_offset: 0.0,
            },
            ..Default::default()
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        let (_, passed, outcome) = planner.plan(&mut rng);
        assert!(passed);
        assert_eq!(outcome.accept, 1);
        assert_eq!(outcome.reject, 0);
        assert!(outcome.last_accept);
    }

    #[test]
    fn certain_reject_still_passes_the_cycle() {
        // A reject is a quality outcome, not a station fault: `passed` must
        // stay true so the engine never fault-latches S5 and the PLC never
        // drives the whole line into FAULT_RESET over a routine reject.
        let mut planner = S5Planner {
            cfg: S5Config {
                p_accept_base: 0.0,
                recipe_offset: 0.0,
            },
            ..Default::default()
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        let (stages, passed, outcome) = planner.plan(&mut rng);
        assert!(passed);
        assert_eq!(stages.len(), 4);
        assert_eq!(outcome.reject, 1);
        assert!(!outcome.last_accept);
    }
}
