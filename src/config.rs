use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::LineResult;

/// Per-station timing/probability parameters plus the shared buffer and RNG
/// seed, loaded from `line_config.json` (SPEC_FULL.md §3.1/§4.6). Unlike the
/// reference crate's config structs, fields here are *not*
/// `deny_unknown_fields`: this config is meant to be forward-compatible
/// with stations this core doesn't know about yet, and an unrecognized key
/// should be ignorable noise, not a fatal parse error (see DESIGN.md).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LineConfig {
    pub stations: StationConfigs,
    pub buffers: HashMap<String, u32>,
    pub rng_seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StationConfigs {
    #[serde(rename = "S1")]
    pub s1: S1Config,
    #[serde(rename = "S2")]
    pub s2: S2Config,
    #[serde(rename = "S3")]
    pub s3: S3Config,
    #[serde(rename = "S4")]
    pub s4: S4Config,
    #[serde(rename = "S5")]
    pub s5: S5Config,
    #[serde(rename = "S6")]
    pub s6: S6Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct S1Config {
    pub p_arm_fail: f64,
}

impl Default for S1Config {
    fn default() -> Self {
        Self { p_arm_fail: 0.03 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct S2Config {
    pub p_rework: f64,
}

impl Default for S2Config {
    fn default() -> Self {
        Self { p_rework: 0.08 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct S3Config {
    pub p_wiring_fail: f64,
}

impl Default for S3Config {
    fn default() -> Self {
        Self { p_wiring_fail: 0.02 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct S4Config {
    pub p_pass: f64,
    pub p_pass_after_retry: f64,
}

impl Default for S4Config {
    fn default() -> Self {
        Self {
            p_pass: 0.93,
            p_pass_after_retry: 0.97,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct S5Config {
    pub p_accept_base: f64,
    pub recipe_offset: f64,
}

impl Default for S5Config {
    fn default() -> Self {
        Self {
            p_accept_base: 0.88,
            recipe_offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct S6Config {
    pub cycle_time_s: f64,
    pub failure_rate: f64,
    pub mttr_s: f64,
    pub buffer_capacity: u32,
}

impl Default for S6Config {
    fn default() -> Self {
        Self {
            cycle_time_s: 1.0,
            failure_rate: 0.01,
            mttr_s: 30.0,
            buffer_capacity: 0,
        }
    }
}

impl LineConfig {
    /// Loads `line_config.json` from `path`. A missing or unreadable file is
    /// not exceptional (§7): defaults are used and a warning is logged. A
    /// present-but-malformed file (bad JSON) propagates as a `LineError`.
    pub fn load(path: impl AsRef<Path>) -> LineResult<Self> {
        let path = path.as_ref();
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("{} not found ({e}), using default config", path.display());
                return Ok(Self::default());
            }
        };
        let cfg: Self = serde_json::from_slice(&bytes)?;
        if cfg.stations.s6.buffer_capacity != 0 {
            log::debug!(
                "buffer_capacity={} configured but not enforced (buffers are uncapped)",
                cfg.stations.s6.buffer_capacity
            );
        }
        Ok(cfg)
    }

    /// Per-station RNG seed, mixing the station index into the shared seed.
    #[must_use]
    pub fn station_seed(&self, station_index: u64) -> u64 {
        self.rng_seed.unwrap_or(42) ^ station_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = LineConfig::load("/nonexistent/line_config.json").unwrap();
        assert!((cfg.stations.s1.p_arm_fail - 0.03).abs() < f64::EPSILON);
        assert_eq!(cfg.rng_seed, None);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("line_config.json");
        std::fs::write(
            &path,
            r#"{"stations": {"S1": {"p_arm_fail": 0.5, "unknown_field": 99}}, "totally_unknown": true}"#,
        )
        .unwrap();
        let cfg = LineConfig::load(&path).unwrap();
        assert!((cfg.stations.s1.p_arm_fail - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn station_seed_mixes_index() {
        let cfg = LineConfig {
            rng_seed: Some(42),
            ..Default::default()
        };
        assert_eq!(cfg.station_seed(0), 42);
        assert_eq!(cfg.station_seed(1), 43);
    }
}
