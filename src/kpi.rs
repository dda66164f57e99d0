//! KPI JSON export (SPEC_FULL.md §4.5/§4.5.1): every station writes
//! `S<k>_kpis_<sim_seconds>.json` at shutdown, sharing one schema
//! (`station`, `sim_seconds`, `counters`, `config`) so offline tooling has
//! a single shape to parse regardless of which station produced it.

use log::info;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::LineResult;

#[derive(Debug, Serialize)]
pub struct KpiReport<'a> {
    pub station: &'a str,
    pub sim_seconds: f64,
    pub counters: Value,
    pub config: Value,
}

pub fn var_dir() -> PathBuf {
    std::env::var("PLC_VAR_DIR").map_or_else(|_| PathBuf::from("."), PathBuf::from)
}

/// Writes `S<k>_kpis_<sim_seconds>.json` under [`var_dir`].
pub fn export(station: &str, sim_seconds: f64, counters: Value, config: Value) -> LineResult<()> {
    let report = KpiReport {
        station,
        sim_seconds,
        counters,
        config,
    };
    let mut path: PathBuf = var_dir();
    path.push(format!("{station}_kpis_{sim_seconds:.0}.json"));
    write_report(&path, &report)?;
    info!("wrote KPI snapshot to {}", path.display());
    Ok(())
}

fn write_report(path: &Path, report: &KpiReport<'_>) -> LineResult<()> {
    let bytes = serde_json::to_vec_pretty(report)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn export_writes_expected_shape() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("PLC_VAR_DIR", dir.path());
        export("S1", 120.0, json!({"total": 10, "completed": 9}), json!({"p_arm_fail": 0.03})).unwrap();
        let path = dir.path().join("S1_kpis_120.json");
        let contents = std::fs::read_to_string(path).unwrap();
        let parsed: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["station"], "S1");
        assert_eq!(parsed["counters"]["total"], 10);
        std::env::remove_var("PLC_VAR_DIR");
    }
}
