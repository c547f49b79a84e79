//! # Bundled Scenarios — Load and Run
//!
//! Every file under the repository's `scenarios/` directory must parse,
//! validate, and keep each gated run inside its domain.

use std::path::PathBuf;

use ase_cli::run::{compare_scenario, run_scenario};
use ase_cli::scenario::Scenario;

fn scenarios_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("scenarios")
}

fn bundled() -> Vec<(PathBuf, Scenario)> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(scenarios_dir()).expect("scenarios directory") {
        let path = entry.expect("dir entry").path();
        let scenario = Scenario::load(&path)
            .unwrap_or_else(|e| panic!("{} failed to load: {e}", path.display()));
        out.push((path, scenario));
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

#[test]
fn every_bundled_scenario_loads() {
    let all = bundled();
    assert!(all.len() >= 3, "expected the bundled scenarios, found {}", all.len());
}

#[test]
fn bundled_scenarios_stay_inside_when_gated() {
    for (path, mut scenario) in bundled() {
        scenario.steps = scenario.steps.min(500);
        let report = run_scenario(&scenario, Some(scenario.engine)).unwrap();
        assert!(report.final_inside, "{}", path.display());
        assert_eq!(report.stats.envelope_exits, 0, "{}", path.display());
    }
}

#[test]
fn comparison_covers_every_mode() {
    for (path, mut scenario) in bundled() {
        scenario.steps = scenario.steps.min(200);
        let reports = compare_scenario(&scenario).unwrap();
        assert_eq!(reports.len(), 4, "{}", path.display());
        assert_eq!(reports[0].label, "ungated");
        for r in &reports[1..] {
            assert_eq!(r.stats.envelope_exits, 0, "{} {}", path.display(), r.label);
        }
    }
}
