//! ---
//! cb_section: "01-core-functionality"
//! cb_subsection: "tests"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Configuration discovery and environment override."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use std::env;
use std::fs;

use cellbench_common::config::BenchConfig;
use tempfile::tempdir;

const BENCH_A: &str = r#"
[bench]
name = "Bench A"

[[cells]]
chemistry = "lfp"
count = 4
"#;

const BENCH_B: &str = r#"
[bench]
name = "Bench B"

[[cells]]
chemistry = "nmc"
"#;

// Candidate discovery and the env override share one test so the
// `CELLBENCH_CONFIG` variable never leaks into a concurrently running case.
#[test]
fn discovery_then_env_override() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.toml");
    let b = dir.path().join("b.toml");
    let missing = dir.path().join("missing.toml");
    fs::write(&a, BENCH_A).unwrap();
    fs::write(&b, BENCH_B).unwrap();

    env::remove_var(BenchConfig::ENV_CONFIG_PATH);
    let loaded = BenchConfig::load_with_source(&[&missing, &a, &b]).unwrap();
    assert_eq!(loaded.source, a);
    assert_eq!(loaded.config.bench.name, "Bench A");
    assert_eq!(loaded.config.planned_cell_ids().len(), 4);

    let err = BenchConfig::load(&[&missing]).unwrap_err();
    assert!(err.to_string().contains("no configuration files found"));

    env::set_var(BenchConfig::ENV_CONFIG_PATH, &b);
    let loaded = BenchConfig::load_with_source(&[&a]).unwrap();
    env::remove_var(BenchConfig::ENV_CONFIG_PATH);
    assert_eq!(loaded.source, b);
    assert_eq!(loaded.config.bench.name, "Bench B");
}

#[test]
fn invalid_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[[cells]]\nchemistry = \"nmc\"\ncount = 0\n").unwrap();
    let err = BenchConfig::from_path(&path).unwrap_err();
    let rendered = format!("{:#}", err);
    assert!(rendered.contains("broken.toml"));
    assert!(rendered.contains("at least one cell"));
}

#[test]
fn shipped_sample_is_valid() {
    let config: BenchConfig = include_str!("../../../config/cellbench.toml")
        .parse()
        .unwrap();
    assert_eq!(config.bench.name, "Test Bench Alpha");
    assert_eq!(config.planned_cell_ids().len(), 8);
    assert_eq!(config.tasks.len(), 3);
    assert_eq!(config.simulation.random_seed, 0xCE11_BE4C);
    assert!(!config.logging.write_file);
}
