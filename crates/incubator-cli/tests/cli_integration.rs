//! CLI Integration Tests
//!
//! These tests run the `incubator` binary against a temporary config,
//! database and catalog. The controller address points at a closed local
//! port, so pushes fail fast without touching the network.
//!
//! ```
//! cargo test --package incubator-cli --test cli_integration
//! ```

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const CATALOG: &str = r#"[
  {"nome": "Galinha", "dias": 21, "temp_min": 37.5, "temp_max": 38.0, "umid_min": 55, "umid_max": 65},
  {"nome": "Codorna", "dias": 17, "temp_min": 37.5, "temp_max": 37.8, "umid_min": 45, "umid_max": 55}
]"#;

/// A scratch directory with config, catalog and database paths.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("aves.json"), CATALOG).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Run the binary with the workspace's files and an unreachable controller.
    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_incubator"))
            .args(args)
            .arg("--config")
            .arg(self.path("config.toml"))
            .arg("--db")
            .arg(self.path("incubator.db"))
            .arg("--catalog")
            .arg(self.path("aves.json"))
            .args(["--controller", "127.0.0.1:1"])
            .env("NO_COLOR", "1")
            .env_remove("INCUBATOR_CONFIG")
            .env_remove("INCUBATOR_DB")
            .env_remove("INCUBATOR_CONTROLLER")
            .env_remove("RUST_LOG")
            .current_dir(self.dir.path())
            .output()
            .expect("Failed to run incubator binary")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn run_bare(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_incubator"))
        .args(args)
        .output()
        .expect("Failed to run incubator binary")
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_command() {
    let output = run_bare(&["--help"]);
    assert!(output.status.success(), "Help should succeed");

    let stdout = stdout(&output);
    for command in [
        "species",
        "start",
        "status",
        "fertility",
        "hatch",
        "push",
        "history",
        "sensors",
        "import",
        "config",
        "completions",
    ] {
        assert!(stdout.contains(command), "Help should list {}", command);
    }
}

#[test]
fn test_version_command() {
    let output = run_bare(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("incubator "));
}

#[test]
fn test_completions_bash() {
    let output = run_bare(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("incubator"));
}

#[test]
fn test_invalid_command() {
    let output = run_bare(&["hatchery"]);
    assert!(!output.status.success());
}

// =============================================================================
// Catalog
// =============================================================================

#[test]
fn test_species_json() {
    let ws = Workspace::new();
    let output = ws.run(&["species", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["nome"], "Galinha");
    assert_eq!(json[1]["dias"], 17);
}

#[test]
fn test_species_missing_catalog_is_empty() {
    let ws = Workspace::new();
    std::fs::remove_file(ws.path("aves.json")).unwrap();

    let output = ws.run(&["species"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("No species available"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_species_corrupt_catalog_degrades() {
    let ws = Workspace::new();
    std::fs::write(ws.path("aves.json"), "{ corrupt").unwrap();

    let output = ws.run(&["species", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("empty catalog"));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 0);

    // Starting then fails on the species lookup, not on the catalog
    let output = ws.run(&["start", "Galinha", "12"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Galinha"));
}

#[test]
fn test_no_color_env_accepts_any_value() {
    let ws = Workspace::new();
    for value in ["1", "yes", "true"] {
        let output = Command::new(env!("CARGO_BIN_EXE_incubator"))
            .args(["species", "--catalog"])
            .arg(ws.path("aves.json"))
            .arg("--config")
            .arg(ws.path("config.toml"))
            .env("NO_COLOR", value)
            .output()
            .expect("Failed to run incubator binary");
        assert!(
            output.status.success(),
            "NO_COLOR={} stderr: {}",
            value,
            stderr(&output)
        );
        assert!(!stdout(&output).contains('\x1b'));
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_status_without_cycle() {
    let ws = Workspace::new();
    let output = ws.run(&["status"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("No active incubation"));
}

#[test]
fn test_start_then_status() {
    let ws = Workspace::new();

    let output = ws.run(&["start", "Galinha", "12", "--notes", "lote A"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Started 12 Galinha eggs"));
    assert!(stderr(&output).contains("could not be updated"));

    let output = ws.run(&["status", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["incubation"]["raca"], "Galinha");
    assert_eq!(json["incubation"]["ovos"], 12);
    assert_eq!(json["incubation"]["observacoes"], "lote A");
    assert_eq!(json["phase"], "in progress");
}

#[test]
fn test_second_start_rejected() {
    let ws = Workspace::new();
    assert!(ws.run(&["start", "Codorna", "6"]).status.success());

    let output = ws.run(&["start", "Galinha", "12"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("already active"));
}

#[test]
fn test_unknown_species_rejected() {
    let ws = Workspace::new();
    let output = ws.run(&["start", "Pato", "8"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Pato"));
}

#[test]
fn test_hatch_before_period_ends_rejected() {
    let ws = Workspace::new();
    assert!(ws.run(&["start", "Galinha", "12"]).status.success());

    let output = ws.run(&["hatch", "8"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("awaiting hatch count"));
}

#[test]
fn test_push_fails_with_unreachable_controller() {
    let ws = Workspace::new();
    assert!(ws.run(&["start", "Galinha", "12"]).status.success());

    let output = ws.run(&["push"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("did not accept"));
}

// =============================================================================
// History and import
// =============================================================================

#[test]
fn test_history_csv_empty() {
    let ws = Workspace::new();
    let output = ws.run(&["history", "--format", "csv"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "inicio,ovos,raca,observacoes,ovoscopia,nascimentos,fim,dias"
    );
}

#[test]
fn test_import_history_then_stats() {
    let ws = Workspace::new();
    let file = ws.path("historico.json");
    std::fs::write(
        &file,
        r#"[
          {"inicio": "2024-01-01 00:00:00", "ovos": 12, "raca": "Galinha", "observacoes": "",
           "ovoscopia": 10, "nascimentos": 8, "fim": "2024-01-22 00:00:00", "dias": 21}
        ]"#,
    )
    .unwrap();

    let output = ws.run(&["import", "--history", path_str(&file)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Imported: 1"));

    // Importing again skips the duplicate
    let output = ws.run(&["import", "--history", path_str(&file)]);
    assert!(stdout(&output).contains("Skipped: 1"));

    let output = ws.run(&["history", "--stats", "--format", "json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["cycles"], 1);
    assert_eq!(json["eggs"], 12);
    assert_eq!(json["hatched"], 8);
}

#[test]
fn test_import_legacy_files_together() {
    let ws = Workspace::new();
    let active = ws.path("incubacao_atual.csv");
    std::fs::write(
        &active,
        "inicio,ovos,raca,observacoes,ovoscopia,nascimentos,fim,dias\n\
         2024-03-01 08:00:00,6,Codorna,lote B,,,,17\n",
    )
    .unwrap();
    let history = ws.path("incubacoes.csv");
    std::fs::write(
        &history,
        "inicio,ovos,raca,observacoes,ovoscopia,nascimentos,fim,dias\n\
         2024-01-01 00:00:00,12,Galinha,,10,8,2024-01-22 00:00:00,21\n",
    )
    .unwrap();

    let output = ws.run(&[
        "import",
        "--active",
        path_str(&active),
        "--history",
        path_str(&history),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).matches("Imported: 1").count(), 2);

    let output = ws.run(&["status", "--format", "json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["incubation"]["raca"], "Codorna");
    assert_eq!(json["incubation"]["observacoes"], "lote B");
}

#[test]
fn test_legacy_hatch_without_end_time_is_informational() {
    let ws = Workspace::new();
    let active = ws.path("incubacao_atual.csv");
    std::fs::write(
        &active,
        "inicio,ovos,raca,observacoes,ovoscopia,nascimentos,fim,dias\n\
         2024-01-01 00:00:00,12,Galinha,,10,8,,21\n",
    )
    .unwrap();

    let output = ws.run(&["import", "--active", path_str(&active)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = ws.run(&["status", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["incubation"]["nascimentos"], 8);
    assert_eq!(json["phase"], "hatched");
}

// =============================================================================
// Sensors
// =============================================================================

#[test]
fn test_sensors_summary_json() {
    let ws = Workspace::new();
    let log = ws.path("dados.csv");
    std::fs::write(
        &log,
        "2024-01-02 10:00:00,37.6,58.0\n2024-01-02 10:05:00,37.8,60.0\nnot,a,row\n",
    )
    .unwrap();

    let output = ws.run(&[
        "sensors",
        "--file",
        path_str(&log),
        "--summary",
        "--species",
        "Galinha",
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Skipped 1 malformed rows"));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["count"], 2);
    assert_eq!(json["first"], "2024-01-02 10:00:00");
    assert_eq!(json["out_of_range"]["temperature"], 0);
}

#[test]
fn test_sensors_missing_log_is_empty() {
    let ws = Workspace::new();
    let output = ws.run(&["sensors", "--format", "csv"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "data_hora,temperatura,umidade");
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn test_config_init_and_show() {
    let ws = Workspace::new();

    let output = ws.run(&["config", "path"]);
    assert!(stdout(&output).trim().ends_with("config.toml"));

    let output = ws.run(&["config", "init"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(ws.path("config.toml").exists());

    let output = ws.run(&["config", "init"]);
    assert!(!output.status.success(), "init should not overwrite");

    let output = ws.run(&["config", "show"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let shown = stdout(&output);
    assert!(shown.contains("[controller]"));
    assert!(shown.contains("address = \"127.0.0.1:1\""));
    assert!(shown.contains("fertility_check_policy = \"exact-day\""));
}

#[test]
fn test_invalid_config_reported() {
    let ws = Workspace::new();
    std::fs::write(
        ws.path("config.toml"),
        "[lifecycle]\nfertility_check_day = 0\n",
    )
    .unwrap();

    let output = ws.run(&["status"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("lifecycle.fertility_check_day"));
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}
