use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::tempdir;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ahm-coverage"))
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, contents).expect("write");
}

fn metadata(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("polkadot.metadata.json");
    let doc = json!({
        "V14": {
            "pallets": [
                {"name": "System", "storage": {"entries": [{"name": "Account"}]}},
                {"name": "PalletA", "storage": {"entries": [{"name": "ItemB"}]}}
            ]
        }
    });
    fs::write(&path, serde_json::to_vec(&doc).expect("json")).expect("write metadata");
    path
}

fn reconcile(root: &Path, metadata: &Path, out: &Path) -> Output {
    bin()
        .arg("reconcile")
        .arg("--root")
        .arg(root)
        .arg("--metadata")
        .arg(metadata)
        .arg("--out")
        .arg(out)
        .args(["--revision", "cafebabe"])
        .output()
        .expect("run ahm-coverage")
}

#[test]
fn clean_run_exits_zero_and_writes_table() {
    let dir = tempdir().expect("tempdir");
    let src = dir.path().join("runtimes");
    write(
        &src,
        "pallets/a/src/tests.rs",
        "// Assert storage \"PalletA::ItemB::ah_pre::empty\"\n// Assert storage 'PalletA::ItemB::ah_post::length'\n",
    );
    write(&src, "target/debug/stale.rs", "// Assert storage \"Nope::Nope::ah_pre::empty\"\n");
    let out = dir.path().join("out");
    let output = reconcile(&src, &metadata(dir.path()), &out);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.contains("Found 6 storage requirements"));
    assert!(stdout.contains("Found 2 storage and 0 functional fulfillments"));
    assert!(stdout.contains("✅ Requirement fulfilled \"PalletA::ItemB::ah_pre::empty\""));
    // System placeholder plus two fulfilled checks out of six.
    assert!(stdout.contains("Coverage: 50.00%"));

    let mut reader = csv::Reader::from_path(out.join("storage.csv")).expect("csv");
    let header: Vec<String> = reader
        .headers()
        .expect("header")
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(header, ["Pallet", "Storage", "Assertion", "Chain", "When", "Link"]);
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("row")).collect();
    assert_eq!(rows.len(), 6);
    assert_eq!(&rows[0][0], "System");
    assert_eq!(
        &rows[1][5],
        "[line 1](https://github.com/polkadot-fellows/runtimes/tree/cafebabe/pallets/a/src/tests.rs:1)"
    );
}

#[test]
fn anomalies_exit_nonzero_after_writing_table() {
    let dir = tempdir().expect("tempdir");
    let src = dir.path().join("runtimes");
    write(
        &src,
        "lib.rs",
        "// Assert storage \"PalletA::ItemB::ah_pre::emty\"\n",
    );
    let out = dir.path().join("out");
    let output = reconcile(&src, &metadata(dir.path()), &out);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success());
    assert!(stdout.contains("Maybe you meant:"));
    assert!(stdout.contains("\"emty\" → \"empty\""));
    assert!(out.join("storage.csv").exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ReconciliationFailure"));
}

#[test]
fn malformed_marker_aborts_without_table() {
    let dir = tempdir().expect("tempdir");
    let src = dir.path().join("runtimes");
    write(&src, "lib.rs", "// Assert storage \"PalletA::ItemB\"\n");
    let out = dir.path().join("out");
    let output = reconcile(&src, &metadata(dir.path()), &out);
    assert!(!output.status.success());
    assert!(!out.join("storage.csv").exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MalformedAnnotation"));
}

#[test]
fn scan_prints_both_namespaces() {
    let dir = tempdir().expect("tempdir");
    write(
        dir.path(),
        "lib.rs",
        "// Assert storage \"A::B::ah_pre::empty\"\n// Assert functionality \"A::call::f::ok\"\n",
    );
    let output = bin()
        .arg("scan")
        .arg("--root")
        .arg(dir.path())
        .output()
        .expect("run scan");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["storage"][0]["full_name"], "A::B::ah_pre::empty");
    assert_eq!(json["functionality"][0]["extrinsic"], "call");
}

#[test]
fn catalog_honours_config_file() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("coverage.toml");
    fs::write(&config, "[catalog]\nexcluded_pallets = [\"PalletA\"]\n").expect("config");
    let output = bin()
        .arg("--config")
        .arg(&config)
        .arg("catalog")
        .arg("--metadata")
        .arg(metadata(dir.path()))
        .output()
        .expect("run catalog");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("json");
    let names: Vec<&str> = json
        .as_array()
        .expect("array")
        .iter()
        .map(|req| req["full_name"].as_str().expect("name"))
        .collect();
    assert_eq!(names.len(), 6);
    assert_eq!(names[0], "System::Account::ah_pre::empty");
    assert_eq!(names[5], "PalletA::::::");
}
