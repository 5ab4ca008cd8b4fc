use std::fs;
use std::process::Command;

use ahm_catalog::Catalog;
use ahm_core::{
    AssertionKey, CoverageError, Fulfillment, Namespace, PhaseDisplay, ReportConfig, Requirement,
};
use ahm_reconcile::Reconciler;
use ahm_report::{
    FixedRevision, GitRevision, PhaseTable, ReportGenerator, RevisionSource, REPORT_HEADER,
};
use tempfile::tempdir;

fn req(full_name: &str) -> Requirement {
    Requirement::expected(Namespace::Storage, AssertionKey::parse(full_name).expect("key"))
}

fn marker(full_name: &str, rel: &str, line: usize) -> Fulfillment {
    Fulfillment {
        namespace: Namespace::Storage,
        key: AssertionKey::parse(full_name).expect("key"),
        line,
        rel_path: format!("{rel}:{line}"),
        abs_path: format!("/repo/{rel}:{line}"),
    }
}

fn catalog() -> Catalog {
    Catalog::new(vec![
        Requirement::placeholder("System"),
        req("Indices::Accounts::ah_pre::empty"),
        req("Indices::Accounts::rc_post::empty"),
        req("Indices::Accounts::ah_post::length"),
        Requirement::placeholder("Session"),
    ])
}

#[test]
fn coverage_without_fulfillments_counts_placeholders_only() {
    let catalog = catalog();
    let outcome = Reconciler::default().reconcile(&catalog, Vec::new());
    let report = ReportGenerator::new(ReportConfig::default())
        .generate(&outcome.bindings, "abc123")
        .expect("report");
    assert_eq!(report.satisfied, catalog.placeholder_count());
    assert_eq!(report.total, 5);
    assert!((report.percentage() - 2.0 / 5.0 * 100.0).abs() < 1e-9);
    assert!(report.rows.iter().all(|row| row.links.is_empty()));
}

#[test]
fn rows_follow_catalog_order_with_display_pairs() {
    let catalog = catalog();
    let outcome = Reconciler::default().reconcile(
        &catalog,
        vec![marker("Indices::Accounts::rc_post::empty", "pallets/indices/src/tests.rs", 12)],
    );
    let report = ReportGenerator::new(ReportConfig::default())
        .generate(&outcome.bindings, "abc123")
        .expect("report");
    let pairs: Vec<(&str, &str, &str)> = report
        .rows
        .iter()
        .map(|row| (row.pallet.as_str(), row.chain.as_str(), row.when.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("System", "", ""),
            ("Indices", "Asset Hub", "before"),
            ("Indices", "Relay", "after"),
            ("Indices", "Asset Hub", "after"),
            ("Session", "", ""),
        ]
    );
    assert_eq!(report.satisfied, 3);
    assert!((report.percentage() - 60.0).abs() < 1e-9);
}

#[test]
fn links_point_at_revision_and_relative_path() {
    let catalog = Catalog::new(vec![req("Proxy::Proxies::ah_post::correct")]);
    let outcome = Reconciler::default().reconcile(
        &catalog,
        vec![
            marker("Proxy::Proxies::ah_post::correct", "pallets/proxy/tests.rs", 4),
            marker("Proxy::Proxies::ah_post::correct", "pallets/proxy/tests.rs", 40),
        ],
    );
    let report = ReportGenerator::new(ReportConfig::default())
        .generate(&outcome.bindings, "deadbeef")
        .expect("report");
    assert_eq!(
        report.rows[0].links,
        "[line 4](https://github.com/polkadot-fellows/runtimes/tree/deadbeef/pallets/proxy/tests.rs:4) \
         [line 40](https://github.com/polkadot-fellows/runtimes/tree/deadbeef/pallets/proxy/tests.rs:40)"
    );
    assert_eq!(report.percentage(), 100.0);
}

#[test]
fn unknown_phase_is_rejected() {
    let catalog = Catalog::new(vec![req("Proxy::Proxies::mid_flight::empty")]);
    let outcome = Reconciler::default().reconcile(&catalog, Vec::new());
    let err = ReportGenerator::new(ReportConfig::default())
        .generate(&outcome.bindings, "abc")
        .unwrap_err();
    assert!(matches!(err, CoverageError::UnrecognizedPhase(_)));
    assert_eq!(
        err.info().context["requirement"],
        "Proxy::Proxies::mid_flight::empty"
    );
}

#[test]
fn phase_table_is_configurable() {
    let table = PhaseTable::new(vec![PhaseDisplay::new("kh_post", "Kusama Hub", "after")]);
    assert_eq!(table.display("kh_post").expect("known"), ("Kusama Hub", "after"));
    assert_eq!(table.display("").expect("empty"), ("", ""));
    assert!(table.display("ah_pre").is_err());
}

#[test]
fn empty_catalog_reports_zero_percent() {
    let report = ReportGenerator::new(ReportConfig::default())
        .generate(&[], "abc")
        .expect("report");
    assert_eq!(report.percentage(), 0.0);
}

#[test]
fn csv_has_fixed_header_and_one_row_per_requirement() {
    let catalog = catalog();
    let outcome = Reconciler::default().reconcile(
        &catalog,
        vec![marker("Indices::Accounts::ah_pre::empty", "src/a.rs", 3)],
    );
    let generator = ReportGenerator::new(ReportConfig::default());
    let report = generator.generate(&outcome.bindings, "abc").expect("report");
    let dir = tempdir().expect("tempdir");
    let path = generator.write_csv(&report, dir.path()).expect("write");
    assert_eq!(path, dir.path().join("storage.csv"));

    let mut reader = csv::Reader::from_path(&path).expect("read");
    let header: Vec<String> = reader
        .headers()
        .expect("header")
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(header, REPORT_HEADER);
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("row")).collect();
    assert_eq!(records.len(), 5);
    assert_eq!(&records[1][0], "Indices");
    assert_eq!(&records[1][2], "empty");
    assert!(records[1][5].starts_with("[line 3]("));
    assert_eq!(&records[2][5], "");
}

#[test]
fn csv_output_is_identical_across_runs() {
    let catalog = catalog();
    let generator = ReportGenerator::new(ReportConfig::default());
    let dir = tempdir().expect("tempdir");
    let mut outputs = Vec::new();
    for sub in ["a", "b"] {
        let outcome = Reconciler::default().reconcile(
            &catalog,
            vec![marker("Indices::Accounts::ah_post::length", "src/a.rs", 9)],
        );
        let report = generator.generate(&outcome.bindings, "abc").expect("report");
        let path = generator.write_csv(&report, &dir.path().join(sub)).expect("write");
        outputs.push(fs::read(path).expect("read"));
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn fixed_revision_is_returned_verbatim() {
    let dir = tempdir().expect("tempdir");
    let revision = FixedRevision("0123abcd".into()).revision(dir.path()).expect("rev");
    assert_eq!(revision, "0123abcd");
}

#[test]
fn git_failure_is_a_revision_error() {
    let dir = tempdir().expect("tempdir");
    let err = GitRevision.revision(&dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, CoverageError::Revision(_)));
}

fn git(dir: &std::path::Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .status()
        .expect("spawn git");
    assert!(status.success(), "git {args:?} failed");
}

#[test]
fn git_revision_reads_checked_out_commit() {
    let dir = tempdir().expect("tempdir");
    git(dir.path(), &["init", "--quiet"]);
    fs::write(dir.path().join("lib.rs"), "// Assert storage \"A::B::ah_pre::empty\"\n")
        .expect("write");
    git(dir.path(), &["add", "lib.rs"]);
    git(
        dir.path(),
        &[
            "-c",
            "user.name=coverage",
            "-c",
            "user.email=coverage@example.invalid",
            "-c",
            "commit.gpgsign=false",
            "commit",
            "--quiet",
            "-m",
            "fixture",
        ],
    );
    let revision = GitRevision.revision(dir.path()).expect("revision");
    assert_eq!(revision.len(), 40);
    assert!(revision.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(revision, revision.trim());
}
