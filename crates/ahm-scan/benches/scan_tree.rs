use std::fs;

use ahm_core::ScanConfig;
use ahm_scan::AnnotationScanner;
use criterion::{criterion_group, criterion_main, Criterion};
use tempfile::tempdir;

fn bench_scan(c: &mut Criterion) {
    let dir = tempdir().expect("tempdir");
    for module in 0..64 {
        let mut body = String::new();
        for item in 0..50 {
            body.push_str(&format!(
                "// Assert storage \"Pallet{module}::Item{item}::ah_post::length\"\nfn check_{item}() {{}}\n"
            ));
        }
        let path = dir.path().join(format!("pallet_{module}/src/tests.rs"));
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, body).expect("write");
    }
    let scanner = AnnotationScanner::new(ScanConfig::default()).expect("scanner");
    let mut group = c.benchmark_group("scan_tree");
    group.bench_function("64_files", |b| {
        b.iter(|| {
            let _ = scanner.scan(dir.path()).unwrap();
        })
    });
    group.finish();
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
