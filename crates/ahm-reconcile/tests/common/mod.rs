#![allow(dead_code)]

use ahm_catalog::Catalog;
use ahm_core::{AssertionKey, Fulfillment, Namespace, Requirement};

pub fn storage_req(full_name: &str) -> Requirement {
    Requirement::expected(Namespace::Storage, AssertionKey::parse(full_name).expect("key"))
}

pub fn fulfillment(namespace: Namespace, full_name: &str, line: usize) -> Fulfillment {
    Fulfillment {
        namespace,
        key: AssertionKey::parse(full_name).expect("key"),
        line,
        rel_path: format!("src/tests.rs:{line}"),
        abs_path: format!("/repo/src/tests.rs:{line}"),
    }
}

pub fn storage(full_name: &str, line: usize) -> Fulfillment {
    fulfillment(Namespace::Storage, full_name, line)
}

pub fn catalog(names: &[&str]) -> Catalog {
    Catalog::new(names.iter().map(|name| storage_req(name)).collect())
}
