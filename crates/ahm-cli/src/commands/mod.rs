pub mod catalog;
pub mod reconcile;
pub mod scan;
