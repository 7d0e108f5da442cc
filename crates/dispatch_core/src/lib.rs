pub mod city;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod ledger;
pub mod lifecycle;
pub mod matching;
pub mod model;
pub mod pricing;
pub mod route;
pub mod service;
pub mod shortest_path;
pub mod snapshot;
pub mod state;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
