//! Fires a fixed number of HTTP GET requests at one target through a bounded
//! pool of concurrent workers and tallies the outcomes.

pub mod cli;
pub mod client;
pub mod config;
pub mod queue;
pub mod report;
pub mod scenario;
pub mod statistics;

pub use client::{HttpClient, HttpGet};
pub use config::{ConfigError, RunConfig};
pub use scenario::{run_load_test, LoadTestReport};
pub use statistics::{AggregateResult, Aggregator, Outcome};
