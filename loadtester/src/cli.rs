use clap::{ArgAction, Parser};

use crate::config::{ConfigError, RunConfig};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "loadtester",
    author,
    version,
    about = "Simple CLI for performing load tests on a web service",
    long_about = "Tests the load capacity of a web service by sending a fixed number of HTTP GET \
                  requests through a pool of concurrent workers, then reports the status codes seen."
)]
pub struct Args {
    /// URL of the web service to test
    #[arg(long)]
    pub url: String,

    /// Total number of requests to send
    #[arg(long)]
    pub requests: usize,

    /// Number of simultaneous requests
    #[arg(long)]
    pub concurrency: usize,

    /// Worker threads of the async runtime, one per core if omitted
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub threads: Option<u16>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn to_config(&self) -> Result<RunConfig, ConfigError> {
        RunConfig::new(&self.url, self.requests, self.concurrency)
    }

    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let args = Args::try_parse_from([
            "loadtester",
            "--url",
            "http://127.0.0.1:8080/",
            "--requests",
            "100",
            "--concurrency",
            "8",
            "--threads",
            "2",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.requests, 100);
        assert_eq!(args.concurrency, 8);
        assert_eq!(args.threads, Some(2));
        assert_eq!(args.log_filter(), "debug");

        let config = args.to_config().unwrap();
        assert_eq!(config.total_requests(), 100);
        assert_eq!(config.concurrency(), 8);
    }

    #[test]
    fn every_run_flag_is_required() {
        let full = [
            ("--url", "http://127.0.0.1:8080/"),
            ("--requests", "1"),
            ("--concurrency", "1"),
        ];
        for missing in 0..full.len() {
            let mut argv = vec!["loadtester"];
            for (i, (flag, value)) in full.iter().enumerate() {
                if i != missing {
                    argv.push(*flag);
                    argv.push(*value);
                }
            }
            assert!(
                Args::try_parse_from(argv).is_err(),
                "parsing succeeded without {}",
                full[missing].0
            );
        }
    }

    #[test]
    fn rejects_zero_threads() {
        let res = Args::try_parse_from([
            "loadtester",
            "--url",
            "http://127.0.0.1/",
            "--requests",
            "1",
            "--concurrency",
            "1",
            "--threads",
            "0",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn quiet_by_default() {
        let args = Args::try_parse_from([
            "loadtester",
            "--url",
            "http://127.0.0.1/",
            "--requests",
            "1",
            "--concurrency",
            "1",
        ])
        .unwrap();
        assert_eq!(args.verbose, 0);
        assert_eq!(args.log_filter(), "warn");
    }
}
