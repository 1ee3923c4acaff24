//! The dispatch engine: a fixed pool of workers draining one work queue.
//!
//! [`run_load_test`] fills a queue with one token per request, spawns
//! `concurrency` workers on the current tokio runtime and waits for all of them
//! to observe exhaustion before reading the aggregated outcomes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use hyper::Uri;

use crate::client::HttpGet;
use crate::config::RunConfig;
use crate::queue::{work_queue, RequestToken, WorkReceiver};
use crate::statistics::{AggregateResult, Aggregator, Outcome};

/// Final state of a completed run.
#[derive(Debug, Clone)]
pub struct LoadTestReport {
    pub total_requests: usize,
    pub elapsed: Duration,
    pub result: AggregateResult,
}

struct Worker<T> {
    id: usize,
    queue: WorkReceiver,
    transport: T,
    uri: Uri,
    aggregator: Arc<Aggregator>,
}

impl<T: HttpGet> Worker<T> {
    /// Returns how many requests this worker dispatched.
    async fn run(self) -> usize {
        tracing::debug!(worker_id = self.id, "Worker started");
        let mut dispatched = 0;
        while let Some(token) = self.queue.dequeue().await {
            let outcome = self.dispatch(token).await;
            self.aggregator.record(outcome);
            dispatched += 1;
        }
        tracing::debug!(
            worker_id = self.id,
            dispatched,
            "Work queue exhausted, worker stopping"
        );
        dispatched
    }

    async fn dispatch(&self, token: RequestToken) -> Outcome {
        match self.transport.get(&self.uri).await {
            Ok(status) => {
                tracing::trace!(
                    worker_id = self.id,
                    token = token.sequence(),
                    status = status.as_u16(),
                    "Response received"
                );
                Outcome::Success(status.as_u16())
            }
            Err(e) => {
                let error = format!("{e:#}");
                tracing::debug!(
                    worker_id = self.id,
                    token = token.sequence(),
                    error = %error,
                    "Request refused"
                );
                Outcome::Refused
            }
        }
    }
}

/// Sends `config.total_requests()` GETs through `config.concurrency()` workers.
///
/// Individual request failures are counted as refused and never abort the run.
/// An error is only returned if a worker task itself could not be joined.
pub async fn run_load_test<T: HttpGet>(
    config: &RunConfig,
    transport: T,
) -> anyhow::Result<LoadTestReport> {
    let total_requests = config.total_requests();
    let concurrency = config.concurrency();
    tracing::info!(
        uri = %config.uri(),
        total_requests,
        concurrency,
        "Starting load test"
    );
    let start = Instant::now();

    let (sender, receiver) = work_queue(total_requests);
    let aggregator = Arc::new(Aggregator::new());
    let mut workers = Vec::with_capacity(concurrency);
    for id in 0..concurrency {
        let worker = Worker {
            id,
            queue: receiver.clone(),
            transport: transport.clone(),
            uri: config.uri().clone(),
            aggregator: Arc::clone(&aggregator),
        };
        workers.push(tokio::spawn(worker.run()));
    }
    drop(receiver);

    for sequence in 0..total_requests {
        sender
            .enqueue(RequestToken::new(sequence))
            .await
            .context("Failed to enqueue request")?;
    }
    sender.close();

    let mut dispatched = 0;
    for worker in workers {
        dispatched += worker.await.context("Failed to join worker")?;
    }
    let elapsed = start.elapsed();

    let result = aggregator.snapshot();
    debug_assert_eq!(result.total(), dispatched as u64);
    tracing::info!(
        dispatched,
        refused = result.refused,
        ?elapsed,
        "Load test finished"
    );
    Ok(LoadTestReport {
        total_requests,
        elapsed,
        result,
    })
}
