use std::fmt;

use crate::scenario::LoadTestReport;

impl fmt::Display for LoadTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Load Test Completed")?;
        writeln!(f, "Total time taken: {:?}", self.elapsed)?;
        writeln!(f, "Total requests made: {}", self.total_requests)?;
        writeln!(f, "Requests with status 200: {}", self.result.count_for(200))?;
        writeln!(f, "Other status codes distribution:")?;
        for (status, count) in self.result.other_statuses() {
            writeln!(f, "Status {status}: {count} requests")?;
        }
        writeln!(f, "Refused requests: {}", self.result.refused)
    }
}

#[cfg(test)]
mod tests {
    use crate::scenario::LoadTestReport;
    use crate::statistics::Aggregator;
    use std::time::Duration;

    #[test]
    fn renders_every_section() {
        let aggregator = Aggregator::new();
        for status in [200, 200, 200, 500, 404, 500] {
            aggregator.record_success(status);
        }
        aggregator.record_refused();
        let report = LoadTestReport {
            total_requests: 7,
            elapsed: Duration::from_millis(1500),
            result: aggregator.snapshot(),
        };

        assert_eq!(
            report.to_string(),
            "\
Load Test Completed
Total time taken: 1.5s
Total requests made: 7
Requests with status 200: 3
Other status codes distribution:
Status 404: 1 requests
Status 500: 2 requests
Refused requests: 1
"
        );
    }

    #[test]
    fn empty_run_still_reports_zero_counts() {
        let report = LoadTestReport {
            total_requests: 0,
            elapsed: Duration::ZERO,
            result: Aggregator::new().snapshot(),
        };
        let rendered = report.to_string();
        assert!(rendered.contains("Requests with status 200: 0\n"));
        assert!(rendered.contains("Other status codes distribution:\nRefused requests: 0\n"));
    }
}
