use std::{fmt::Write as _, time::Instant};

use dashmap::DashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct RequestKey {
    method: String,
    route: String,
    status: u16,
}

/// Per-route request counters rendered in Prometheus text format.
#[derive(Debug)]
pub struct RequestMetrics {
    requests: DashMap<RequestKey, u64>,
    started_at: Instant,
}

impl Default for RequestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self {
            requests: DashMap::new(),
            started_at: Instant::now(),
        }
    }

    /// Count one answered request. `route` is the matched route template,
    /// not the raw path, so job ids do not explode the label set.
    pub fn record(&self, method: &str, route: &str, status: u16) {
        let key = RequestKey {
            method: method.to_string(),
            route: route.to_string(),
            status,
        };
        *self.requests.entry(key).or_insert(0) += 1;
    }

    pub fn count(&self, method: &str, route: &str, status: u16) -> u64 {
        let key = RequestKey {
            method: method.to_string(),
            route: route.to_string(),
            status,
        };
        self.requests.get(&key).map(|count| *count).unwrap_or(0)
    }

    pub fn render(&self) -> String {
        let mut samples: Vec<(RequestKey, u64)> = self
            .requests
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        samples.sort();

        let mut out = String::new();
        out.push_str(
            "# HELP vulnscan_http_requests_total Total HTTP requests answered.\n",
        );
        out.push_str("# TYPE vulnscan_http_requests_total counter\n");
        for (key, count) in samples {
            let _ = writeln!(
                out,
                "vulnscan_http_requests_total{{method=\"{}\",route=\"{}\",status=\"{}\"}} {}",
                escape_label(&key.method),
                escape_label(&key.route),
                key.status,
                count
            );
        }

        out.push_str("# HELP vulnscan_uptime_seconds Seconds since the server started.\n");
        out.push_str("# TYPE vulnscan_uptime_seconds gauge\n");
        let _ = writeln!(
            out,
            "vulnscan_uptime_seconds {}",
            self.started_at.elapsed().as_secs_f64()
        );
        out
    }
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
