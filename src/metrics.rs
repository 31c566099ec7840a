use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Metric names for the repository layer
///
/// Recording goes through the `metrics` facade, so it is a no-op until the
/// host installs a recorder.
#[derive(Debug, Clone, Copy)]
pub struct RepositoryMetrics {
    /// Counter of repository calls by operation and status
    pub operations_total: &'static str,
    /// Histogram of call durations in seconds
    pub operation_duration: &'static str,
    /// Histogram of listing sizes before and after filtering
    pub items_fetched: &'static str,
    /// Counter of image uploads
    pub uploads_total: &'static str,
    /// Counter of failures by kind
    pub errors_total: &'static str,
    /// Gauge of the latest listing size
    pub last_listing_size: &'static str,
}

impl Default for RepositoryMetrics {
    fn default() -> Self {
        Self {
            operations_total: "lost_found_repository_operations_total",
            operation_duration: "lost_found_repository_operation_duration_seconds",
            items_fetched: "lost_found_items_fetched",
            uploads_total: "lost_found_image_uploads_total",
            errors_total: "lost_found_errors_total",
            last_listing_size: "lost_found_last_listing_size",
        }
    }
}

impl RepositoryMetrics {
    /// Record one repository call
    pub fn record_operation(&self, operation: &'static str, duration: Duration, success: bool) {
        let status = if success { "success" } else { "error" };
        counter!(self.operations_total, "operation" => operation, "status" => status).increment(1);
        histogram!(self.operation_duration, "operation" => operation).record(duration.as_secs_f64());

        if !success {
            counter!(self.errors_total, "operation" => operation).increment(1);
        }
    }

    /// Record how many items a listing returned before and after in-memory filtering
    pub fn record_listing(&self, operation: &'static str, fetched: usize, returned: usize) {
        histogram!(self.items_fetched, "operation" => operation, "stage" => "fetched").record(fetched as f64);
        histogram!(self.items_fetched, "operation" => operation, "stage" => "returned").record(returned as f64);
        gauge!(self.last_listing_size, "operation" => operation).set(returned as f64);
    }

    /// Record one image upload outcome
    pub fn record_upload(&self, success: bool) {
        let status = if success { "success" } else { "error" };
        counter!(self.uploads_total, "status" => status).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_names() {
        let metrics = RepositoryMetrics::default();
        assert_eq!(metrics.operations_total, "lost_found_repository_operations_total");
    }

    #[test]
    fn recording_without_a_recorder_is_a_no_op() {
        let metrics = RepositoryMetrics::default();
        metrics.record_operation("get_items", Duration::from_millis(5), true);
        metrics.record_listing("get_items", 10, 3);
        metrics.record_upload(false);
    }
}
