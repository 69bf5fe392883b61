use std::time::Duration;

use metrics::{counter, gauge, histogram};

use crate::models::{AnalyticsSummary, SentimentVerdict};

/// Metric names and recording helpers.
///
/// Everything goes through the `metrics` facade. The embedding process installs
/// the exporter; with none installed every call is a no-op.
#[derive(Debug, Clone, Copy)]
pub struct MetricsCollector {
    // Storage metrics
    pub db_operations_total: &'static str,
    pub db_operation_duration: &'static str,

    // Classification metrics
    pub classifications_total: &'static str,
    pub classification_duration: &'static str,
    pub classification_fallbacks_total: &'static str,
    pub classifier_available: &'static str,

    // Analytics metrics
    pub analytics_requests_total: &'static str,
    pub analytics_review_set_size: &'static str,

    // Error metrics
    pub errors_total: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            db_operations_total: "review_sentiment_db_operations_total",
            db_operation_duration: "review_sentiment_db_operation_duration_seconds",

            classifications_total: "review_sentiment_classifications_total",
            classification_duration: "review_sentiment_classification_duration_seconds",
            classification_fallbacks_total: "review_sentiment_classification_fallbacks_total",
            classifier_available: "review_sentiment_classifier_available",

            analytics_requests_total: "review_sentiment_analytics_requests_total",
            analytics_review_set_size: "review_sentiment_analytics_review_set_size",

            errors_total: "review_sentiment_errors_total",
        }
    }
}

impl MetricsCollector {
    /// Record database operation metrics
    pub fn record_db_operation(&self, operation: &'static str, duration: Duration, success: bool) {
        let status = if success { "success" } else { "error" };

        counter!(self.db_operations_total, "operation" => operation, "status" => status).increment(1);
        histogram!(self.db_operation_duration, "operation" => operation).record(duration.as_secs_f64());

        if !success {
            self.record_error("database", operation);
        }
    }

    /// Record a verdict produced by the classifier
    pub fn record_classification(&self, verdict: &SentimentVerdict, duration: Duration) {
        let outcome = if verdict.is_fallback() { "fallback" } else { "ok" };

        counter!(
            self.classifications_total,
            "label" => verdict.label.as_str(),
            "outcome" => outcome
        )
        .increment(1);
        histogram!(self.classification_duration).record(duration.as_secs_f64());
    }

    /// Record why a classification fell back to the neutral verdict
    pub fn record_fallback(&self, reason: &'static str) {
        counter!(self.classification_fallbacks_total, "reason" => reason).increment(1);
    }

    /// Publish whether an inference backend is loaded
    pub fn set_classifier_available(&self, available: bool) {
        gauge!(self.classifier_available).set(if available { 1.0 } else { 0.0 });
    }

    /// Record an analytics computation
    pub fn record_analytics(&self, summary: &AnalyticsSummary) {
        counter!(self.analytics_requests_total).increment(1);
        histogram!(self.analytics_review_set_size).record(summary.total_reviews as f64);
    }

    /// Record error metrics
    pub fn record_error(&self, error_type: &'static str, operation: &'static str) {
        counter!(self.errors_total, "type" => error_type, "operation" => operation).increment(1);
    }
}

/// Performance timing wrapper for storage metrics
pub struct MetricsTimer {
    collector: MetricsCollector,
    operation: &'static str,
    start: std::time::Instant,
}

impl MetricsTimer {
    #[must_use]
    pub fn new(collector: MetricsCollector, operation: &'static str) -> Self {
        Self {
            collector,
            operation,
            start: std::time::Instant::now(),
        }
    }

    pub fn finish(self, success: bool) {
        let duration = self.start.elapsed();
        self.collector.record_db_operation(self.operation, duration, success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentLabel;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::default();
        assert_eq!(collector.classifications_total, "review_sentiment_classifications_total");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let collector = MetricsCollector::default();
        collector.record_classification(
            &SentimentVerdict {
                score: 0.7,
                label: SentimentLabel::Positive,
            },
            Duration::from_millis(3),
        );
        collector.record_fallback("model_unavailable");
        collector.set_classifier_available(false);
        collector.record_analytics(&AnalyticsSummary::default());
        MetricsTimer::new(collector, "get_review").finish(true);
    }
}
