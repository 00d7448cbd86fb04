use std::time::Duration;

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, TextEncoder};

static DISPATCH_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "chat_notification_dispatch_total",
            "Chat message notification invocations by outcome",
        ),
        &["outcome"],
    )
    .expect("failed to create chat_notification_dispatch_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register chat_notification_dispatch_total");
    counter
});

static DISPATCH_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let histogram = HistogramVec::new(
        HistogramOpts::new(
            "chat_notification_dispatch_duration_seconds",
            "End-to-end latency of one notification invocation",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["outcome"],
    )
    .expect("failed to create chat_notification_dispatch_duration_seconds");
    prometheus::default_registry()
        .register(Box::new(histogram.clone()))
        .expect("failed to register chat_notification_dispatch_duration_seconds");
    histogram
});

pub fn observe_dispatch(outcome: &str, elapsed: Duration) {
    DISPATCH_TOTAL.with_label_values(&[outcome]).inc();
    DISPATCH_DURATION_SECONDS
        .with_label_values(&[outcome])
        .observe(elapsed.as_secs_f64());
}

pub fn dispatch_count(outcome: &str) -> u64 {
    DISPATCH_TOTAL.with_label_values(&[outcome]).get()
}

pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
