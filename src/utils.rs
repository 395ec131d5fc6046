use std::time::{Duration, Instant};

/// Format a `Duration` with automatic unit scaling, e.g. `1.94ms` or `2.34s`.
pub fn fmt_duration(d: Duration) -> String {
    format!("{d:.2?}")
}

/// Time elapsed since `started`, warning under `operation` when it exceeds `threshold`.
pub fn elapsed_warn_slow(operation: &'static str, started: Instant, threshold: Duration) -> Duration {
    let elapsed = started.elapsed();
    if elapsed > threshold {
        tracing::warn!(
            operation,
            duration = fmt_duration(elapsed),
            threshold = fmt_duration(threshold),
            "slow operation"
        );
    }
    elapsed
}
