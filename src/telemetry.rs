//! Telemetry metric name constants.
//!
//! Centralised metric names for petmatch operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `petmatch_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `service` — upstream service name (e.g. "listings", "completion")
//! - `operation` — operation invoked (e.g. "search", "recommend")
//! - `status` — outcome: "ok" or "error"
//! - `namespace` — cache namespace (e.g. "search", "ai_rec")

/// Total requests dispatched to upstream services.
///
/// Labels: `service`, `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "petmatch_requests_total";

/// Upstream request duration in seconds.
///
/// Labels: `service`, `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "petmatch_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `service`, `operation`.
pub const RETRIES_TOTAL: &str = "petmatch_retries_total";

/// Total cache hits.
///
/// Labels: `namespace`.
pub const CACHE_HITS_TOTAL: &str = "petmatch_cache_hits_total";

/// Total cache misses (absent, expired, or malformed entries).
///
/// Labels: `namespace`.
pub const CACHE_MISSES_TOTAL: &str = "petmatch_cache_misses_total";

/// Total cache writes swallowed due to storage failures.
///
/// Labels: `namespace`.
pub const CACHE_WRITE_FAILURES_TOTAL: &str = "petmatch_cache_write_failures_total";
