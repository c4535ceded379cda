//! # Crosschain Metrics
//!
//! Prometheus metrics for the CCTX lifecycle.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! cctx-core = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `cctx_created_total` - Counter of CCTXs constructed (by origin)
//! - `cctx_forced_aborts_total` - Counter of illegal transitions forced to Aborted
//! - `cctx_refunds_total` - Counter of aborted CCTXs refunded
//! - `cctx_throttled_total` - Counter of inbounds held back by the rate limiter
//! - `cctx_sweep_removed_total` - Counter of sweep removals (by reason)
//! - `cctx_tracker_rejections_total` - Counter of hashes refused by a full tracker

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// CCTXs constructed, labeled by origin
    pub static ref CCTX_CREATED: IntCounterVec = register_int_counter_vec!(
        "cctx_created_total",
        "Total number of CCTXs constructed",
        &["origin"]
    )
    .expect("Failed to create CCTX_CREATED metric");

    /// Illegal transitions forced to Aborted
    pub static ref FORCED_ABORTS: IntCounter = register_int_counter!(
        "cctx_forced_aborts_total",
        "Total number of illegal status transitions forced to Aborted"
    )
    .expect("Failed to create FORCED_ABORTS metric");

    /// Aborted CCTXs refunded
    pub static ref REFUNDS: IntCounter = register_int_counter!(
        "cctx_refunds_total",
        "Total number of aborted CCTXs refunded"
    )
    .expect("Failed to create REFUNDS metric");

    /// Inbounds held back by the rate limiter
    pub static ref THROTTLED: IntCounter = register_int_counter!(
        "cctx_throttled_total",
        "Total number of inbound CCTXs throttled by the rate limiter"
    )
    .expect("Failed to create THROTTLED metric");

    /// Sweep removals, labeled by reason
    pub static ref SWEEP_REMOVED: IntCounterVec = register_int_counter_vec!(
        "cctx_sweep_removed_total",
        "Total number of entries removed by the expiry sweep",
        &["reason"]
    )
    .expect("Failed to create SWEEP_REMOVED metric");

    /// Hashes refused by a full tracker
    pub static ref TRACKER_REJECTIONS: IntCounter = register_int_counter!(
        "cctx_tracker_rejections_total",
        "Total number of outbound hashes refused by a full tracker"
    )
    .expect("Failed to create TRACKER_REJECTIONS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a CCTX constructed ("inbound" or "command")
#[cfg(feature = "metrics")]
pub fn record_cctx_created(origin: &str) {
    CCTX_CREATED.with_label_values(&[origin]).inc();
}

/// Record an illegal transition forced to Aborted
#[cfg(feature = "metrics")]
pub fn record_forced_abort() {
    FORCED_ABORTS.inc();
}

/// Record a refund
#[cfg(feature = "metrics")]
pub fn record_refund() {
    REFUNDS.inc();
}

/// Record a throttled inbound
#[cfg(feature = "metrics")]
pub fn record_throttled() {
    THROTTLED.inc();
}

/// Record sweep removals with reason
#[cfg(feature = "metrics")]
pub fn record_sweep_removed(reason: &str, count: usize) {
    SWEEP_REMOVED
        .with_label_values(&[reason])
        .inc_by(count as u64);
}

/// Record a hash refused by a full tracker
#[cfg(feature = "metrics")]
pub fn record_tracker_rejection() {
    TRACKER_REJECTIONS.inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_cctx_created(_origin: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_forced_abort() {}

#[cfg(not(feature = "metrics"))]
pub fn record_refund() {}

#[cfg(not(feature = "metrics"))]
pub fn record_throttled() {}

#[cfg(not(feature = "metrics"))]
pub fn record_sweep_removed(_reason: &str, _count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_tracker_rejection() {}
