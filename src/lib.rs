//! # Griddle
//!
//! Query translation, multi-site search fan-out, and analytics engine for
//! [Pleasanter](https://pleasanter.org)-compatible issue trackers.
//!
//! Griddle turns typed filter descriptions into the tracker's native view
//! grammar, runs one logical query across many sites concurrently with
//! per-site failure isolation, and post-processes the returned records into
//! grouped aggregates and calendar-bucketed trend series. It holds no state
//! between calls and caches nothing.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use griddle::engine::StatusSummaryParams;
//! use griddle::{Engine, ServiceConfig};
//!
//! # async fn demo() -> griddle::Result<()> {
//! let config = ServiceConfig::new("https://tracker.example.com", "api-key");
//! let engine = Engine::from_config(config);
//!
//! let summary = engine
//!     .status_summary(StatusSummaryParams { site_id: 10, group_by: None })
//!     .await?;
//! println!("{} items in {} groups", summary.total_items, summary.group_count);
//! # Ok(())
//! # }
//! ```
//!
//! ## Typed filters
//!
//! ```rust
//! use griddle::query::{DateRange, FilterSpec, NumericRange};
//!
//! let mut spec = FilterSpec::default();
//! spec.filters.insert("Status".into(), "100|200|300".into());
//! spec.date_ranges.insert("StartTime".into(), DateRange::since("2024-01-01"));
//! spec.numeric_ranges.insert("ProgressRate".into(), NumericRange::at_least(50.0));
//!
//! let view = spec.build_view();
//! assert_eq!(
//!     view.column_filter_expressions.unwrap()["ProgressRate"],
//!     ">=[ProgressRate]>=50"
//! );
//! ```

pub mod analytics;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod query;
pub mod search;
pub mod types;

pub use client::TrackerClient;
pub use config::ServiceConfig;
pub use engine::Engine;
pub use error::{GriddleError, Result};
pub use types::*;

/// Install a process-wide tracing subscriber honoring `RUST_LOG`.
///
/// Convenience for binaries and examples; calling it twice is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
