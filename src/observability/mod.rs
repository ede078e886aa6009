//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured, key/value fields)
//!     → metrics.rs (export/import counters and histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Library code only emits; the binary installs subscriber and exporter
//! - Metrics are cheap (facade no-ops until an exporter is installed)

pub mod logging;
pub mod metrics;
