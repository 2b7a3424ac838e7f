//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! account / transaction / subscription / storage produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and histograms via the `metrics` facade)
//!
//! Consumers:
//!     → stderr (tracing-subscriber fmt layer)
//!     → whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Private keys, bearer tokens and signatures are never logged
//! - The library never installs a metrics exporter itself

pub mod logging;
pub mod metrics;
