//! API layer
//!
//! HTTP handlers for:
//! - Performance data (sync + query)
//! - Metrics (Prometheus)

mod data;
mod dto;
pub mod metrics;

pub use dto::*;

pub use data::data_router;
pub use metrics::metrics_router;
