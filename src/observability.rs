//! Observability module for tracing and metrics setup.
//!
//! This module provides:
//! - Structured logging with configurable levels and formats
//! - Metrics collection with an in-process Prometheus recorder
//! - Recording helpers for parsing, segmentation and master data builds

mod metrics;
mod tracing_mod;

pub use self::metrics::{
    init_metrics, record_line_parse_metrics, record_master_data_build_metrics,
    record_master_data_cache_metrics, record_segmentation_metrics,
};
pub use self::tracing_mod::{init_tracing, parse_span};
