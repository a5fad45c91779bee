//! Metrics recording helpers.

use std::time::Duration;

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::types::ParsedIngredient;

/// Initialize metrics collection with a Prometheus recorder
///
/// Installs the global recorder; call once per process. The returned handle
/// renders the current metrics in Prometheus text format.
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    tracing::info!("Metrics collection initialized");
    Ok(handle)
}

/// Record metrics for one parsed ingredient line
pub fn record_line_parse_metrics(duration: Duration, parsed: &ParsedIngredient) {
    metrics::counter!(
        "ingredient_lines_parsed_total",
        "amount" => parsed.statuses.amount.as_str(),
        "unit" => parsed.statuses.unit.as_str(),
        "ingredient" => parsed.statuses.ingredient.as_str()
    )
    .increment(1);
    metrics::histogram!("ingredient_line_parse_duration_seconds").record(duration.as_secs_f64());
    metrics::histogram!("ingredient_line_confidence").record(parsed.confidence);
}

/// Record metrics for one segmented ingredient block
pub fn record_segmentation_metrics(duration: Duration, text_length: usize, segments: usize) {
    metrics::counter!("ingredient_blocks_segmented_total").increment(1);
    metrics::histogram!("ingredient_block_segmentation_duration_seconds")
        .record(duration.as_secs_f64());
    metrics::histogram!("ingredient_block_length_chars").record(text_length as f64);
    metrics::histogram!("ingredient_block_segments").record(segments as f64);
}

/// Record metrics for a master data build
pub fn record_master_data_build_metrics(
    duration: Duration,
    recipes: usize,
    units: usize,
    ingredients: usize,
    mined: usize,
) {
    metrics::counter!("master_data_builds_total").increment(1);
    metrics::histogram!("master_data_build_duration_seconds").record(duration.as_secs_f64());
    metrics::gauge!("master_data_recipes").set(recipes as f64);
    metrics::gauge!("master_data_units").set(units as f64);
    metrics::gauge!("master_data_ingredients").set(ingredients as f64);
    metrics::gauge!("master_data_mined_ingredients").set(mined as f64);
}

/// Record a master data cache lookup
pub fn record_master_data_cache_metrics(hit: bool) {
    if hit {
        metrics::counter!("master_data_cache_hits_total").increment(1);
    } else {
        metrics::counter!("master_data_cache_misses_total").increment(1);
    }
}
