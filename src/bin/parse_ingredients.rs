//! Parse an ingredient block from stdin and print the results as JSON.
//!
//! ```text
//! parse_ingredients [CORPUS_JSON] < ingredients.txt
//! ```
//!
//! `CORPUS_JSON` is an optional file holding `[{"name": ..., "ingredients": ...}]`
//! whose ingredient texts are mined into the master data.

use anyhow::{Context, Result};
use just_cocktails::cache::MasterDataCache;
use just_cocktails::config::ParserConfig;
use just_cocktails::errors::{error_logging, AppError};
use just_cocktails::observability;
use just_cocktails::observability_config::ObservabilityConfig;
use just_cocktails::vocabulary::BaseVocabulary;
use just_cocktails::{parse_ingredient_block, Recipe};
use std::io::Read;
use std::{env, fs, io};
use tracing::info;

fn load_corpus(path: &str) -> Result<Vec<Recipe>> {
    let content = fs::read_to_string(path).map_err(|e| {
        error_logging::log_filesystem_error(&e, "read_corpus", Some(path));
        AppError::FileSystem(format!("cannot read '{}': {}", path, e))
    })?;
    let corpus: Vec<Recipe> = serde_json::from_str(&content)
        .map_err(AppError::from)
        .with_context(|| format!("invalid recipe corpus in '{}'", path))?;
    Ok(corpus)
}

fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    let observability_config = ObservabilityConfig::from_env();
    observability_config
        .validate()
        .map_err(AppError::Config)?;
    observability::init_tracing(&observability_config)?;
    let metrics_handle = observability::init_metrics()?;

    let config = ParserConfig::from_env();
    if let Err(e) = config.validate() {
        error_logging::log_config_error(&e, "PARSER_CONFIG", "validate");
        return Err(e.into());
    }
    info!(config = %config.summary(), "Parser configuration loaded");

    let corpus = match env::args().nth(1) {
        Some(path) => load_corpus(&path)?,
        None => Vec::new(),
    };

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read ingredient text from stdin")?;

    let cache = MasterDataCache::with_config(BaseVocabulary::from_config(&config), config);
    let master_data = cache.get_or_build(&corpus);

    let parsed = {
        let _span = observability::parse_span("parse_block", input.len()).entered();
        parse_ingredient_block(&input, &master_data)
    };
    info!(recipes = corpus.len(), lines = parsed.len(), "Parsed ingredient block");

    println!("{}", serde_json::to_string_pretty(&parsed)?);

    if env::var("PRINT_METRICS").is_ok_and(|v| v == "true") {
        eprintln!("{}", metrics_handle.render());
    }

    Ok(())
}
