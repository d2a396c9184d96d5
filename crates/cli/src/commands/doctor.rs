//! `askrelay doctor`: diagnose configuration and credentials.

use std::path::Path;

use askrelay_config::{AppConfig, SearchBackend, SearchConfig};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("askrelay doctor");
    println!("===============\n");

    let mut issues = 0;

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
    if path.exists() {
        println!("  ok    Config file: {}", path.display());
    } else {
        println!("  info  No config file at {}, using defaults", path.display());
    }

    let config = match super::load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("  FAIL  {e}");
            return Ok(());
        }
    };

    match config.completion_readiness() {
        Ok(()) => println!(
            "  ok    Completion: {} / {}",
            config.completion.provider, config.completion.default_model
        ),
        Err(e) => {
            println!("  FAIL  Completion: {e}");
            issues += 1;
        }
    }

    let search = &config.search;
    if search.provider == SearchBackend::None {
        println!("  info  Search: disabled");
    } else if search_ready(search) {
        println!("  ok    Search: {}", search.provider);
    } else {
        println!(
            "  warn  Search: {} has no credentials, fresh queries go unaugmented",
            search.provider
        );
        issues += 1;
    }

    let deep_needed = config.augment.deep_search || config.passthrough_model().is_some();
    if deep_needed && !is_set(&search.deepseek.api_key) {
        println!("  warn  DeepSeek: no DEEPSEEK_API_KEY, deep search and passthrough will fail");
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// A credential that is present and not blank.
fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn search_ready(search: &SearchConfig) -> bool {
    match search.provider {
        SearchBackend::Bing => is_set(&search.bing.api_key),
        SearchBackend::Google => is_set(&search.google.api_key) && is_set(&search.google.cse_id),
        SearchBackend::DeepSeek => is_set(&search.deepseek.api_key),
        SearchBackend::None => true,
    }
}
