//! `askrelay models`: print the model catalog.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let default_model = config.completion.default_model.trim();
    let passthrough = config.passthrough_model();

    let width = config
        .models
        .iter()
        .map(|m| m.label.chars().count())
        .max()
        .unwrap_or(0);

    for model in &config.models {
        let mut notes = Vec::new();
        if model.value == default_model {
            notes.push("default");
        }
        if Some(model.value.as_str()) == passthrough {
            notes.push("search only");
        }

        let suffix = if notes.is_empty() {
            String::new()
        } else {
            format!("  ({})", notes.join(", "))
        };
        println!("  {:<width$}  {}{suffix}", model.label, model.value);
    }

    Ok(())
}
