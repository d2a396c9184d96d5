//! `askrelay serve`: start the HTTP API server.

use std::path::Path;

use tracing::info;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = port_override {
        info!(port, "Port overridden from the command line");
        config.gateway.port = port;
    }

    println!("askrelay gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Completion: {}", config.completion.provider);
    println!("   Search: {}", config.search.provider);

    askrelay_gateway::start(config).await?;

    Ok(())
}
