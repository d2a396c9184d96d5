//! `askrelay ask`: one question through the same pipeline the gateway runs.

use std::path::Path;
use std::sync::Arc;

use askrelay_agent::AskRequest;
use askrelay_core::message::Message;
use tracing::debug;

pub async fn run(
    config_path: Option<&Path>,
    text: String,
    model: Option<String>,
    timezone: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let pipeline = askrelay_gateway::build_pipeline(Arc::new(config))?;

    let request = AskRequest {
        messages: vec![Message::user(text)],
        model,
        timezone,
    };

    debug!(
        provider = %pipeline.config().completion.provider,
        "Dispatching one-shot question"
    );
    let reply = pipeline.ask(request).await?;
    println!("{reply}");

    Ok(())
}
