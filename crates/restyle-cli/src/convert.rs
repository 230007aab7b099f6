//! `restyle convert`: run one text through the open pipeline.

use anyhow::Result;
use axum::http::Method;
use serde_json::json;

use restyle_core::config::Config;
use restyle_handler::ConvertPipeline;
use restyle_providers::create_provider;

use crate::helpers;

pub async fn run(config: &Config, text: &str, style: Option<&str>) -> Result<()> {
    let generator = create_provider(&config.provider, &config.providers)
        .map_err(|e| anyhow::anyhow!(e))?;
    let pipeline = ConvertPipeline::new(generator, config.conversion.clone());

    let body = serde_json::to_vec(&json!({ "text": text, "style": style }))?;
    let reply = pipeline.handle(&Method::POST, None, &body).await;

    let Some(envelope) = reply.envelope else {
        anyhow::bail!("empty reply (HTTP {})", reply.status);
    };
    if !envelope.success {
        anyhow::bail!(
            "{} [{}]",
            envelope.error.as_deref().unwrap_or("conversion failed"),
            envelope.code.as_deref().unwrap_or("UNKNOWN_ERROR")
        );
    }

    helpers::print_conversion(&envelope);
    Ok(())
}
