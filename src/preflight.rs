//! Startup checks for the backends the assistant cannot run without

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::Config;

/// Result of the startup checks
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreflightReport {
    /// Speech recognition service answered with 2xx/3xx
    pub asr_reachable: bool,
    pub asr_detail: String,

    /// Local model service answered its model listing
    pub llm_reachable: bool,
    pub models: Vec<String>,

    /// The configured model is among `models`
    pub model_available: bool,

    /// A legal knowledge credential is set
    pub legal_configured: bool,

    /// Cloud agent application id and credential are set
    pub agent_configured: bool,
}

impl PreflightReport {
    /// Recognition reachable and at least one local model installed.
    /// A missing legal credential only disables legal answers.
    pub fn is_ready(&self) -> bool {
        self.asr_reachable && self.llm_reachable && !self.models.is_empty()
    }
}

/// Probe every backend and log what was found
pub fn run(config: &Config) -> Result<PreflightReport> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.llm.probe_timeout_secs))
        .build()
        .context("Failed to build HTTP client for preflight")?;

    let mut report = PreflightReport::default();

    match probe_asr(&client, &config.asr.url) {
        Ok(detail) => {
            info!("Speech recognition online ({})", detail);
            report.asr_reachable = true;
            report.asr_detail = detail;
        }
        Err(e) => {
            error!("Speech recognition unreachable: {:#}", e);
            report.asr_detail = format!("{:#}", e);
        }
    }

    match probe_models(&client, &config.llm.tags_url) {
        Ok(models) => {
            report.llm_reachable = true;
            if models.is_empty() {
                warn!("No local models installed, pull one with: ollama pull {}", config.llm.model);
            } else {
                info!("Available models: {:?}", models);
            }
            report.models = models;
        }
        Err(e) => error!("Local model service unreachable: {:#}", e),
    }

    report.model_available = report.models.iter().any(|m| m == &config.llm.model);
    if report.llm_reachable && !report.models.is_empty() && !report.model_available {
        warn!("Configured model '{}' not found", config.llm.model);
    }

    report.legal_configured = config.legal.api_key().is_some();
    if !report.legal_configured {
        warn!(
            "{} is not set, legal questions will be declined",
            config.legal.api_key_env
        );
    }

    report.agent_configured = config.agent.is_configured();
    if report.agent_configured {
        info!("General questions go to cloud agent {}", config.agent.app_id);
    }

    Ok(report)
}

/// Service root of the recognition endpoint, e.g.
/// `http://host:7860/api/v1/asr` -> `http://host:7860/`
pub fn service_root(url: &str) -> Result<Url> {
    let url = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
    url.join("/")
        .with_context(|| format!("Cannot derive service root from {}", url))
}

/// Model names from an Ollama `/api/tags` payload
pub fn model_names(payload: &Value) -> Vec<String> {
    payload
        .get("models")
        .and_then(Value::as_array)
        .map(|models| {
            models
                .iter()
                .filter_map(|m| m.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn probe_asr(client: &Client, url: &str) -> Result<String> {
    let root = service_root(url)?;
    let response = client
        .get(root.clone())
        .send()
        .with_context(|| format!("GET {}", root))?;

    let status = response.status();
    if status.is_success() || status.is_redirection() {
        Ok(format!("HTTP {}", status.as_u16()))
    } else {
        anyhow::bail!("{} returned HTTP {}", root, status.as_u16())
    }
}

fn probe_models(client: &Client, tags_url: &str) -> Result<Vec<String>> {
    let response = client
        .get(tags_url)
        .send()
        .with_context(|| format!("GET {}", tags_url))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("{} returned HTTP {}", tags_url, status.as_u16());
    }

    let payload: Value = response.json().context("Model listing is not JSON")?;
    Ok(model_names(&payload))
}
