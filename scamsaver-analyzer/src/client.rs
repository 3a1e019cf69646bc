use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, Result};
use crate::gemini::{GenerateContentRequest, GenerateContentResponse};
use crate::payload::AnalysisPayload;
use crate::result::AnalysisResult;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, info};

/// Build the instruction sent to the model for `url`.
pub fn build_instruction(url: &str) -> String {
    format!(
        "Act as a world-class cybersecurity expert. Perform an authentic deep-scan of the URL: {url}.\n\
         Search for scam reports, phishing alerts, domain history, and trust ratings across the web.\n\
         Cross-reference your findings to provide a 100% accurate security verdict."
    )
}

pub struct AnalysisClient {
    client: Client,
    config: AnalyzerConfig,
}

impl AnalysisClient {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(concat!("ScamSaver/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .tcp_keepalive(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| AnalysisError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a URL or domain. The input is forwarded verbatim.
    ///
    /// Makes exactly one request for non-empty input. Any transport, status,
    /// parse or schema problem fails the whole call.
    pub async fn analyze(&self, url: &str) -> Result<AnalysisResult> {
        if url.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        info!("Analyzing {} with {}", url, self.config.model);
        let start = Instant::now();

        let outcome = self.request(url).await;
        match &outcome {
            Ok(result) => info!(
                "Analysis of {} finished in {:?}: {} ({}/100, {} risk factors, {} sources)",
                url,
                start.elapsed(),
                result.verdict,
                result.trust_score,
                result.risk_factors.len(),
                result.sources().len()
            ),
            // Provider detail stays at debug; callers show the generic message
            Err(e) => debug!("Analysis of {} failed: {}", url, e),
        }
        outcome
    }

    async fn request(&self, url: &str) -> Result<AnalysisResult> {
        let endpoint = self.config.generate_content_url();
        let body = GenerateContentRequest::grounded_json(build_instruction(url));

        debug!("POST {}", endpoint);

        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AnalysisError::RequestFailure(format!(
                "provider returned {}: {}",
                status, text
            )));
        }

        let raw = response.text().await?;
        let response: GenerateContentResponse = serde_json::from_str(&raw)?;

        if let Some(reason) = response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            debug!("Finish reason: {}", reason);
        }

        let text = response.text().ok_or_else(|| {
            AnalysisError::SchemaViolation("response contained no text".to_string())
        })?;

        let payload = AnalysisPayload::parse(&text)?;
        let sources = response.grounding_sources();
        debug!("{} grounding sources", sources.len());

        Ok(payload.into_result(url, sources))
    }
}
