// Strict decoding of the JSON document the model writes as its answer

use crate::error::{AnalysisError, Result};
use crate::result::{AnalysisResult, GroundingSource, RiskFactor, SiteDetails, Verdict};
use serde::Deserialize;

/// Shape the model must produce. Every field is required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalysisPayload {
    pub trust_score: f64,
    pub verdict: Verdict,
    pub summary: String,
    pub risk_factors: Vec<RiskFactor>,
    pub site_details: SiteDetails,
    pub recommendation: String,
}

impl AnalysisPayload {
    pub fn parse(text: &str) -> Result<Self> {
        let payload: AnalysisPayload = serde_json::from_str(text.trim())?;
        payload.validate()?;
        Ok(payload)
    }

    fn validate(&self) -> Result<()> {
        if !self.trust_score.is_finite() || !(0.0..=100.0).contains(&self.trust_score) {
            return Err(AnalysisError::SchemaViolation(format!(
                "trustScore {} is outside 0-100",
                self.trust_score
            )));
        }
        Ok(())
    }

    /// Merge with the caller's URL and the grounding sources.
    /// The URL given by the caller is authoritative.
    pub fn into_result(self, url: &str, sources: Vec<GroundingSource>) -> AnalysisResult {
        AnalysisResult {
            url: url.to_string(),
            trust_score: self.trust_score.round() as u8,
            verdict: self.verdict,
            summary: self.summary,
            risk_factors: self.risk_factors,
            site_details: self.site_details,
            recommendation: self.recommendation,
            sources: if sources.is_empty() { None } else { Some(sources) },
        }
    }
}
