use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Overall label the provider assigns to a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Verdict {
    Safe,
    Suspicious,
    Dangerous,
    Neutral,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "Safe",
            Verdict::Suspicious => "Suspicious",
            Verdict::Dangerous => "Dangerous",
            Verdict::Neutral => "Neutral",
        }
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "safe" => Ok(Verdict::Safe),
            "suspicious" => Ok(Verdict::Suspicious),
            "dangerous" => Ok(Verdict::Dangerous),
            "neutral" => Ok(Verdict::Neutral),
            other => Err(format!("unknown verdict '{}'", other)),
        }
    }
}

impl TryFrom<String> for Verdict {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Verdict> for String {
    fn from(value: Verdict) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

/// Descriptive facts about the site. Free text as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDetails {
    pub domain_age: String,
    pub ssl_status: String,
    pub popularity: String,
    pub server_location: String,
    pub owner_info: String,
}

/// A web page the provider cited while grounding its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub url: String,
    pub trust_score: u8,
    pub verdict: Verdict,
    pub summary: String,
    pub risk_factors: Vec<RiskFactor>,
    pub site_details: SiteDetails,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<GroundingSource>>,
}

impl AnalysisResult {
    /// Grounding sources, with an absent list and an empty list both yielding `&[]`.
    pub fn sources(&self) -> &[GroundingSource] {
        self.sources.as_deref().unwrap_or_default()
    }

    pub fn has_sources(&self) -> bool {
        !self.sources().is_empty()
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.risk_factors.iter().map(|f| f.severity).max()
    }
}
