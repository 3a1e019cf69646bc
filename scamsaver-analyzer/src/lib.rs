pub mod client;
pub mod config;
pub mod error;
pub mod gemini;
mod payload;
pub mod result;

pub use client::AnalysisClient;
pub use config::AnalyzerConfig;
pub use error::{AnalysisError, USER_FACING_FAILURE};
pub use result::{AnalysisResult, GroundingSource, RiskFactor, Severity, SiteDetails, Verdict};
