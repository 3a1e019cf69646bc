// Report rendering for analysis results

use colored::{ColoredString, Colorize};
use scamsaver_analyzer::{AnalysisResult, Severity};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const THIN_RULE: &str = "────────────────────────────────────────────────────────────────────────────────";
const SOURCE_TITLE_LIMIT: usize = 30;
const NO_RISKS: &str = "No critical security vulnerabilities detected.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

/// Gauge band for a trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustBand {
    Trusted,
    Caution,
    Risky,
    Danger,
}

impl TrustBand {
    pub fn for_score(score: u8) -> Self {
        match score {
            80.. => TrustBand::Trusted,
            50..=79 => TrustBand::Caution,
            30..=49 => TrustBand::Risky,
            _ => TrustBand::Danger,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrustBand::Trusted => "Trusted",
            TrustBand::Caution => "Caution",
            TrustBand::Risky => "Risky",
            TrustBand::Danger => "Danger",
        }
    }

    pub fn paint(&self, text: &str) -> ColoredString {
        match self {
            TrustBand::Trusted => text.green().bold(),
            TrustBand::Caution => text.yellow().bold(),
            TrustBand::Risky => text.truecolor(249, 115, 22).bold(),
            TrustBand::Danger => text.red().bold(),
        }
    }
}

/// Verdict badges are green above 70, red otherwise.
pub fn verdict_is_favourable(score: u8) -> bool {
    score > 70
}

pub fn paint_severity(severity: Severity) -> ColoredString {
    let label = severity.as_str().to_uppercase();
    match severity {
        Severity::High => label.red().bold(),
        Severity::Medium => label.yellow().bold(),
        Severity::Low => label.blue(),
    }
}

/// Best-effort host label for headings. Falls back to the raw input.
pub fn display_host(input: &str) -> String {
    let trimmed = input.trim();
    let parsed = Url::parse(trimmed)
        .ok()
        .filter(|u| u.host_str().is_some())
        .or_else(|| Url::parse(&format!("https://{}", trimmed)).ok());

    parsed
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| trimmed.to_string())
}

/// Shorten `title` to `limit` characters, appending `...` when cut.
pub fn truncate_title(title: &str, limit: usize) -> String {
    if title.chars().count() > limit {
        let cut: String = title.chars().take(limit).collect();
        format!("{}...", cut)
    } else {
        title.to_string()
    }
}

pub fn render_report(result: &AnalysisResult, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(result)),
        ReportFormat::Json => generate_json_report(result),
        ReportFormat::Markdown => Ok(generate_markdown_report(result)),
    }
}

pub fn generate_text_report(result: &AnalysisResult) -> String {
    let mut report = String::new();
    let band = TrustBand::for_score(result.trust_score);

    report.push_str(RULE);
    report.push('\n');
    report.push_str("                         SCAM SAVER TRUST REPORT\n");
    report.push_str(RULE);
    report.push_str("\n\n");

    report.push_str(&format!("Target:       {}\n", result.url));
    report.push_str(&format!("Host:         {}\n", display_host(&result.url)));
    report.push_str(&format!("Generated:    {}\n\n", generated_at()));

    report.push_str(&format!(
        "Trust Score:  {}% ({})\n",
        result.trust_score,
        band.label()
    ));
    report.push_str(&format!("Verdict:      {}\n\n", result.verdict.as_str().to_uppercase()));

    section(&mut report, "SUMMARY");
    report.push_str(&wrap_text(&result.summary, 80, "  "));
    report.push_str("\n\n");

    section(&mut report, "INFRASTRUCTURE DETAILS");
    let details = &result.site_details;
    report.push_str(&format!("Domain Longevity:   {}\n", details.domain_age));
    report.push_str(&format!("Encryption (SSL):   {}\n", details.ssl_status));
    report.push_str(&format!("Global Rank:        {}\n", details.popularity));
    report.push_str(&format!("Server Node:        {}\n", details.server_location));
    report.push_str(&format!("Owner:              {}\n\n", details.owner_info));

    section(&mut report, "SAFE-SEARCH ADVICE");
    report.push_str(&wrap_text(&result.recommendation, 80, "  "));
    report.push_str("\n\n");

    section(&mut report, "IDENTIFIED RISKS");
    if result.risk_factors.is_empty() {
        report.push_str(NO_RISKS);
        report.push_str("\n\n");
    } else {
        for (idx, factor) in result.risk_factors.iter().enumerate() {
            report.push_str(&format!("[{}] {}\n", idx + 1, factor.title));
            report.push_str(&format!("Severity:     {}\n", factor.severity.as_str().to_uppercase()));
            report.push_str(&wrap_text(&factor.description, 80, "  "));
            report.push_str("\n\n");
            report.push_str(THIN_RULE);
            report.push_str("\n\n");
        }
    }

    if result.has_sources() {
        section(&mut report, "VERIFICATION SOURCES (LIVE WEB DATA)");
        for source in result.sources() {
            report.push_str(&format!(
                "  • {}  {}\n",
                truncate_title(&source.title, SOURCE_TITLE_LIMIT),
                source.uri
            ));
        }
        report.push('\n');
    }

    report.push_str(RULE);
    report.push('\n');
    report.push_str("                  Scan processed via live web grounding\n");
    report.push_str(RULE);
    report.push('\n');

    report
}

pub fn generate_json_report(result: &AnalysisResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

pub fn generate_markdown_report(result: &AnalysisResult) -> String {
    let mut md = String::new();
    let band = TrustBand::for_score(result.trust_score);

    md.push_str(&format!(
        "# Trust Report: {}\n\n",
        escape_markdown(&display_host(&result.url))
    ));
    md.push_str(&format!("_Generated {}_\n\n", generated_at()));
    md.push_str("| | |\n|---|---|\n");
    md.push_str(&format!("| **Target** | {} |\n", escape_markdown(&result.url)));
    md.push_str(&format!(
        "| **Trust Score** | {}% ({}) |\n",
        result.trust_score,
        band.label()
    ));
    md.push_str(&format!("| **Verdict** | {} |\n\n", result.verdict));

    md.push_str("## Summary\n\n");
    md.push_str(&escape_markdown(&result.summary));
    md.push_str("\n\n");

    let details = &result.site_details;
    md.push_str("## Infrastructure Details\n\n");
    md.push_str(&format!("- **Domain Longevity:** {}\n", escape_markdown(&details.domain_age)));
    md.push_str(&format!("- **Encryption (SSL):** {}\n", escape_markdown(&details.ssl_status)));
    md.push_str(&format!("- **Global Rank:** {}\n", escape_markdown(&details.popularity)));
    md.push_str(&format!("- **Server Node:** {}\n", escape_markdown(&details.server_location)));
    md.push_str(&format!("- **Owner:** {}\n\n", escape_markdown(&details.owner_info)));

    md.push_str("## Safe-Search Advice\n\n");
    md.push_str(&escape_markdown(&result.recommendation));
    md.push_str("\n\n");

    md.push_str("## Identified Risks\n\n");
    if result.risk_factors.is_empty() {
        md.push_str(&format!("_{}_\n\n", NO_RISKS));
    } else {
        for factor in &result.risk_factors {
            md.push_str(&format!(
                "### {} `{}`\n\n{}\n\n",
                escape_markdown(&factor.title),
                factor.severity.as_str().to_uppercase(),
                escape_markdown(&factor.description)
            ));
        }
    }

    if result.has_sources() {
        md.push_str("## Verification Sources\n\n");
        for source in result.sources() {
            md.push_str(&format!(
                "- [{}]({})\n",
                escape_markdown(&truncate_title(&source.title, SOURCE_TITLE_LIMIT)),
                markdown_link_target(&source.uri)
            ));
        }
        md.push('\n');
    }

    md
}

pub fn write_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn section(report: &mut String, title: &str) {
    report.push_str(RULE);
    report.push('\n');
    report.push_str(title);
    report.push('\n');
    report.push_str(RULE);
    report.push_str("\n\n");
}

/// Backslash-escape characters that would open inline Markdown markup or break a table cell.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '`' | '*' | '_' | '[' | ']' | '(' | ')' | '<' | '>' | '|' | '#' | '!'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Percent-encode the characters that end or split a Markdown link destination.
pub fn markdown_link_target(uri: &str) -> String {
    let mut target = String::with_capacity(uri.len());
    for c in uri.trim().chars() {
        match c {
            ' ' => target.push_str("%20"),
            '(' => target.push_str("%28"),
            ')' => target.push_str("%29"),
            '<' => target.push_str("%3C"),
            '>' => target.push_str("%3E"),
            _ => target.push(c),
        }
    }
    target
}

fn generated_at() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if !current_line.is_empty() && current_line.len() + word.len() + 1 > width - indent.len() {
            lines.push(format!("{}{}", indent, current_line));
            current_line.clear();
        }
        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        lines.push(format!("{}{}", indent, current_line));
    }

    lines.join("\n")
}
