use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use scamsaver_analyzer::{AnalysisClient, AnalysisResult, AnalyzerConfig, USER_FACING_FAILURE};
use scamsaver_core::animation::{PROGRESS_TICK, frame_at};
use scamsaver_core::report::{
    ReportFormat, TrustBand, display_host, paint_severity, render_report, verdict_is_favourable,
    write_report,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::Level;

// Helper functions for the scan handler

/// Build the analyzer configuration from resolved command-line values.
pub fn build_config(
    api_key: Option<&String>,
    model: &str,
    endpoint: &str,
) -> Result<AnalyzerConfig, String> {
    let api_key = api_key
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| "No API key configured. Pass --api-key or set GEMINI_API_KEY".to_string())?;

    let config = AnalyzerConfig::new(api_key)
        .with_model(model)
        .with_base_url(endpoint);
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Reject an empty scan target with the same message as any other failed analysis.
pub fn require_target(url: &str) -> Result<&str, String> {
    if url.trim().is_empty() {
        Err(USER_FACING_FAILURE.to_string())
    } else {
        Ok(url)
    }
}

/// Expand `~` in a user-supplied output path
pub fn resolve_output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Write the rendered report to `output`, or print it when no path is given
pub fn emit_report(content: &str, output: Option<&PathBuf>) -> Result<(), String> {
    match output {
        Some(path) => write_report(content, path)
            .map_err(|e| format!("Failed to write report to {}: {}", path.display(), e)),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

fn config_from_matches(args: &ArgMatches) -> AnalyzerConfig {
    let api_key = args.get_one::<String>("api-key");
    let model = args
        .get_one::<String>("model")
        .map(String::as_str)
        .unwrap_or(scamsaver_analyzer::config::DEFAULT_MODEL);
    let endpoint = args
        .get_one::<String>("endpoint")
        .map(String::as_str)
        .unwrap_or(scamsaver_analyzer::config::DEFAULT_BASE_URL);

    match build_config(api_key, model, endpoint) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_red().bold());
}

/// Drive the cosmetic scan animation until aborted. It never looks at the request.
fn start_scan_animation() -> (ProgressBar, JoinHandle<()>) {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.red} [{bar:30.red/white}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    let bar = pb.clone();
    let handle = tokio::spawn(async move {
        let started = Instant::now();
        loop {
            let frame = frame_at(started.elapsed());
            bar.set_position(frame.percent());
            bar.set_message(frame.label);
            tokio::time::sleep(PROGRESS_TICK).await;
        }
    });

    (pb, handle)
}

fn print_summary(result: &AnalysisResult) {
    let band = TrustBand::for_score(result.trust_score);
    let verdict = result.verdict.as_str().to_uppercase();
    let badge = if verdict_is_favourable(result.trust_score) {
        verdict.on_green().white().bold()
    } else {
        verdict.on_red().white().bold()
    };

    println!();
    print_divider();
    println!(
        "  {}  {}",
        band.paint(&format!("{}% Trust", result.trust_score)),
        badge
    );
    println!(
        "  {} {}",
        "Official report for:".bright_black(),
        display_host(&result.url).bright_white()
    );
    print_divider();

    if let Some(severity) = result.highest_severity() {
        println!(
            "{} {} risk factor(s), highest severity {}",
            "⚠".yellow().bold(),
            result.risk_factors.len(),
            paint_severity(severity)
        );
    }
    if result.has_sources() {
        println!(
            "{} {} verification source(s) from live web data",
            "ℹ".blue(),
            result.sources().len()
        );
    }
    println!();
}

pub async fn handle_scan(sub_matches: &ArgMatches) {
    init_logging(sub_matches.get_flag("verbose"));

    let config = config_from_matches(sub_matches);
    let url = sub_matches
        .get_one::<String>("URL")
        .cloned()
        .unwrap_or_default();
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = sub_matches
        .get_one::<String>("output")
        .map(|p| resolve_output_path(p));
    let animate = !sub_matches.get_flag("no-animation");

    let client = match AnalysisClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = require_target(&url) {
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }

    println!("\n🛡  Verifying {}\n", url.bright_white().bold());

    let animation = animate.then(start_scan_animation);
    let outcome = client.analyze(&url).await;
    if let Some((pb, handle)) = animation {
        handle.abort();
        pb.finish_and_clear();
    }

    let result = match outcome {
        Ok(result) => result,
        Err(_) => {
            eprintln!("{} {}", "✗".red().bold(), USER_FACING_FAILURE);
            std::process::exit(1);
        }
    };

    if format == ReportFormat::Text {
        print_summary(&result);
    }

    let report = match render_report(&result, format) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} Failed to render report: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = emit_report(&report, output.as_ref()) {
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }

    if let Some(path) = output {
        println!(
            "{} Report saved: {}",
            "✓".green().bold(),
            path.display().to_string().bright_white()
        );
    }
}

pub fn handle_ui(args: &ArgMatches) {
    let client = match AnalysisClient::new(config_from_matches(args)) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = tokio::task::block_in_place(|| scamsaver_tui::run(client)) {
        eprintln!("Error running TUI: {}", e);
        std::process::exit(1);
    }
}
