use crate::CLAP_STYLING;
use clap::{arg, command};
use scamsaver_analyzer::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("scamsaver")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("scamsaver")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Show debug logging on stderr")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(--"api-key" <KEY>)
                .required(false)
                .help("API key for the Gemini API")
                .env("GEMINI_API_KEY")
                .hide_env_values(true)
                .global(true),
        )
        .arg(
            arg!(--"model" <MODEL>)
                .required(false)
                .help("Model used for the analysis")
                .default_value(DEFAULT_MODEL)
                .global(true),
        )
        .arg(
            arg!(--"endpoint" <URL>)
                .required(false)
                .help("Base URL of the Gemini API")
                .default_value(DEFAULT_BASE_URL)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(command!("ui").about("Launch the interactive terminal interface"))
        .subcommand(
            command!("scan")
                .about(
                    "Verify a website or domain using search-grounded AI analysis. Prints a \
                trust score, verdict and risk narrative.",
                )
                .arg(
                    arg!(<URL>)
                        .required(true)
                        .help("The URL or domain to verify (sent as typed)"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown")
                        .value_parser(["text", "json", "markdown", "md"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)"),
                )
                .arg(
                    arg!(--"no-animation")
                        .required(false)
                        .help("Do not show the scanning animation")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
