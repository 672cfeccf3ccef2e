//! # ollama-smoke
//!
//! Runs the built-in scenarios against the configured chat-completion server.
//! Exit status: 0 when the run completes, 1 on network, decode or
//! configuration failure, 2 when `--strict` is set and a check failed.

use std::process::ExitCode;

use ollama_smoke::scenario::{self, SuiteSummary};
use ollama_smoke::{Config, SmokeClient};
use tracing::{error, info};

async fn run(config: &Config) -> ollama_smoke::Result<SuiteSummary> {
    let scenarios = scenario::select_scenarios(&config.scenarios)?;
    let client = SmokeClient::new(config)?;
    scenario::run_scenarios(&client, &scenarios).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Config::parse_args();

    info!("Base URL: {}", config.display_base_url());
    info!("Model: {}", config.model);

    match run(&config).await {
        Ok(summary) if config.strict && !summary.all_passed() => {
            error!(failed = summary.failed_checks(), "checks failed in strict mode");
            ExitCode::from(2)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("Smoke test failed: {}", err);
            ExitCode::FAILURE
        }
    }
}
