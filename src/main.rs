use std::process::ExitCode;

use clap::Parser;

use serve_dir::cli::Cli;
use serve_dir::{logger, Config, Server, ShutdownSignal};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match Config::load(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            logger::log_error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    // Reject a bad directory before any runtime or socket exists
    if let Err(e) = cfg.resolve_root() {
        logger::log_error(&e.to_string());
        return ExitCode::FAILURE;
    }

    // Build the Tokio runtime, sizing the worker pool from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    // 0 falls back to one worker per CPU core
    if let Some(workers) = cfg.server.workers.filter(|&w| w > 0) {
        runtime_builder.worker_threads(workers);
    }
    let runtime = match runtime_builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            logger::log_error(&format!("Failed to start runtime: {e}"));
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(async_main(cfg)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn async_main(cfg: Config) -> serve_dir::Result<()> {
    let signals = ShutdownSignal::register()?;
    let server = Server::bind(&cfg)?;

    server
        .run_until(async move {
            let name = signals.recv().await;
            logger::log_signal_received(name);
        })
        .await
}
