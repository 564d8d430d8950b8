//! cdx - fast codebase exploration CLI

use clap::Parser;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cdx::config::{Cli, Command, Config, DefArgs};
use cdx::error::Result;
use cdx::output::Formatter;
use cdx::service::{DefinitionLocator, SearchContext};
use cdx::VERSION;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let code = match &cli.command {
        Command::Version => print_version(),
        Command::Def(args) => run_def(&cli, args).await,
    };

    std::process::exit(code);
}

fn print_version() -> i32 {
    let mut out = std::io::stdout().lock();
    let mut lines = vec![format!("cdx {}", VERSION)];
    let commit = option_env!("CDX_COMMIT");
    let built = option_env!("CDX_BUILD_DATE");
    if commit.is_some() || built.is_some() {
        lines.push(format!("  commit: {}", commit.unwrap_or("unknown")));
        lines.push(format!("  built:  {}", built.unwrap_or("unknown")));
    }
    match writeln!(out, "{}", lines.join("\n")).and_then(|_| out.flush()) {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

async fn run_def(cli: &Cli, args: &DefArgs) -> i32 {
    let config = match Config::load() {
        Ok(mut config) => {
            config.apply_cli(cli);
            config
        }
        Err(e) => {
            let mut fallback = Config::default();
            fallback.apply_cli(cli);
            return report(&Formatter::new(fallback.output_format, fallback.color), &e);
        }
    };
    let formatter = Formatter::new(config.output_format, config.color);

    let opts = args.search_options(&config);
    let interrupt = CancellationToken::new();
    let ctx = SearchContext::from_token(interrupt.clone()).timeout(args.timeout(&config));

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, cancelling search");
            interrupt.cancel();
        }
    });

    let locator = DefinitionLocator::default();
    match locator.find_definition(&ctx, &args.symbol, &opts).await {
        Ok(results) => match write_results(&formatter, &args.symbol, &results) {
            Ok(()) => 0,
            Err(e) => report(&formatter, &e),
        },
        Err(e) => report(&formatter, &e),
    }
}

fn write_results(
    formatter: &Formatter,
    symbol: &str,
    results: &[cdx::types::MatchResult],
) -> Result<()> {
    let mut out = std::io::stdout().lock();
    formatter.format_results(&mut out, symbol, results)?;
    out.flush()?;
    Ok(())
}

/// Render `err` on stdout and return the matching exit status.
fn report(formatter: &Formatter, err: &cdx::Error) -> i32 {
    let mut out = std::io::stdout().lock();
    if formatter.format_error(&mut out, err).is_err() || out.flush().is_err() {
        return 1;
    }
    err.exit_code()
}
