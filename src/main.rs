use anyhow::Result;
use clap::{Parser, Subcommand};
use proxy_probe::{
    proxy::{CheckerConfig, ProxyChecker, ProxyLoader},
    report,
    tui::ProbeApp,
};
use std::path::PathBuf;
use std::time::Duration;

/// A concurrent proxy liveness and latency checker
#[derive(Parser)]
#[command(name = "proxy-probe")]
#[command(about = "A concurrent proxy liveness and latency checker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file containing `address,type` proxy lines
    #[arg(short, long, default_value = "proxylist.csv")]
    input: PathBuf,

    /// Number of concurrent probes
    #[arg(short = 'n', long, default_value = "10")]
    concurrency: usize,

    /// Timeout per probe in seconds
    #[arg(long, default_value = "5")]
    timeout: u64,

    /// Echo URL to request through each proxy
    #[arg(long, default_value = "http://httpbin.org/ip")]
    test_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the proxy list and print results to the console
    Check,
    /// Probe the proxy list in an interactive terminal UI
    Tui,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // A missing or unreadable proxy list is fatal before any probing starts
    let endpoints = ProxyLoader::load_file(&cli.input)?;

    let config = CheckerConfig::new()
        .with_concurrency(cli.concurrency)
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_test_url(cli.test_url.clone());

    match cli.command {
        Some(Commands::Tui) => {
            let mut app = ProbeApp::new(endpoints, config);
            app.run().await?;
        }
        Some(Commands::Check) | None => {
            println!("Loaded {} proxies from {:?}", endpoints.len(), cli.input);
            println!(
                "Probing with {} concurrent probes, timeout: {}s",
                cli.concurrency, cli.timeout
            );
            println!();

            let checker = ProxyChecker::with_config(config);
            let rx = checker.check_proxies_stream(endpoints);
            report::run_console(rx).await;
        }
    }

    Ok(())
}
