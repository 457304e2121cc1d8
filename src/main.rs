//! airscan - scan documents from eSCL/AirScan network scanners.

use airscan::cli::{self, Cli};
use airscan::discovery::ServiceLocator;
use airscan::error::ScanResult;
use airscan::job::ScanJobController;
use airscan::output;
use airscan::probe::CapabilitiesProbe;
use airscan::region;
use airscan::transport::TransportSession;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        output::print_error(&e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "airscan=debug" } else { "airscan=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> ScanResult<()> {
    let config = cli.into_config();

    // Resolve everything local before touching the network.
    let output_path = cli::resolve_output_path(&config)?;
    let scan_region = config
        .region
        .as_deref()
        .map(region::parse_region)
        .transpose()?;

    let spinner = start_spinner("Searching for scanner...");
    let discovered = ServiceLocator::new().discover().await;
    spinner.finish_and_clear();
    let endpoint = discovered?;
    output::print_info(&format!("Using {}", endpoint.name));

    let session = TransportSession::new(endpoint.base_url())?;
    CapabilitiesProbe::new(&session, &endpoint)
        .ensure_ready(&config)
        .await?;

    let spinner = start_spinner("Scanning...");
    let mut controller = ScanJobController::new(&session, &config, output_path.clone());
    let result = controller.execute(scan_region.as_ref()).await;
    spinner.finish_and_clear();
    let pages = result?;

    output::print_info(&format!(
        "Scan complete: {} page(s) -> {}",
        pages,
        output_path.display()
    ));
    Ok(())
}

fn start_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("valid spinner template"),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
