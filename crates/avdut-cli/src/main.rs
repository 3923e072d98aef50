//! avdut - ConnectionManager conformance runner
//!
//! Exercises a UPnP AV MediaRenderer against the ConnectionManager
//! service contract.
//!
//! Usage:
//!   avdut local [--config settings.toml] [--room NAME] [--install-root DIR]
//!   avdut 192.168.1.20
//!   avdut http://renderer.lan:1400/xml/device_description.xml
//!
//! `local` spawns and supervises a reference player; any other DUT value
//! is treated as a remote device address or description URL whose
//! lifecycle is managed externally.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use avdut_conformance::{ConformanceReport, ConformanceTestCase, UpnpConnectionManager};
use avdut_core::sources;
use avdut_core::{ConfigStore, ProtocolInfo};
use avdut_player::{DeviceSupervisor, DutHandle, Readiness, StartOptions};
use clap::Parser;
use tokio::runtime::Runtime;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "avdut")]
#[command(about = "UPnP AV ConnectionManager conformance runner")]
struct Cli {
    /// MediaRenderer DUT: 'local' for a supervised reference player on
    /// loopback, anything else is a device address or description URL
    dut: String,

    /// Settings file with streaming-service credentials
    #[arg(short, long, env = "AVDUT_CONFIG")]
    config: Option<PathBuf>,

    /// Device-friendly name for the local player
    #[arg(long, default_value = "TestDev")]
    room: String,

    /// Root of the reference-player install layout
    #[arg(long, env = "AVDUT_INSTALL_ROOT", default_value = "..")]
    install_root: PathBuf,

    /// Cloud-service credential slot for the local player
    #[arg(long, default_value = "1")]
    cloud_index: String,

    /// Explicit diagnostics port (defaults to the deterministic allocator)
    #[arg(long)]
    odp_port: Option<u16>,

    /// Wait a fixed settle period instead of probing the diagnostics port
    #[arg(long)]
    settle_secs: Option<u64>,

    /// Repeat the start/query/stop cycle this many times
    #[arg(long, default_value_t = 1)]
    soak: u32,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Streaming-service credentials pulled from the settings store.
struct Credentials {
    tunein_partner_id: String,
    tidal_id: String,
    /// Combined `id:secret` pair, the form the player expects.
    qobuz_id: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "avdut=debug,avdut_player=debug,avdut_conformance=debug"
    } else {
        "avdut=info,avdut_player=info,avdut_conformance=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let credentials = cli
        .config
        .as_deref()
        .map(load_credentials)
        .transpose()?;

    let runtime = Runtime::new()?;

    let cycles = cli.soak.max(1);
    let mut failed_runs = 0;
    for cycle in 1..=cycles {
        if cycles > 1 {
            info!(cycle, of = cycles, "Starting soak cycle");
        }
        let report = run_once(&cli, credentials.as_ref(), &runtime)?;
        println!("{}", report);
        if !report.all_passed() {
            failed_runs += 1;
        }
    }

    if failed_runs > 0 {
        bail!("{} of {} run(s) had failing checks", failed_runs, cycles);
    }
    Ok(())
}

/// One full start/query/stop cycle against the selected DUT. The DUT is
/// torn down on every path, including a setup failure, which aborts the
/// run without reporting any check as passed.
fn run_once(
    cli: &Cli,
    credentials: Option<&Credentials>,
    runtime: &Runtime,
) -> Result<ConformanceReport> {
    let mut dut = build_dut(cli, credentials)?;

    if dut.is_local() {
        info!(sources = %default_source_lineup(), "Supervised player source lineup");
    }

    let descriptor = ProtocolInfo::renderer_defaults();
    let url = dut.description_url();
    info!(dut = %dut.address(), url = %url, "Exercising ConnectionManager service");

    let outcome = runtime.block_on(async {
        let cm = UpnpConnectionManager::connect(&url)
            .await
            .with_context(|| format!("connecting to DUT at {}", url))?;
        info!(device = %cm.friendly_name(), "Running ConnectionManager checks");
        let case = ConformanceTestCase::new(cm, descriptor);
        Ok::<_, anyhow::Error>(case.run().await)
    });

    match (outcome, dut.teardown()) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(_), Err(teardown)) => Err(teardown).context("DUT teardown failed"),
        (Err(run), teardown) => {
            if let Err(e) = teardown {
                error!(error = %e, "DUT teardown failed after run error");
            }
            Err(run)
        }
    }
}

fn build_dut(cli: &Cli, credentials: Option<&Credentials>) -> Result<DutHandle> {
    if cli.dut != "local" {
        return Ok(DutHandle::remote(cli.dut.as_str()));
    }

    let mut options = StartOptions::new(cli.install_root.as_path(), cli.room.as_str());
    options.cloud_index = cli.cloud_index.clone();
    if let Some(port) = cli.odp_port {
        options.odp_port = port;
    }
    if let Some(secs) = cli.settle_secs {
        options.readiness = Readiness::SettleDelay(Duration::from_secs(secs));
    }
    if let Some(c) = credentials {
        options.tunein_partner_id = Some(c.tunein_partner_id.clone());
        options.tidal_id = Some(c.tidal_id.clone());
        options.qobuz_id = Some(c.qobuz_id.clone());
    }

    let supervisor = DeviceSupervisor::start(options)?;
    Ok(DutHandle::local(supervisor))
}

fn load_credentials(path: &Path) -> Result<Credentials> {
    let store = ConfigStore::load(path)
        .with_context(|| format!("loading settings file {}", path.display()))?;

    Ok(Credentials {
        tunein_partner_id: store.get("tunein.partnerid")?.to_string(),
        tidal_id: store.get("tidal.id")?.to_string(),
        qobuz_id: format!("{}:{}", store.get("qobuz.id")?, store.get("qobuz.secret")?),
    })
}

fn default_source_lineup() -> String {
    sources::SOURCE_TYPES
        .iter()
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_declaration_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn first_positional_selects_the_dut() {
        let cli = Cli::parse_from(["avdut", "192.168.1.20"]);
        assert_eq!(cli.dut, "192.168.1.20");
        assert_eq!(cli.room, "TestDev");
    }
}
