//! Mock reference player
//!
//! Stands in for the reference-player executable during harness tests:
//! parses the supervisor's launch-argument surface, binds the diagnostics
//! (ODP) port, serves a trivial line protocol on it, and exits gracefully
//! on SIGTERM.
//!
//! Fault knobs:
//! - `--ignore-term` keeps running through SIGTERM, forcing the
//!   supervisor's termination escalation.
//! - `--startup-delay-ms` delays the diagnostics bind, widening the
//!   readiness-probe window.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "mock-player")]
#[command(about = "Simulated reference player for harness tests")]
struct Args {
    /// Device-friendly name
    #[arg(long)]
    room: String,

    /// Diagnostics (ODP) port to listen on
    #[arg(long)]
    odp_port: u16,

    /// Cloud-service credential slot
    #[arg(long, default_value = "1")]
    cloud_index: String,

    /// TuneIn partner ID
    #[arg(long)]
    tunein_id: Option<String>,

    /// TIDAL client ID
    #[arg(long)]
    tidal_id: Option<String>,

    /// Qobuz id:secret pair
    #[arg(long)]
    qobuz_id: Option<String>,

    /// Keep running through SIGTERM
    #[arg(long)]
    ignore_term: bool,

    /// Delay before the diagnostics port opens
    #[arg(long, default_value_t = 0)]
    startup_delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("mock_player=info")
        .init();

    let args = Args::parse();

    info!(
        room = %args.room,
        odp_port = args.odp_port,
        cloud_index = %args.cloud_index,
        tunein_id = ?args.tunein_id,
        tidal_id = ?args.tidal_id,
        qobuz_id = ?args.qobuz_id,
        "Reference player configured"
    );

    if args.startup_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(args.startup_delay_ms)).await;
    }

    let listener = TcpListener::bind(("127.0.0.1", args.odp_port))
        .await
        .with_context(|| format!("binding diagnostics port {}", args.odp_port))?;
    info!(port = args.odp_port, "Diagnostics port listening");

    let room = args.room.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    tokio::spawn(serve_connection(stream, room.clone()));
                }
                Err(e) => {
                    warn!(error = %e, "Diagnostics accept failed");
                    break;
                }
            }
        }
    });

    wait_for_shutdown(args.ignore_term).await?;
    info!("Reference player exiting");
    Ok(())
}

/// Line protocol on the diagnostics socket: `ping` and `room` queries.
async fn serve_connection(stream: TcpStream, room: String) {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let reply = match line.trim() {
            "ping" => "pong".to_string(),
            "room" => room.clone(),
            other => format!("unknown command: {}", other),
        };
        if write_half
            .write_all(format!("{}\n", reply).as_bytes())
            .await
            .is_err()
        {
            break;
        }
    }
}

#[cfg(unix)]
async fn wait_for_shutdown(ignore_term: bool) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())?;
    if ignore_term {
        loop {
            term.recv().await;
            info!("Ignoring termination request");
        }
    }
    tokio::select! {
        _ = term.recv() => {}
        _ = tokio::signal::ctrl_c() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown(_ignore_term: bool) -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
