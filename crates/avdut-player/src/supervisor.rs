//! Reference-player lifecycle supervisor
//!
//! A `DeviceSupervisor` owns exactly one reference-player OS process: it
//! resolves the platform-specific executable, launches it with the derived
//! argument set, waits until the player is addressable, and guarantees
//! orderly shutdown and log cleanup. The spawned process, its diagnostics
//! port, and its log file belong to one supervisor instance only.

use std::net::{SocketAddr, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::{Duration, Instant};

use avdut_core::{HarnessError, Result};
use tracing::{debug, info, warn};

use crate::logs::PlayerLog;
use crate::platform::{resolve_player_exe, Platform};
use crate::ports::allocate_odp_port;

/// Settle period of the original harness, kept for the fallback policy.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Upper bound on the diagnostics-port readiness probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// How long a graceful stop may take before force-termination.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const PROBE_CONNECT_TIMEOUT: Duration = Duration::from_millis(250);

/// How `start` decides the player is addressable.
#[derive(Debug, Clone, Copy)]
pub enum Readiness {
    /// Poll the diagnostics TCP port until it accepts, bounded by `timeout`.
    ProbeOdp { timeout: Duration },
    /// Block for a fixed settle period without probing.
    SettleDelay(Duration),
}

impl Default for Readiness {
    fn default() -> Self {
        Readiness::ProbeOdp {
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// Configuration set for one supervised player instance.
#[derive(Debug, Clone)]
pub struct StartOptions {
    /// Root of the player install layout (`<root>/install/bin/...`).
    pub install_root: PathBuf,
    /// Device-friendly name announced by the player.
    pub room: String,
    /// Diagnostics-protocol port; defaulted from the deterministic
    /// allocator, overridable for tests.
    pub odp_port: u16,
    /// Which cloud-service credential slot the player binds.
    pub cloud_index: String,
    pub tunein_partner_id: Option<String>,
    pub tidal_id: Option<String>,
    pub qobuz_id: Option<String>,
    /// Directory receiving the per-instance player log.
    pub log_dir: PathBuf,
    pub platform: Platform,
    pub readiness: Readiness,
    pub stop_timeout: Duration,
}

impl StartOptions {
    pub fn new(install_root: impl Into<PathBuf>, room: impl Into<String>) -> Self {
        Self {
            install_root: install_root.into(),
            room: room.into(),
            odp_port: allocate_odp_port(),
            cloud_index: "1".to_string(),
            tunein_partner_id: None,
            tidal_id: None,
            qobuz_id: None,
            log_dir: std::env::temp_dir().join("avdut-logs"),
            platform: Platform::current(),
            readiness: Readiness::default(),
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }

    /// Command-line surface handed to the player. The mock player used by
    /// the integration tests parses exactly this set.
    pub fn derive_args(&self) -> Vec<String> {
        let mut args = vec![
            "--room".to_string(),
            self.room.clone(),
            "--odp-port".to_string(),
            self.odp_port.to_string(),
            "--cloud-index".to_string(),
            self.cloud_index.clone(),
        ];
        if let Some(id) = &self.tunein_partner_id {
            args.push("--tunein-id".to_string());
            args.push(id.clone());
        }
        if let Some(id) = &self.tidal_id {
            args.push("--tidal-id".to_string());
            args.push(id.clone());
        }
        if let Some(id) = &self.qobuz_id {
            args.push("--qobuz-id".to_string());
            args.push(id.clone());
        }
        args
    }
}

/// How a stop completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The player honoured the graceful-termination request.
    Graceful,
    /// The player ignored it; it was force-terminated after the timeout.
    /// Degraded but non-fatal, and cleanup still completed.
    GracefulStopTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Stopping,
    Stopped,
}

/// Supervisor for one locally-spawned reference-player process.
#[derive(Debug)]
pub struct DeviceSupervisor {
    child: Child,
    state: State,
    room: String,
    odp_port: u16,
    stop_timeout: Duration,
    log: Option<PlayerLog>,
}

impl DeviceSupervisor {
    /// Launch the reference player and block until it is addressable.
    ///
    /// A missing executable fails before any process is spawned or log
    /// resource allocated. A player that the OS refuses to start, that
    /// exits during the readiness wait, or that never opens its
    /// diagnostics port fails with `ProcessLaunchFailed`; a failed start
    /// is terminal for this supervisor and leaves nothing behind.
    pub fn start(options: StartOptions) -> Result<Self> {
        let exe = resolve_player_exe(&options.install_root, options.platform)?;
        reject_occupied_port(options.odp_port)?;
        let log = PlayerLog::create(&options.log_dir, options.odp_port)?;
        let (stdout, stderr) = log.stdio()?;
        let args = options.derive_args();

        info!(
            exe = %exe.display(),
            room = %options.room,
            odp_port = options.odp_port,
            "Launching reference player"
        );

        let child = match Command::new(&exe)
            .args(&args)
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                let _ = log.cleanup();
                return Err(HarnessError::ProcessLaunchFailed(format!(
                    "{}: {}",
                    exe.display(),
                    e
                )));
            }
        };

        let mut supervisor = Self {
            child,
            state: State::Running,
            room: options.room,
            odp_port: options.odp_port,
            stop_timeout: options.stop_timeout,
            log: Some(log),
        };

        if let Err(e) = supervisor.wait_ready(options.readiness) {
            let _ = supervisor.child.kill();
            let _ = supervisor.child.wait();
            supervisor.state = State::Stopped;
            if let Some(log) = supervisor.log.take() {
                let _ = log.cleanup();
            }
            return Err(e);
        }

        info!(room = %supervisor.room, odp_port = supervisor.odp_port, "Reference player ready");
        Ok(supervisor)
    }

    fn wait_ready(&mut self, readiness: Readiness) -> Result<()> {
        match readiness {
            Readiness::SettleDelay(delay) => {
                std::thread::sleep(delay);
                if let Some(status) = self.child.try_wait()? {
                    return Err(HarnessError::ProcessLaunchFailed(format!(
                        "player exited during settle period ({})",
                        status
                    )));
                }
                Ok(())
            }
            Readiness::ProbeOdp { timeout } => {
                let addr = SocketAddr::from(([127, 0, 0, 1], self.odp_port));
                let deadline = Instant::now() + timeout;
                loop {
                    std::thread::sleep(POLL_INTERVAL);
                    if let Some(status) = self.child.try_wait()? {
                        return Err(HarnessError::ProcessLaunchFailed(format!(
                            "player exited before becoming ready ({})",
                            status
                        )));
                    }
                    if TcpStream::connect_timeout(&addr, PROBE_CONNECT_TIMEOUT).is_ok() {
                        // A dead child means someone else owns the port.
                        if let Some(status) = self.child.try_wait()? {
                            return Err(HarnessError::ProcessLaunchFailed(format!(
                                "player exited before becoming ready ({})",
                                status
                            )));
                        }
                        return Ok(());
                    }
                    if Instant::now() >= deadline {
                        return Err(HarnessError::ProcessLaunchFailed(format!(
                            "diagnostics port {} not accepting within {:?}",
                            self.odp_port, timeout
                        )));
                    }
                }
            }
        }
    }

    /// Request graceful termination and wait for the player to exit,
    /// force-terminating after the stop timeout.
    ///
    /// Not idempotent: a second call fails with `AlreadyStopped`. The log
    /// handle is flushed on every path so `cleanup_logs` can complete even
    /// after a degraded stop.
    pub fn stop(&mut self) -> Result<StopOutcome> {
        match self.state {
            State::Running => {}
            State::Stopping | State::Stopped => return Err(HarnessError::AlreadyStopped),
        }
        self.state = State::Stopping;

        info!(room = %self.room, pid = self.child.id(), "Stopping reference player");
        if let Err(e) = request_termination(&mut self.child) {
            // Already-exited children are reaped by the wait loop below.
            debug!(error = %e, "Termination request not delivered");
        }

        let deadline = Instant::now() + self.stop_timeout;
        let outcome = loop {
            if let Some(status) = self.child.try_wait()? {
                debug!(room = %self.room, %status, "Player exited");
                break StopOutcome::Graceful;
            }
            if Instant::now() >= deadline {
                warn!(
                    room = %self.room,
                    pid = self.child.id(),
                    timeout = ?self.stop_timeout,
                    "Graceful stop timed out, force-terminating player"
                );
                self.child.kill()?;
                self.child.wait()?;
                break StopOutcome::GracefulStopTimeout;
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        if let Some(log) = &self.log {
            let _ = log.flush();
        }
        self.state = State::Stopped;
        Ok(outcome)
    }

    /// Release the per-instance log resources. Valid only after `stop`,
    /// and at most once.
    pub fn cleanup_logs(&mut self) -> Result<()> {
        if self.state != State::Stopped {
            return Err(HarnessError::InvalidState(
                "cleanup_logs called before stop".to_string(),
            ));
        }
        match self.log.take() {
            Some(log) => {
                log.cleanup()?;
                Ok(())
            }
            None => Err(HarnessError::InvalidState(
                "logs already cleaned up".to_string(),
            )),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn odp_port(&self) -> u16 {
        self.odp_port
    }

    /// OS process ID of the supervised player.
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Loopback address the local player answers on.
    pub fn address(&self) -> &str {
        "127.0.0.1"
    }

    /// Path of the player log, until `cleanup_logs` removes it.
    pub fn log_path(&self) -> Option<&Path> {
        self.log.as_ref().map(PlayerLog::path)
    }
}

impl Drop for DeviceSupervisor {
    fn drop(&mut self) {
        if matches!(self.state, State::Running | State::Stopping) {
            warn!(
                room = %self.room,
                pid = self.child.id(),
                "Supervisor dropped while player still running, force-terminating"
            );
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// A diagnostics port someone else already owns would make the readiness
/// probe answer for the wrong process; reject it before spawning anything.
fn reject_occupied_port(odp_port: u16) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], odp_port));
    match std::net::TcpListener::bind(addr) {
        Ok(listener) => {
            drop(listener);
            Ok(())
        }
        Err(e) => Err(HarnessError::ProcessLaunchFailed(format!(
            "diagnostics port {} unavailable: {}",
            odp_port, e
        ))),
    }
}

#[cfg(unix)]
fn request_termination(child: &mut Child) -> std::io::Result<()> {
    let rc = unsafe { libc::kill(child.id() as libc::pid_t, libc::SIGTERM) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child) -> std::io::Result<()> {
    child.kill()
}
