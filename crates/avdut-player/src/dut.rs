//! Device-under-test reference
//!
//! Conformance tests only need `{start, stop, address}` from a DUT. A
//! local DUT owns its supervisor (and so its process lifecycle); a remote
//! DUT is a bare address whose lifecycle belongs to someone else.

use avdut_core::Result;
use tracing::info;

use crate::supervisor::{DeviceSupervisor, StopOutcome};

/// UPnP description-document port a reference player serves on when the
/// target does not name one.
pub const DEFAULT_DEVICE_PORT: u16 = 55178;

/// The logical target of a test run.
#[derive(Debug)]
pub enum DutHandle {
    /// Supervisor-managed reference player on loopback.
    Local(DeviceSupervisor),
    /// Externally-managed renderer, by address or URL.
    Remote(String),
}

impl DutHandle {
    pub fn local(supervisor: DeviceSupervisor) -> Self {
        DutHandle::Local(supervisor)
    }

    pub fn remote(address: impl Into<String>) -> Self {
        DutHandle::Remote(address.into())
    }

    pub fn is_local(&self) -> bool {
        matches!(self, DutHandle::Local(_))
    }

    /// Host the DUT answers on.
    pub fn address(&self) -> String {
        match self {
            DutHandle::Local(supervisor) => supervisor.address().to_string(),
            DutHandle::Remote(address) => address.clone(),
        }
    }

    /// Location of the DUT's UPnP description document.
    ///
    /// Remote targets may be a bare host, a `host:port` pair, or a full
    /// URL; bare hosts get the default device port and document path.
    pub fn description_url(&self) -> String {
        match self {
            DutHandle::Local(_) => format!(
                "http://127.0.0.1:{}/description.xml",
                DEFAULT_DEVICE_PORT
            ),
            DutHandle::Remote(address) => {
                if address.starts_with("http://") || address.starts_with("https://") {
                    address.clone()
                } else if address.contains(':') {
                    format!("http://{}/description.xml", address)
                } else {
                    format!("http://{}:{}/description.xml", address, DEFAULT_DEVICE_PORT)
                }
            }
        }
    }

    pub fn supervisor(&self) -> Option<&DeviceSupervisor> {
        match self {
            DutHandle::Local(supervisor) => Some(supervisor),
            DutHandle::Remote(_) => None,
        }
    }

    /// Tear the DUT down: stop the supervised player and release its logs.
    /// A no-op for remote targets.
    pub fn teardown(&mut self) -> Result<()> {
        match self {
            DutHandle::Local(supervisor) => {
                let outcome = supervisor.stop()?;
                if outcome == StopOutcome::GracefulStopTimeout {
                    info!("Player required forced termination during teardown");
                }
                supervisor.cleanup_logs()
            }
            DutHandle::Remote(_) => Ok(()),
        }
    }
}
