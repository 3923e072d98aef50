//! Test utilities for the conformance suite
//!
//! Provides a scripted ConnectionManager so the check logic can be
//! exercised without a live device.

use async_trait::async_trait;
use avdut_core::ProtocolInfo;

use crate::connection_manager::{ConnectionInfo, ConnectionManager, ProtocolInfoResponse};
use crate::error::{ClientError, Result};

/// The info record an idle renderer reports for the static connection.
pub fn idle_connection_info() -> ConnectionInfo {
    ConnectionInfo {
        rcs_id: "0".to_string(),
        av_transport_id: "0".to_string(),
        protocol_info: String::new(),
        peer_connection_manager: String::new(),
        peer_connection_id: "-1".to_string(),
        direction: "Input".to_string(),
        status: "Unknown".to_string(),
    }
}

/// A ConnectionManager answering from canned data, with per-action
/// failure injection.
pub struct ScriptedConnectionManager {
    pub source: String,
    pub sink: String,
    pub connection_ids: String,
    pub connection_info: ConnectionInfo,
    failing_actions: Vec<&'static str>,
}

impl ScriptedConnectionManager {
    /// A device that advertises exactly `descriptor` and holds the idle
    /// static connection.
    pub fn answering(descriptor: &ProtocolInfo) -> Self {
        Self {
            source: descriptor.source_csv(),
            sink: descriptor.sink_csv(),
            connection_ids: "0".to_string(),
            connection_info: idle_connection_info(),
            failing_actions: Vec::new(),
        }
    }

    /// Make the named action fail instead of answering.
    pub fn fail_on(mut self, action: &'static str) -> Self {
        self.failing_actions.push(action);
        self
    }

    fn maybe_fail(&self, action: &'static str) -> Result<()> {
        if self.failing_actions.contains(&action) {
            Err(ClientError::ActionFailed(format!(
                "scripted failure for {}",
                action
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ConnectionManager for ScriptedConnectionManager {
    async fn protocol_info(&self) -> Result<ProtocolInfoResponse> {
        self.maybe_fail("GetProtocolInfo")?;
        Ok(ProtocolInfoResponse {
            source: self.source.clone(),
            sink: self.sink.clone(),
        })
    }

    async fn current_connection_ids(&self) -> Result<String> {
        self.maybe_fail("GetCurrentConnectionIDs")?;
        Ok(self.connection_ids.clone())
    }

    async fn current_connection_info(&self, _connection_id: i32) -> Result<ConnectionInfo> {
        self.maybe_fail("GetCurrentConnectionInfo")?;
        Ok(self.connection_info.clone())
    }
}
