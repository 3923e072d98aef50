//! ConnectionManager service client
//!
//! The `ConnectionManager` trait is the seam the conformance suite drives:
//! the three capability queries the service offers. `UpnpConnectionManager`
//! implements it over the network via the UPnP toolkit; the `testing`
//! module provides a scripted in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use rupnp::http::Uri;
use rupnp::ssdp::URN;
use rupnp::{Device, Service};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Service type of the UPnP AV ConnectionManager.
pub const CONNECTION_MANAGER: URN = URN::service("schemas-upnp-org", "ConnectionManager", 1);

/// Answer to `GetProtocolInfo`: the comma-joined source and sink lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolInfoResponse {
    pub source: String,
    pub sink: String,
}

/// Answer to `GetCurrentConnectionInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub rcs_id: String,
    pub av_transport_id: String,
    pub protocol_info: String,
    pub peer_connection_manager: String,
    pub peer_connection_id: String,
    pub direction: String,
    pub status: String,
}

/// Capability-negotiation queries of a ConnectionManager-equivalent
/// interface.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn protocol_info(&self) -> Result<ProtocolInfoResponse>;

    /// Comma-joined list of active connection IDs.
    async fn current_connection_ids(&self) -> Result<String>;

    async fn current_connection_info(&self, connection_id: i32) -> Result<ConnectionInfo>;
}

/// ConnectionManager client over a live UPnP device.
pub struct UpnpConnectionManager {
    device: Device,
}

impl UpnpConnectionManager {
    /// Fetch the description document at `description_url` and verify the
    /// device offers a ConnectionManager service.
    pub async fn connect(description_url: &str) -> Result<Self> {
        let uri: Uri = description_url.parse().map_err(|e| {
            ClientError::InvalidEndpoint(format!("{}: {}", description_url, e))
        })?;

        let device = Device::from_url(uri).await?;
        debug!(
            name = %device.friendly_name(),
            device_type = %device.device_type(),
            "Fetched device description"
        );

        let cm = Self { device };
        cm.service()?;
        Ok(cm)
    }

    pub fn friendly_name(&self) -> &str {
        self.device.friendly_name()
    }

    fn service(&self) -> Result<&Service> {
        self.device
            .find_service(&CONNECTION_MANAGER)
            .ok_or_else(|| ClientError::ServiceNotFound(CONNECTION_MANAGER.to_string()))
    }

    async fn invoke(&self, action: &str, payload: &str) -> Result<HashMap<String, String>> {
        debug!(action, "Invoking ConnectionManager action");
        let service = self.service()?;
        Ok(service.action(self.device.url(), action, payload).await?)
    }
}

fn take(map: &mut HashMap<String, String>, key: &'static str) -> Result<String> {
    map.remove(key).ok_or(ClientError::MissingArgument(key))
}

#[async_trait]
impl ConnectionManager for UpnpConnectionManager {
    async fn protocol_info(&self) -> Result<ProtocolInfoResponse> {
        let mut response = self.invoke("GetProtocolInfo", "").await?;
        Ok(ProtocolInfoResponse {
            source: take(&mut response, "Source")?,
            sink: take(&mut response, "Sink")?,
        })
    }

    async fn current_connection_ids(&self) -> Result<String> {
        let mut response = self.invoke("GetCurrentConnectionIDs", "").await?;
        take(&mut response, "ConnectionIDs")
    }

    async fn current_connection_info(&self, connection_id: i32) -> Result<ConnectionInfo> {
        let payload = format!("<ConnectionID>{}</ConnectionID>", connection_id);
        let mut response = self.invoke("GetCurrentConnectionInfo", &payload).await?;
        Ok(ConnectionInfo {
            rcs_id: take(&mut response, "RcsID")?,
            av_transport_id: take(&mut response, "AVTransportID")?,
            protocol_info: take(&mut response, "ProtocolInfo")?,
            peer_connection_manager: take(&mut response, "PeerConnectionManager")?,
            peer_connection_id: take(&mut response, "PeerConnectionID")?,
            direction: take(&mut response, "Direction")?,
            status: take(&mut response, "Status")?,
        })
    }
}
