//! Error types for device capability queries

use thiserror::Error;

/// Result type alias for capability-query operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while querying a device under test
#[derive(Error, Debug)]
pub enum ClientError {
    /// Underlying UPnP failure (description fetch, SOAP call)
    #[error("UPnP error: {0}")]
    Upnp(#[from] rupnp::Error),

    /// The DUT target could not be turned into a device URL
    #[error("Invalid device endpoint: {0}")]
    InvalidEndpoint(String),

    /// The device description does not offer the required service
    #[error("Device does not offer service {0}")]
    ServiceNotFound(String),

    /// An action response is missing a declared out-argument
    #[error("Action response missing argument: {0}")]
    MissingArgument(&'static str),

    /// The device rejected or failed the action
    #[error("Action failed: {0}")]
    ActionFailed(String),
}
