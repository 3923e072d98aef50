//! avdut-core - Core types for the UPnP AV renderer conformance harness
//!
//! This crate provides the value types shared by the supervisor and the
//! conformance suite: the harness error taxonomy, the ProtocolInfo
//! capability descriptor, the read-only settings store, and the static
//! product source-type table.

pub mod config;
pub mod error;
pub mod protocol;
pub mod sources;

pub use config::ConfigStore;
pub use error::{HarnessError, Result};
pub use protocol::{ProtocolInfo, ProtocolInfoEntry};
