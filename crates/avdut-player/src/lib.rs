//! avdut-player - Reference-player process supervisor
//!
//! Makes a locally-spawned reference player behave as an addressable
//! device under test with a predictable start/stop protocol, hiding
//! platform differences in executable naming and invocation.
//!
//! Lifecycle is a one-way street: `Created → Running → Stopping →
//! Stopped`. A supervisor launches its process on construction, is stopped
//! exactly once, and releases its log resources afterwards; relaunching
//! means constructing a new supervisor.

pub mod dut;
pub mod logs;
pub mod platform;
pub mod ports;
pub mod supervisor;

pub use dut::DutHandle;
pub use logs::PlayerLog;
pub use platform::{resolve_player_exe, Platform};
pub use ports::allocate_odp_port;
pub use supervisor::{DeviceSupervisor, Readiness, StartOptions, StopOutcome};
