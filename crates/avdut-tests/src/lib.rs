//! Integration tests for the renderer conformance harness
//!
//! This crate exercises the full supervisor lifecycle against a simulated
//! reference player:
//!
//! - `src/bin/mock-player.rs` - stand-in for the reference-player
//!   executable: parses the supervisor's launch-argument surface, serves a
//!   trivial line protocol on the diagnostics (ODP) port, and exits on
//!   SIGTERM (unless told to ignore it).
//! - `tests/supervisor_e2e.rs` - lifecycle, readiness, and port-collision
//!   tests.
//! - `tests/credential_flow.rs` - settings-file to launch-argument flow.
//!
//! Tests stage the mock player into a scratch `install/bin` layout via
//! `CARGO_BIN_EXE_mock-player`, so no pre-built artifacts are needed.

// This crate only contains the mock player binary and tests, no library code
