//! Diagnostics-port allocation
//!
//! Every reference-player instance exposes an out-of-band diagnostics
//! (ODP) TCP port. The port is derived, not user-chosen: concurrently
//! running harness processes land in distinct 8-port lanes keyed on PID,
//! and sequential in-process supervisors walk the lane. Two instances of
//! one supervisor process therefore never collide, and up to 80 harness
//! processes on one host stay apart.

use std::sync::atomic::{AtomicU16, Ordering};

/// First port of the ODP allocation range.
pub const ODP_BASE_PORT: u16 = 8100;

const LANE_COUNT: u16 = 80;
const LANE_WIDTH: u16 = 8;

static NEXT_SLOT: AtomicU16 = AtomicU16::new(0);

/// Derive the next diagnostics port for this process.
pub fn allocate_odp_port() -> u16 {
    let slot = NEXT_SLOT.fetch_add(1, Ordering::Relaxed) % LANE_WIDTH;
    let lane = (std::process::id() as u16) % LANE_COUNT;
    ODP_BASE_PORT + lane * LANE_WIDTH + slot
}
