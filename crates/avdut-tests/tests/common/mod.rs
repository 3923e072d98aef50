//! Shared helpers for the end-to-end supervisor tests.
//!
//! Each test stages the mock player into a scratch install layout
//! (`<root>/install/bin/TestMediaPlayer`) so the supervisor's platform
//! resolver finds it exactly as it would the real player.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::time::Duration;

use avdut_player::{Readiness, StartOptions};
use tempfile::TempDir;

/// Stage a player install layout with the mock player as the executable.
pub fn stage_install_root(mock_player: &str) -> TempDir {
    let root = tempfile::tempdir().expect("create scratch install root");
    let bin = root.path().join("install").join("bin");
    std::fs::create_dir_all(&bin).expect("create install/bin");
    std::fs::copy(mock_player, bin.join("TestMediaPlayer")).expect("stage mock player");
    root
}

/// Stage an install layout whose executable is a wrapper script passing
/// `extra_args` to the mock player on top of the supervisor's argv.
#[cfg(unix)]
pub fn stage_install_root_with_args(mock_player: &str, extra_args: &str) -> TempDir {
    use std::os::unix::fs::PermissionsExt;

    let root = tempfile::tempdir().expect("create scratch install root");
    let bin = root.path().join("install").join("bin");
    std::fs::create_dir_all(&bin).expect("create install/bin");

    let wrapper = bin.join("TestMediaPlayer");
    let script = format!("#!/bin/sh\nexec \"{}\" \"$@\" {}\n", mock_player, extra_args);
    std::fs::write(&wrapper, script).expect("write wrapper script");
    std::fs::set_permissions(&wrapper, std::fs::Permissions::from_mode(0o755))
        .expect("mark wrapper executable");
    root
}

/// Start options pointed at a staged install root, with test-friendly
/// probe and stop timeouts.
pub fn start_options(root: &TempDir, room: &str, odp_port: u16) -> StartOptions {
    let mut options = StartOptions::new(root.path(), room);
    options.odp_port = odp_port;
    options.log_dir = root.path().join("logs");
    options.readiness = Readiness::ProbeOdp {
        timeout: Duration::from_secs(10),
    };
    options.stop_timeout = Duration::from_secs(5);
    options
}

/// Send one diagnostics-protocol command and return the reply line.
pub fn odp_query(odp_port: u16, command: &str) -> String {
    let stream = TcpStream::connect(("127.0.0.1", odp_port)).expect("connect diagnostics port");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("set read timeout");

    let mut writer = stream.try_clone().expect("clone diagnostics stream");
    writer
        .write_all(format!("{}\n", command).as_bytes())
        .expect("send diagnostics command");

    let mut reply = String::new();
    BufReader::new(stream)
        .read_line(&mut reply)
        .expect("read diagnostics reply");
    reply.trim().to_string()
}
