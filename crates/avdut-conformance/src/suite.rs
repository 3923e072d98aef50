//! The ConnectionManager conformance test case
//!
//! A fixed, ordered list of checks run against one DUT. Every check is
//! reported independently; a failing check never aborts the remainder of
//! the run.

use avdut_core::protocol::{ProtocolInfo, ProtocolInfoEntry};
use tracing::{info, warn};

use crate::connection_manager::ConnectionManager;
use crate::report::{CheckResult, ConformanceReport};

/// Direction vocabulary of `GetCurrentConnectionInfo`.
const DIRECTIONS: &[&str] = &["Input", "Output"];

/// Status vocabulary of `GetCurrentConnectionInfo`.
const STATUSES: &[&str] = &[
    "OK",
    "ContentFormatMismatch",
    "InsufficientBandwidth",
    "UnreliableChannel",
    "Unknown",
];

/// One conformance run: a ConnectionManager endpoint bound to the
/// capability descriptor the DUT is expected to advertise.
pub struct ConformanceTestCase<C> {
    cm: C,
    expected: ProtocolInfo,
}

impl<C: ConnectionManager> ConformanceTestCase<C> {
    pub fn new(cm: C, expected: ProtocolInfo) -> Self {
        Self { cm, expected }
    }

    /// Run every check in order and report each independently.
    pub async fn run(&self) -> ConformanceReport {
        let mut report = ConformanceReport::default();
        record(&mut report, "GetProtocolInfo", self.check_protocol_info().await);
        record(
            &mut report,
            "GetCurrentConnectionIDs",
            self.check_connection_ids().await,
        );
        record(
            &mut report,
            "GetCurrentConnectionInfo",
            self.check_connection_info().await,
        );
        report
    }

    /// The advertised source and sink lists parse and match the expected
    /// descriptor field-wise.
    async fn check_protocol_info(&self) -> std::result::Result<String, String> {
        let response = self.cm.protocol_info().await.map_err(|e| e.to_string())?;
        let reported = ProtocolInfo::from_csv(&response.source, &response.sink);

        compare_lists("source", self.expected.source(), reported.source())?;
        compare_lists("sink", self.expected.sink(), reported.sink())?;

        Ok(format!(
            "{} source / {} sink protocols match",
            reported.source().len(),
            reported.sink().len()
        ))
    }

    /// The connection ID list is a well-formed CSV of integers and
    /// includes the static connection 0.
    async fn check_connection_ids(&self) -> std::result::Result<String, String> {
        let ids = self
            .cm
            .current_connection_ids()
            .await
            .map_err(|e| e.to_string())?;

        let mut parsed = Vec::new();
        for segment in ids.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let id: i64 = segment
                .parse()
                .map_err(|_| format!("connection ID {:?} is not an integer", segment))?;
            parsed.push(id);
        }

        if !parsed.contains(&0) {
            return Err(format!("static connection 0 missing from {:?}", ids));
        }
        Ok(format!("connection IDs [{}]", ids.trim()))
    }

    /// The static connection's info record has a sane shape.
    async fn check_connection_info(&self) -> std::result::Result<String, String> {
        let info = self
            .cm
            .current_connection_info(0)
            .await
            .map_err(|e| e.to_string())?;

        if !DIRECTIONS.contains(&info.direction.as_str()) {
            return Err(format!("unexpected direction {:?}", info.direction));
        }
        if !STATUSES.contains(&info.status.as_str()) {
            return Err(format!("unexpected status {:?}", info.status));
        }
        info.rcs_id
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("RcsID {:?} is not an integer", info.rcs_id))?;
        info.av_transport_id
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("AVTransportID {:?} is not an integer", info.av_transport_id))?;
        if !info.protocol_info.is_empty() {
            info.protocol_info
                .parse::<ProtocolInfoEntry>()
                .map_err(|e| e.to_string())?;
        }

        Ok(format!(
            "direction {}, status {}",
            info.direction, info.status
        ))
    }
}

fn record(
    report: &mut ConformanceReport,
    name: &'static str,
    outcome: std::result::Result<String, String>,
) {
    match outcome {
        Ok(detail) => {
            info!(check = name, %detail, "Check passed");
            report.push(CheckResult {
                name,
                passed: true,
                detail,
            });
        }
        Err(detail) => {
            warn!(check = name, %detail, "Check failed");
            report.push(CheckResult {
                name,
                passed: false,
                detail,
            });
        }
    }
}

fn compare_lists(
    kind: &str,
    expected: &[String],
    reported: &[String],
) -> std::result::Result<(), String> {
    if expected.len() != reported.len() {
        return Err(format!(
            "{} list has {} entries, expected {}",
            kind,
            reported.len(),
            expected.len()
        ));
    }
    for (i, (want, got)) in expected.iter().zip(reported).enumerate() {
        if !entry_eq(want, got) {
            return Err(format!(
                "{} entry {} mismatch: reported {:?}, expected {:?}",
                kind, i, got, want
            ));
        }
    }
    Ok(())
}

/// Field-wise equality where both sides parse under the grammar, raw
/// string equality otherwise (malformed entries pass through verbatim).
fn entry_eq(a: &str, b: &str) -> bool {
    match (a.parse::<ProtocolInfoEntry>(), b.parse::<ProtocolInfoEntry>()) {
        (Ok(ea), Ok(eb)) => ea == eb,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedConnectionManager;

    fn descriptor() -> ProtocolInfo {
        ProtocolInfo::renderer_defaults()
    }

    #[tokio::test]
    async fn conforming_device_passes_every_check() {
        let cm = ScriptedConnectionManager::answering(&descriptor());
        let report = ConformanceTestCase::new(cm, descriptor()).run().await;

        assert!(report.all_passed(), "report: {}", report);
        assert_eq!(report.checks().len(), 3);
    }

    #[tokio::test]
    async fn descriptor_mismatch_fails_only_the_protocol_check() {
        let cm = ScriptedConnectionManager::answering(&descriptor());
        let expected = ProtocolInfo::new(vec!["http-get:*:audio/ogg:*"], Vec::<&str>::new());
        let report = ConformanceTestCase::new(cm, expected).run().await;

        // One failure does not abort the remaining checks
        assert_eq!(report.checks().len(), 3);
        assert!(!report.checks()[0].passed);
        assert!(report.checks()[1].passed);
        assert!(report.checks()[2].passed);
    }

    #[tokio::test]
    async fn action_failure_is_reported_not_propagated() {
        let cm = ScriptedConnectionManager::answering(&descriptor())
            .fail_on("GetCurrentConnectionIDs");
        let report = ConformanceTestCase::new(cm, descriptor()).run().await;

        assert_eq!(report.checks().len(), 3);
        assert!(report.checks()[0].passed);
        assert!(!report.checks()[1].passed);
        assert!(report.checks()[2].passed);
        assert_eq!(report.failed_count(), 1);
    }

    #[tokio::test]
    async fn bogus_direction_fails_the_connection_info_check() {
        let mut cm = ScriptedConnectionManager::answering(&descriptor());
        cm.connection_info.direction = "Sideways".to_string();
        let report = ConformanceTestCase::new(cm, descriptor()).run().await;

        assert!(!report.checks()[2].passed);
        assert!(report.checks()[2].detail.contains("Sideways"));
    }

    #[tokio::test]
    async fn missing_static_connection_fails_the_id_check() {
        let mut cm = ScriptedConnectionManager::answering(&descriptor());
        cm.connection_ids = "4,7".to_string();
        let report = ConformanceTestCase::new(cm, descriptor()).run().await;

        assert!(!report.checks()[1].passed);
    }

    #[tokio::test]
    async fn field_wise_match_tolerates_spacing_in_the_csv() {
        let mut cm = ScriptedConnectionManager::answering(&descriptor());
        cm.sink = descriptor()
            .sink()
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" , ");
        let report = ConformanceTestCase::new(cm, descriptor()).run().await;

        assert!(report.checks()[0].passed, "report: {}", report);
    }
}
