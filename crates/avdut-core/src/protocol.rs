//! ProtocolInfo capability descriptor
//!
//! The UPnP AV `ProtocolInfo` grammar describes one supported media
//! transfer as `<protocol>:<network>:<contentFormat>:<additionalInfo>`,
//! where each field may independently be the wildcard `*`. A device
//! advertises two ordered lists of these tuples (source and sink),
//! comma-joined, through the ConnectionManager `GetProtocolInfo` action.

use std::fmt;
use std::str::FromStr;

/// Sink protocols a stock software renderer advertises. Used for the
/// `local` DUT path, where the expected capability set is known up front.
const RENDERER_SINK_PROTOCOLS: &[&str] = &[
    "http-get:*:audio/x-flac:*",
    "http-get:*:audio/wav:*",
    "http-get:*:audio/wave:*",
    "http-get:*:audio/x-wav:*",
    "http-get:*:audio/mpeg:*",
    "http-get:*:audio/x-mpeg:*",
    "http-get:*:audio/mp1:*",
    "http-get:*:audio/aiff:*",
    "http-get:*:audio/x-aiff:*",
    "http-get:*:audio/x-m4a:*",
    "http-get:*:audio/x-ms-wma:*",
    "ohz:*:*:*",
    "ohm:*:*:*",
    "ohu:*:*:*",
];

/// A single protocol-info tuple split into its four fields.
///
/// This is a best-effort typed view; the descriptor itself stores entries
/// verbatim and never rejects malformed ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolInfoEntry {
    pub protocol: String,
    pub network: String,
    pub content_format: String,
    pub additional_info: String,
}

impl ProtocolInfoEntry {
    /// Field-wise comparison honouring `*` wildcards on either side.
    pub fn matches(&self, other: &ProtocolInfoEntry) -> bool {
        field_matches(&self.protocol, &other.protocol)
            && field_matches(&self.network, &other.network)
            && field_matches(&self.content_format, &other.content_format)
            && field_matches(&self.additional_info, &other.additional_info)
    }
}

fn field_matches(a: &str, b: &str) -> bool {
    a == "*" || b == "*" || a == b
}

/// Error splitting a protocol-info string into its four fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedProtocolInfo(pub String);

impl fmt::Display for MalformedProtocolInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "protocol-info tuple does not have four fields: {}", self.0)
    }
}

impl std::error::Error for MalformedProtocolInfo {}

impl FromStr for ProtocolInfoEntry {
    type Err = MalformedProtocolInfo;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut fields = s.split(':');
        let entry = ProtocolInfoEntry {
            protocol: fields.next().unwrap_or_default().to_string(),
            network: fields
                .next()
                .ok_or_else(|| MalformedProtocolInfo(s.to_string()))?
                .to_string(),
            content_format: fields
                .next()
                .ok_or_else(|| MalformedProtocolInfo(s.to_string()))?
                .to_string(),
            // additionalInfo may itself contain `:` (e.g. DLNA flags)
            additional_info: fields.collect::<Vec<_>>().join(":"),
        };
        if entry.additional_info.is_empty() && s.split(':').count() < 4 {
            return Err(MalformedProtocolInfo(s.to_string()));
        }
        Ok(entry)
    }
}

impl fmt::Display for ProtocolInfoEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.protocol, self.network, self.content_format, self.additional_info
        )
    }
}

/// Immutable capability descriptor: the ordered source and sink
/// protocol-info lists a test role declares.
///
/// Entries are stored verbatim; validating individual tuples is the
/// consuming check's business, not the descriptor's. No I/O, no mutation
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtocolInfo {
    source: Vec<String>,
    sink: Vec<String>,
}

impl ProtocolInfo {
    /// Construct from explicit source and sink lists; either may be empty,
    /// meaning the role declares no protocols of that kind.
    pub fn new<S: Into<String>>(
        source: impl IntoIterator<Item = S>,
        sink: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            source: source.into_iter().map(Into::into).collect(),
            sink: sink.into_iter().map(Into::into).collect(),
        }
    }

    /// The descriptor a renderer-role test expects from a stock software
    /// player: no source protocols, the standard sink list.
    pub fn renderer_defaults() -> Self {
        Self::new(Vec::<&str>::new(), RENDERER_SINK_PROTOCOLS.iter().copied())
    }

    /// Parse from the comma-joined wire form of both lists.
    pub fn from_csv(source: &str, sink: &str) -> Self {
        Self {
            source: parse_csv(source),
            sink: parse_csv(sink),
        }
    }

    pub fn source(&self) -> &[String] {
        &self.source
    }

    pub fn sink(&self) -> &[String] {
        &self.sink
    }

    /// Comma-joined source list, as answered to `GetProtocolInfo`.
    pub fn source_csv(&self) -> String {
        self.source.join(",")
    }

    /// Comma-joined sink list, as answered to `GetProtocolInfo`.
    pub fn sink_csv(&self) -> String {
        self.sink.join(",")
    }

    /// Typed views of the source entries, skipping tuples that do not
    /// split into four fields.
    pub fn source_entries(&self) -> Vec<ProtocolInfoEntry> {
        parse_entries(&self.source)
    }

    /// Typed views of the sink entries, skipping malformed tuples.
    pub fn sink_entries(&self) -> Vec<ProtocolInfoEntry> {
        parse_entries(&self.sink)
    }
}

impl fmt::Display for ProtocolInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source={} Sink={}", self.source_csv(), self.sink_csv())
    }
}

/// Split a comma-joined protocol-info list, trimming whitespace and
/// dropping empty segments (an empty string is the empty list).
pub fn parse_csv(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_entries(list: &[String]) -> Vec<ProtocolInfoEntry> {
    list.iter()
        .filter_map(|e| e.parse::<ProtocolInfoEntry>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_round_trip() {
        let descriptor = ProtocolInfo::new(
            vec!["http-get:*:audio/mpeg:*"],
            vec!["http-get:*:audio/x-flac:*", "ohz:*:*:*"],
        );

        let reparsed =
            ProtocolInfo::from_csv(&descriptor.source_csv(), &descriptor.sink_csv());
        assert_eq!(descriptor, reparsed);
    }

    #[test]
    fn empty_lists_serialize_to_empty_csv() {
        let descriptor = ProtocolInfo::default();
        assert_eq!(descriptor.source_csv(), "");
        assert_eq!(descriptor.sink_csv(), "");
        assert!(parse_csv("").is_empty());
    }

    #[test]
    fn csv_parse_trims_and_skips_empty_segments() {
        let entries = parse_csv(" http-get:*:audio/wav:* , ,ohm:*:*:*,");
        assert_eq!(entries, vec!["http-get:*:audio/wav:*", "ohm:*:*:*"]);
    }

    #[test]
    fn entry_splits_into_four_fields() {
        let entry: ProtocolInfoEntry = "http-get:*:audio/mpeg:*".parse().unwrap();
        assert_eq!(entry.protocol, "http-get");
        assert_eq!(entry.network, "*");
        assert_eq!(entry.content_format, "audio/mpeg");
        assert_eq!(entry.additional_info, "*");
        assert_eq!(entry.to_string(), "http-get:*:audio/mpeg:*");
    }

    #[test]
    fn entry_keeps_colons_in_additional_info() {
        let entry: ProtocolInfoEntry = "http-get:*:audio/mpeg:DLNA.ORG_PN=MP3;X=a:b"
            .parse()
            .unwrap();
        assert_eq!(entry.additional_info, "DLNA.ORG_PN=MP3;X=a:b");
    }

    #[test]
    fn short_entry_is_rejected_by_typed_view() {
        assert!("http-get:*:audio/mpeg".parse::<ProtocolInfoEntry>().is_err());
    }

    #[test]
    fn malformed_entries_pass_through_verbatim() {
        let descriptor = ProtocolInfo::new(vec!["not-a-tuple"], Vec::<&str>::new());
        assert_eq!(descriptor.source(), ["not-a-tuple"]);
        // ...but the typed view skips them
        assert!(descriptor.source_entries().is_empty());
    }

    #[test]
    fn wildcard_matching_is_per_field() {
        let a: ProtocolInfoEntry = "http-get:*:audio/mpeg:*".parse().unwrap();
        let b: ProtocolInfoEntry = "http-get:eth0:audio/mpeg:something".parse().unwrap();
        let c: ProtocolInfoEntry = "rtsp-rtp-udp:*:audio/mpeg:*".parse().unwrap();
        assert!(a.matches(&b));
        assert!(b.matches(&a));
        assert!(!a.matches(&c));
    }

    #[test]
    fn renderer_defaults_declare_sink_only() {
        let descriptor = ProtocolInfo::renderer_defaults();
        assert!(descriptor.source().is_empty());
        assert!(!descriptor.sink().is_empty());
        // Every default entry parses under the grammar
        assert_eq!(
            descriptor.sink_entries().len(),
            descriptor.sink().len()
        );
    }
}
