//! Product source-type data
//!
//! Display names for the sources a stock software player exposes, keyed by
//! source type. Static data; nothing mutates it at runtime.

/// Source type to default display name.
pub const SOURCE_TYPES: &[(&str, &str)] = &[
    ("NetAux", "Net Aux"),
    ("Playlist", "Playlist"),
    ("Radio", "Radio"),
    ("Receiver", "Songcast"),
    ("Spotify", "Spotify"),
    ("UpnpAv", "UPnP AV"),
    ("Scd", "Scd"),
];

/// Default display name for a source type, if the product defines one.
pub fn source_display_name(source_type: &str) -> Option<&'static str> {
    SOURCE_TYPES
        .iter()
        .find(|(ty, _)| *ty == source_type)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_source_types_resolve() {
        assert_eq!(source_display_name("Receiver"), Some("Songcast"));
        assert_eq!(source_display_name("UpnpAv"), Some("UPnP AV"));
    }

    #[test]
    fn unknown_source_type_is_none() {
        assert_eq!(source_display_name("Cassette"), None);
    }
}
