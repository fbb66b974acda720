/// Label used when neither metadata nor identity yields a usable name.
pub const FALLBACK_AGENT_NAME: &str = "Investor";

/// Derive a participant display name from its metadata blob.
///
/// The backend publishes metadata as a JSON object with an optional
/// `display_name` field. Anything that fails to parse, or parses without the
/// field, falls back to the participant identity; this is never an error the
/// user sees.
pub fn display_name(identity: &str, metadata: &str) -> String {
    let from_metadata = serde_json::from_str::<serde_json::Value>(metadata)
        .ok()
        .and_then(|value| {
            value
                .get("display_name")
                .and_then(|name| name.as_str())
                .map(str::to_string)
        })
        .filter(|name| !name.trim().is_empty());

    if let Some(name) = from_metadata {
        return name;
    }

    if identity.trim().is_empty() {
        FALLBACK_AGENT_NAME.to_string()
    } else {
        identity.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_name_comes_from_metadata_when_present() {
        assert_eq!(display_name("agent-1", r#"{"display_name":"The Deal Closer"}"#), "The Deal Closer");
    }

    #[test]
    fn malformed_metadata_falls_back_to_identity() {
        assert_eq!(display_name("agent-1", "{not json"), "agent-1");
        assert_eq!(display_name("agent-1", ""), "agent-1");
        assert_eq!(display_name("agent-1", r#"{"display_name":42}"#), "agent-1");
        assert_eq!(display_name("agent-1", r#"{"display_name":"  "}"#), "agent-1");
    }

    #[test]
    fn empty_identity_falls_back_to_the_generic_label() {
        assert_eq!(display_name("", "{}"), FALLBACK_AGENT_NAME);
    }
}
