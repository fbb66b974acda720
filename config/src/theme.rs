use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumIter,
    EnumString,
};

/// The one persisted user preference. `System` defers to whatever the
/// terminal's ambient palette is.
#[derive(Debug, Default, Clone, Copy, Display, EnumIter, EnumString, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    System,
    Dark,
    Light,
}

impl ThemePreference {
    /// Cycle to the next preference, in toggle order.
    pub fn toggle(self) -> Self {
        match self {
            Self::System => Self::Dark,
            Self::Dark => Self::Light,
            Self::Light => Self::System,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn toggling_cycles_through_all_three() {
        let start = ThemePreference::default();
        assert_eq!(start, ThemePreference::System);
        assert_eq!(start.toggle(), ThemePreference::Dark);
        assert_eq!(start.toggle().toggle(), ThemePreference::Light);
        assert_eq!(start.toggle().toggle().toggle(), start);
    }

    #[test]
    fn parses_and_serializes_lowercase() {
        assert_eq!(ThemePreference::from_str("dark").unwrap(), ThemePreference::Dark);
        assert_eq!(ThemePreference::Light.to_string(), "light");
        assert_eq!(serde_yml::to_string(&ThemePreference::System).unwrap().trim(), "system");
    }
}
