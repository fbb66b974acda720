use crate::components::transcript::TranscriptAction;
use pitch_tank_config::ThemePreference;
use serde::{
    Deserialize,
    Serialize,
};
use serde_yml::with::singleton_map_recursive;
use strum::Display;

#[derive(Display, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    ClearScreen,
    Error(String),

    // Control-surface toggles.
    ToggleChat,
    ToggleCamera,
    ToggleScreenShare,
    ToggleTheme,
    ToggleLogs,

    // Broadcast state changes the components follow.
    ChatOpenChanged(bool),
    ThemeChanged(ThemePreference),

    #[allow(clippy::enum_variant_names)]
    #[serde(with = "singleton_map_recursive")]
    Transcript(TranscriptAction),
}
