use pitch_tank_config::ThemePreference;
use ratatui::style::{
    Color,
    Modifier,
    Style,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Theme {
    pub(crate) default: Style,
    pub(crate) text_default: Style,
    pub(crate) text_dim: Style,
    pub(crate) text_selected: Style,
    pub(crate) border_focused: Style,
    pub(crate) border_unfocused: Style,
    pub(crate) agent_accent: Style,
    pub(crate) local_accent: Style,
    pub(crate) fade: Style,
    pub(crate) waveform: Color,
    pub(crate) avatar: Color,
}

impl Theme {
    fn dark() -> Self {
        Self {
            default: Style::default().bg(Color::Black).fg(Color::Gray),
            text_default: Style::default(),
            text_dim: Style::default().fg(Color::DarkGray),
            text_selected: Style::default().fg(Color::Yellow),
            border_focused: Style::default().fg(Color::White),
            border_unfocused: Style::default().fg(Color::DarkGray),
            agent_accent: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            local_accent: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            fade: Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
            waveform: Color::Cyan,
            avatar: Color::LightBlue,
        }
    }

    fn light() -> Self {
        Self {
            default: Style::default().bg(Color::White).fg(Color::Black),
            text_default: Style::default(),
            text_dim: Style::default().fg(Color::Gray),
            text_selected: Style::default().fg(Color::Blue),
            border_focused: Style::default().fg(Color::Black),
            border_unfocused: Style::default().fg(Color::Gray),
            agent_accent: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            local_accent: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            fade: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            waveform: Color::Blue,
            avatar: Color::Indexed(25),
        }
    }

    /// `System` renders with the terminal's own colors as far as possible,
    /// which in practice means the dark palette minus the forced background.
    pub(crate) fn from_preference(preference: ThemePreference) -> Self {
        match preference {
            ThemePreference::Dark => Self::dark(),
            ThemePreference::Light => Self::light(),
            ThemePreference::System => Self {
                default: Style::default(),
                ..Self::dark()
            },
        }
    }

    pub(crate) fn border(&self, focused: bool) -> Style {
        if focused {
            self.border_focused
        } else {
            self.border_unfocused
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_preference(ThemePreference::default())
    }
}
