use crate::{
    presence::{
        LocalMediaPresence,
        RemoteAgentPresence,
    },
    track::{
        AudioTrackHandle,
        VideoTrackHandle,
    },
};
use strum::Display;

/// The discrete arrangement of visual slots. Exactly one mode holds at any
/// instant; it changes only when one of the three [`LayoutInputs`] changes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, serde::Serialize, serde::Deserialize)]
pub enum LayoutMode {
    /// No chat panel; the agent stage has the whole area and the second tile,
    /// if there is one, sits in a small bottom-right anchor.
    #[default]
    AgentFull,
    /// Chat panel open, no second tile; the agent stage shrinks but keeps the
    /// whole remaining row to itself.
    SidePanelWide,
    /// Chat panel open with a second tile beside the agent stage on the same
    /// row.
    SidePanelSplit,
}

/// The three signals layout is a function of. No hidden state: previous
/// geometry is only ever used for animating, never for deciding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayoutInputs {
    pub chat_open: bool,
    pub second_tile_visible: bool,
    pub avatar_present: bool,
}

impl LayoutInputs {
    pub fn derive(agent: &RemoteAgentPresence, local: &LocalMediaPresence, chat_open: bool) -> Self {
        Self {
            chat_open,
            second_tile_visible: local.any_active(),
            avatar_present: agent.has_video(),
        }
    }
}

impl LayoutMode {
    /// Pure mode selection. The second tile claims a column only while the
    /// chat panel is open; with the panel closed it stays in its anchor and
    /// the stage keeps the full area regardless of what else is live.
    pub fn select(inputs: LayoutInputs) -> Self {
        match (inputs.chat_open, inputs.second_tile_visible) {
            (false, _) => Self::AgentFull,
            (true, false) => Self::SidePanelWide,
            (true, true) => Self::SidePanelSplit,
        }
    }

    pub fn chat_panel_open(&self) -> bool {
        !matches!(self, Self::AgentFull)
    }
}

/// Which sub-rendering occupies the agent stage slot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum StageView {
    /// No agent media yet: idle waveform placeholder.
    #[default]
    Idle,
    /// Audio only: scrolling waveform bound to the agent's audio handle.
    Waveform(AudioTrackHandle),
    /// Avatar video. Wins over the waveform whenever video is present, even
    /// with audio live at the same time; the two are never mixed.
    Avatar(VideoTrackHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StageViewKind {
    Idle,
    Waveform,
    Avatar,
}

impl StageView {
    pub fn select(agent: &RemoteAgentPresence) -> Self {
        if let Some(video) = &agent.video {
            Self::Avatar(video.clone())
        } else if let Some(audio) = &agent.audio {
            Self::Waveform(audio.clone())
        } else {
            Self::Idle
        }
    }

    pub fn kind(&self) -> StageViewKind {
        match self {
            Self::Idle => StageViewKind::Idle,
            Self::Waveform(_) => StageViewKind::Waveform,
            Self::Avatar(_) => StageViewKind::Avatar,
        }
    }

    pub fn audio_handle(&self) -> Option<&AudioTrackHandle> {
        match self {
            Self::Waveform(handle) => Some(handle),
            _ => None,
        }
    }
}

/// What occupies the secondary tile. Camera and screen share are mutually
/// exclusive sources in the UI; when both publications are live the screen
/// share occupies the slot and the camera stays unrendered until it stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryTile {
    Camera(VideoTrackHandle),
    ScreenShare(VideoTrackHandle),
}

impl SecondaryTile {
    pub fn select(local: &LocalMediaPresence) -> Option<Self> {
        match (&local.screen_share, &local.camera) {
            (Some(share), _) => Some(Self::ScreenShare(share.clone())),
            (None, Some(camera)) => Some(Self::Camera(camera.clone())),
            (None, None) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Camera(_) => "Camera",
            Self::ScreenShare(_) => "Screen share",
        }
    }
}

/// One reconciliation pass: everything the rendering layer needs, recomputed
/// from scratch on every input change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub inputs: LayoutInputs,
    pub mode: LayoutMode,
    pub stage: StageView,
    pub tile: Option<SecondaryTile>,
}

pub fn reconcile(agent: &RemoteAgentPresence, local: &LocalMediaPresence, chat_open: bool) -> Reconciled {
    let inputs = LayoutInputs::derive(agent, local, chat_open);
    Reconciled {
        inputs,
        mode: LayoutMode::select(inputs),
        stage: StageView::select(agent),
        tile: SecondaryTile::select(local),
    }
}
