use derive_more::Display;
use std::{
    fmt,
    sync::{
        atomic::{
            AtomicU64,
            Ordering,
        },
        Arc,
    },
};
use strum::Display as StrumDisplay;

static NEXT_SID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a published track, unique within the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub struct TrackSid(String);

impl TrackSid {
    pub fn next() -> Self {
        Self(format!("TR_{}", NEXT_SID.fetch_add(1, Ordering::Relaxed)))
    }
}

/// The four media sources this front-end cares about. Everything else a
/// transport might publish is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, serde::Serialize, serde::Deserialize)]
pub enum TrackSource {
    AgentMicrophone,
    AgentCamera,
    LocalCamera,
    LocalScreenShare,
}

impl TrackSource {
    pub fn is_local(&self) -> bool {
        matches!(self, Self::LocalCamera | Self::LocalScreenShare)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TrackDimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for TrackDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Provider of time-domain audio samples for a live track, as exposed by the
/// transport. Samples are unsigned 8-bit amplitudes with 128 at the center
/// line.
pub trait AudioSampleSource: Send + Sync {
    /// Called when an analysis tap attaches to the track. Returns `false`
    /// when the platform cannot provide analysis data for this track, in
    /// which case no tap is created and no `detach` call follows.
    fn attach(&self) -> bool {
        true
    }

    /// Called exactly once when a previously attached tap is released.
    fn detach(&self) {}

    /// Fill `buf` with the most recent samples. Returns `false` when the
    /// underlying media has produced no audio yet (e.g. not negotiated).
    fn fill_waveform(&self, buf: &mut [u8]) -> bool;
}

/// Opaque reference to a live audio track. Cloning shares the underlying
/// sample source; equality is by track sid.
#[derive(Clone)]
pub struct AudioTrackHandle {
    sid: TrackSid,
    source: Arc<dyn AudioSampleSource>,
}

impl AudioTrackHandle {
    pub fn new(source: Arc<dyn AudioSampleSource>) -> Self {
        Self {
            sid: TrackSid::next(),
            source,
        }
    }

    pub fn sid(&self) -> &TrackSid {
        &self.sid
    }

    pub(crate) fn source(&self) -> &Arc<dyn AudioSampleSource> {
        &self.source
    }
}

impl fmt::Debug for AudioTrackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioTrackHandle").field("sid", &self.sid).finish()
    }
}

impl PartialEq for AudioTrackHandle {
    fn eq(&self, other: &Self) -> bool {
        self.sid == other.sid
    }
}

impl Eq for AudioTrackHandle {}

/// Opaque reference to a live video track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoTrackHandle {
    sid: TrackSid,
}

impl VideoTrackHandle {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self { sid: TrackSid::next() }
    }

    pub fn sid(&self) -> &TrackSid {
        &self.sid
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackHandle {
    Audio(AudioTrackHandle),
    Video(VideoTrackHandle),
}

/// Transport-level record that a participant is offering a track, including
/// mute state and, for video, pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub handle: TrackHandle,
    pub muted: bool,
    pub dimensions: Option<TrackDimensions>,
}

impl Publication {
    pub fn audio(handle: AudioTrackHandle) -> Self {
        Self {
            handle: TrackHandle::Audio(handle),
            muted: false,
            dimensions: None,
        }
    }

    pub fn video(handle: VideoTrackHandle, dimensions: TrackDimensions) -> Self {
        Self {
            handle: TrackHandle::Video(handle),
            muted: false,
            dimensions: Some(dimensions),
        }
    }
}
