use crate::{
    events::{
        RoomEvent,
        RoomEvents,
        Subscription,
    },
    metadata,
    track::{
        AudioTrackHandle,
        Publication,
        TrackDimensions,
        TrackHandle,
        TrackSource,
        VideoTrackHandle,
    },
};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
    },
};

/// What media the remote agent currently has active. Handles are only present
/// for active, unmuted publications, so `has_video` implies a usable video
/// handle by construction.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemoteAgentPresence {
    pub audio: Option<AudioTrackHandle>,
    pub video: Option<VideoTrackHandle>,
    pub video_dimensions: Option<TrackDimensions>,
}

impl RemoteAgentPresence {
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }
}

/// What the local user currently has active.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LocalMediaPresence {
    pub camera: Option<VideoTrackHandle>,
    pub screen_share: Option<VideoTrackHandle>,
}

impl LocalMediaPresence {
    pub fn camera_active(&self) -> bool {
        self.camera.is_some()
    }

    pub fn screen_share_active(&self) -> bool {
        self.screen_share.is_some()
    }

    pub fn any_active(&self) -> bool {
        self.camera_active() || self.screen_share_active()
    }
}

/// Folds transport events into the current publication set and derives
/// presence summaries from it. Purely synchronous; before any event has
/// arrived every presence field reports absent.
#[derive(Debug, Default)]
pub struct RoomObserver {
    publications: HashMap<TrackSource, Publication>,
    agent_identity: Option<String>,
    agent_metadata: Option<String>,
}

pub type SharedObserver = Arc<Mutex<RoomObserver>>;

impl RoomObserver {
    /// Subscribe a shared observer to the event stream. Presence recomputes
    /// synchronously on every event for as long as the subscription lives.
    pub fn attach(events: &RoomEvents) -> (SharedObserver, Subscription) {
        let observer = SharedObserver::default();
        let subscription = {
            let observer = observer.clone();
            events.subscribe(move |event| observer.lock().unwrap().apply(event))
        };
        (observer, subscription)
    }

    pub fn apply(&mut self, event: &RoomEvent) {
        match event {
            RoomEvent::TrackPublished { source, publication } => {
                self.publications.insert(*source, publication.clone());
            }
            RoomEvent::TrackUnpublished { source } => {
                self.publications.remove(source);
            }
            RoomEvent::MuteChanged { source, muted } => {
                if let Some(publication) = self.publications.get_mut(source) {
                    publication.muted = *muted;
                }
            }
            RoomEvent::DimensionsChanged { source, dimensions } => {
                if let Some(publication) = self.publications.get_mut(source) {
                    publication.dimensions = Some(*dimensions);
                }
            }
            RoomEvent::MetadataChanged { identity, metadata } => {
                self.agent_identity = Some(identity.clone());
                self.agent_metadata = Some(metadata.clone());
            }
            RoomEvent::Disconnected => {
                // The remote peer is gone; local media stays as-is.
                self.publications.retain(|source, _| source.is_local());
                self.agent_identity = None;
                self.agent_metadata = None;
            }
            RoomEvent::MessageReceived(_) => {}
        }
    }

    fn active(&self, source: TrackSource) -> Option<&Publication> {
        self.publications.get(&source).filter(|publication| !publication.muted)
    }

    fn active_video(&self, source: TrackSource) -> Option<VideoTrackHandle> {
        self.active(source).and_then(|publication| match &publication.handle {
            TrackHandle::Video(handle) => Some(handle.clone()),
            TrackHandle::Audio(_) => None,
        })
    }

    pub fn agent_presence(&self) -> RemoteAgentPresence {
        let audio = self.active(TrackSource::AgentMicrophone).and_then(|publication| match &publication.handle {
            TrackHandle::Audio(handle) => Some(handle.clone()),
            TrackHandle::Video(_) => None,
        });
        let camera = self.active(TrackSource::AgentCamera);
        let video_dimensions = camera.and_then(|publication| publication.dimensions);

        RemoteAgentPresence {
            audio,
            video: self.active_video(TrackSource::AgentCamera),
            video_dimensions,
        }
    }

    pub fn local_presence(&self) -> LocalMediaPresence {
        LocalMediaPresence {
            camera: self.active_video(TrackSource::LocalCamera),
            screen_share: self.active_video(TrackSource::LocalScreenShare),
        }
    }

    /// Display name of the remote agent, derived from its metadata blob with
    /// a fallback to the identity and then to a generic label.
    pub fn agent_display_name(&self) -> String {
        match (&self.agent_identity, &self.agent_metadata) {
            (Some(identity), Some(blob)) => metadata::display_name(identity, blob),
            (Some(identity), None) => identity.clone(),
            _ => metadata::FALLBACK_AGENT_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{
        AudioSampleSource,
        Publication,
    };
    use pretty_assertions::assert_eq;

    struct Silence;

    impl AudioSampleSource for Silence {
        fn fill_waveform(&self, _buf: &mut [u8]) -> bool {
            false
        }
    }

    fn audio_publication() -> Publication {
        Publication::audio(AudioTrackHandle::new(Arc::new(Silence)))
    }

    fn video_publication() -> Publication {
        Publication::video(VideoTrackHandle::new(), TrackDimensions { width: 512, height: 512 })
    }

    #[test]
    fn everything_absent_before_any_event() {
        let observer = RoomObserver::default();
        assert_eq!(observer.agent_presence(), RemoteAgentPresence::default());
        assert_eq!(observer.local_presence(), LocalMediaPresence::default());
    }

    #[test]
    fn publish_and_unpublish_drive_agent_presence() {
        let mut observer = RoomObserver::default();
        observer.apply(&RoomEvent::TrackPublished {
            source: TrackSource::AgentMicrophone,
            publication: audio_publication(),
        });
        assert!(observer.agent_presence().has_audio());
        assert!(!observer.agent_presence().has_video());

        observer.apply(&RoomEvent::TrackUnpublished {
            source: TrackSource::AgentMicrophone,
        });
        assert!(!observer.agent_presence().has_audio());
    }

    #[test]
    fn muted_publications_report_absent() {
        let mut observer = RoomObserver::default();
        observer.apply(&RoomEvent::TrackPublished {
            source: TrackSource::AgentCamera,
            publication: video_publication(),
        });
        assert!(observer.agent_presence().has_video());

        observer.apply(&RoomEvent::MuteChanged {
            source: TrackSource::AgentCamera,
            muted: true,
        });
        let presence = observer.agent_presence();
        assert!(!presence.has_video());
        assert_eq!(presence.video_dimensions, None);

        observer.apply(&RoomEvent::MuteChanged {
            source: TrackSource::AgentCamera,
            muted: false,
        });
        assert!(observer.agent_presence().has_video());
    }

    #[test]
    fn dimension_changes_update_presence() {
        let mut observer = RoomObserver::default();
        observer.apply(&RoomEvent::TrackPublished {
            source: TrackSource::AgentCamera,
            publication: video_publication(),
        });
        observer.apply(&RoomEvent::DimensionsChanged {
            source: TrackSource::AgentCamera,
            dimensions: TrackDimensions { width: 1280, height: 720 },
        });
        assert_eq!(
            observer.agent_presence().video_dimensions,
            Some(TrackDimensions { width: 1280, height: 720 })
        );
    }

    #[test]
    fn disconnect_clears_agent_state_but_keeps_local_media() {
        let mut observer = RoomObserver::default();
        observer.apply(&RoomEvent::TrackPublished {
            source: TrackSource::AgentMicrophone,
            publication: audio_publication(),
        });
        observer.apply(&RoomEvent::TrackPublished {
            source: TrackSource::LocalCamera,
            publication: video_publication(),
        });
        observer.apply(&RoomEvent::Disconnected);

        assert_eq!(observer.agent_presence(), RemoteAgentPresence::default());
        assert!(observer.local_presence().camera_active());
    }

    #[test]
    fn display_name_falls_back_through_identity() {
        let mut observer = RoomObserver::default();
        assert_eq!(observer.agent_display_name(), metadata::FALLBACK_AGENT_NAME);

        observer.apply(&RoomEvent::MetadataChanged {
            identity: "investor-agent".into(),
            metadata: "not json".into(),
        });
        assert_eq!(observer.agent_display_name(), "investor-agent");

        observer.apply(&RoomEvent::MetadataChanged {
            identity: "investor-agent".into(),
            metadata: r#"{"display_name":"The Deal Closer"}"#.into(),
        });
        assert_eq!(observer.agent_display_name(), "The Deal Closer");
    }

    #[test]
    fn attached_observer_follows_the_event_stream() {
        let events = RoomEvents::default();
        let (observer, subscription) = RoomObserver::attach(&events);

        events.emit(&RoomEvent::TrackPublished {
            source: TrackSource::AgentMicrophone,
            publication: audio_publication(),
        });
        assert!(observer.lock().unwrap().agent_presence().has_audio());

        subscription.dispose();
        events.emit(&RoomEvent::TrackUnpublished {
            source: TrackSource::AgentMicrophone,
        });
        // No longer subscribed, the stale snapshot persists.
        assert!(observer.lock().unwrap().agent_presence().has_audio());
    }
}
