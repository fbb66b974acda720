use crate::{
    events::{
        RoomEvent,
        RoomEvents,
    },
    track::{
        Publication,
        TrackDimensions,
        TrackSource,
        VideoTrackHandle,
    },
    transcript::ChatMessage,
};
use std::sync::{
    atomic::{
        AtomicU64,
        Ordering,
    },
    Mutex,
};

const CAMERA_DIMENSIONS: TrackDimensions = TrackDimensions { width: 1280, height: 720 };
const SCREEN_SHARE_DIMENSIONS: TrackDimensions = TrackDimensions { width: 1920, height: 1080 };

/// Local side of the session: the media controls and outbound chat a control
/// surface invokes. Everything it does is expressed as events on the shared
/// registry, so the observer and transcript pick changes up the same way they
/// would from a live transport.
#[derive(Debug)]
pub struct Room {
    events: RoomEvents,
    local_identity: String,
    camera: Mutex<Option<VideoTrackHandle>>,
    screen_share: Mutex<Option<VideoTrackHandle>>,
    next_message: AtomicU64,
}

impl Room {
    pub fn new(local_identity: impl Into<String>) -> Self {
        Self {
            events: RoomEvents::default(),
            local_identity: local_identity.into(),
            camera: Mutex::new(None),
            screen_share: Mutex::new(None),
            next_message: AtomicU64::new(1),
        }
    }

    pub fn events(&self) -> &RoomEvents {
        &self.events
    }

    pub fn local_identity(&self) -> &str {
        &self.local_identity
    }

    /// Toggle the local camera publication. Returns the new state.
    pub fn toggle_camera(&self) -> bool {
        Self::toggle(&self.events, &self.camera, TrackSource::LocalCamera, CAMERA_DIMENSIONS)
    }

    /// Toggle the local screen-share publication. Returns the new state.
    pub fn toggle_screen_share(&self) -> bool {
        Self::toggle(
            &self.events,
            &self.screen_share,
            TrackSource::LocalScreenShare,
            SCREEN_SHARE_DIMENSIONS,
        )
    }

    fn toggle(
        events: &RoomEvents,
        slot: &Mutex<Option<VideoTrackHandle>>,
        source: TrackSource,
        dimensions: TrackDimensions,
    ) -> bool {
        let mut slot = slot.lock().unwrap();
        if slot.take().is_some() {
            info!(%source, "unpublishing local track");
            events.emit(&RoomEvent::TrackUnpublished { source });
            false
        } else {
            let handle = VideoTrackHandle::new();
            info!(%source, sid = %handle.sid(), "publishing local track");
            *slot = Some(handle.clone());
            events.emit(&RoomEvent::TrackPublished {
                source,
                publication: Publication::video(handle, dimensions),
            });
            true
        }
    }

    /// Send a chat message as the local participant. The transport would
    /// carry it to the agent; here it is echoed straight onto the stream.
    pub fn send_message(&self, text: impl Into<String>) {
        let id = format!("local-{}", self.next_message.fetch_add(1, Ordering::Relaxed));
        let message = ChatMessage::new(id, true, self.local_identity.clone(), text);
        self.events.emit(&RoomEvent::MessageReceived(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::RoomObserver;
    use pretty_assertions::assert_eq;

    #[test]
    fn camera_toggle_publishes_and_unpublishes() {
        let room = Room::new("founder");
        let (observer, _subscription) = RoomObserver::attach(room.events());

        assert!(room.toggle_camera());
        assert!(observer.lock().unwrap().local_presence().camera_active());

        assert!(!room.toggle_camera());
        assert!(!observer.lock().unwrap().local_presence().camera_active());
    }

    #[test]
    fn camera_and_screen_share_publish_independently() {
        let room = Room::new("founder");
        let (observer, _subscription) = RoomObserver::attach(room.events());

        room.toggle_camera();
        room.toggle_screen_share();
        let local = observer.lock().unwrap().local_presence();
        assert!(local.camera_active());
        assert!(local.screen_share_active());
    }

    #[test]
    fn sent_messages_arrive_as_local_with_fresh_ids() {
        let room = Room::new("founder");
        let received = std::sync::Arc::new(Mutex::new(Vec::new()));
        let _subscription = {
            let received = received.clone();
            room.events().subscribe(move |event| {
                if let RoomEvent::MessageReceived(message) = event {
                    received.lock().unwrap().push(message.clone());
                }
            })
        };

        room.send_message("We are asking for 500k.");
        room.send_message("For 10 percent.");

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert!(received.iter().all(|message| message.local));
        assert_eq!(received[0].sender, "founder");
        assert_ne!(received[0].id, received[1].id);
    }
}
