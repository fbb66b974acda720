use crate::events::{
    RoomEvent,
    RoomEvents,
    Subscription,
};
use chrono::{
    DateTime,
    Utc,
};
use std::sync::{
    Arc,
    Mutex,
};

/// A single chat entry as delivered over the data channel. Streaming partial
/// transcripts arrive as repeated messages with the same id and growing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub local: bool,
    pub sender: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(id: impl Into<String>, local: bool, sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            local,
            sender: sender.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// What the rendering layer should do with its scroll position after a
/// message lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollEffect {
    /// Force the view to the newest entry (the local user just sent this).
    StickToBottom,
    /// Leave the reading position alone.
    Keep,
}

/// Append-only ordered log of chat messages.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    stick_requested: bool,
}

impl Transcript {
    /// Append `message`, or update the text of the last entry in place when
    /// id and sender match it (streaming partial support). Messages are never
    /// removed or reordered.
    pub fn push(&mut self, message: ChatMessage) -> ScrollEffect {
        let local = message.local;

        match self.messages.last_mut() {
            Some(last) if last.id == message.id && last.sender == message.sender => {
                last.text = message.text;
                last.timestamp = message.timestamp;
            }
            _ => self.messages.push(message),
        }

        if local {
            self.stick_requested = true;
            ScrollEffect::StickToBottom
        } else {
            ScrollEffect::Keep
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consume the pending scroll-to-bottom request, if any. Set whenever a
    /// local-origin message was pushed since the last call.
    pub fn take_stick_request(&mut self) -> bool {
        std::mem::take(&mut self.stick_requested)
    }
}

pub type SharedTranscript = Arc<Mutex<Transcript>>;

impl Transcript {
    /// Subscribe a shared transcript to the event stream. It fills itself
    /// from `MessageReceived` events for as long as the subscription lives.
    pub fn attach(events: &RoomEvents) -> (SharedTranscript, Subscription) {
        let transcript = SharedTranscript::default();
        let subscription = {
            let transcript = transcript.clone();
            events.subscribe(move |event| {
                if let RoomEvent::MessageReceived(message) = event {
                    transcript.lock().unwrap().push(message.clone());
                }
            })
        };
        (transcript, subscription)
    }
}
