use crate::{
    events::{
        RoomEvent,
        RoomEvents,
    },
    track::{
        AudioSampleSource,
        AudioTrackHandle,
        Publication,
        TrackDimensions,
        TrackSource,
        VideoTrackHandle,
    },
    transcript::ChatMessage,
};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Arc,
    },
};

const AGENT_IDENTITY: &str = "investor-agent";
const AGENT_METADATA: &str = r#"{"display_name":"The Deal Closer"}"#;
const AVATAR_DIMENSIONS: TrackDimensions = TrackDimensions { width: 512, height: 512 };

/// Deterministic synthesized "speech" signal. Each read advances the phase so
/// the rendered waveform scrolls; the first few reads report no audio, like a
/// track whose media has not negotiated yet.
#[derive(Debug, Default)]
pub struct SyntheticAudio {
    phase: AtomicUsize,
    reads: AtomicUsize,
    warmup: usize,
}

impl SyntheticAudio {
    pub fn with_warmup(warmup: usize) -> Self {
        Self {
            warmup,
            ..Self::default()
        }
    }
}

impl AudioSampleSource for SyntheticAudio {
    fn fill_waveform(&self, buf: &mut [u8]) -> bool {
        if self.reads.fetch_add(1, Ordering::Relaxed) < self.warmup {
            return false;
        }

        let phase = self.phase.fetch_add(3, Ordering::Relaxed);
        for (index, sample) in buf.iter_mut().enumerate() {
            let t = (index + phase) as f64;
            // Two overlaid tones so the trace looks like speech, not a beep.
            let amplitude = (t / 5.0).sin() * 0.6 + (t / 1.7).sin() * 0.25;
            *sample = (128.0 + amplitude * 110.0).clamp(0.0, 255.0) as u8;
        }
        true
    }
}

/// Scripted stand-in for the live agent: publishes tracks and streams partial
/// chat transcripts onto the event registry, one batch per advance. The
/// binary drives it from the tick loop; tests drive it directly.
#[derive(Debug)]
pub struct ScriptedFeed {
    events: RoomEvents,
    steps: VecDeque<Vec<RoomEvent>>,
}

impl ScriptedFeed {
    pub fn investor_session(events: RoomEvents) -> Self {
        let microphone = AudioTrackHandle::new(Arc::new(SyntheticAudio::with_warmup(2)));
        let camera = VideoTrackHandle::new();

        let agent = |id: &str, text: &str| RoomEvent::MessageReceived(ChatMessage::new(id, false, AGENT_IDENTITY, text));

        let steps = VecDeque::from([
            vec![RoomEvent::MetadataChanged {
                identity: AGENT_IDENTITY.to_string(),
                metadata: AGENT_METADATA.to_string(),
            }],
            vec![RoomEvent::TrackPublished {
                source: TrackSource::AgentMicrophone,
                publication: Publication::audio(microphone),
            }],
            vec![agent("a1", "Alright, you have my attention.")],
            vec![agent("a1", "Alright, you have my attention. Give me the pitch and the ask.")],
            vec![agent("a2", "What did you net in the last twelve months?")],
            vec![RoomEvent::TrackPublished {
                source: TrackSource::AgentCamera,
                publication: Publication::video(camera, AVATAR_DIMENSIONS),
            }],
            vec![agent("a3", "And why won't a competitor")],
            vec![agent("a3", "And why won't a competitor crush you tomorrow?")],
            vec![agent("a4", "Convince me the valuation isn't fantasy and we can talk terms.")],
        ]);

        Self { events, steps }
    }

    /// Emit the next scripted batch. Returns `false` once the script is done.
    pub fn advance(&mut self) -> bool {
        let Some(step) = self.steps.pop_front() else {
            return false;
        };
        for event in &step {
            self.events.emit(event);
        }
        !self.steps.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }
}
