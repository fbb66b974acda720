//! Transport-facing core of the pitch-session front-end: track/participant
//! observation, presence reconciliation, audio analysis, and the chat
//! transcript. Everything here is synchronous and event-driven; the rendering
//! layer lives in the root crate.

#[macro_use]
extern crate tracing;

pub mod analysis;
pub mod events;
pub mod feed;
pub mod metadata;
pub mod presence;
pub mod reconciler;
pub mod room;
pub mod track;
pub mod transcript;
