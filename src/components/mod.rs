mod component;
pub mod logs;
pub mod stage;
pub mod tile;
pub mod transcript;
mod waveform;

pub use component::Component;
