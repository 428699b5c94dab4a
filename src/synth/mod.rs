// Voice management, polyphony, and the audio-thread engine.
// This layer sits above graph nodes and owns everything the callback touches.

pub mod engine;
pub mod message;
pub mod patch;
pub mod voice;

pub use engine::{Engine, EngineStatus, TakeSnapshot};
pub use message::{Command, MessageReceiver};
pub use patch::Patch;
pub use voice::{Voice, VoiceState};
