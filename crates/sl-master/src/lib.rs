//! Real-time controller for sawloop.
//!
//! [`AudioEngine`] owns the output device, the generator thread and the
//! ring buffer between them. Input code steers it with integer deltas.

mod engine;
mod error;
mod keys;

pub use engine::{AudioEngine, EngineState};
pub use error::EngineError;
pub use keys::ControlKeys;

// Re-export common types so callers don't need sl-dsp/sl-audio directly.
pub use sl_audio::{AudioError, CpalDevice, DeviceSpec, OutputDevice};
pub use sl_dsp::{ControlTargets, SynthConfig};
