//! Output device trait and error types.

/// Error type for audio operations.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// No output device available
    #[error("no audio output device available")]
    NoDevice,
    /// The device rejected the requested format
    #[error("unsupported output config: {0}")]
    UnsupportedConfig(String),
    /// Failed to create the output stream
    #[error("stream create error: {0}")]
    StreamCreate(String),
    /// Failed to start playback
    #[error("playback error: {0}")]
    Playback(String),
    /// `open` called on a device that is already open
    #[error("device is already open")]
    AlreadyOpen,
}

/// Format requested from (and reported by) an output device.
///
/// Samples are always signed 16-bit; `channels` is 1 for sawloop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceSpec {
    pub sample_rate: u32,
    pub channels: u16,
    /// Frames per callback.
    pub block_size: usize,
}

impl DeviceSpec {
    pub fn mono(sample_rate: u32, block_size: usize) -> Self {
        Self {
            sample_rate,
            channels: 1,
            block_size,
        }
    }
}

/// Real-time render callback. Must fill the whole slice and must not block.
pub type RenderCallback = Box<dyn FnMut(&mut [i16]) + Send + 'static>;

/// An audio output that pulls samples through a registered callback on its
/// own thread and schedule.
pub trait OutputDevice {
    /// Open the device, register `callback` and start playback.
    ///
    /// Returns the spec actually obtained.
    fn open(&mut self, spec: &DeviceSpec, callback: RenderCallback) -> Result<DeviceSpec, AudioError>;

    /// Stop playback and release the device. Safe to call when not open.
    fn close(&mut self);
}
