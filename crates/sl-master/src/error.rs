use sl_audio::AudioError;
use sl_dsp::ConfigError;

/// Errors from [`AudioEngine`](crate::AudioEngine).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("audio device unavailable: {0}")]
    Audio(#[from] AudioError),
    /// `play` before a successful `start`.
    #[error("engine has not been started")]
    NotStarted,
    /// Any call after teardown.
    #[error("engine has been shut down")]
    Terminated,
    #[error("failed to spawn generator thread: {0}")]
    GeneratorSpawn(#[source] std::io::Error),
}
