//! Generator thread, render callback and device lifecycle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use sl_audio::{
    CpalDevice, DeviceSpec, OutputDevice, RingBuffer, SampleConsumer, SampleProducer,
};
use sl_dsp::{ControlTargets, SynthConfig, SynthEngine};

use crate::error::EngineError;

/// Lifecycle of an [`AudioEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, device not opened yet.
    Idle,
    /// Device open and pulling samples.
    Running,
    /// Torn down. Terminal.
    Stopped,
}

/// Shutdown flag and the condvar the generator parks on while the ring is full.
#[derive(Default)]
struct Wakeup {
    shutdown: Mutex<bool>,
    space: Condvar,
}

impl Wakeup {
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.shutdown.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.space.notify_one();
    }

    fn request_shutdown(&self) {
        // Set under the lock so a generator between its predicate check and
        // its wait cannot miss the flag.
        *self.lock() = true;
        self.notify();
    }

    fn is_shutdown(&self) -> bool {
        *self.lock()
    }
}

/// Everything the generator thread owns, built by `start` and moved by `play`.
struct Generator {
    synth: SynthEngine,
    producer: SampleProducer,
    block: Vec<i16>,
}

impl Generator {
    fn run(mut self, wakeup: &Wakeup) {
        log::info!("generator started ({} samples/block)", self.block.len());
        loop {
            self.render_block();

            let mut remaining = self.producer.write(&self.block);
            while remaining > 0 {
                log::trace!("ring full, waiting to write {} samples", remaining);
                let guard = wakeup
                    .space
                    .wait_while(wakeup.lock(), |shutdown| {
                        !*shutdown && !self.producer.has_space()
                    })
                    .unwrap_or_else(PoisonError::into_inner);
                if *guard {
                    break;
                }
                drop(guard);

                let offset = self.block.len() - remaining;
                remaining = self.producer.write(&self.block[offset..]);
            }

            if wakeup.is_shutdown() {
                break;
            }
        }
        log::info!("generator stopped");
    }

    #[cfg(not(feature = "alloc_check"))]
    fn render_block(&mut self) {
        self.synth.generate_block(&mut self.block);
    }

    #[cfg(feature = "alloc_check")]
    fn render_block(&mut self) {
        let Self { synth, block, .. } = self;
        assert_no_alloc::assert_no_alloc(|| synth.generate_block(block));
    }
}

/// Build the real-time callback: drain the ring, zero-fill any underrun,
/// then wake the generator. Never locks, never allocates.
fn render_callback(
    mut consumer: SampleConsumer,
    wakeup: Arc<Wakeup>,
    underruns: Arc<AtomicU64>,
) -> impl FnMut(&mut [i16]) + Send + 'static {
    move |out: &mut [i16]| {
        let shortfall = consumer.read(out);
        if shortfall > 0 {
            let filled = out.len() - shortfall;
            out[filled..].fill(0);
            underruns.fetch_add(1, Ordering::Relaxed);
        }
        wakeup.notify();
    }
}

/// Streams the synth to an output device.
///
/// `start` opens the device, `play` launches the generator thread, and
/// `stop` (or drop) joins the thread and closes the device.
pub struct AudioEngine {
    config: SynthConfig,
    device: Box<dyn OutputDevice>,
    controls: Arc<ControlTargets>,
    wakeup: Arc<Wakeup>,
    underruns: Arc<AtomicU64>,
    state: EngineState,
    pending: Option<Generator>,
    generator: Option<JoinHandle<()>>,
}

impl AudioEngine {
    /// Create an idle engine that will play through `device`.
    pub fn new(config: SynthConfig, device: impl OutputDevice + 'static) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            device: Box::new(device),
            controls: Arc::new(ControlTargets::new()),
            wakeup: Arc::new(Wakeup::default()),
            underruns: Arc::new(AtomicU64::new(0)),
            state: EngineState::Idle,
            pending: None,
            generator: None,
        })
    }

    /// Create an idle engine on the default system output.
    pub fn with_default_device(config: SynthConfig) -> Result<Self, EngineError> {
        Self::new(config, CpalDevice::new())
    }

    /// Open the device and register the render callback.
    ///
    /// On error the engine stays idle and must not be played.
    pub fn start(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Stopped => return Err(EngineError::Terminated),
            EngineState::Running => return Ok(()),
            EngineState::Idle => {}
        }

        let (producer, consumer) = RingBuffer::with_block_size(self.config.block_size).split();
        let spec = DeviceSpec::mono(self.config.sample_rate, self.config.block_size);
        let callback = render_callback(
            consumer,
            Arc::clone(&self.wakeup),
            Arc::clone(&self.underruns),
        );

        let obtained = self.device.open(&spec, Box::new(callback))?;
        let mut synth_config = self.config.clone();
        if obtained != spec {
            log::warn!("device opened with {:?}, requested {:?}", obtained, spec);
            // Render at the device rate so pitch and tempo stay put
            if obtained.sample_rate != 0 {
                synth_config.sample_rate = obtained.sample_rate;
            }
        }

        self.pending = Some(Generator {
            synth: SynthEngine::with_controls(&synth_config, Arc::clone(&self.controls)),
            producer,
            block: vec![0; self.config.block_size],
        });
        self.state = EngineState::Running;
        Ok(())
    }

    /// Launch the generator thread. No-op if it is already running.
    pub fn play(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Stopped => return Err(EngineError::Terminated),
            EngineState::Idle => return Err(EngineError::NotStarted),
            EngineState::Running => {}
        }
        if self.generator.is_some() {
            return Ok(());
        }

        let generator = self.pending.take().ok_or(EngineError::NotStarted)?;
        let wakeup = Arc::clone(&self.wakeup);
        let handle = thread::Builder::new()
            .name("sawloop-generator".into())
            .spawn(move || generator.run(&wakeup))
            .map_err(EngineError::GeneratorSpawn)?;
        self.generator = Some(handle);
        Ok(())
    }

    /// Join the generator and close the device. Idempotent; the engine
    /// cannot be restarted afterwards.
    pub fn stop(&mut self) {
        if self.state == EngineState::Stopped {
            return;
        }
        if let Some(handle) = self.generator.take() {
            self.wakeup.request_shutdown();
            if handle.join().is_err() {
                log::error!("generator thread panicked");
            }
        }
        self.pending = None;
        if self.state == EngineState::Running {
            self.device.close();
        }
        self.state = EngineState::Stopped;
    }

    /// Glide tuning: `+1` up, `-1` down, `0` hold.
    pub fn set_tuning(&self, delta: i32) {
        self.controls.set_tuning(delta);
    }

    /// Glide filter cutoff: `+1` open, `-1` close, `0` hold.
    pub fn set_cutoff(&self, delta: i32) {
        self.controls.set_cutoff(delta);
    }

    /// Control handle that can be moved to an input thread.
    pub fn controls(&self) -> Arc<ControlTargets> {
        Arc::clone(&self.controls)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.generator.is_some()
    }

    /// Number of callbacks that had to pad with silence.
    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
