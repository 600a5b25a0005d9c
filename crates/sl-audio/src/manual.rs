//! Output device driven by hand, for tests.

use std::sync::{Arc, Mutex, PoisonError};

use crate::traits::{AudioError, DeviceSpec, OutputDevice, RenderCallback};

#[derive(Default)]
struct ManualState {
    callback: Option<RenderCallback>,
    spec: Option<DeviceSpec>,
    fail_open: bool,
    /// Rate reported back from `open` instead of the requested one.
    sample_rate: Option<u32>,
    opens: usize,
}

/// A device whose callback runs only when the test calls [`ManualDevice::pull`].
///
/// Clones share state: hand one clone to the engine and keep the other.
#[derive(Clone, Default)]
pub struct ManualDevice {
    state: Arc<Mutex<ManualState>>,
}

impl ManualDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device whose `open` always fails with [`AudioError::NoDevice`].
    pub fn unavailable() -> Self {
        let device = Self::default();
        device.lock().fail_open = true;
        device
    }

    /// A device that opens at `sample_rate` whatever rate is requested.
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        let device = Self::default();
        device.lock().sample_rate = Some(sample_rate);
        device
    }

    /// Invoke the registered callback on `out`. Returns `false` if closed.
    pub fn pull(&self, out: &mut [i16]) -> bool {
        match self.lock().callback.as_mut() {
            Some(callback) => {
                callback(out);
                true
            }
            None => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.lock().callback.is_some()
    }

    /// Spec reported by the last successful `open`.
    pub fn spec(&self) -> Option<DeviceSpec> {
        self.lock().spec
    }

    /// Number of successful opens.
    pub fn opens(&self) -> usize {
        self.lock().opens
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutputDevice for ManualDevice {
    fn open(&mut self, spec: &DeviceSpec, callback: RenderCallback) -> Result<DeviceSpec, AudioError> {
        let mut state = self.lock();
        if state.fail_open {
            return Err(AudioError::NoDevice);
        }
        if state.callback.is_some() {
            return Err(AudioError::AlreadyOpen);
        }
        let obtained = DeviceSpec {
            sample_rate: state.sample_rate.unwrap_or(spec.sample_rate),
            ..*spec
        };
        state.callback = Some(callback);
        state.spec = Some(obtained);
        state.opens += 1;
        Ok(obtained)
    }

    fn close(&mut self) {
        self.lock().callback = None;
    }
}
