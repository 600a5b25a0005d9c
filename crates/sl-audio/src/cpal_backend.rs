//! CPAL-based audio output backend.
//!
//! The requested `i16` mono format is used when the device advertises it.
//! Otherwise the stream opens with the device's default config and each
//! mono sample is converted and written to every channel.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, BuildStreamError, Device, FromSample, OutputCallbackInfo, Sample, SampleFormat,
    SampleRate, SizedSample, Stream, StreamConfig, SupportedBufferSize,
};

use crate::traits::{AudioError, DeviceSpec, OutputDevice, RenderCallback};

/// Mono frames rendered per pass on the converting path.
const SCRATCH_FRAMES: usize = 4096;

/// Default output device of the default host.
#[derive(Default)]
pub struct CpalDevice {
    stream: Option<Stream>,
}

impl CpalDevice {
    pub fn new() -> Self {
        Self { stream: None }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl OutputDevice for CpalDevice {
    fn open(&mut self, spec: &DeviceSpec, callback: RenderCallback) -> Result<DeviceSpec, AudioError> {
        if self.stream.is_some() {
            return Err(AudioError::AlreadyOpen);
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;

        let (stream, obtained) = match exact_buffer_size(&device, spec) {
            Some(buffer_size) => {
                let config = StreamConfig {
                    channels: spec.channels,
                    sample_rate: SampleRate(spec.sample_rate),
                    buffer_size,
                };
                let stream = build_direct(&device, &config, callback)
                    .map_err(|e| AudioError::StreamCreate(e.to_string()))?;
                (stream, *spec)
            }
            None => {
                let default = device
                    .default_output_config()
                    .map_err(|e| AudioError::UnsupportedConfig(e.to_string()))?;
                let format = default.sample_format();
                let config: StreamConfig = default.into();
                log::info!(
                    "i16 mono at {} Hz not offered, converting to {:?} x{} at {} Hz",
                    spec.sample_rate,
                    format,
                    config.channels,
                    config.sample_rate.0
                );

                let stream = match format {
                    SampleFormat::I16 => build_converting::<i16>(&device, &config, callback),
                    SampleFormat::U16 => build_converting::<u16>(&device, &config, callback),
                    SampleFormat::F32 => build_converting::<f32>(&device, &config, callback),
                    other => {
                        return Err(AudioError::UnsupportedConfig(format!(
                            "sample format {:?}",
                            other
                        )))
                    }
                }
                .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

                let obtained = DeviceSpec {
                    sample_rate: config.sample_rate.0,
                    channels: config.channels,
                    block_size: spec.block_size,
                };
                (stream, obtained)
            }
        };

        stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;

        log::info!(
            "opened {} at {} Hz, {} ch, {} frames/callback",
            device.name().unwrap_or_else(|_| "output device".into()),
            obtained.sample_rate,
            obtained.channels,
            obtained.block_size
        );
        self.stream = Some(stream);
        Ok(obtained)
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::warn!("failed to pause stream on close: {}", e);
            }
            log::info!("closed audio device");
        }
    }
}

impl Drop for CpalDevice {
    fn drop(&mut self) {
        self.close();
    }
}

/// Buffer size to request if the device offers `spec` as `i16` directly.
///
/// `None` means the format isn't offered and the converting path is needed.
fn exact_buffer_size(device: &Device, spec: &DeviceSpec) -> Option<BufferSize> {
    let rate = SampleRate(spec.sample_rate);
    let range = device.supported_output_configs().ok()?.find(|range| {
        range.channels() == spec.channels
            && range.sample_format() == SampleFormat::I16
            && range.min_sample_rate() <= rate
            && rate <= range.max_sample_rate()
    })?;

    let frames = u32::try_from(spec.block_size).ok();
    let buffer_size = match (range.buffer_size(), frames) {
        (SupportedBufferSize::Range { min, max }, Some(frames)) if (*min..=*max).contains(&frames) => {
            BufferSize::Fixed(frames)
        }
        _ => BufferSize::Default,
    };
    Some(buffer_size)
}

fn build_direct(
    device: &Device,
    config: &StreamConfig,
    mut callback: RenderCallback,
) -> Result<Stream, BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [i16], _: &OutputCallbackInfo| callback(data),
        |err| log::warn!("audio stream error: {}", err),
        None,
    )
}

fn build_converting<T>(
    device: &Device,
    config: &StreamConfig,
    mut callback: RenderCallback,
) -> Result<Stream, BuildStreamError>
where
    T: SizedSample + FromSample<i16>,
{
    let channels = config.channels as usize;
    let mut scratch = vec![0i16; SCRATCH_FRAMES];
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &OutputCallbackInfo| {
            render_fanned(&mut callback, &mut scratch, data, channels)
        },
        |err| log::warn!("audio stream error: {}", err),
        None,
    )
}

/// Render mono blocks into `scratch` and copy each sample to every channel
/// of the interleaved `data`. Never allocates.
fn render_fanned<T, F>(callback: &mut F, scratch: &mut [i16], data: &mut [T], channels: usize)
where
    T: Sample + FromSample<i16>,
    F: FnMut(&mut [i16]) + ?Sized,
{
    let channels = channels.max(1);
    for chunk in data.chunks_mut(scratch.len() * channels) {
        let mono = &mut scratch[..chunk.len() / channels];
        callback(mono);
        for (frame, &sample) in chunk.chunks_exact_mut(channels).zip(mono.iter()) {
            frame.fill(T::from_sample(sample));
        }
    }
}
