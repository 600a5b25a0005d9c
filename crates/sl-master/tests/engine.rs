//! Integration test: engine → ring → hand-driven device callback.

use std::thread;
use std::time::Duration;

use sl_audio::{AudioError, DeviceSpec, ManualDevice};
use sl_dsp::{ConfigError, SynthConfig, SynthEngine};
use sl_master::{AudioEngine, EngineError, EngineState};

/// Long enough for the generator to fill the ring and park.
const SETTLE: Duration = Duration::from_millis(300);

fn started_engine(config: SynthConfig) -> (AudioEngine, ManualDevice) {
    let device = ManualDevice::new();
    let mut engine = AudioEngine::new(config, device.clone()).unwrap();
    engine.start().unwrap();
    (engine, device)
}

fn offline_blocks(config: &SynthConfig, blocks: usize) -> Vec<i16> {
    let mut synth = SynthEngine::new(config);
    let mut block = vec![0i16; config.block_size];
    let mut out = Vec::with_capacity(blocks * config.block_size);
    for _ in 0..blocks {
        synth.generate_block(&mut block);
        out.extend_from_slice(&block);
    }
    out
}

#[test]
fn start_opens_mono_device_at_block_size() {
    let (engine, device) = started_engine(SynthConfig::default());
    assert_eq!(engine.state(), EngineState::Running);
    assert_eq!(device.spec(), Some(DeviceSpec::mono(44100, 1024)));
    assert!(!engine.is_playing());
}

#[test]
fn unavailable_device_leaves_engine_unusable() {
    let mut engine = AudioEngine::new(SynthConfig::default(), ManualDevice::unavailable()).unwrap();
    let err = engine.start().unwrap_err();
    assert!(matches!(err, EngineError::Audio(AudioError::NoDevice)));
    assert_eq!(engine.state(), EngineState::Idle);
    assert!(matches!(engine.play(), Err(EngineError::NotStarted)));
}

#[test]
fn invalid_config_is_rejected() {
    let config = SynthConfig { bpm: 0, ..SynthConfig::default() };
    let err = AudioEngine::new(config, ManualDevice::new()).err().unwrap();
    assert!(matches!(err, EngineError::Config(ConfigError::ZeroTempo)));
}

#[test]
fn callback_before_play_pads_with_silence() {
    let (engine, device) = started_engine(SynthConfig::default());
    let mut out = vec![77i16; 1024];
    assert!(device.pull(&mut out));
    assert!(out.iter().all(|&s| s == 0));
    assert_eq!(engine.underruns(), 1);
}

#[test]
fn playing_streams_generated_blocks_in_order() {
    let config = SynthConfig::default();
    let expected = offline_blocks(&config, 3);
    let (mut engine, device) = started_engine(config);
    engine.play().unwrap();
    thread::sleep(SETTLE);

    // Ring holds exactly two blocks; the third waits for space
    let mut out = vec![0i16; 2048];
    assert!(device.pull(&mut out));
    assert_eq!(out, expected[..2048]);

    thread::sleep(SETTLE);
    let mut next = vec![0i16; 1024];
    assert!(device.pull(&mut next));
    assert_eq!(next, expected[2048..]);
    assert_eq!(engine.underruns(), 0);
}

#[test]
fn partial_underrun_zero_fills_only_the_tail() {
    let config = SynthConfig::default();
    let expected = offline_blocks(&config, 2);
    let (mut engine, device) = started_engine(config);
    engine.play().unwrap();
    thread::sleep(SETTLE);

    // Two blocks are buffered; ask for three
    let mut out = vec![77i16; 3072];
    assert!(device.pull(&mut out));
    assert_eq!(out[..2048], expected[..]);
    assert!(out[2048..].iter().all(|&s| s == 0));
    assert_eq!(engine.underruns(), 1);
}

#[test]
fn renders_at_the_rate_the_device_reports() {
    let device = ManualDevice::with_sample_rate(22050);
    let mut engine = AudioEngine::new(SynthConfig::default(), device.clone()).unwrap();
    engine.start().unwrap();
    assert_eq!(device.spec(), Some(DeviceSpec::mono(22050, 1024)));

    engine.play().unwrap();
    thread::sleep(SETTLE);
    let mut out = vec![0i16; 2048];
    assert!(device.pull(&mut out));

    let device_rate = SynthConfig { sample_rate: 22050, ..SynthConfig::default() };
    assert_eq!(out, offline_blocks(&device_rate, 2));
    assert_ne!(out, offline_blocks(&SynthConfig::default(), 2));
}

#[test]
fn play_is_idempotent() {
    let (mut engine, _device) = started_engine(SynthConfig::default());
    engine.play().unwrap();
    engine.play().unwrap();
    assert!(engine.is_playing());
}

#[test]
fn stop_joins_a_parked_generator() {
    let (mut engine, device) = started_engine(SynthConfig::default());
    engine.play().unwrap();
    thread::sleep(SETTLE);

    engine.stop();
    assert_eq!(engine.state(), EngineState::Stopped);
    assert!(!engine.is_playing());
    assert!(!device.is_open());

    assert!(matches!(engine.start(), Err(EngineError::Terminated)));
    assert!(matches!(engine.play(), Err(EngineError::Terminated)));
    engine.stop();
}

#[test]
fn drop_closes_device() {
    let device = ManualDevice::new();
    {
        let mut engine = AudioEngine::new(SynthConfig::default(), device.clone()).unwrap();
        engine.start().unwrap();
        engine.play().unwrap();
        assert!(device.is_open());
    }
    assert!(!device.is_open());
}

#[test]
fn start_is_idempotent_while_running() {
    let (mut engine, device) = started_engine(SynthConfig::default());
    engine.start().unwrap();
    assert_eq!(device.opens(), 1);
}

#[test]
fn controls_are_shared_with_input_thread() {
    let (engine, _device) = started_engine(SynthConfig::default());
    engine.set_tuning(-1);
    assert!((engine.controls().tuning_target() - 0.99).abs() < 1e-6);

    let controls = engine.controls();
    thread::spawn(move || controls.set_cutoff(1)).join().unwrap();
    assert!((engine.controls().cutoff_target() - 1.01).abs() < 1e-6);
}

#[test]
fn generator_keeps_up_with_steady_pulls() {
    let (mut engine, device) = started_engine(SynthConfig::default());
    engine.play().unwrap();
    thread::sleep(SETTLE);

    let mut out = vec![0i16; 1024];
    for _ in 0..20 {
        assert!(device.pull(&mut out));
        thread::sleep(Duration::from_millis(25));
    }
    assert_eq!(engine.underruns(), 0);
    assert!(out.iter().any(|&s| s != 0));
}
