//! sawloop: play the sawtooth loop on the default output device.
//!
//! Reads commands from stdin, any number per line:
//!   u / d   glide tuning up / down
//!   l / r   open / close the filter
//!   q       quit
//!
//! Each command holds its glide briefly, like a key being held.

use std::io::{self, BufRead};
use std::process;
use std::thread;
use std::time::Duration;

use sl_master::{AudioEngine, ControlKeys, SynthConfig};

const HOLD: Duration = Duration::from_millis(200);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut engine = AudioEngine::with_default_device(SynthConfig::default()).unwrap_or_else(|e| {
        log::error!("{}", e);
        process::exit(1);
    });
    if let Err(e) = engine.start() {
        log::error!("couldn't open audio device: {}", e);
        process::exit(1);
    }
    if let Err(e) = engine.play() {
        log::error!("couldn't start playback: {}", e);
        process::exit(1);
    }

    println!("Playing. u/d tune, l/r filter, q quits.");

    'input: for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        for command in line.chars() {
            if command == 'q' {
                break 'input;
            }
            if let Some(keys) = keys_for(command) {
                hold(&engine, keys);
            }
        }
    }

    engine.stop();
    log::info!("stopped after {} underruns", engine.underruns());
}

fn keys_for(command: char) -> Option<ControlKeys> {
    let mut keys = ControlKeys::default();
    match command {
        'u' => keys.up = true,
        'd' => keys.down = true,
        'l' => keys.left = true,
        'r' => keys.right = true,
        _ => return None,
    }
    Some(keys)
}

/// Press `keys` for [`HOLD`], then release.
fn hold(engine: &AudioEngine, keys: ControlKeys) {
    engine.set_tuning(keys.tuning_delta());
    engine.set_cutoff(keys.cutoff_delta());
    thread::sleep(HOLD);

    let released = ControlKeys::default();
    engine.set_tuning(released.tuning_delta());
    engine.set_cutoff(released.cutoff_delta());
}
