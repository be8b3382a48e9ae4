//! Headless native front-end for the wave field: a scripted scene, a terminal
//! glow renderer and an offline synthesizer that saves the run as WAV.

pub mod cli;
pub mod scene;
pub mod synth;
pub mod text;

use anyhow::{Context, Result};
use std::io;
use std::thread;
use std::time::Duration;
use wavefield_core::{FrameClock, FrameConsumer, Sonifier};

use cli::Args;
use scene::Scene;
use synth::SoftwareSynth;
use text::TextRenderer;

/// What a finished run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub simulated_ms: f64,
    pub waves_emitted: u64,
    pub peak_energy: f32,
    pub audio_seconds: Option<f32>,
}

/// Simulate the scene described by `args`, printing frames to stdout and
/// writing audio when `--wav` is given.
///
/// Runs as fast as possible with a fixed step unless `--realtime` is set.
pub fn run(args: &Args) -> Result<RunSummary> {
    let frames = args.frames()?;
    let mut scene = Scene::new(args.scene_config()?).context("building scene")?;
    let dt = 1.0 / args.fps as f32;

    let mut sonifier = args
        .wav
        .as_ref()
        .map(|_| Sonifier::new(SoftwareSynth::new(args.sample_rate)));
    let mut text = (args.frame_every > 0)
        .then(|| TextRenderer::new(io::stdout(), args.frame_every, args.columns));

    log::info!(
        "[run] {frames} frames at {} fps ({:.1}s simulated)",
        args.fps,
        frames as f32 * dt
    );

    let mut clock = args.realtime.then(FrameClock::new);
    let mut peak_energy = 0.0f32;
    for _ in 0..frames {
        let step_dt = match clock.as_mut() {
            Some(clock) => {
                thread::sleep(Duration::from_secs_f32(dt));
                clock.tick()
            }
            None => dt,
        };
        let mut consumers: Vec<&mut dyn FrameConsumer> = Vec::with_capacity(2);
        if let Some(s) = sonifier.as_mut() {
            consumers.push(s);
        }
        if let Some(t) = text.as_mut() {
            consumers.push(t);
        }
        scene.step(step_dt, &mut consumers);
        peak_energy = peak_energy.max(scene.simulation().field().total_energy());
    }

    if let Some(err) = text.as_ref().and_then(|t| t.error()) {
        log::warn!("[run] frame output stopped early: {err}");
    }

    let sim = scene.simulation();
    let waves_emitted: u64 = sim
        .emitter_ids()
        .filter_map(|id| sim.emitter(id))
        .map(|e| e.emitted())
        .sum();

    let mut audio_seconds = None;
    if let (Some(path), Some(sonifier)) = (args.wav.as_ref(), sonifier) {
        let synth = sonifier.into_backend();
        synth.write_wav(path)?;
        audio_seconds = Some(synth.duration_secs());
    }

    Ok(RunSummary {
        frames,
        simulated_ms: sim.time_ms(),
        waves_emitted,
        peak_energy,
        audio_seconds,
    })
}
