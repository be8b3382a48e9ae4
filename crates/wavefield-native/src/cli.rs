//! Command-line argument parsing.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use wavefield_core::constants::{DEFAULT_DECAY_RATE, DEFAULT_RESOLUTION};
use wavefield_core::{EmitterType, FieldConfig, Scale, UpdateStrategy};

use crate::scene::{EmitterTuning, SceneConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    CopySwap,
    DoubleBuffer,
}

impl From<StrategyArg> for UpdateStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::CopySwap => UpdateStrategy::CopySwap,
            StrategyArg::DoubleBuffer => UpdateStrategy::DoubleBuffer,
        }
    }
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "wavefield")]
#[command(about = "Headless wave-field simulation with terminal glow and WAV output", long_about = None)]
pub struct Args {
    /// Simulated duration
    #[arg(long, value_name = "SECONDS", default_value_t = 8.0)]
    pub seconds: f32,

    /// Simulation steps per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Grid cells per side
    #[arg(long, value_name = "CELLS", default_value_t = DEFAULT_RESOLUTION)]
    pub resolution: usize,

    /// World width and height
    #[arg(long, value_name = "UNITS", default_value_t = 960.0)]
    pub size: f32,

    /// Per-frame energy multiplier at 60 fps, in (0, 1]
    #[arg(long, default_value_t = DEFAULT_DECAY_RATE)]
    pub decay: f32,

    /// Grid update strategy
    #[arg(long, value_enum, default_value_t = StrategyArg::CopySwap)]
    pub strategy: StrategyArg,

    /// Seed for emitter pitch jitter
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Scale every emitter snaps to unless overridden per type
    #[arg(long, value_name = "SCALE")]
    pub scale: Option<Scale>,

    /// Write the sonified run to this WAV file
    #[arg(long, value_name = "PATH")]
    pub wav: Option<PathBuf>,

    /// Sample rate of the WAV output
    #[arg(long, value_name = "HZ", default_value_t = 44_100)]
    pub sample_rate: u32,

    /// Print every Nth frame as text (0 disables)
    #[arg(long, value_name = "FRAMES", default_value_t = 30)]
    pub frame_every: u32,

    /// Width of the printed frames in characters
    #[arg(long, default_value_t = 48)]
    pub columns: usize,

    /// Emitter option, e.g. `weapon.spreadAngle=45` or `gain=0.3` for all types
    #[arg(long = "set", value_name = "[TYPE.]KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Pace frames in real time and step by measured wall-clock deltas
    #[arg(long)]
    pub realtime: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn field_config(&self) -> FieldConfig {
        FieldConfig::new(self.size, self.size, self.resolution)
            .with_decay_rate(self.decay)
            .with_strategy(self.strategy.into())
    }

    /// Per-type emitter overrides from `--set` and `--scale`.
    pub fn tuning(&self) -> Result<EmitterTuning> {
        let mut tuning = EmitterTuning::default();
        for entry in &self.overrides {
            let Some((name, value)) = entry.split_once('=') else {
                bail!("expected [TYPE.]KEY=VALUE, got `{entry}`");
            };
            let kinds = match name.split_once('.') {
                Some((kind, _)) => vec![kind
                    .trim()
                    .parse::<EmitterType>()
                    .with_context(|| format!("in `--set {entry}`"))?],
                None => vec![
                    EmitterType::Thruster,
                    EmitterType::Weapon,
                    EmitterType::Explosion,
                    EmitterType::Default,
                ],
            };
            let key = name.split_once('.').map_or(name, |(_, key)| key).trim();
            for kind in kinds {
                let known = tuning
                    .for_kind_mut(kind)
                    .set(key, value.trim())
                    .with_context(|| format!("in `--set {entry}`"))?;
                if !known {
                    log::warn!("[cli] unknown emitter option `{key}` ignored");
                }
            }
        }
        if let Some(scale) = self.scale {
            tuning = tuning.with_scale(scale);
        }
        Ok(tuning)
    }

    pub fn scene_config(&self) -> Result<SceneConfig> {
        Ok(SceneConfig {
            field: self.field_config(),
            seed: self.seed,
            tuning: self.tuning()?,
        })
    }

    /// Total frames to simulate.
    pub fn frames(&self) -> Result<u64> {
        if self.fps == 0 {
            bail!("--fps must be at least 1");
        }
        if !(self.seconds >= 0.0 && self.seconds.is_finite()) {
            bail!("--seconds must be a non-negative number, got {}", self.seconds);
        }
        Ok((self.seconds * self.fps as f32).round() as u64)
    }
}
