//! Offline software synthesizer: renders the sonifier's voice set into an
//! interleaved stereo buffer that can be saved as a WAV file.

use anyhow::{Context, Result};
use std::f32::consts::{FRAC_PI_4, TAU};
use std::io::{Seek, Write};
use std::path::Path;
use wavefield_core::{AudioBackend, Tone, Waveform};

const GLIDE_SECONDS: f32 = 0.02; // time for a voice to ramp between silence and full gain
const SILENCE: f32 = 1e-4; // released voices below this amplitude are dropped
const MATCH_HZ: f32 = 3.0; // a tone this close to a sounding voice keeps its oscillator

struct Oscillator {
    frequency: f32,
    phase: f32, // radians
    amplitude: f32,
    target: f32,
    left_gain: f32,
    right_gain: f32,
    waveform: Waveform,
}

impl Oscillator {
    fn retune(&mut self, tone: &Tone) {
        self.frequency = tone.frequency;
        self.target = tone.gain;
        // equal-power stereo distribution
        let theta = (tone.pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
        self.left_gain = theta.cos();
        self.right_gain = theta.sin();
    }
}

/// One sample of `waveform` at `phase` radians, in \[-1, 1\].
pub fn render_wave_sample(phase: f32, waveform: Waveform) -> f32 {
    match waveform {
        Waveform::Sine => phase.sin(),
        Waveform::Square => {
            if phase.sin() >= 0.0 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Saw => {
            // Map phase 0..2PI to -1..1
            let t = phase / TAU;
            2.0 * (t - t.floor()) - 1.0
        }
        Waveform::Triangle => {
            let t = phase / TAU;
            1.0 - 4.0 * (t - t.floor() - 0.5).abs()
        }
    }
}

/// Audio backend that synthesizes into memory instead of a sound card.
///
/// Voices persist across frames: a tone close to a sounding oscillator
/// retunes it, and oscillators that lose their tone glide out.
pub struct SoftwareSynth {
    sample_rate: u32,
    oscillators: Vec<Oscillator>,
    samples: Vec<f32>,
    carry: f32,
}

impl SoftwareSynth {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            oscillators: Vec::new(),
            samples: Vec::new(),
            carry: 0.0,
        }
    }

    /// Interleaved stereo samples rendered so far.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Stereo frames rendered so far.
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }

    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0, |m, s| m.max(s.abs()))
    }

    /// Oscillators currently sounding or gliding out.
    pub fn voice_count(&self) -> usize {
        self.oscillators.len()
    }

    fn assign(&mut self, tones: &[Tone]) {
        for osc in &mut self.oscillators {
            osc.target = 0.0;
        }
        let existing = self.oscillators.len();
        let mut claimed = vec![false; existing];
        for tone in tones {
            let nearest = (0..existing)
                .filter(|&i| !claimed[i] && self.oscillators[i].waveform == tone.waveform)
                .map(|i| (i, (self.oscillators[i].frequency - tone.frequency).abs()))
                .filter(|&(_, d)| d < MATCH_HZ)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            match nearest {
                Some((i, _)) => {
                    claimed[i] = true;
                    self.oscillators[i].retune(tone);
                }
                None => {
                    let mut osc = Oscillator {
                        frequency: tone.frequency,
                        phase: 0.0,
                        amplitude: 0.0,
                        target: 0.0,
                        left_gain: 0.0,
                        right_gain: 0.0,
                        waveform: tone.waveform,
                    };
                    osc.retune(tone);
                    self.oscillators.push(osc);
                }
            }
        }
    }

    fn mix_sample_stereo(&mut self) -> (f32, f32) {
        let sr = self.sample_rate as f32;
        let step = 1.0 / (GLIDE_SECONDS * sr);
        let mut left = 0.0f32;
        let mut right = 0.0f32;
        for osc in &mut self.oscillators {
            let delta = osc.target - osc.amplitude;
            osc.amplitude += delta.clamp(-step, step);
            let raw = render_wave_sample(osc.phase, osc.waveform) * osc.amplitude;
            left += raw * osc.left_gain;
            right += raw * osc.right_gain;
            osc.phase += TAU * osc.frequency / sr;
            if osc.phase > TAU {
                osc.phase -= TAU;
            }
        }
        (left.tanh(), right.tanh())
    }

    /// Save everything rendered so far as a 32-bit float stereo WAV.
    pub fn write_wav(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = hound::WavWriter::create(path, self.wav_spec())
            .with_context(|| format!("creating {}", path.display()))?;
        self.write_samples(writer)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!(
            "[synth] wrote {:.2}s of audio to {}",
            self.duration_secs(),
            path.display()
        );
        Ok(())
    }

    /// Encode the rendered audio as WAV into any seekable writer.
    pub fn write_wav_to<W: Write + Seek>(&self, out: W) -> Result<()> {
        let writer = hound::WavWriter::new(out, self.wav_spec()).context("starting WAV stream")?;
        self.write_samples(writer)
    }

    fn wav_spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: 2,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        }
    }

    fn write_samples<W: Write + Seek>(&self, mut writer: hound::WavWriter<W>) -> Result<()> {
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

impl AudioBackend for SoftwareSynth {
    fn sample_rate(&self) -> f32 {
        self.sample_rate as f32
    }

    fn render(&mut self, tones: &[Tone], delta_time: f32) {
        self.assign(tones);
        let exact = delta_time.max(0.0) * self.sample_rate as f32 + self.carry;
        let count = exact.floor();
        self.carry = exact - count;
        self.samples.reserve(count as usize * 2);
        for _ in 0..count as usize {
            let (l, r) = self.mix_sample_stereo();
            self.samples.push(l);
            self.samples.push(r);
        }
        self.oscillators
            .retain(|osc| osc.target > 0.0 || osc.amplitude > SILENCE);
    }
}
