//! Sonification: turns lit cells into a bounded set of tones and hands them
//! to an injected audio backend.

use crate::constants::{DEFAULT_ACTIVE_THRESHOLD, DEFAULT_MAX_VOICES, VOICE_GAIN_CEILING};
use crate::consumer::{FrameConsumer, FrameView};
use crate::music::Waveform;
use crate::waves::Wave;
use fnv::FnvHashMap;

/// One sustained voice requested from the backend for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    pub gain: f32,
    /// Stereo position, -1 (left) to 1 (right).
    pub pan: f32,
    pub waveform: Waveform,
}

/// Audio capability passed to the sonifier at construction.
///
/// Implementations own the actual output (a sound card stream, an offline
/// buffer, a test recorder). They are told the full voice set every frame.
pub trait AudioBackend {
    fn sample_rate(&self) -> f32;
    /// Replace the sounding voices and render `delta_time` seconds of audio.
    fn render(&mut self, tones: &[Tone], delta_time: f32);
}

#[derive(Default)]
struct Bucket {
    energy: f32,
    weighted_x: f32,
    weighted_frequency: f32,
}

/// Groups active cells by pitch and keeps the loudest groups.
#[derive(Clone, Debug)]
pub struct VoiceAllocator {
    pub max_voices: usize,
    pub threshold: f32,
    /// Cells whose frequencies round to the same bucket share a voice.
    pub bucket_hz: f32,
    pub fallback_waveform: Waveform,
}

impl Default for VoiceAllocator {
    fn default() -> Self {
        Self {
            max_voices: DEFAULT_MAX_VOICES,
            threshold: DEFAULT_ACTIVE_THRESHOLD,
            bucket_hz: 4.0,
            fallback_waveform: Waveform::Sine,
        }
    }
}

impl VoiceAllocator {
    /// Pick at most `max_voices` tones for `frame`, loudest first.
    pub fn allocate(&self, frame: &FrameView<'_>) -> Vec<Tone> {
        let width = frame.field.world_size().x;
        let bucket_hz = self.bucket_hz.max(f32::EPSILON);
        let mut buckets: FnvHashMap<i64, Bucket> = FnvHashMap::default();
        for active in frame.field.iter_active(self.threshold) {
            let key = (active.cell.frequency / bucket_hz).round() as i64;
            let b = buckets.entry(key).or_default();
            let e = active.cell.energy;
            b.energy += e;
            b.weighted_x += active.world.x * e;
            b.weighted_frequency += active.cell.frequency * e;
        }

        let mut voices: Vec<Bucket> = buckets.into_values().collect();
        voices.sort_by(|a, b| b.energy.total_cmp(&a.energy));
        voices.truncate(self.max_voices);

        let total: f32 = voices.iter().map(|b| b.energy).sum();
        let scale = if total > VOICE_GAIN_CEILING {
            VOICE_GAIN_CEILING / total
        } else {
            1.0
        };

        voices
            .into_iter()
            .map(|b| {
                let frequency = b.weighted_frequency / b.energy;
                let x = b.weighted_x / b.energy;
                Tone {
                    frequency,
                    gain: b.energy * scale,
                    pan: ((x / width) * 2.0 - 1.0).clamp(-1.0, 1.0),
                    waveform: nearest_waveform(frame.waves, frequency)
                        .unwrap_or(self.fallback_waveform),
                }
            })
            .collect()
    }
}

fn nearest_waveform(waves: &[Wave], frequency: f32) -> Option<Waveform> {
    waves
        .iter()
        .min_by(|a, b| {
            (a.frequency - frequency)
                .abs()
                .total_cmp(&(b.frequency - frequency).abs())
        })
        .map(|w| w.waveform)
}

/// Frame consumer that sonifies the field through an injected backend.
pub struct Sonifier<B: AudioBackend> {
    pub allocator: VoiceAllocator,
    backend: B,
    last_tones: Vec<Tone>,
}

impl<B: AudioBackend> Sonifier<B> {
    pub fn new(backend: B) -> Self {
        Self::with_allocator(backend, VoiceAllocator::default())
    }

    pub fn with_allocator(backend: B, allocator: VoiceAllocator) -> Self {
        Self {
            allocator,
            backend,
            last_tones: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Tones sent on the most recent frame.
    pub fn last_tones(&self) -> &[Tone] {
        &self.last_tones
    }
}

impl<B: AudioBackend> FrameConsumer for Sonifier<B> {
    fn consume(&mut self, frame: &FrameView<'_>) {
        self.last_tones = self.allocator.allocate(frame);
        self.backend.render(&self.last_tones, frame.delta_time);
    }
}
