use crate::constants::{SCALE_REFERENCE_MIDI, SEMITONES_PER_OCTAVE};
use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Basic oscillator shape used by synths in the audio front-ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Square,
    Saw,
    Triangle,
}

impl FromStr for Waveform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sine" => Ok(Waveform::Sine),
            "square" => Ok(Waveform::Square),
            "saw" | "sawtooth" => Ok(Waveform::Saw),
            "triangle" => Ok(Waveform::Triangle),
            _ => Err(ConfigError::UnknownWaveform(s.to_string())),
        }
    }
}

/// Filter character applied by audio front-ends after the oscillator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterType {
    Lowpass,
    Highpass,
    Bandpass,
}

impl FromStr for FilterType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lowpass" => Ok(FilterType::Lowpass),
            "highpass" => Ok(FilterType::Highpass),
            "bandpass" => Ok(FilterType::Bandpass),
            _ => Err(ConfigError::UnknownFilter(s.to_string())),
        }
    }
}

/// Default five-note scale centered around middle C.
pub const C_MAJOR_PENTATONIC: &[i32] = &[0, 2, 4, 7, 9, 12];

/// Diatonic modes (relative semitone degrees)
pub const IONIAN: &[i32] = &[0, 2, 4, 5, 7, 9, 11, 12]; // major
pub const DORIAN: &[i32] = &[0, 2, 3, 5, 7, 9, 10, 12];
pub const PHRYGIAN: &[i32] = &[0, 1, 3, 5, 7, 8, 10, 12];
pub const LYDIAN: &[i32] = &[0, 2, 4, 6, 7, 9, 11, 12];
pub const MIXOLYDIAN: &[i32] = &[0, 2, 4, 5, 7, 9, 10, 12];
pub const AEOLIAN: &[i32] = &[0, 2, 3, 5, 7, 8, 10, 12]; // natural minor
pub const LOCRIAN: &[i32] = &[0, 1, 3, 5, 6, 8, 10, 12];

pub const BLUES: &[i32] = &[0, 3, 5, 6, 7, 10, 12];
pub const CHROMATIC: &[i32] = &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

/// Named pitch sets emitted tones are quantized to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Scale {
    #[default]
    Major,
    Minor,
    Pentatonic,
    Blues,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
    Chromatic,
}

impl Scale {
    /// Semitone degrees relative to the scale root.
    pub fn degrees(self) -> &'static [i32] {
        match self {
            Scale::Major => IONIAN,
            Scale::Minor => AEOLIAN,
            Scale::Pentatonic => C_MAJOR_PENTATONIC,
            Scale::Blues => BLUES,
            Scale::Dorian => DORIAN,
            Scale::Phrygian => PHRYGIAN,
            Scale::Lydian => LYDIAN,
            Scale::Mixolydian => MIXOLYDIAN,
            Scale::Locrian => LOCRIAN,
            Scale::Chromatic => CHROMATIC,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::Minor => "minor",
            Scale::Pentatonic => "pentatonic",
            Scale::Blues => "blues",
            Scale::Dorian => "dorian",
            Scale::Phrygian => "phrygian",
            Scale::Lydian => "lydian",
            Scale::Mixolydian => "mixolydian",
            Scale::Locrian => "locrian",
            Scale::Chromatic => "chromatic",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "major" | "ionian" => Ok(Scale::Major),
            "minor" | "aeolian" => Ok(Scale::Minor),
            "pentatonic" => Ok(Scale::Pentatonic),
            "blues" => Ok(Scale::Blues),
            "dorian" => Ok(Scale::Dorian),
            "phrygian" => Ok(Scale::Phrygian),
            "lydian" => Ok(Scale::Lydian),
            "mixolydian" => Ok(Scale::Mixolydian),
            "locrian" => Ok(Scale::Locrian),
            "chromatic" => Ok(Scale::Chromatic),
            _ => Err(ConfigError::UnknownScale(s.to_string())),
        }
    }
}

/// Convert a MIDI note number to Hertz (A4=440 Hz).
///
/// Monotonic and exhibits octave symmetry: +12 semitones doubles the frequency.
pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * (2.0_f32).powf((midi - 69.0) / 12.0)
}

/// Convert Hertz back to a (fractional) MIDI note number.
pub fn hz_to_midi(hz: f32) -> f32 {
    69.0 + 12.0 * (hz / 440.0).log2()
}

/// Quantize `frequency` to the nearest tone of `scale`, rooted at C4.
///
/// The distance from the reference is split into whole octaves and a
/// remainder; the remainder is matched against every degree both directly and
/// one octave down so tones just below the next root snap upward. Chromatic
/// input and non-positive frequencies are returned unchanged.
pub fn snap_to_scale(frequency: f32, scale: Scale) -> f32 {
    if scale == Scale::Chromatic || !(frequency > 0.0) || !frequency.is_finite() {
        return frequency;
    }
    let octave_len = SEMITONES_PER_OCTAVE as f64;
    let reference_hz = midi_to_hz(SCALE_REFERENCE_MIDI) as f64;
    let semitones = octave_len * (frequency as f64 / reference_hz).log2();
    let octave = (semitones / octave_len).floor();
    let remainder = semitones - octave * octave_len;

    let mut best_distance = f64::INFINITY;
    let mut best_offset = 0.0;
    for &degree in scale.degrees() {
        let degree = degree as f64;
        let direct = (remainder - degree).abs();
        if direct < best_distance {
            best_distance = direct;
            best_offset = degree;
        }
        let wrapped = (remainder - octave_len - degree).abs();
        if wrapped < best_distance {
            best_distance = wrapped;
            best_offset = degree + octave_len;
        }
    }

    let snapped = octave * octave_len + best_offset;
    (reference_hz * 2.0_f64.powf(snapped / octave_len)) as f32
}
