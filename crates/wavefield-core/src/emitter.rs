//! Stateful wave sources.
//!
//! An emitter carries the tunable identity of a source (pitch, timbre, cone,
//! color) and decides when and what to emit. Emitted waves are handed to every
//! registered `WaveListener`.

use crate::constants::*;
use crate::error::ConfigError;
use crate::music::{snap_to_scale, FilterType, Scale, Waveform};
use crate::waves::Wave;
use glam::Vec2;
use rand::prelude::*;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, Sender};

/// Source category selecting the default sound and look of an emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EmitterType {
    Thruster,
    Weapon,
    Explosion,
    #[default]
    Default,
}

impl EmitterType {
    pub fn name(self) -> &'static str {
        match self {
            EmitterType::Thruster => "thruster",
            EmitterType::Weapon => "weapon",
            EmitterType::Explosion => "explosion",
            EmitterType::Default => "default",
        }
    }
}

impl fmt::Display for EmitterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EmitterType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "thruster" => Ok(EmitterType::Thruster),
            "weapon" => Ok(EmitterType::Weapon),
            "explosion" => Ok(EmitterType::Explosion),
            "default" => Ok(EmitterType::Default),
            _ => Err(ConfigError::UnknownEmitterType(s.to_string())),
        }
    }
}

/// Resolved tunables of an emitter.
#[derive(Clone, Debug, PartialEq)]
pub struct EmitterProperties {
    pub base_frequency: f32,
    /// Full cone width in degrees.
    pub spread_angle: f32,
    /// Waves per second for periodic emission; 0 disables it.
    pub wave_density: f32,
    pub waveform: Waveform,
    pub filter_type: FilterType,
    pub filter_cutoff: f32,
    pub scale: Scale,
    pub color: [u8; 3],
    pub gain: f32,
    pub max_radius: f32,
    /// Multiplier on the starting radius of emitted waves.
    pub pulse_size: f32,
    pub wave_speed: f32,
}

impl EmitterProperties {
    /// Table-driven defaults for each emitter type.
    pub fn for_type(kind: EmitterType) -> Self {
        // (frequency multiplier, waveform, filter cutoff, gain, color, spread, density, speed, range)
        let (mult, waveform, cutoff, gain, color, spread, density, speed, range) = match kind {
            EmitterType::Thruster => (
                0.5,
                Waveform::Saw,
                800.0,
                0.3,
                [255, 140, 40],
                60.0,
                8.0,
                160.0,
                200.0,
            ),
            EmitterType::Weapon => (
                2.0,
                Waveform::Square,
                2400.0,
                0.5,
                [80, 200, 255],
                30.0,
                0.0,
                320.0,
                400.0,
            ),
            EmitterType::Explosion => (
                0.25,
                Waveform::Triangle,
                400.0,
                0.8,
                [255, 60, 60],
                360.0,
                0.0,
                240.0,
                350.0,
            ),
            EmitterType::Default => (
                1.0,
                Waveform::Sine,
                1200.0,
                0.4,
                [120, 255, 160],
                DEFAULT_SPREAD_ANGLE,
                DEFAULT_WAVE_DENSITY,
                DEFAULT_WAVE_SPEED,
                DEFAULT_MAX_RADIUS,
            ),
        };
        Self {
            base_frequency: BASE_FREQUENCY_HZ * mult,
            spread_angle: spread,
            wave_density: density,
            waveform,
            filter_type: FilterType::Lowpass,
            filter_cutoff: cutoff,
            scale: Scale::default(),
            color,
            gain,
            max_radius: range,
            pulse_size: 1.0,
            wave_speed: speed,
        }
    }

    /// Copy every value `overrides` provides; invalid values are skipped.
    pub fn merge(&mut self, overrides: &EmitterOverrides) {
        if let Some(v) = overrides.base_frequency.filter(|v| *v > 0.0 && v.is_finite()) {
            self.base_frequency = v;
        }
        if let Some(v) = overrides.spread_angle.filter(|v| v.is_finite()) {
            self.spread_angle = v.clamp(0.0, 360.0);
        }
        if let Some(v) = overrides.wave_density {
            if v >= 0.0 && v.is_finite() {
                self.wave_density = v;
            } else {
                log::warn!("[emitter] ignored wave density {v}");
            }
        }
        if let Some(v) = overrides.waveform {
            self.waveform = v;
        }
        if let Some(v) = overrides.filter_type {
            self.filter_type = v;
        }
        if let Some(v) = overrides.filter_cutoff.filter(|v| *v > 0.0) {
            self.filter_cutoff = v;
        }
        if let Some(v) = overrides.scale {
            self.scale = v;
        }
        if let Some(v) = overrides.color {
            self.color = v;
        }
        if let Some(v) = overrides.gain.filter(|v| v.is_finite()) {
            self.gain = v.max(0.0);
        }
        if let Some(v) = overrides.max_radius {
            if v > 0.0 && v.is_finite() {
                self.max_radius = v;
            } else {
                log::warn!("[emitter] ignored max radius {v}");
            }
        }
        if let Some(v) = overrides.pulse_size.filter(|v| *v > 0.0 && v.is_finite()) {
            self.pulse_size = v;
        }
        if let Some(v) = overrides.wave_speed.filter(|v| *v >= 0.0 && v.is_finite()) {
            self.wave_speed = v;
        }
    }
}

/// Partial property set; `None` keeps the current value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmitterOverrides {
    pub base_frequency: Option<f32>,
    pub spread_angle: Option<f32>,
    pub wave_density: Option<f32>,
    pub waveform: Option<Waveform>,
    pub filter_type: Option<FilterType>,
    pub filter_cutoff: Option<f32>,
    pub scale: Option<Scale>,
    pub color: Option<[u8; 3]>,
    pub gain: Option<f32>,
    pub max_radius: Option<f32>,
    pub pulse_size: Option<f32>,
    pub wave_speed: Option<f32>,
}

impl EmitterOverrides {
    /// Set one option by name. Returns `Ok(false)` for names emitters do not
    /// declare; those are ignored.
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        let invalid = || ConfigError::InvalidOption {
            key: key.to_string(),
            value: value.to_string(),
        };
        let number = || value.trim().parse::<f32>().map_err(|_| invalid());
        match key {
            "baseFrequency" | "base_frequency" => self.base_frequency = Some(number()?),
            "spreadAngle" | "spread_angle" => self.spread_angle = Some(number()?),
            "waveDensity" | "wave_density" => self.wave_density = Some(number()?),
            "oscillatorType" | "oscillator_type" | "waveform" => {
                self.waveform = Some(value.parse()?)
            }
            "filterType" | "filter_type" => self.filter_type = Some(value.parse()?),
            "filterCutoff" | "filter_cutoff" => self.filter_cutoff = Some(number()?),
            "scaleType" | "scale_type" | "scale" => self.scale = Some(value.parse()?),
            "color" => self.color = Some(parse_color(value).ok_or_else(|| invalid())?),
            "gain" => self.gain = Some(number()?),
            "maxRadius" | "max_radius" => self.max_radius = Some(number()?),
            "pulseSize" | "pulse_size" => self.pulse_size = Some(number()?),
            "waveSpeed" | "wave_speed" | "speed" => self.wave_speed = Some(number()?),
            _ => {
                log::debug!("[emitter] ignoring unknown option `{key}`");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Build overrides from `(key, value)` pairs, skipping unknown keys.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut overrides = Self::default();
        for (key, value) in pairs {
            overrides.set(key.trim(), value.trim())?;
        }
        Ok(overrides)
    }
}

/// Parse `#rrggbb` or `r,g,b`.
fn parse_color(value: &str) -> Option<[u8; 3]> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return Some([channel(0)?, channel(2)?, channel(4)?]);
    }
    let mut parts = value.split(',').map(|p| p.trim().parse::<u8>().ok());
    let rgb = [parts.next()??, parts.next()??, parts.next()??];
    if parts.next().is_some() {
        return None;
    }
    Some(rgb)
}

/// Construction-time options. Anything left unset falls back to the defaults
/// of `kind`.
#[derive(Clone, Debug, Default)]
pub struct EmitterConfig {
    pub id: Option<String>,
    pub kind: EmitterType,
    pub position: Vec2,
    /// Facing in radians.
    pub angle: f32,
    pub player_id: Option<u32>,
    /// Seed for pitch jitter; a random seed is drawn when unset.
    pub seed: Option<u64>,
    pub properties: EmitterOverrides,
}

impl EmitterConfig {
    pub fn new(kind: EmitterType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_properties(mut self, properties: EmitterOverrides) -> Self {
        self.properties = properties;
        self
    }
}

/// Receives every wave an emitter produces.
pub trait WaveListener {
    /// Handle a wave. Returning `false` unsubscribes the listener.
    fn on_wave(&mut self, wave: &Wave) -> bool;
}

impl<F: FnMut(&Wave)> WaveListener for F {
    fn on_wave(&mut self, wave: &Wave) -> bool {
        self(wave);
        true
    }
}

/// Forwards emitted waves into a channel until the receiver is dropped.
pub struct ChannelListener {
    sender: Sender<Wave>,
}

impl ChannelListener {
    pub fn new(sender: Sender<Wave>) -> Self {
        Self { sender }
    }
}

impl WaveListener for ChannelListener {
    fn on_wave(&mut self, wave: &Wave) -> bool {
        self.sender.send(wave.clone()).is_ok()
    }
}

/// Handle returned by `Emitter::subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

pub struct Emitter {
    id: String,
    kind: EmitterType,
    pub position: Vec2,
    pub angle: f32,
    pub player_id: Option<u32>,
    properties: EmitterProperties,
    active: bool,
    last_emit_time: Option<f64>,
    emitted: u64,
    rng: StdRng,
    listeners: SmallVec<[(ListenerId, Box<dyn WaveListener>); 2]>,
    next_listener: u32,
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("position", &self.position)
            .field("angle", &self.angle)
            .field("active", &self.active)
            .field("properties", &self.properties)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Emitter {
    /// Resolve `config` against the type defaults and validate the result.
    pub fn new(config: EmitterConfig) -> Result<Self, ConfigError> {
        let mut properties = EmitterProperties::for_type(config.kind);
        let requested = &config.properties;
        if let Some(v) = requested.wave_density {
            if !(v >= 0.0 && v.is_finite()) {
                return Err(ConfigError::InvalidWaveDensity(v));
            }
        }
        if let Some(v) = requested.max_radius {
            if !(v > 0.0 && v.is_finite()) {
                return Err(ConfigError::InvalidMaxRadius(v));
            }
        }
        properties.merge(requested);

        let seed = config.seed.unwrap_or_else(|| thread_rng().gen());
        Ok(Self {
            id: config
                .id
                .unwrap_or_else(|| format!("{}-{seed:08x}", config.kind)),
            kind: config.kind,
            position: config.position,
            angle: config.angle,
            player_id: config.player_id,
            properties,
            active: true,
            last_emit_time: None,
            emitted: 0,
            rng: StdRng::seed_from_u64(seed),
            listeners: SmallVec::new(),
            next_listener: 0,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> EmitterType {
        self.kind
    }

    pub fn properties(&self) -> &EmitterProperties {
        &self.properties
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_emit_time(&self) -> Option<f64> {
        self.last_emit_time
    }

    /// Waves emitted since construction.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Move/turn the emitter and merge property overrides.
    pub fn update(&mut self, position: Vec2, angle: f32, overrides: &EmitterOverrides) {
        self.position = position;
        self.angle = angle;
        self.properties.merge(overrides);
    }

    pub fn activate(&mut self) {
        if !self.active {
            log::debug!("[emitter] {} activated", self.id);
        }
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        if self.active {
            log::debug!("[emitter] {} deactivated", self.id);
        }
        self.active = false;
    }

    /// Restart the pitch-jitter sequence.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn subscribe(&mut self, listener: impl WaveListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Subscribe a channel and return its receiving end.
    pub fn subscribe_channel(&mut self) -> (ListenerId, Receiver<Wave>) {
        let (tx, rx) = mpsc::channel();
        (self.subscribe(ChannelListener::new(tx)), rx)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Periodic-rate gate: true when active, emitting periodically and at
    /// least `1000 / wave_density` ms have passed since the last emission.
    pub fn should_emit_wave(&self, current_time: f64) -> bool {
        if !self.active || self.properties.wave_density <= 0.0 {
            return false;
        }
        let interval = 1000.0 / self.properties.wave_density as f64;
        match self.last_emit_time {
            Some(last) => current_time - last >= interval,
            None => true,
        }
    }

    /// Produce a wave at `timestamp` (ms) and notify listeners. Inactive
    /// emitters return `None`.
    pub fn emit_wave(&mut self, intensity: f32, timestamp: f64) -> Option<Wave> {
        if !self.active {
            return None;
        }
        let p = &self.properties;
        let jitter = self
            .rng
            .gen_range(1.0 - FREQUENCY_JITTER..=1.0 + FREQUENCY_JITTER);
        let raw = p.base_frequency * jitter;
        let frequency = match p.scale {
            Scale::Chromatic => raw,
            scale => snap_to_scale(raw, scale),
        };

        let wave = Wave {
            position: self.position,
            angle: self.angle,
            spread_angle: p.spread_angle,
            radius: WAVE_START_RADIUS * p.pulse_size,
            max_radius: p.max_radius,
            speed: p.wave_speed,
            intensity,
            frequency,
            color: p.color,
            waveform: p.waveform,
            gain: p.gain,
            created_at: timestamp,
            emitter_id: self.id.clone(),
            player_id: self.player_id,
        };
        self.last_emit_time = Some(timestamp);
        self.emitted += 1;
        log::debug!(
            "[emitter] {} wave #{} at {:.0}ms: {:.1} Hz, intensity {:.2}",
            self.id,
            self.emitted,
            timestamp,
            frequency,
            intensity
        );

        let emitter_id = &self.id;
        self.listeners.retain(|(listener_id, listener)| {
            let keep = listener.on_wave(&wave);
            if !keep {
                log::debug!("[emitter] {emitter_id} dropped listener {listener_id:?}");
            }
            keep
        });
        Some(wave)
    }
}
