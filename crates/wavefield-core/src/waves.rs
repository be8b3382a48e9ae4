//! Traveling-wave lifecycle: expands emitted waves, fades them and stamps
//! them onto the field every tick until they die out.

use crate::constants::*;
use crate::field::{Pulse, WaveField};
use crate::music::Waveform;
use glam::Vec2;
use std::sync::mpsc::{Receiver, TryRecvError};

/// A wave produced by an emitter.
///
/// Emitters hand out owned snapshots; the manager then grows `radius` and
/// fades `intensity` on its own copy.
#[derive(Clone, Debug, PartialEq)]
pub struct Wave {
    pub position: Vec2,
    /// Beam direction in radians.
    pub angle: f32,
    /// Full cone width in degrees.
    pub spread_angle: f32,
    pub radius: f32,
    pub max_radius: f32,
    /// World units per second.
    pub speed: f32,
    pub intensity: f32,
    pub frequency: f32,
    pub color: [u8; 3],
    pub waveform: Waveform,
    pub gain: f32,
    /// Emission timestamp in milliseconds.
    pub created_at: f64,
    pub emitter_id: String,
    pub player_id: Option<u32>,
}

impl Wave {
    /// True once the wave has reached its range or faded out.
    pub fn is_expired(&self) -> bool {
        self.radius >= self.max_radius || self.intensity <= WAVE_REMOVE_INTENSITY
    }

    /// Grow and fade by one tick.
    ///
    /// Intensity is scaled by `1 - radius / max_radius / 2`, so it only falls
    /// to zero as the ring approaches the end of its range.
    pub fn advance(&mut self, delta_time: f32) {
        self.radius += self.speed.max(0.0) * delta_time;
        let falloff = (1.0 - self.radius / self.max_radius / 2.0).max(0.0);
        self.intensity *= falloff;
    }

    /// Field injection for the wave's current geometry.
    pub fn pulse(&self) -> Pulse {
        Pulse::new(
            self.position,
            self.radius,
            self.intensity,
            self.frequency,
            self.color,
        )
        .directed(self.angle, self.spread_angle)
    }

    /// Fraction of the range travelled, in \[0, 1\].
    pub fn progress(&self) -> f32 {
        (self.radius / self.max_radius).clamp(0.0, 1.0)
    }
}

/// Owns all live waves and couples them to the field.
#[derive(Default)]
pub struct WaveManager {
    waves: Vec<Wave>,
    inboxes: Vec<Receiver<Wave>>,
    removed_total: u64,
}

impl WaveManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly emitted wave.
    pub fn spawn(&mut self, wave: Wave) {
        self.waves.push(wave);
    }

    /// Take waves from an emitter channel on every update.
    ///
    /// The inbox is dropped once every sender has been dropped.
    pub fn attach(&mut self, inbox: Receiver<Wave>) {
        self.inboxes.push(inbox);
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    pub fn waves_mut(&mut self) -> &mut [Wave] {
        &mut self.waves
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Waves removed since construction.
    pub fn removed_total(&self) -> u64 {
        self.removed_total
    }

    /// Drop every live wave along with any still queued in attached channels.
    pub fn clear(&mut self) {
        self.drain_inboxes();
        self.waves.clear();
    }

    /// Move any waves waiting in attached channels into the live set.
    pub fn drain_inboxes(&mut self) {
        let waves = &mut self.waves;
        self.inboxes.retain(|inbox| loop {
            match inbox.try_recv() {
                Ok(wave) => waves.push(wave),
                Err(TryRecvError::Empty) => break true,
                Err(TryRecvError::Disconnected) => break false,
            }
        });
    }

    /// Drop expired waves without advancing the others. Returns how many
    /// were removed.
    pub fn prune(&mut self) -> usize {
        let before = self.waves.len();
        self.waves.retain(|w| !w.is_expired());
        let removed = before - self.waves.len();
        self.removed_total += removed as u64;
        removed
    }

    /// Advance every wave by `delta_time`, remove the ones that expired and
    /// stamp the survivors onto `field`.
    pub fn update(&mut self, delta_time: f32, field: &mut WaveField) {
        self.drain_inboxes();
        for wave in &mut self.waves {
            wave.advance(delta_time);
        }
        let removed = self.prune();
        if removed > 0 {
            log::debug!("[waves] removed {removed}, {} live", self.waves.len());
        }
        for wave in &self.waves {
            if wave.intensity > WAVE_PULSE_INTENSITY {
                field.add_wave_pulse(&wave.pulse());
            }
        }
    }
}
