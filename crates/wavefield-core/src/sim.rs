//! Single-threaded tick driver tying emitters, waves and the field together.

use crate::clock::clamp_delta_time;
use crate::consumer::{FrameConsumer, FrameView};
use crate::emitter::{Emitter, ListenerId};
use crate::error::ConfigError;
use crate::field::{FieldConfig, WaveField};
use crate::schedule::{burst, BurstPattern, ScheduledEmit, Scheduler};
use crate::waves::{Wave, WaveManager};
use fnv::FnvHashMap;

/// Intensity used for waves fired by the periodic-rate gate.
pub const PERIODIC_INTENSITY: f32 = 0.6;

struct Registered {
    emitter: Emitter,
    channel: ListenerId,
}

/// Owns the whole simulation state and advances it one tick at a time.
///
/// Each `step` runs, in order: due scheduled emissions, periodic emissions,
/// wave growth and pulsing, then field decay. Given the same sequence of
/// `dt` values and emitter seeds, runs are identical.
pub struct Simulation {
    field: WaveField,
    waves: WaveManager,
    scheduler: Scheduler<ScheduledEmit>,
    emitters: FnvHashMap<String, Registered>,
    order: Vec<String>,
    time_ms: f64,
    pub periodic_intensity: f32,
}

impl Simulation {
    pub fn new(config: FieldConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            field: WaveField::new(config)?,
            waves: WaveManager::new(),
            scheduler: Scheduler::new(),
            emitters: FnvHashMap::default(),
            order: Vec::new(),
            time_ms: 0.0,
            periodic_intensity: PERIODIC_INTENSITY,
        })
    }

    /// Register an emitter and route its waves into the wave manager.
    /// An emitter with the same id is replaced and returned.
    pub fn add_emitter(&mut self, mut emitter: Emitter) -> Option<Emitter> {
        let (channel, inbox) = emitter.subscribe_channel();
        self.waves.attach(inbox);
        let id = emitter.id().to_string();
        let previous = self.detach(&id);
        self.order.push(id.clone());
        self.emitters.insert(id, Registered { emitter, channel });
        previous
    }

    pub fn remove_emitter(&mut self, id: &str) -> Option<Emitter> {
        self.detach(id)
    }

    fn detach(&mut self, id: &str) -> Option<Emitter> {
        let mut reg = self.emitters.remove(id)?;
        self.order.retain(|o| o != id);
        reg.emitter.unsubscribe(reg.channel);
        Some(reg.emitter)
    }

    pub fn emitter(&self, id: &str) -> Option<&Emitter> {
        self.emitters.get(id).map(|r| &r.emitter)
    }

    pub fn emitter_mut(&mut self, id: &str) -> Option<&mut Emitter> {
        self.emitters.get_mut(id).map(|r| &mut r.emitter)
    }

    /// Emitter ids in registration order.
    pub fn emitter_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Fire an emitter now. The wave joins the field on the next step.
    pub fn emit(&mut self, id: &str, intensity: f32) -> Option<Wave> {
        let now = self.time_ms;
        self.emitter_mut(id)?.emit_wave(intensity, now)
    }

    /// Queue a staggered burst for an emitter, starting on the next step.
    pub fn schedule_burst(&mut self, id: &str, intensity: f32, pattern: BurstPattern) {
        burst(&mut self.scheduler, id, intensity, pattern);
    }

    pub fn scheduler(&self) -> &Scheduler<ScheduledEmit> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<ScheduledEmit> {
        &mut self.scheduler
    }

    pub fn field(&self) -> &WaveField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut WaveField {
        &mut self.field
    }

    pub fn waves(&self) -> &[Wave] {
        self.waves.waves()
    }

    pub fn wave_manager_mut(&mut self) -> &mut WaveManager {
        &mut self.waves
    }

    /// Simulation time in milliseconds.
    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    /// Advance by `delta_time` seconds (clamped). Returns the delta actually used.
    pub fn step(&mut self, delta_time: f32) -> f32 {
        let dt = clamp_delta_time(delta_time);
        if dt != delta_time {
            log::debug!("[sim] clamped delta time {delta_time} -> {dt}");
        }
        self.time_ms += dt as f64 * 1000.0;
        let now = self.time_ms;

        for action in self.scheduler.advance_to(now) {
            let Some(reg) = self.emitters.get_mut(&action.emitter_id) else {
                log::debug!("[sim] scheduled emitter {} is gone", action.emitter_id);
                continue;
            };
            let emitter = &mut reg.emitter;
            let facing = emitter.angle;
            emitter.angle = facing + action.angle_offset;
            emitter.emit_wave(action.intensity, now);
            emitter.angle = facing;
        }

        for id in &self.order {
            if let Some(reg) = self.emitters.get_mut(id) {
                if reg.emitter.should_emit_wave(now) {
                    reg.emitter.emit_wave(self.periodic_intensity, now);
                }
            }
        }

        self.waves.update(dt, &mut self.field);
        self.field.update(dt);
        dt
    }

    /// Read-only view of the current state for front-ends.
    pub fn frame(&self, delta_time: f32) -> FrameView<'_> {
        FrameView {
            field: &self.field,
            waves: self.waves.waves(),
            time_ms: self.time_ms,
            delta_time,
        }
    }

    /// `step`, then show the new frame to every consumer.
    pub fn step_with(&mut self, delta_time: f32, consumers: &mut [&mut dyn FrameConsumer]) -> f32 {
        let dt = self.step(delta_time);
        let frame = self.frame(dt);
        for consumer in consumers.iter_mut() {
            consumer.consume(&frame);
        }
        dt
    }

    /// Reset the field and drop all live, queued and scheduled waves.
    pub fn reset(&mut self) {
        self.field.clear();
        self.waves.clear();
        self.scheduler.clear();
    }
}
