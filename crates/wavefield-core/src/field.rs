//! Fixed-resolution energy grid that absorbs directional pulses and decays
//! over time.
//!
//! The field never fails at runtime: off-grid coordinates read as `None` and
//! pulses that land outside the grid are dropped. A dropped pulse is cheap, a
//! stalled frame loop is not.

use crate::cell::Cell;
use crate::constants::*;
use crate::error::ConfigError;
use glam::{IVec2, Vec2};
use std::f32::consts::{PI, TAU};

/// How `WaveField::update` produces the next grid generation.
///
/// Both strategies yield identical cell values; they differ only in
/// allocation behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// Clone the grid each tick, step the clone, then swap it in.
    #[default]
    CopySwap,
    /// Step into a persistent back buffer and swap the two buffers.
    DoubleBuffer,
}

/// Construction parameters for a `WaveField`.
#[derive(Clone, Debug)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
    pub resolution: usize,
    pub decay_rate: f32,
    pub propagation_speed: f32,
    pub strategy: UpdateStrategy,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 960.0,
            resolution: DEFAULT_RESOLUTION,
            decay_rate: DEFAULT_DECAY_RATE,
            propagation_speed: DEFAULT_PROPAGATION_SPEED,
            strategy: UpdateStrategy::CopySwap,
        }
    }
}

impl FieldConfig {
    pub fn new(width: f32, height: f32, resolution: usize) -> Self {
        Self {
            width,
            height,
            resolution,
            ..Self::default()
        }
    }

    pub fn with_decay_rate(mut self, decay_rate: f32) -> Self {
        self.decay_rate = decay_rate;
        self
    }

    pub fn with_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        if !(self.width > 0.0 && self.height > 0.0)
            || !self.width.is_finite()
            || !self.height.is_finite()
        {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        validate_decay_rate(self.decay_rate)
    }
}

fn validate_decay_rate(decay_rate: f32) -> Result<(), ConfigError> {
    if decay_rate > 0.0 && decay_rate <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDecayRate(decay_rate))
    }
}

/// A ring-shaped energy injection centered on a world position.
///
/// `angle` is the beam direction in radians; `spread_angle` is the full cone
/// width in degrees, where 360 means omnidirectional.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    pub position: Vec2,
    pub radius: f32,
    pub intensity: f32,
    pub frequency: f32,
    pub color: [u8; 3],
    pub angle: f32,
    pub spread_angle: f32,
}

impl Pulse {
    /// Omnidirectional pulse.
    pub fn new(position: Vec2, radius: f32, intensity: f32, frequency: f32, color: [u8; 3]) -> Self {
        Self {
            position,
            radius,
            intensity,
            frequency,
            color,
            angle: 0.0,
            spread_angle: DEFAULT_SPREAD_ANGLE,
        }
    }

    /// Restrict the pulse to a cone of `spread_angle` degrees around `angle`.
    pub fn directed(mut self, angle: f32, spread_angle: f32) -> Self {
        self.angle = angle;
        self.spread_angle = spread_angle;
        self
    }

    fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.radius.is_finite()
            && self.intensity.is_finite()
            && self.frequency.is_finite()
            && self.angle.is_finite()
            && self.spread_angle.is_finite()
    }
}

/// Snapshot of a lit cell together with its grid and world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveCell {
    pub cell: Cell,
    pub x: usize,
    pub y: usize,
    pub world: Vec2,
}

pub struct WaveField {
    cells: Vec<Cell>,
    back: Vec<Cell>,
    resolution: usize,
    cell_size: Vec2,
    decay_rate: f32,
    propagation_speed: f32,
    time_step: u64,
    strategy: UpdateStrategy,
}

impl WaveField {
    /// Build an empty field; fails only on a misconfigured grid.
    pub fn new(config: FieldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let count = config.resolution * config.resolution;
        let back = match config.strategy {
            UpdateStrategy::CopySwap => Vec::new(),
            UpdateStrategy::DoubleBuffer => Vec::with_capacity(count),
        };
        log::debug!(
            "[field] {}x{} cells over {:.0}x{:.0} world units ({:?})",
            config.resolution,
            config.resolution,
            config.width,
            config.height,
            config.strategy
        );
        Ok(Self {
            cells: vec![Cell::default(); count],
            back,
            resolution: config.resolution,
            cell_size: Vec2::new(
                config.width / config.resolution as f32,
                config.height / config.resolution as f32,
            ),
            decay_rate: config.decay_rate,
            propagation_speed: config.propagation_speed,
            time_step: 0,
            strategy: config.strategy,
        })
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    pub fn world_size(&self) -> Vec2 {
        self.cell_size * self.resolution as f32
    }

    pub fn decay_rate(&self) -> f32 {
        self.decay_rate
    }

    pub fn set_decay_rate(&mut self, decay_rate: f32) -> Result<(), ConfigError> {
        validate_decay_rate(decay_rate)?;
        self.decay_rate = decay_rate;
        Ok(())
    }

    pub fn propagation_speed(&self) -> f32 {
        self.propagation_speed
    }

    /// Number of `update` calls so far.
    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    pub fn strategy(&self) -> UpdateStrategy {
        self.strategy
    }

    /// The whole grid in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let res = self.resolution as i32;
        if x < 0 || y < 0 || x >= res || y >= res {
            return None;
        }
        Some(y as usize * self.resolution + x as usize)
    }

    /// Bounds-checked lookup; `None` for off-grid coordinates.
    pub fn get_cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_cell_at_position(&self, world: Vec2) -> Option<&Cell> {
        let g = self.world_to_grid(world);
        self.get_cell(g.x, g.y)
    }

    /// World-space center of a grid cell.
    pub fn grid_to_world(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new(
            x as f32 * self.cell_size.x + self.cell_size.x / 2.0,
            y as f32 * self.cell_size.y + self.cell_size.y / 2.0,
        )
    }

    /// Floor division into grid coordinates. The result is not clamped.
    pub fn world_to_grid(&self, world: Vec2) -> IVec2 {
        IVec2::new(
            (world.x / self.cell_size.x).floor() as i32,
            (world.y / self.cell_size.y).floor() as i32,
        )
    }

    /// Inject energy into a single cell, blending its tone when the amount is
    /// significant.
    pub fn add_energy(&mut self, x: i32, y: i32, amount: f32, frequency: f32, color: [u8; 3]) {
        if !amount.is_finite() || !frequency.is_finite() {
            log::warn!("[field] dropped non-finite energy injection at ({x},{y})");
            return;
        }
        let now = self.time_step;
        let Some(i) = self.index(x, y) else {
            return;
        };
        let cell = &mut self.cells[i];
        let current = cell.energy;
        if amount > BLEND_THRESHOLD {
            cell.blend_tone(frequency, color, amount / (current + amount));
        }
        cell.energy = (current + amount).clamp(0.0, 1.0);
        cell.last_active = now;
    }

    /// Stamp a thin expanding ring of energy onto the grid.
    ///
    /// Only cells inside `radius` and within `radius * WAVE_THICKNESS_RATIO` of
    /// the ring front receive energy, scaled linearly by their distance to the
    /// front and, for directed pulses, by their angular distance to the beam
    /// center.
    pub fn add_wave_pulse(&mut self, pulse: &Pulse) {
        if !pulse.is_finite() {
            log::warn!("[field] dropped non-finite pulse {:?}", pulse);
            return;
        }
        if pulse.radius <= 0.0 || pulse.intensity <= 0.0 {
            return;
        }

        // Bounding box in world space; rings that miss the grid are dropped
        let world = self.world_size();
        let lo = pulse.position - Vec2::splat(pulse.radius);
        let hi = pulse.position + Vec2::splat(pulse.radius);
        if hi.x < 0.0 || hi.y < 0.0 || lo.x > world.x || lo.y > world.y {
            return;
        }
        // Float-to-int casts saturate, so far-off edges clamp instead of overflowing
        let max = self.resolution as i32 - 1;
        let to_cell = |v: f32, size: f32| ((v / size).floor() as i32).clamp(0, max);
        let (x0, x1) = (to_cell(lo.x, self.cell_size.x), to_cell(hi.x, self.cell_size.x));
        let (y0, y1) = (to_cell(lo.y, self.cell_size.y), to_cell(hi.y, self.cell_size.y));

        let angle = wrap_angle(pulse.angle);

        let directional = pulse.spread_angle < 360.0;
        let half_spread = pulse.spread_angle.max(0.0).to_radians() / 2.0;
        let thickness = pulse.radius * WAVE_THICKNESS_RATIO;
        let heading = Vec2::new(angle.cos(), angle.sin());
        let now = self.time_step;

        for gy in y0..=y1 {
            for gx in x0..=x1 {
                let offset = self.grid_to_world(gx, gy) - pulse.position;
                let distance = offset.length();
                if distance > pulse.radius {
                    continue;
                }

                let mut direction_factor = 1.0;
                if directional {
                    let cell_angle = wrap_angle(offset.y.atan2(offset.x));
                    let mut diff = (cell_angle - angle).abs();
                    if diff > PI {
                        diff = TAU - diff;
                    }
                    if diff > half_spread {
                        continue;
                    }
                    if half_spread > 0.0 {
                        direction_factor = 1.0 - diff / half_spread;
                    }
                }

                let from_front = (distance - pulse.radius).abs();
                if from_front >= thickness {
                    continue;
                }
                let intensity_factor = 1.0 - from_front / thickness;
                let cell_intensity = pulse.intensity * intensity_factor * direction_factor;

                let i = gy as usize * self.resolution + gx as usize;
                let cell = &mut self.cells[i];
                let current = cell.energy;
                let new_energy = (current + cell_intensity).min(1.0);

                if cell_intensity > VELOCITY_BLEND_THRESHOLD {
                    let push = heading * VELOCITY_SCALE * cell_intensity * direction_factor;
                    let weight = (cell_intensity / new_energy).min(1.0);
                    cell.velocity = cell.velocity.lerp(push, weight);
                }
                if cell_intensity > BLEND_THRESHOLD {
                    cell.blend_tone(
                        pulse.frequency,
                        pulse.color,
                        cell_intensity / (current + cell_intensity),
                    );
                }
                cell.energy = new_energy.max(0.0);
                cell.last_active = now;
            }
        }
    }

    /// Advance one tick: phase rotation, frame-rate-normalized decay and
    /// velocity damping, applied to a fresh generation that replaces the grid
    /// in one step.
    pub fn update(&mut self, delta_time: f32) {
        if !delta_time.is_finite() || delta_time < 0.0 {
            log::warn!("[field] ignored update with delta time {delta_time}");
            return;
        }
        self.time_step += 1;
        let decay = self.decay_rate.powf(delta_time * REFERENCE_FPS);

        match self.strategy {
            UpdateStrategy::CopySwap => {
                let mut next = self.cells.clone();
                for cell in &mut next {
                    step_cell(cell, decay, delta_time);
                }
                self.cells = next;
            }
            UpdateStrategy::DoubleBuffer => {
                self.back.clear();
                self.back.extend(self.cells.iter().map(|c| {
                    let mut next = *c;
                    step_cell(&mut next, decay, delta_time);
                    next
                }));
                std::mem::swap(&mut self.cells, &mut self.back);
            }
        }
    }

    /// Lit cells above `threshold`, in row-major order.
    pub fn active_cells(&self, threshold: f32) -> Vec<ActiveCell> {
        self.iter_active(threshold).collect()
    }

    pub fn iter_active(&self, threshold: f32) -> impl Iterator<Item = ActiveCell> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.energy > threshold)
            .map(move |(i, c)| {
                let x = i % self.resolution;
                let y = i / self.resolution;
                ActiveCell {
                    cell: *c,
                    x,
                    y,
                    world: self.grid_to_world(x as i32, y as i32),
                }
            })
    }

    /// Sum of energy over the whole grid.
    pub fn total_energy(&self) -> f32 {
        self.cells.iter().map(|c| c.energy).sum()
    }

    /// Reset every cell, velocity included.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }
}

/// Wrap into \[0, 2π). `rem_euclid` can round up to exactly 2π for tiny
/// negative inputs.
#[inline]
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

#[inline]
fn step_cell(cell: &mut Cell, decay: f32, delta_time: f32) {
    let old_energy = cell.energy;
    if old_energy > ACTIVE_ENERGY_EPSILON {
        cell.phase = wrap_angle(cell.phase + delta_time * cell.frequency / PHASE_RATE_DIVISOR);
    }

    let mut new_energy = old_energy * decay;
    if old_energy > ACTIVE_ENERGY_EPSILON {
        cell.velocity *= new_energy / old_energy;
    } else if cell.velocity != Vec2::ZERO {
        cell.velocity *= DARK_VELOCITY_DECAY;
    }
    if cell.velocity.length() < VELOCITY_EPSILON {
        cell.velocity = Vec2::ZERO;
    }

    if new_energy < ACTIVE_ENERGY_EPSILON {
        new_energy = 0.0;
    }
    cell.energy = new_energy.clamp(0.0, 1.0);
}
