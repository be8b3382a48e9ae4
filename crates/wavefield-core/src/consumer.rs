//! Read-only contract between the simulation and its front-ends.
//!
//! Renderers and audio layers receive a `FrameView` once per tick and poll
//! whatever they need from it. Nothing here can mutate the field.

use crate::constants::DEFAULT_ACTIVE_THRESHOLD;
use crate::field::{ActiveCell, WaveField};
use crate::waves::Wave;
use glam::Vec2;

/// Borrowed view of one simulated frame.
#[derive(Clone, Copy)]
pub struct FrameView<'a> {
    pub field: &'a WaveField,
    pub waves: &'a [Wave],
    /// Simulation time in milliseconds.
    pub time_ms: f64,
    /// Clamped delta of the tick that produced this frame.
    pub delta_time: f32,
}

impl<'a> FrameView<'a> {
    pub fn active_cells(&self) -> Vec<ActiveCell> {
        self.field.active_cells(DEFAULT_ACTIVE_THRESHOLD)
    }

    /// Active cells packed for instanced drawing.
    pub fn cell_instances(&self, threshold: f32) -> Vec<CellInstance> {
        self.field
            .iter_active(threshold)
            .map(|a| CellInstance::from_active(&a, self.field.cell_size()))
            .collect()
    }
}

/// Anything that wants to see every simulated frame.
pub trait FrameConsumer {
    fn consume(&mut self, frame: &FrameView<'_>);
}

impl<F: FnMut(&FrameView<'_>)> FrameConsumer for F {
    fn consume(&mut self, frame: &FrameView<'_>) {
        self(frame)
    }
}

/// Per-cell instance data laid out for a GPU vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CellInstance {
    pub pos: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
    pub velocity: [f32; 2],
    pub phase: f32,
    pub energy: f32,
}

impl CellInstance {
    pub fn from_active(active: &ActiveCell, cell_size: Vec2) -> Self {
        let rgb = active.cell.color_rgb();
        Self {
            pos: active.world.to_array(),
            size: cell_size.to_array(),
            color: [rgb[0], rgb[1], rgb[2], active.cell.energy],
            velocity: active.cell.velocity.to_array(),
            phase: active.cell.phase,
            energy: active.cell.energy,
        }
    }
}

/// Energy-weighted center of the lit part of the field, if anything is lit.
pub fn energy_centroid(field: &WaveField, threshold: f32) -> Option<Vec2> {
    let mut weight = 0.0;
    let mut sum = Vec2::ZERO;
    for a in field.iter_active(threshold) {
        weight += a.cell.energy;
        sum += a.world * a.cell.energy;
    }
    (weight > 0.0).then(|| sum / weight)
}

/// Energy-weighted mean frequency of the lit cells, if anything is lit.
pub fn dominant_frequency(field: &WaveField, threshold: f32) -> Option<f32> {
    let mut weight = 0.0;
    let mut sum = 0.0;
    for a in field.iter_active(threshold) {
        weight += a.cell.energy;
        sum += a.cell.frequency * a.cell.energy;
    }
    (weight > 0.0).then(|| sum / weight)
}
