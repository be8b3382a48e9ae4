//! Atomic grid unit of the wave field.

use crate::constants::DEFAULT_CELL_FREQUENCY;
use glam::Vec2;

/// One cell of the field grid.
///
/// Fields:
/// - `energy`: excitation level, always within \[0, 1\]
/// - `frequency`: dominant tone in Hertz, blended on injection
/// - `color`: RGB identity of the dominant injected wave
/// - `phase`: oscillation phase in \[0, 2π), advanced only while lit
/// - `velocity`: directional momentum from the latest significant injection
/// - `last_active`: field tick of the most recent injection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub energy: f32,
    pub frequency: f32,
    pub color: [u8; 3],
    pub phase: f32,
    pub velocity: Vec2,
    pub last_active: u64,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            energy: 0.0,
            frequency: DEFAULT_CELL_FREQUENCY,
            color: [0, 0, 0],
            phase: 0.0,
            velocity: Vec2::ZERO,
            last_active: 0,
        }
    }
}

impl Cell {
    /// Color as normalized floats for shaders and mixers.
    pub fn color_rgb(&self) -> [f32; 3] {
        [
            self.color[0] as f32 / 255.0,
            self.color[1] as f32 / 255.0,
            self.color[2] as f32 / 255.0,
        ]
    }

    /// Ticks elapsed since the last injection into this cell.
    pub fn staleness(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_active)
    }

    /// Blend frequency and color toward an injected wave with `weight` in \[0, 1\].
    pub(crate) fn blend_tone(&mut self, frequency: f32, color: [u8; 3], weight: f32) {
        let w = weight.clamp(0.0, 1.0);
        self.frequency += (frequency - self.frequency) * w;
        for (channel, target) in self.color.iter_mut().zip(color) {
            let mixed = *channel as f32 + (target as f32 - *channel as f32) * w;
            *channel = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }
}
