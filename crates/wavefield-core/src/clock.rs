use crate::constants::MAX_DELTA_TIME;
use instant::Instant;

/// Clamp a frame delta into \[0, `MAX_DELTA_TIME`\].
///
/// Decay and growth formulas overshoot on large gaps (a backgrounded tab, a
/// debugger pause), so every tick goes through this.
#[inline]
pub fn clamp_delta_time(delta_time: f32) -> f32 {
    if delta_time.is_finite() {
        delta_time.clamp(0.0, MAX_DELTA_TIME)
    } else {
        0.0
    }
}

/// Wall-clock frame timer producing clamped deltas.
pub struct FrameClock {
    last_instant: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_instant: Instant::now(),
        }
    }

    /// Seconds since the previous call, clamped.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now - self.last_instant;
        self.last_instant = now;
        clamp_delta_time(dt.as_secs_f32())
    }
}
