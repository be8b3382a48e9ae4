//! Deterministic time-offset actions evaluated by the tick loop.
//!
//! Staggered effects such as multi-wave weapon bursts are queued here with a
//! due time instead of being handed to real timers, so a run is fully
//! reproducible from its sequence of `dt` values.

/// A queued action and the simulation time (ms) it becomes due.
#[derive(Clone, Debug, PartialEq)]
pub struct Scheduled<A> {
    pub due_at: f64,
    pub action: A,
    seq: u64,
}

#[derive(Clone, Debug)]
pub struct Scheduler<A> {
    entries: Vec<Scheduled<A>>,
    now: f64,
    next_seq: u64,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            now: 0.0,
            next_seq: 0,
        }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scheduler time in milliseconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queue `action` to run `delay_ms` after the current time.
    pub fn schedule(&mut self, delay_ms: f64, action: A) {
        self.schedule_at(self.now + delay_ms.max(0.0), action);
    }

    /// Queue `action` at an absolute time; past times run on the next advance.
    pub fn schedule_at(&mut self, due_at: f64, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Scheduled { due_at, action, seq });
    }

    /// Move time forward to `now` and return every action that is due, in due
    /// order with ties broken by insertion order.
    pub fn advance_to(&mut self, now: f64) -> Vec<A> {
        self.now = self.now.max(now);
        let current = self.now;
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due_at <= current {
                due.push(self.entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due_at.total_cmp(&b.due_at).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|s| s.action).collect()
    }

    pub fn advance_by(&mut self, delta_ms: f64) -> Vec<A> {
        self.advance_to(self.now + delta_ms.max(0.0))
    }

    /// Drop all pending actions matching `pred`.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&A) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|s| !pred(&s.action));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Emission request produced by a burst pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledEmit {
    pub emitter_id: String,
    pub intensity: f32,
    /// Facing offset in radians added to the emitter angle at fire time.
    pub angle_offset: f32,
}

/// Shape of a multi-wave burst.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurstPattern {
    pub count: usize,
    pub interval_ms: f64,
    /// Total fan in radians the shots are spread across.
    pub fan: f32,
    /// Intensity multiplier applied to each successive shot.
    pub falloff: f32,
}

impl Default for BurstPattern {
    fn default() -> Self {
        Self {
            count: 3,
            interval_ms: 80.0,
            fan: 0.0,
            falloff: 0.85,
        }
    }
}

/// Queue a burst of emissions for `emitter_id`, the first one immediately.
pub fn burst(
    scheduler: &mut Scheduler<ScheduledEmit>,
    emitter_id: &str,
    intensity: f32,
    pattern: BurstPattern,
) {
    let mut shot_intensity = intensity;
    for i in 0..pattern.count {
        let angle_offset = if pattern.count > 1 {
            -pattern.fan / 2.0 + pattern.fan * i as f32 / (pattern.count - 1) as f32
        } else {
            0.0
        };
        scheduler.schedule(
            pattern.interval_ms * i as f64,
            ScheduledEmit {
                emitter_id: emitter_id.to_string(),
                intensity: shot_intensity,
                angle_offset,
            },
        );
        shot_intensity *= pattern.falloff;
    }
}
