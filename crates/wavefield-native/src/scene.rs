//! Scripted demo scene: a droning beacon, an orbiting thruster, a cannon that
//! fires volleys at the center and a recurring explosion.

use glam::Vec2;
use std::f32::consts::FRAC_PI_2;
use wavefield_core::{
    BurstPattern, ConfigError, Emitter, EmitterConfig, EmitterOverrides, EmitterType, FieldConfig,
    FrameConsumer, Scale, Scheduler, Simulation,
};

pub const BEACON: &str = "beacon";
pub const THRUSTER: &str = "thruster";
pub const CANNON: &str = "cannon";
pub const BLAST: &str = "blast";

const ORBIT_RADIUS_RATIO: f32 = 0.3; // of the shorter world side
const ORBIT_SPEED: f32 = 0.8; // radians per second
const FIRST_VOLLEY_MS: f64 = 1000.0;
const VOLLEY_INTERVAL_MS: f64 = 1500.0;
const FIRST_BLAST_MS: f64 = 3000.0;
const BLAST_INTERVAL_MS: f64 = 6000.0;
const VOLLEY_FAN: f32 = 0.2; // radians

/// Per-type property overrides applied when the scene builds its emitters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmitterTuning {
    pub thruster: EmitterOverrides,
    pub weapon: EmitterOverrides,
    pub explosion: EmitterOverrides,
    pub default: EmitterOverrides,
}

impl EmitterTuning {
    pub fn for_kind(&self, kind: EmitterType) -> &EmitterOverrides {
        match kind {
            EmitterType::Thruster => &self.thruster,
            EmitterType::Weapon => &self.weapon,
            EmitterType::Explosion => &self.explosion,
            EmitterType::Default => &self.default,
        }
    }

    pub fn for_kind_mut(&mut self, kind: EmitterType) -> &mut EmitterOverrides {
        match kind {
            EmitterType::Thruster => &mut self.thruster,
            EmitterType::Weapon => &mut self.weapon,
            EmitterType::Explosion => &mut self.explosion,
            EmitterType::Default => &mut self.default,
        }
    }

    /// Use `scale` for every type that does not name its own.
    pub fn with_scale(mut self, scale: Scale) -> Self {
        for kind in [
            EmitterType::Thruster,
            EmitterType::Weapon,
            EmitterType::Explosion,
            EmitterType::Default,
        ] {
            self.for_kind_mut(kind).scale.get_or_insert(scale);
        }
        self
    }
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub field: FieldConfig,
    pub seed: u64,
    pub tuning: EmitterTuning,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            seed: 1,
            tuning: EmitterTuning::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Cue {
    Volley,
    Blast,
}

pub struct Scene {
    sim: Simulation,
    cues: Scheduler<Cue>,
    center: Vec2,
    orbit_radius: f32,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Result<Self, ConfigError> {
        let world = Vec2::new(config.field.width, config.field.height);
        let center = world / 2.0;
        let orbit_radius = world.min_element() * ORBIT_RADIUS_RATIO;
        let mut sim = Simulation::new(config.field)?;

        let cannon_at = world * Vec2::new(0.15, 0.85);
        let aim = center - cannon_at;
        let layout = [
            (BEACON, EmitterType::Default, center, 0.0),
            (THRUSTER, EmitterType::Thruster, center, 0.0),
            (CANNON, EmitterType::Weapon, cannon_at, aim.y.atan2(aim.x)),
            (BLAST, EmitterType::Explosion, world * Vec2::new(0.7, 0.3), 0.0),
        ];
        for (i, (id, kind, position, angle)) in layout.into_iter().enumerate() {
            let emitter = Emitter::new(
                EmitterConfig::new(kind)
                    .with_id(id)
                    .with_position(position)
                    .with_angle(angle)
                    .with_seed(config.seed.wrapping_add(i as u64))
                    .with_properties(config.tuning.for_kind(kind).clone()),
            )?;
            sim.add_emitter(emitter);
        }

        let mut cues = Scheduler::new();
        cues.schedule(FIRST_VOLLEY_MS, Cue::Volley);
        cues.schedule(FIRST_BLAST_MS, Cue::Blast);

        let mut scene = Self {
            sim,
            cues,
            center,
            orbit_radius,
        };
        scene.move_thruster();
        log::info!(
            "[scene] {} emitters on a {}x{} grid",
            scene.sim.emitter_ids().count(),
            scene.sim.field().resolution(),
            scene.sim.field().resolution()
        );
        Ok(scene)
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    /// Advance the scene one frame and show it to `consumers`.
    pub fn step(&mut self, delta_time: f32, consumers: &mut [&mut dyn FrameConsumer]) -> f32 {
        let dt = self.sim.step_with(delta_time, consumers);
        self.move_thruster();
        for cue in self.cues.advance_to(self.sim.time_ms()) {
            self.run(cue);
        }
        dt
    }

    fn move_thruster(&mut self) {
        let theta = (self.sim.time_ms() / 1000.0) as f32 * ORBIT_SPEED;
        let position = self.center + Vec2::from_angle(theta) * self.orbit_radius;
        // Exhaust points against the direction of travel
        let exhaust = theta - FRAC_PI_2;
        if let Some(thruster) = self.sim.emitter_mut(THRUSTER) {
            thruster.update(position, exhaust, &EmitterOverrides::default());
        }
    }

    fn run(&mut self, cue: Cue) {
        match cue {
            Cue::Volley => {
                log::debug!("[scene] volley at {:.0}ms", self.sim.time_ms());
                self.sim.schedule_burst(
                    CANNON,
                    1.0,
                    BurstPattern {
                        fan: VOLLEY_FAN,
                        ..Default::default()
                    },
                );
                self.cues.schedule(VOLLEY_INTERVAL_MS, Cue::Volley);
            }
            Cue::Blast => {
                log::debug!("[scene] blast at {:.0}ms", self.sim.time_ms());
                self.sim.emit(BLAST, 1.0);
                self.cues.schedule(BLAST_INTERVAL_MS, Cue::Blast);
            }
        }
    }
}
