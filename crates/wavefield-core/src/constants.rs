// Shared simulation tuning constants used by the field, emitters and wave manager.

// Field defaults
pub const DEFAULT_RESOLUTION: usize = 48; // cells per side
pub const DEFAULT_DECAY_RATE: f32 = 0.96; // per-frame energy multiplier at 60 fps
pub const DEFAULT_PROPAGATION_SPEED: f32 = 200.0; // reserved, world units per second
pub const DEFAULT_CELL_FREQUENCY: f32 = 440.0; // Hz of an untouched cell

// Frame-rate normalization
pub const REFERENCE_FPS: f32 = 60.0; // decay exponent is expressed in 60 fps frames
pub const MAX_DELTA_TIME: f32 = 0.1; // seconds; larger frame gaps are clamped

// Energy thresholds
pub const ACTIVE_ENERGY_EPSILON: f32 = 0.01; // below this a cell is dark and snapped to 0
pub const BLEND_THRESHOLD: f32 = 0.05; // minimum injection that blends frequency/color
pub const VELOCITY_BLEND_THRESHOLD: f32 = 0.1; // minimum injection that imparts momentum
pub const DEFAULT_ACTIVE_THRESHOLD: f32 = 0.05; // default cutoff for active-cell queries

// Pulse geometry
pub const WAVE_THICKNESS_RATIO: f32 = 0.2; // ring thickness as a fraction of radius
pub const VELOCITY_SCALE: f32 = 2.0; // directional velocity imparted per unit intensity
pub const DARK_VELOCITY_DECAY: f32 = 0.8; // per-tick velocity factor once a cell goes dark
pub const VELOCITY_EPSILON: f32 = 0.01; // velocity magnitude snapped to zero below this
pub const PHASE_RATE_DIVISOR: f32 = 20.0; // phase advances by dt * frequency / 20

// Traveling waves
pub const WAVE_START_RADIUS: f32 = 10.0; // world units at emission
pub const WAVE_REMOVE_INTENSITY: f32 = 0.01; // waves at or below this are dropped
pub const WAVE_PULSE_INTENSITY: f32 = 0.05; // waves pulse the field only above this
pub const DEFAULT_WAVE_SPEED: f32 = 200.0; // world units per second
pub const DEFAULT_MAX_RADIUS: f32 = 300.0; // world units

// Emitters
pub const BASE_FREQUENCY_HZ: f32 = 220.0; // multiplied by the per-type frequency multiplier
pub const FREQUENCY_JITTER: f32 = 0.02; // emitted frequency varies by +/- 2%
pub const DEFAULT_WAVE_DENSITY: f32 = 4.0; // waves per second for periodic emitters
pub const DEFAULT_SPREAD_ANGLE: f32 = 360.0; // degrees; 360 is omnidirectional

// Music
pub const SCALE_REFERENCE_MIDI: f32 = 60.0; // C4, root of every snapped scale
pub const SEMITONES_PER_OCTAVE: i32 = 12;

// Voice allocation
pub const DEFAULT_MAX_VOICES: usize = 8;
pub const VOICE_GAIN_CEILING: f32 = 0.8; // summed voice gain never exceeds this
