use thiserror::Error;

/// Construction-time configuration failures.
///
/// Runtime operations never return these; off-grid queries and inactive
/// emitters degrade to `None` or no-ops instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("field resolution must be at least 1")]
    ZeroResolution,
    #[error("world dimensions must be positive and finite, got {width}x{height}")]
    InvalidDimensions { width: f32, height: f32 },
    #[error("decay rate must be in (0, 1], got {0}")]
    InvalidDecayRate(f32),
    #[error("wave density must be non-negative and finite, got {0}")]
    InvalidWaveDensity(f32),
    #[error("max radius must be positive and finite, got {0}")]
    InvalidMaxRadius(f32),
    #[error("unknown emitter type `{0}`")]
    UnknownEmitterType(String),
    #[error("unknown scale `{0}`")]
    UnknownScale(String),
    #[error("unknown oscillator type `{0}`")]
    UnknownWaveform(String),
    #[error("unknown filter type `{0}`")]
    UnknownFilter(String),
    #[error("invalid value `{value}` for option `{key}`")]
    InvalidOption { key: String, value: String },
}
