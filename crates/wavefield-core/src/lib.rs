//! Discretized 2D wave field driven by directional emitters.
//!
//! Emitters produce waves, the wave manager grows them into expanding rings
//! stamped onto the field every tick, and front-ends poll the field's lit
//! cells to draw glow and synthesize sound.

pub mod cell;
pub mod clock;
pub mod constants;
pub mod consumer;
pub mod emitter;
pub mod error;
pub mod field;
pub mod music;
pub mod schedule;
pub mod sim;
pub mod voices;
pub mod waves;

pub use cell::*;
pub use clock::*;
pub use consumer::*;
pub use emitter::*;
pub use error::*;
pub use field::*;
pub use music::*;
pub use schedule::*;
pub use sim::*;
pub use voices::*;
pub use waves::*;
