// The signal analysis core: text vectorization, dimensionality
// reduction, and composite-signal fusion.

pub mod engine;
pub mod fuse;
pub mod reduce;
pub mod vectorize;

pub use engine::{EngineConfig, SignalEngine};
