// LogTrail - app/mod.rs
//
// Application layer: session state and load orchestration.
// Dependencies: core layer, platform::fs for reading inputs.

pub mod loader;
pub mod state;
