// LogTrail - core/mod.rs
//
// Core business logic layer.
// Dependencies: parsing and serialisation crates only.
// Must NOT depend on: platform, app, or read file contents directly.

pub mod discovery;
pub mod event_id;
pub mod export;
pub mod extract;
pub mod level;
pub mod model;
pub mod query;
pub mod timestamp;
