//! Glade Core - Foundations for the Glade 2D engine
//!
//! This crate provides the pieces every other Glade crate leans on:
//! - Mathematical primitives (re-exported from glam)
//! - Fixed-timestep time keeping for the simulation loop
//! - Per-system profiling with rolling statistics

pub mod profile;
pub mod time;

pub use glam::Vec2;
pub use profile::{ProfileStats, Profiler, ScopeTimer};
pub use time::{GameTime, TimeConfig, TimeConfigError};
