//! Finger Snake library
//!
//! A snake steered by a single tracked point: a sensor thread samples the
//! pointer (or a finger seen by a camera), a smoother turns that noisy,
//! gappy stream into a steady target, and a fixed-rate simulation drives a
//! chain of evenly spaced points toward it while items spawn, get eaten and
//! respawn.
//!
//! The core (`tracking`, `chain`, `food`, `session`) has no rendering
//! dependency beyond `bevy`'s math and logging; the Bevy plugins in
//! `simulation`, `menu` and `rendering` wire it into a windowed app.

pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod food;
pub mod graphics;
pub mod menu;
pub mod rendering;
pub mod save;
pub mod session;
pub mod simulation;
pub mod tracking;

/// Playfield coordinate in pixels, origin top-left, y down.
pub type Point = bevy::math::Vec2;
