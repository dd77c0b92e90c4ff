//! Arbor - 2D scene graph with kinematic physics
//!
//! The application layer on top of the engine crates:
//!
//! - [`config`] - Layered application configuration
//! - [`simulation`] - Fixed-step frame loop
//! - [`demo`] - Behavior-driven demo platformer scene

pub mod config;
pub mod simulation;
pub mod demo;
