//! A small n-body playground: bodies attract, merge, shatter and fade, and a
//! population controller keeps the sky from emptying out.

pub mod clock;
pub mod config;
pub mod core;
pub mod render;
pub mod types;
pub mod ui;

pub use crate::config::{ConfigError, WorldParams};
pub use crate::core::{Body, Entity, Explosion, World};
pub use crate::render::Renderer;
pub use crate::types::{Bounds, Event, Rgb, Vec2, WorldStats};
