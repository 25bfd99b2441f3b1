// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for Ricochet crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`draw`] - Debug-draw recorder
//! - [`bodies`] - Rigid body builder and weightless scene helpers

pub mod bodies;
pub mod config;
pub mod draw;

pub use bodies::{weightless_scene, weightless_settings, BodyBuilder};
pub use config::InMemoryConfigStore;
pub use draw::{DrawCall, RecordingDebugDraw};
