//! Tilt-maze server library.
//!
//! This module exposes the server components for use in tests and binaries.

pub mod config;
pub mod game_loop;
pub mod grid;
pub mod maze;
pub mod physics;
pub mod registry;
pub mod session;
pub mod tilt;
pub mod ws;
