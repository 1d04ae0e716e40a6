//! # Rendering Module
//!
//! Plain-text rendering of the encounter for a terminal.

pub mod display;

pub use display::*;
