// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Visualization tools for recognized hands.

/// Color definitions and palettes.
pub mod color;

/// Hand skeleton topology.
pub mod skeleton;

pub use color::Color;
pub use skeleton::HAND_SKELETON;
