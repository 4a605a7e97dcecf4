//! Shared graphics setup and camera controls for the atom viewer
//!
//! Window and device bring-up, buffer helpers, and an orbital camera with
//! an input controller that turns held keys and mouse drags into motion.

pub mod graphics;
pub mod camera;

pub use graphics::*;
pub use camera::*;
