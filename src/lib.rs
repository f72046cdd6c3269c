//! Frontier March - hex-grid action planning with speculative movement
//!
//! `campaign` plans what a unit can do this turn, `overlay` holds
//! client-side state written ahead of the backend, and `movement` submits
//! moves and reconciles the overlay with the result.

pub mod campaign;
pub mod core;
pub mod movement;
pub mod overlay;
