//! Speculative state overlays
//!
//! Client-side writes applied ahead of authoritative confirmation and
//! rolled back by id.

pub mod store;
pub mod unit_state;

pub use store::{Categorized, FieldCategory, Mutation, OverlayId, OverlayStatus, OverlayStore};
pub use unit_state::{FieldValue, SpeculativeLedger, StateField, StateKey, StateOverlays, UnitStateStore};
