//! Movement submission with speculative overlays

pub mod action;
pub mod executor;
pub mod mock;

pub use action::{MoveAction, Receipt, Submitter};
pub use executor::{MoveOutcome, MoveReport, MoveTicket, MovementExecutor};
pub use mock::MockSubmitter;
