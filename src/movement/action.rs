//! Authoritative movement actions and the submission seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::campaign::map::Direction;
use crate::core::error::Result;
use crate::core::types::EntityId;

/// A state-changing call sent to the authoritative backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveAction {
    /// Step onto one unexplored neighbour
    Explore { unit: EntityId, direction: Direction },
    /// Walk a chain of explored hexes
    Travel {
        unit: EntityId,
        directions: Vec<Direction>,
    },
}

impl MoveAction {
    pub fn unit(&self) -> EntityId {
        match self {
            MoveAction::Explore { unit, .. } | MoveAction::Travel { unit, .. } => *unit,
        }
    }

    pub fn hops(&self) -> usize {
        match self {
            MoveAction::Explore { .. } => 1,
            MoveAction::Travel { directions, .. } => directions.len(),
        }
    }
}

/// Backend acknowledgement of a submitted action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction: String,
}

impl Receipt {
    pub fn new(transaction: impl Into<String>) -> Self {
        Self {
            transaction: transaction.into(),
        }
    }
}

/// Sends movement actions to the authoritative backend
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, action: MoveAction) -> Result<Receipt>;
}
