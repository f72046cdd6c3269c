//! In-memory submitter for tests and the demo binary.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::action::{MoveAction, Receipt, Submitter};
use crate::core::error::{MarchError, Result};

/// Records every action and answers with a synthetic receipt.
///
/// Can be switched to reject submissions, or gated so that each
/// submission waits for `release()` before resolving.
#[derive(Clone, Default)]
pub struct MockSubmitter {
    submitted: Arc<Mutex<Vec<MoveAction>>>,
    counter: Arc<AtomicU64>,
    failing: Arc<AtomicBool>,
    gate: Option<Arc<Notify>>,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every submission
    pub fn failing() -> Self {
        let mock = Self::new();
        mock.set_failing(true);
        mock
    }

    /// Hold each submission until `release()` is called
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Let one held submission resolve
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn submitted(&self) -> Vec<MoveAction> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Submitter for MockSubmitter {
    async fn submit(&self, action: MoveAction) -> Result<Receipt> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action);

        if self.failing.load(Ordering::SeqCst) {
            return Err(MarchError::Submission("rejected by mock backend".into()));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Receipt::new(format!("mock-tx-{n}")))
    }
}
