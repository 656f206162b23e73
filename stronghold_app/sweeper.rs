use std::{sync::Arc, time::Duration};
use tokio::time;
use tracing::{debug, error, info, warn};

use stronghold_types::errors::ApplicationError;

use crate::construction::ConstructionQueueManager;

/// Completes due upgrades in the background, so villages nobody looks at still level up.
pub struct QueueSweeper {
    manager: ConstructionQueueManager,
    interval: Duration,
    batch_size: i64,
}

impl QueueSweeper {
    pub fn new(manager: ConstructionQueueManager, interval: Duration, batch_size: i64) -> Self {
        Self {
            manager,
            interval,
            batch_size,
        }
    }

    /// Run the sweep loop inside a tokio task. A zero interval disables it.
    pub fn run(self: Arc<Self>) {
        if self.interval.is_zero() {
            info!("Queue sweeper disabled");
            return;
        }

        tokio::spawn(async move {
            let mut interval = time::interval(self.interval);
            info!(every = ?self.interval, "Queue sweeper started");

            loop {
                interval.tick().await;
                if let Err(e) = self.sweep_once().await {
                    error!(error = ?e, "Error while sweeping construction queues");
                }
            }
        });
    }

    /// Processes one batch of villages with due upgrades.
    /// Returns how many upgrades were completed.
    pub async fn sweep_once(&self) -> Result<usize, ApplicationError> {
        let due = self
            .manager
            .villages_with_due_upgrades(self.batch_size)
            .await?;
        if due.is_empty() {
            return Ok(0);
        }
        debug!(villages = due.len(), "Found villages with due upgrades");

        let mut completed = 0;
        for village_id in due {
            match self.manager.process_queue(None, village_id).await {
                Ok(report) => completed += report.completed.len(),
                Err(e) => warn!(village_id, error = %e, "Failed to process construction queue"),
            }
        }
        Ok(completed)
    }
}
