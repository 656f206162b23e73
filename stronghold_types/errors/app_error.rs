use thiserror::Error;

/// Errors for app logic.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{queue} queue is full (max {limit})")]
    QueueLimitReached { queue: &'static str, limit: usize },

    #[error("Village {0} already exists")]
    VillageAlreadyExists(u32),

    #[error("Invalid building catalog: {0}")]
    InvalidCatalog(String),
}
