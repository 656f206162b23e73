use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Village {
    pub id: i32,
    pub player_id: Uuid,
    pub world_id: Uuid,
    pub name: String,
    pub position: serde_json::Value,
    pub buildings: serde_json::Value,
    pub resources: serde_json::Value,
    pub resources_updated_at: DateTime<Utc>,
    pub next_completion_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
