use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stronghold_game::models::village::Village;
use stronghold_types::common::Position;

use super::helpers::{app_error, current_player};
use crate::http::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterVillageRequest {
    pub village_id: u32,
    pub world_id: Uuid,
    pub name: String,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Serialize)]
pub struct VillageResponse {
    pub id: u32,
    pub name: String,
    pub player_id: Uuid,
    pub world_id: Uuid,
    pub position: Position,
}

impl From<Village> for VillageResponse {
    fn from(village: Village) -> Self {
        Self {
            id: village.id,
            name: village.name,
            player_id: village.player_id,
            world_id: village.world_id,
            position: village.position,
        }
    }
}

/// POST /villages - world-join hook, the village belongs to the calling player.
pub async fn register_village(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterVillageRequest>,
) -> Response {
    let player_id = match current_player(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let position = Position {
        x: body.x,
        y: body.y,
    };
    match state
        .manager
        .register_village(body.village_id, player_id, body.world_id, body.name, position)
        .await
    {
        Ok(village) => (StatusCode::CREATED, Json(VillageResponse::from(village))).into_response(),
        Err(e) => app_error(e),
    }
}

/// GET /villages/{village_id}/resources
pub async fn village_resources(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(village_id): Path<u32>,
) -> Response {
    let player_id = match current_player(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.manager.village_resources(player_id, village_id).await {
        Ok(resources) => Json(resources).into_response(),
        Err(e) => app_error(e),
    }
}

/// GET /villages/{village_id}/queue
pub async fn queue_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(village_id): Path<u32>,
) -> Response {
    let player_id = match current_player(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.manager.queue_status(player_id, village_id).await {
        Ok(status) => Json(status).into_response(),
        Err(e) => app_error(e),
    }
}

/// POST /villages/{village_id}/queue/process
pub async fn process_queue(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(village_id): Path<u32>,
) -> Response {
    let player_id = match current_player(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.manager.process_queue(Some(player_id), village_id).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => app_error(e),
    }
}
