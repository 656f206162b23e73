use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use stronghold_game::models::buildings::TimeRemaining;
use stronghold_types::{buildings::BuildingName, common::ResourceGroup};

use super::helpers::{app_error, current_player, parse_building};
use crate::http::AppState;

#[derive(Debug, Serialize)]
pub struct UpgradeStartedResponse {
    pub building: BuildingName,
    pub new_level: u8,
    pub completion_time: DateTime<Utc>,
    pub costs: ResourceGroup,
}

#[derive(Debug, Serialize)]
pub struct TimeRemainingResponse {
    pub is_upgrading: bool,
    pub time_remaining: u64,
    pub completion_time: Option<DateTime<Utc>>,
    pub formatted_time: String,
    pub can_complete: bool,
}

impl From<TimeRemaining> for TimeRemainingResponse {
    fn from(remaining: TimeRemaining) -> Self {
        Self {
            is_upgrading: remaining.is_upgrading,
            time_remaining: remaining.seconds,
            completion_time: remaining.completion_time,
            formatted_time: remaining.formatted,
            can_complete: remaining.can_complete,
        }
    }
}

/// Player and building of a `/villages/{village_id}/buildings/{building}` request.
fn target(headers: &HeaderMap, building: &str) -> Result<(Uuid, BuildingName), Response> {
    let player_id = current_player(headers)?;
    let building = parse_building(building)?;
    Ok((player_id, building))
}

/// GET /villages/{village_id}/buildings/{building}
pub async fn building_info(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((village_id, building)): Path<(u32, String)>,
) -> Response {
    let (player_id, building) = match target(&headers, &building) {
        Ok(target) => target,
        Err(response) => return response,
    };

    match state
        .manager
        .upgrade_info(player_id, village_id, building)
        .await
    {
        Ok(report) => Json(report).into_response(),
        Err(e) => app_error(e),
    }
}

/// GET /villages/{village_id}/buildings/{building}/time-remaining
pub async fn time_remaining(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((village_id, building)): Path<(u32, String)>,
) -> Response {
    let (player_id, building) = match target(&headers, &building) {
        Ok(target) => target,
        Err(response) => return response,
    };

    match state
        .manager
        .time_remaining(player_id, village_id, building)
        .await
    {
        Ok(remaining) => Json(TimeRemainingResponse::from(remaining)).into_response(),
        Err(e) => app_error(e),
    }
}

/// POST /villages/{village_id}/buildings/{building}/upgrade
pub async fn start_upgrade(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((village_id, building)): Path<(u32, String)>,
) -> Response {
    let (player_id, building) = match target(&headers, &building) {
        Ok(target) => target,
        Err(response) => return response,
    };

    match state
        .manager
        .start_upgrade(player_id, village_id, building)
        .await
    {
        Ok(result) => Json(UpgradeStartedResponse {
            building: result.building,
            new_level: result.new_level,
            completion_time: result.completion_time,
            costs: result.costs,
        })
        .into_response(),
        Err(e) => app_error(e),
    }
}

/// POST /villages/{village_id}/buildings/{building}/cancel
pub async fn cancel_upgrade(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((village_id, building)): Path<(u32, String)>,
) -> Response {
    let (player_id, building) = match target(&headers, &building) {
        Ok(target) => target,
        Err(response) => return response,
    };

    match state
        .manager
        .cancel_upgrade(player_id, village_id, building)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => app_error(e),
    }
}

/// POST /villages/{village_id}/buildings/{building}/complete
pub async fn complete_upgrade(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((village_id, building)): Path<(u32, String)>,
) -> Response {
    let (player_id, building) = match target(&headers, &building) {
        Ok(target) => target,
        Err(response) => return response,
    };

    match state
        .manager
        .complete_upgrade(player_id, village_id, building)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => app_error(e),
    }
}
