use axum::{
    Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::str::FromStr;
use uuid::Uuid;

use stronghold_types::{
    buildings::BuildingName,
    errors::{AppError, ApplicationError, DbError, GameError},
};

/// Header carrying the authenticated player, set by the auth proxy in front of us.
pub const PLAYER_HEADER: &str = "x-player-id";

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub(super) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        error: message.into(),
    };
    (status, Json(body)).into_response()
}

pub fn status_for(err: &ApplicationError) -> StatusCode {
    match err {
        ApplicationError::Game(e) => match e {
            GameError::BuildingNotFound(_) => StatusCode::NOT_FOUND,
            GameError::VillageNotOwned { .. } => StatusCode::FORBIDDEN,
            GameError::BuildingUpgrading(_)
            | GameError::InsufficientResources
            | GameError::NotUpgrading(_)
            | GameError::UpgradeNotFinished { .. }
            | GameError::UpgradeAlreadyFinished(_) => StatusCode::CONFLICT,
            GameError::InvalidBuildingType(_)
            | GameError::BuildingMaxLevel { .. }
            | GameError::TownHallRequired { .. } => StatusCode::BAD_REQUEST,
        },
        ApplicationError::App(e) => match e {
            AppError::QueueLimitReached { .. } | AppError::VillageAlreadyExists(_) => {
                StatusCode::CONFLICT
            }
            AppError::InvalidCatalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        ApplicationError::Db(DbError::VillageNotFound(_)) => StatusCode::NOT_FOUND,
        ApplicationError::Db(_)
        | ApplicationError::Json(_)
        | ApplicationError::Infrastructure(_)
        | ApplicationError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turns an application error into a JSON error response.
/// Server-side failures are logged and their details are not exposed.
pub(super) fn app_error(err: ApplicationError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = ?err, "Request failed");
        return error_response(status, "Internal server error");
    }
    error_response(status, err.to_string())
}

pub(super) fn current_player(headers: &HeaderMap) -> Result<Uuid, Response> {
    let raw = headers
        .get(PLAYER_HEADER)
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Missing player identity"))?;

    raw.to_str()
        .ok()
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Malformed player identity"))
}

pub(super) fn parse_building(raw: &str) -> Result<BuildingName, Response> {
    BuildingName::from_str(raw).map_err(|e| app_error(e.into()))
}
