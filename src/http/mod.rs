//! HTTP surface: bootstrap REST endpoints and the WebSocket route.

pub mod ws;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::catalog;
use crate::error::GameError;
use crate::game::state::{PlayerId, RoomConfig, RoomId};
use crate::profiles::{Profile, ProfileStoreError};
use crate::protocol::{ErrorCode, PublicGameState};
use crate::server::GameServer;

/// Builds the application router with CORS configured like the rest of the
/// deployment (comma-separated origins, `*` for permissive).
pub fn create_router(server: Arc<GameServer>, cors_origins: &str) -> Router {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let cors = if cors_origins == "*" {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("No valid CORS origins configured, using permissive CORS");
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    let body_limit = server.config().storage.max_avatar_bytes + 64 * 1024;

    Router::new()
        .route("/profiles", post(create_profile))
        .route("/profiles/{id}", get(get_profile))
        .route("/profiles/{id}/avatar", post(upload_avatar))
        .route("/avatars/{filename}", get(get_avatar))
        .route("/game-templates", get(get_templates))
        .route("/games", get(list_games))
        .route("/games/create", post(create_game))
        .route("/games/{room_id}/join", post(join_game))
        .route("/games/{room_id}", get(get_game))
        .route("/ws/{room_id}/{player_id}", get(ws::websocket_handler))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Error envelope for the bootstrap surface.
struct ApiError {
    status: StatusCode,
    code: ErrorCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "error_code": self.code,
        }));
        (self.status, body).into_response()
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        let status = match err {
            GameError::RoomNotFound
            | GameError::PlayerNotFound
            | GameError::ProfileNotFound
            | GameError::TemplateNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        ApiError::new(status, err.code(), err.to_string())
    }
}

impl From<ProfileStoreError> for ApiError {
    fn from(err: ProfileStoreError) -> Self {
        match err {
            ProfileStoreError::NotFound => ApiError::new(
                StatusCode::NOT_FOUND,
                ErrorCode::ProfileNotFound,
                "profile not found",
            ),
            ProfileStoreError::InvalidAvatar(reason) => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::InvalidAvatar, reason)
            }
            other => {
                tracing::error!(error = %other, "Profile store failure");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    "internal error",
                )
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateProfileRequest {
    name: String,
}

async fn create_profile(
    State(server): State<Arc<GameServer>>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let name = request.name.trim();
    if name.is_empty() || name.chars().count() > 32 {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::InvalidFrame,
            "name must be 1-32 characters",
        ));
    }
    let profile = server.profiles().create(name.to_string()).await?;
    Ok(Json(profile))
}

async fn get_profile(
    State(server): State<Arc<GameServer>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(server.profiles().get(id).await?))
}

/// Multipart avatar upload, capped by `storage.max_avatar_bytes`.
async fn upload_avatar(
    State(server): State<Arc<GameServer>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Profile>, ApiError> {
    let max_bytes = server.config().storage.max_avatar_bytes;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let content_type = field.content_type().map(str::to_owned);
        let Some(content_type) = content_type else {
            continue;
        };
        let Some(extension) = image_extension(&content_type) else {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidAvatar,
                format!("unsupported content type `{content_type}`"),
            ));
        };
        let bytes = field.bytes().await.map_err(bad_multipart)?;
        if bytes.len() > max_bytes {
            return Err(ApiError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorCode::AvatarTooLarge,
                format!("avatar exceeds {max_bytes} bytes"),
            ));
        }
        let profile = server
            .profiles()
            .store_avatar(id, extension, &bytes)
            .await?;
        return Ok(Json(profile));
    }
    Err(ApiError::new(
        StatusCode::BAD_REQUEST,
        ErrorCode::InvalidAvatar,
        "no image field in upload",
    ))
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> ApiError {
    // an over-limit body surfaces here as a read failure
    ApiError::new(
        StatusCode::PAYLOAD_TOO_LARGE,
        ErrorCode::AvatarTooLarge,
        err.to_string(),
    )
}

fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Serves stored avatar files.
async fn get_avatar(
    State(server): State<Arc<GameServer>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    if filename.contains(['/', '\\']) || filename.contains("..") {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::InvalidAvatar,
            "bad avatar filename",
        ));
    }
    let path = server.config().storage.avatars_dir().join(&filename);
    let bytes = tokio::fs::read(&path).await.map_err(|_| {
        ApiError::new(
            StatusCode::NOT_FOUND,
            ErrorCode::ProfileNotFound,
            "avatar not found",
        )
    })?;
    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

async fn get_templates() -> Json<&'static [catalog::GameTemplate]> {
    Json(catalog::list_templates())
}

async fn list_games(
    State(server): State<Arc<GameServer>>,
) -> Json<Vec<crate::game::LobbySummary>> {
    Json(server.list_rooms().await)
}

#[derive(Debug, Deserialize)]
struct CreateGameRequest {
    host_profile_id: Uuid,
    game_config: RoomConfig,
}

#[derive(Debug, Serialize)]
struct RoomEntryResponse {
    room_id: RoomId,
    player_id: PlayerId,
}

async fn create_game(
    State(server): State<Arc<GameServer>>,
    Json(request): Json<CreateGameRequest>,
) -> Result<Json<RoomEntryResponse>, ApiError> {
    let (room_id, host) = server
        .create_room(request.host_profile_id, request.game_config)
        .await?;
    Ok(Json(RoomEntryResponse {
        room_id,
        player_id: host.id,
    }))
}

#[derive(Debug, Deserialize)]
struct JoinGameRequest {
    profile_id: Uuid,
}

async fn join_game(
    State(server): State<Arc<GameServer>>,
    Path(room_id): Path<Uuid>,
    Json(request): Json<JoinGameRequest>,
) -> Result<Json<RoomEntryResponse>, ApiError> {
    let (room_id, player) = server.join_room(room_id, request.profile_id).await?;
    Ok(Json(RoomEntryResponse {
        room_id,
        player_id: player.id,
    }))
}

async fn get_game(
    State(server): State<Arc<GameServer>>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<PublicGameState>, ApiError> {
    let coordinator = server.room(room_id).ok_or(GameError::RoomNotFound)?;
    Ok(Json(coordinator.public_snapshot().await))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}
