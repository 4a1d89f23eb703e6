use crate::types::AssetsResponse;
use crate::AppState;
use axum::{routing::get, Json, Router};

/// GET /api/assets
async fn list_assets() -> Json<AssetsResponse> {
    Json(AssetsResponse::all())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/assets", get(list_assets))
}
