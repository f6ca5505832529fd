//! Dashboard routes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::DashboardService;
use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::Utc;
use gymtrack_shared::types::DashboardResponse;

/// GET /api/v1/dashboard - Today's summary
pub async fn get_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let today = Utc::now().date_naive();
    let summary = DashboardService::summary(state.db(), auth.user_id, today).await?;
    Ok(Json(summary))
}

/// GET /dashboard - Browser entry point
///
/// Anonymous visitors get a 307 to the login page.
pub async fn browser_dashboard(State(state): State<AppState>, auth: Option<AuthUser>) -> Response {
    let Some(auth) = auth else {
        return Redirect::temporary(&state.config().server.login_url).into_response();
    };

    let today = Utc::now().date_naive();
    match DashboardService::summary(state.db(), auth.user_id, today).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => e.into_response(),
    }
}
