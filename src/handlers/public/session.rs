use axum::extract::State;
use serde::Deserialize;

use crate::checkout::SessionStatus;
use crate::error::Result;
use crate::extractors::{Json, Query};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionStatusQuery {
    #[serde(default)]
    pub session_id: String,
}

pub async fn session_status(
    State(state): State<AppState>,
    Query(query): Query<SessionStatusQuery>,
) -> Result<Json<SessionStatus>> {
    let status = state.checkout.session_status(&query.session_id).await?;
    Ok(Json(status))
}
