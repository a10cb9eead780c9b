use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Extension, Json,
};

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::checkin::{CheckinPage, CheckinQuery, CreatedCheckinResponse};
use crate::services::checkins::PageRequest;
use crate::validation::{CreateCheckinRequest, FieldError};
use crate::AppState;

pub async fn create_checkin(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<CreateCheckinRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CreatedCheckinResponse>)> {
    let Json(body) = payload.map_err(|rejection| {
        AppError::Validation(vec![FieldError::new(
            Some("body"),
            "malformed",
            &rejection.body_text(),
        )])
    })?;

    let checkin = state
        .checkins
        .create(auth_user.id, &body, state.clock.now())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedCheckinResponse {
            message: "Check-in saved successfully",
            checkin,
        }),
    ))
}

pub async fn list_checkins(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    query: Result<Query<CheckinQuery>, QueryRejection>,
) -> AppResult<Json<CheckinPage>> {
    let Query(query) = query.map_err(|rejection| {
        AppError::Validation(vec![FieldError::new(
            Some("query"),
            "malformed",
            &rejection.body_text(),
        )])
    })?;

    let page = state
        .checkins
        .list(auth_user.id, PageRequest::from(&query))
        .await?;

    Ok(Json(page))
}
