use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::models::{CandidateProfile, CandidateRecord};
use crate::screening::validation::{validate_email, validate_phone};
use crate::state::AppState;

/// POST /api/user
/// Stores a finished candidate record. 201 with the stored record, 409 on a
/// duplicate email, 400 on a malformed body or invalid fields.
pub async fn handle_create_user(
    State(state): State<AppState>,
    payload: Result<Json<CandidateProfile>, JsonRejection>,
) -> Result<(StatusCode, Json<CandidateRecord>), AppError> {
    let Json(mut profile) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    profile.email = validate_email(&profile.email).map_err(|e| AppError::Validation(e.to_string()))?;
    profile.phone = validate_phone(&profile.phone).map_err(|e| AppError::Validation(e.to_string()))?;
    if profile.full_name.trim().is_empty() {
        return Err(AppError::Validation("full_name must not be empty".to_string()));
    }
    if profile.desired_positions.is_empty() {
        return Err(AppError::Validation(
            "desired_positions must contain at least one entry".to_string(),
        ));
    }

    let record = state.store.insert(&profile).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/user/:email
/// 200 with the stored record, 404 if unknown, 400 on an invalid email.
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<CandidateRecord>, AppError> {
    let email = validate_email(&email).map_err(|e| AppError::Validation(e.to_string()))?;

    let record = state
        .store
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(record))
}
