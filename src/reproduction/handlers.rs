use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    check_calving_after, IndicatorsResponse, ReproductionPatchRequest, ReproductionRequest,
};
use crate::{
    analytics::metrics::{reproduction_indicators, upcoming_births},
    auth::AuthUser,
    domain::ReproductionRecord,
    error::{AppError, AppResult},
    state::AppState,
    store::{NewReproductionRecord, ReproductionPatch},
};

const UPCOMING_BIRTHS_LIMIT: usize = 10;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reproduction",
            get(list_reproduction).post(create_reproduction),
        )
        .route("/reproduction/indicators", get(indicators))
        .route(
            "/reproduction/:id",
            patch(update_reproduction).delete(delete_reproduction),
        )
}

#[instrument(skip(state))]
pub async fn list_reproduction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<ReproductionRecord>>> {
    Ok(Json(state.store.list_reproduction(user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_reproduction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ReproductionRequest>,
) -> AppResult<(StatusCode, Json<ReproductionRecord>)> {
    let new = NewReproductionRecord::try_from(payload)?;
    if state.store.get_animal(user_id, new.animal_id).await?.is_none() {
        warn!(%user_id, animal_id = %new.animal_id, "insemination for unknown animal");
        return Err(AppError::not_found("Animal not found"));
    }

    let record = state.store.insert_reproduction(user_id, new).await?;
    info!(%user_id, record_id = %record.id, animal_id = %record.animal_id, "insemination recorded");
    Ok((StatusCode::CREATED, Json(record)))
}

#[instrument(skip(state, payload))]
pub async fn update_reproduction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReproductionPatchRequest>,
) -> AppResult<Json<ReproductionRecord>> {
    let patch = ReproductionPatch::from(payload);
    if patch.predicted_calving_date.is_some() {
        let current = state
            .store
            .list_reproduction(user_id)
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::not_found("Reproduction record not found"))?;
        check_calving_after(current.insemination_date, patch.predicted_calving_date)?;
    }

    let record = state
        .store
        .update_reproduction(user_id, id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("Reproduction record not found"))?;
    info!(%user_id, record_id = %record.id, status = ?record.status, "reproduction updated");
    Ok(Json(record))
}

#[instrument(skip(state))]
pub async fn delete_reproduction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.store.delete_reproduction(user_id, id).await? {
        return Err(AppError::not_found("Reproduction record not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn indicators(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<IndicatorsResponse>> {
    let (animals, records) = tokio::try_join!(
        state.store.list_animals(user_id),
        state.store.list_reproduction(user_id),
    )?;
    let herd = &state.config.herd;
    let now = herd.now();

    Ok(Json(IndicatorsResponse {
        indicators: reproduction_indicators(
            &animals,
            &records,
            now.date(),
            herd.service_window_days,
        ),
        service_window_days: herd.service_window_days,
        upcoming_births: upcoming_births(&animals, now, UPCOMING_BIRTHS_LIMIT),
    }))
}
