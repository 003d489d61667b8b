use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::AnimalRequest;
use crate::{
    analytics::filters::AnimalFilter,
    auth::AuthUser,
    domain::Animal,
    error::{AppError, AppResult},
    state::AppState,
    store::NewAnimal,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/animals", get(list_animals).post(create_animal))
        .route(
            "/animals/:id",
            get(get_animal).put(update_animal).delete(delete_animal),
        )
}

#[instrument(skip(state))]
pub async fn list_animals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<AnimalFilter>,
) -> AppResult<Json<Vec<Animal>>> {
    let animals = state.store.list_animals(user_id).await?;
    Ok(Json(
        animals.into_iter().filter(|a| filter.matches(a)).collect(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn create_animal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AnimalRequest>,
) -> AppResult<impl IntoResponse> {
    let new = NewAnimal::try_from(payload)?;
    ensure_tag_free(&state, user_id, &new.tag_number, None).await?;

    let animal = state.store.insert_animal(user_id, new).await?;
    info!(%user_id, animal_id = %animal.id, tag = %animal.tag_number, "animal registered");
    let location = format!("/api/v1/animals/{}", animal.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(animal)))
}

#[instrument(skip(state))]
pub async fn get_animal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Animal>> {
    state
        .store
        .get_animal(user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Animal not found"))
}

#[instrument(skip(state, payload))]
pub async fn update_animal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnimalRequest>,
) -> AppResult<Json<Animal>> {
    let new = NewAnimal::try_from(payload)?;
    ensure_tag_free(&state, user_id, &new.tag_number, Some(id)).await?;

    let animal = state
        .store
        .update_animal(user_id, id, new)
        .await?
        .ok_or_else(|| AppError::not_found("Animal not found"))?;
    info!(%user_id, animal_id = %animal.id, "animal updated");
    Ok(Json(animal))
}

#[instrument(skip(state))]
pub async fn delete_animal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.store.delete_animal(user_id, id).await? {
        return Err(AppError::not_found("Animal not found"));
    }
    info!(%user_id, animal_id = %id, "animal deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_tag_free(
    state: &AppState,
    user_id: Uuid,
    tag: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    match state.store.find_animal_by_tag(user_id, tag).await? {
        Some(existing) if Some(existing.id) != except => {
            warn!(%user_id, tag, "tag number already registered");
            Err(AppError::Conflict(format!("Tag number {tag} already registered")))
        }
        _ => Ok(()),
    }
}
