use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    ProductionQuery, ProductionRequest, Series, SummaryPeriod, SummaryQuery, SummaryResponse,
    DEFAULT_DAILY_DAYS, DEFAULT_MONTHLY_DAYS, MAX_SUMMARY_DAYS,
};
use crate::{
    analytics::metrics::{
        daily_production, monthly_production, production_by_breed, production_summary,
    },
    auth::AuthUser,
    domain::ProductionRecord,
    error::{AppError, AppResult},
    state::AppState,
    store::NewProductionRecord,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/production", get(list_production).post(create_production))
        .route("/production/summary", get(production_overview))
        .route("/production/:id", delete(delete_production))
}

#[instrument(skip(state))]
pub async fn list_production(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ProductionQuery>,
) -> AppResult<Json<Vec<ProductionRecord>>> {
    let records = state.store.list_production(user_id).await?;
    Ok(Json(
        records
            .into_iter()
            .filter(|r| q.animal_id.map_or(true, |id| r.animal_id == id))
            .filter(|r| q.from.map_or(true, |from| r.date >= from))
            .filter(|r| q.to.map_or(true, |to| r.date <= to))
            .collect(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn create_production(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ProductionRequest>,
) -> AppResult<(StatusCode, Json<ProductionRecord>)> {
    let new = NewProductionRecord::try_from(payload)?;
    if state.store.get_animal(user_id, new.animal_id).await?.is_none() {
        warn!(%user_id, animal_id = %new.animal_id, "production for unknown animal");
        return Err(AppError::not_found("Animal not found"));
    }

    let record = state.store.insert_production(user_id, new).await?;
    info!(%user_id, record_id = %record.id, animal_id = %record.animal_id, liters = record.quantity, "production recorded");
    Ok((StatusCode::CREATED, Json(record)))
}

#[instrument(skip(state))]
pub async fn delete_production(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.store.delete_production(user_id, id).await? {
        return Err(AppError::not_found("Production record not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Daily or monthly series over the last `days` days (today included), the
/// summary of that span, and today's liters per breed.
#[instrument(skip(state))]
pub async fn production_overview(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<SummaryQuery>,
) -> AppResult<Json<SummaryResponse>> {
    let default_days = match q.period {
        SummaryPeriod::Daily => DEFAULT_DAILY_DAYS,
        SummaryPeriod::Monthly => DEFAULT_MONTHLY_DAYS,
    };
    let days = q.days.unwrap_or(default_days);
    if !(1..=MAX_SUMMARY_DAYS).contains(&days) {
        return Err(AppError::bad_request(format!(
            "days must be between 1 and {MAX_SUMMARY_DAYS}"
        )));
    }

    let today = state.config.herd.now().date();
    let from = today.saturating_sub(Duration::days(days - 1));

    let (animals, records) = tokio::try_join!(
        state.store.list_animals(user_id),
        state.store.list_production(user_id),
    )?;
    let in_span: Vec<ProductionRecord> = records
        .iter()
        .filter(|r| r.date >= from && r.date <= today)
        .cloned()
        .collect();

    let daily = daily_production(&in_span, from, today);
    let summary = production_summary(&daily);
    let series = match q.period {
        SummaryPeriod::Daily => Series::Daily(daily),
        SummaryPeriod::Monthly => Series::Monthly(monthly_production(&in_span)),
    };

    Ok(Json(SummaryResponse {
        period: q.period,
        from,
        to: today,
        series,
        summary,
        by_breed: production_by_breed(&animals, &records, today),
    }))
}
