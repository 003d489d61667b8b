use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{ReportContent, ReportRequest, ReportResponse},
    services::{report_title, resolve_range},
};
use crate::{
    analytics::metrics::{
        breed_distribution, daily_production, herd_counts, production_summary,
        reproduction_indicators,
    },
    auth::AuthUser,
    domain::{ReportKind, ReportLog},
    error::AppResult,
    state::AppState,
    store::NewReportLog,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/reports", get(list_reports).post(generate_report))
}

async fn build_content(
    state: &AppState,
    user_id: Uuid,
    kind: ReportKind,
    start: time::Date,
    end: time::Date,
) -> AppResult<ReportContent> {
    let content = match kind {
        ReportKind::Production => {
            let records = state.store.list_production(user_id).await?;
            let series = daily_production(&records, start, end);
            ReportContent::Production {
                summary: production_summary(&series),
                series,
            }
        }
        ReportKind::Reproduction => {
            let (animals, records) = tokio::try_join!(
                state.store.list_animals(user_id),
                state.store.list_reproduction(user_id),
            )?;
            ReportContent::Reproduction {
                indicators: reproduction_indicators(
                    &animals,
                    &records,
                    end,
                    state.config.herd.service_window_days,
                ),
            }
        }
        ReportKind::Animals => {
            let animals = state.store.list_animals(user_id).await?;
            ReportContent::Animals {
                herd: herd_counts(&animals),
                breeds: breed_distribution(&animals),
            }
        }
    };
    Ok(content)
}

/// Build a report preview for the requested period and log the request.
#[instrument(skip(state))]
pub async fn generate_report(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<ReportRequest>,
) -> AppResult<(StatusCode, Json<ReportResponse>)> {
    let today = state.config.herd.now().date();
    let (start, end) = resolve_range(req.period, today, req.start_date, req.end_date)?;

    let content = build_content(&state, user_id, req.kind, start, end).await?;
    let log = state
        .store
        .insert_report(
            user_id,
            NewReportLog {
                kind: req.kind,
                period: req.period,
                format: req.format,
                title: report_title(req.kind, start, end),
                start_date: start,
                end_date: end,
            },
        )
        .await?;
    info!(%user_id, report_id = %log.id, title = %log.title, format = ?log.format, "report generated");

    Ok((StatusCode::CREATED, Json(ReportResponse { log, content })))
}

#[instrument(skip(state))]
pub async fn list_reports(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<ReportLog>>> {
    Ok(Json(state.store.list_reports(user_id).await?))
}
