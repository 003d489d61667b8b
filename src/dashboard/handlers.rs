use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use time::Duration;
use tracing::instrument;

use crate::{
    alerts::handlers::current_alerts,
    analytics::metrics::{
        daily_production, herd_counts, production_on, upcoming_births, DailyProduction,
        HerdCounts, UpcomingBirth,
    },
    auth::AuthUser,
    domain::{Alert, Priority},
    error::AppResult,
    state::AppState,
};

const CHART_DAYS: i64 = 7;
const HOME_LIST_LIMIT: usize = 3;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(rename = "rebanho")]
    pub herd: HerdCounts,
    #[serde(rename = "producaoHoje")]
    pub production_today: f64,
    #[serde(rename = "producaoSemana")]
    pub last_days: Vec<DailyProduction>,
    #[serde(rename = "proximosPartos")]
    pub upcoming_births: Vec<UpcomingBirth>,
    #[serde(rename = "alertas")]
    pub alerts: Vec<Alert>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

fn priority_rank(p: Priority) -> u8 {
    match p {
        Priority::High => 0,
        Priority::Medium => 1,
        Priority::Low => 2,
    }
}

/// Pending alerts, most urgent first, then by date.
fn top_pending(mut alerts: Vec<Alert>, limit: usize) -> Vec<Alert> {
    alerts.retain(|a| !a.resolved);
    alerts.sort_by(|a, b| {
        priority_rank(a.priority)
            .cmp(&priority_rank(b.priority))
            .then(a.date.cmp(&b.date))
    });
    alerts.truncate(limit);
    alerts
}

#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<DashboardResponse>> {
    let (animals, production) = tokio::try_join!(
        state.store.list_animals(user_id),
        state.store.list_production(user_id),
    )?;
    let alerts = current_alerts(&state, user_id).await?;

    let now = state.config.herd.now();
    let today = now.date();
    let week_start = today.saturating_sub(Duration::days(CHART_DAYS - 1));

    Ok(Json(DashboardResponse {
        herd: herd_counts(&animals),
        production_today: production_on(&production, today),
        last_days: daily_production(&production, week_start, today),
        upcoming_births: upcoming_births(&animals, now, HOME_LIST_LIMIT),
        alerts: top_pending(alerts, HOME_LIST_LIMIT),
    }))
}
