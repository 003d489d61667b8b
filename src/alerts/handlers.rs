use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    analytics::{alerts::synthesize, filters::AlertFilter},
    auth::AuthUser,
    domain::{parse_alert_id, Alert, AlertResolution},
    error::{AppError, AppResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(list_alerts))
        .route("/alerts/:id/resolve", post(resolve_alert))
}

/// Synthesize the user's current alerts from stored rows.
pub(crate) async fn current_alerts(state: &AppState, user_id: Uuid) -> AppResult<Vec<Alert>> {
    let (animals, production, resolutions) = tokio::try_join!(
        state.store.list_animals(user_id),
        state.store.list_production(user_id),
        state.store.list_resolutions(user_id),
    )?;
    let herd = &state.config.herd;
    Ok(synthesize(
        &animals,
        &production,
        &resolutions,
        herd.now(),
        &herd.thresholds(),
    ))
}

#[instrument(skip(state))]
pub async fn list_alerts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<AlertFilter>,
) -> AppResult<Json<Vec<Alert>>> {
    let alerts = current_alerts(&state, user_id).await?;
    Ok(Json(
        alerts.into_iter().filter(|a| filter.matches(a)).collect(),
    ))
}

/// Mark an alert resolved. Idempotent: resolving again only moves the
/// resolution timestamp.
#[instrument(skip(state))]
pub async fn resolve_alert(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<AlertResolution>> {
    let Some((kind, animal_id)) = parse_alert_id(&id) else {
        warn!(%user_id, alert_id = %id, "malformed alert id");
        return Err(AppError::bad_request("Invalid alert id"));
    };
    if state.store.get_animal(user_id, animal_id).await?.is_none() {
        return Err(AppError::not_found("Animal not found"));
    }

    let resolution = state
        .store
        .upsert_resolution(user_id, &id, OffsetDateTime::now_utc())
        .await?;
    info!(%user_id, alert_id = %id, kind = kind.as_str(), "alert resolved");
    Ok(Json(resolution))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use time::Duration;

    use crate::test_support::TestApp;

    async fn cow_calving_in(app: &TestApp, tag: &str, days: i64) -> String {
        let date = app.state.config.herd.now().date() + Duration::days(days);
        app.create_animal(json!({
            "numero": tag,
            "nome": format!("Vaca {tag}"),
            "dataNascimento": "2020-05-10",
            "raca": "Holandesa",
            "status": "prenhe",
            "dataProximoParto": date.to_string()
        }))
        .await
    }

    #[tokio::test]
    async fn birth_alerts_carry_priority() {
        let app = TestApp::new();
        let soon = cow_calving_in(&app, "1001", 2).await;
        let later = cow_calving_in(&app, "1002", 5).await;
        cow_calving_in(&app, "1003", 30).await;

        let (status, body) = app.get("/api/v1/alerts").await;
        assert_eq!(status, StatusCode::OK);
        let alerts = body.as_array().unwrap();
        assert_eq!(alerts.len(), 2);

        let find = |animal: &str| {
            alerts
                .iter()
                .find(|a| a["animal_id"] == animal)
                .cloned()
                .unwrap()
        };
        let a = find(&soon);
        assert_eq!(a["id"], format!("parto-{soon}"));
        assert_eq!(a["tipo"], "parto");
        assert_eq!(a["prioridade"], "alta");
        assert_eq!(a["resolvido"], false);
        assert_eq!(find(&later)["prioridade"], "media");
    }

    #[tokio::test]
    async fn production_drop_raises_high_alert() {
        let app = TestApp::new();
        let id = app
            .create_animal(json!({
                "numero": "1001",
                "nome": "Mimosa",
                "dataNascimento": "2020-05-10",
                "raca": "Holandesa",
                "status": "lactante"
            }))
            .await;
        // newest first: 10, 10, 10, 20
        for (day, liters) in [("2025-05-01", 20), ("2025-05-02", 10), ("2025-05-03", 10), ("2025-05-04", 10)] {
            app.post(
                "/api/v1/production",
                json!({"animal_id": id, "data": day, "quantidade": liters}),
            )
            .await;
        }

        let (_, body) = app.get("/api/v1/alerts?tipo=producao").await;
        let alerts = body.as_array().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["id"], format!("producao-{id}"));
        assert_eq!(alerts[0]["prioridade"], "alta");
        assert_eq!(alerts[0]["data"], "2025-05-04");
    }

    #[tokio::test]
    async fn resolving_twice_keeps_one_resolution() {
        let app = TestApp::new();
        let id = cow_calving_in(&app, "1001", 2).await;
        let uri = format!("/api/v1/alerts/parto-{id}/resolve");

        let (status, first) = app.post(&uri, json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["resolvido"], true);
        let (status, _) = app.post(&uri, json!({})).await;
        assert_eq!(status, StatusCode::OK);

        let rows = app.state.store.list_resolutions(app.user_id).await.unwrap();
        assert_eq!(rows.len(), 1);

        let (_, pending) = app.get("/api/v1/alerts").await;
        assert!(pending.as_array().unwrap().is_empty());
        let (_, resolved) = app.get("/api/v1/alerts?status=resolvidos").await;
        assert_eq!(resolved.as_array().unwrap().len(), 1);
        assert_eq!(resolved[0]["resolvido"], true);
        let (_, all) = app.get("/api/v1/alerts?status=todos&tipo=todos").await;
        assert_eq!(all.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn resolve_rejects_malformed_or_foreign_ids() {
        let app = TestApp::new();
        let (status, _) = app.post("/api/v1/alerts/parto-123/resolve", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let id = cow_calving_in(&app, "1001", 2).await;
        let intruder = app.other_user();
        let (status, _) = intruder
            .post(&format!("/api/v1/alerts/parto-{id}/resolve"), json!({}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
