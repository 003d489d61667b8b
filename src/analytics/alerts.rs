use std::collections::HashMap;

use time::OffsetDateTime;

use super::metrics::production_trend;
use crate::{
    date_utils::days_until,
    domain::{Alert, AlertKind, AlertResolution, Animal, Priority, ProductionRecord},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// Birth alerts start this many days ahead of the expected date.
    pub birth_window_days: i64,
    /// Birth alerts at or under this many days are high priority.
    pub birth_urgent_days: i64,
    /// Percentage drop (positive number) that raises a production alert.
    pub production_drop_pct: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            birth_window_days: 7,
            birth_urgent_days: 3,
            production_drop_pct: 15.0,
        }
    }
}

/// Build the current alert list from herd state.
///
/// Birth alerts come first, then production alerts, each in herd order.
/// Resolution flags are looked up by composite id; inputs are never
/// modified, so repeated calls with the same inputs return the same list.
pub fn synthesize(
    animals: &[Animal],
    production: &[ProductionRecord],
    resolutions: &[AlertResolution],
    now: OffsetDateTime,
    thresholds: &AlertThresholds,
) -> Vec<Alert> {
    let resolved: HashMap<&str, bool> = resolutions
        .iter()
        .map(|r| (r.alert_id.as_str(), r.resolved))
        .collect();
    let is_resolved = |id: &str| resolved.get(id).copied().unwrap_or(false);

    let births = animals.iter().filter_map(|animal| {
        let date = animal.next_calving_date?;
        let days = days_until(date, now);
        if days > thresholds.birth_window_days {
            return None;
        }
        let id = AlertKind::Birth.alert_id(animal.id);
        Some(Alert {
            resolved: is_resolved(&id),
            id,
            kind: AlertKind::Birth,
            animal_id: animal.id,
            animal: animal.label(),
            description: birth_description(days),
            date,
            priority: if days <= thresholds.birth_urgent_days {
                Priority::High
            } else {
                Priority::Medium
            },
        })
    });

    let drops = animals.iter().filter_map(|animal| {
        let trend = production_trend(production, animal.id)?;
        if trend.variation_pct >= -thresholds.production_drop_pct {
            return None;
        }
        let id = AlertKind::Production.alert_id(animal.id);
        Some(Alert {
            resolved: is_resolved(&id),
            id,
            kind: AlertKind::Production,
            animal_id: animal.id,
            animal: animal.label(),
            description: format!(
                "Queda de {:.0}% na produção nos últimos 3 registros",
                -trend.variation_pct
            ),
            date: trend.latest_date,
            priority: Priority::High,
        })
    });

    births.chain(drops).collect()
}

fn birth_description(days: i64) -> String {
    match days {
        0 => "Parto previsto para hoje".to_string(),
        1 => "Parto previsto para amanhã".to_string(),
        d if d < 0 => format!("Parto atrasado há {} dias", -d),
        d => format!("Parto previsto em {} dias", d),
    }
}
