use serde::Deserialize;
use time::OffsetDateTime;

use crate::{analytics::alerts::AlertThresholds, date_utils::local_now};

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Herd-level tunables for the derived metrics and alerts.
#[derive(Debug, Clone, Deserialize)]
pub struct HerdConfig {
    /// Offset of the farm's local time; decides what "today" is.
    pub utc_offset_hours: i8,
    pub birth_window_days: i64,
    pub birth_urgent_days: i64,
    pub production_drop_pct: f64,
    /// Inseminations older than this do not count towards the service rate.
    pub service_window_days: i64,
}

impl Default for HerdConfig {
    fn default() -> Self {
        let thresholds = AlertThresholds::default();
        Self {
            utc_offset_hours: 0,
            birth_window_days: thresholds.birth_window_days,
            birth_urgent_days: thresholds.birth_urgent_days,
            production_drop_pct: thresholds.production_drop_pct,
            service_window_days: 21,
        }
    }
}

impl HerdConfig {
    pub fn thresholds(&self) -> AlertThresholds {
        AlertThresholds {
            birth_window_days: self.birth_window_days,
            birth_urgent_days: self.birth_urgent_days,
            production_drop_pct: self.production_drop_pct,
        }
    }

    pub fn now(&self) -> OffsetDateTime {
        local_now(self.utc_offset_hours)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub herd: HerdConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "herdbook".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "herdbook-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let defaults = HerdConfig::default();
        let herd = HerdConfig {
            utc_offset_hours: env_or("HERD_UTC_OFFSET_HOURS", defaults.utc_offset_hours),
            birth_window_days: env_or("ALERT_BIRTH_WINDOW_DAYS", defaults.birth_window_days),
            birth_urgent_days: env_or("ALERT_BIRTH_URGENT_DAYS", defaults.birth_urgent_days),
            production_drop_pct: env_or("ALERT_PRODUCTION_DROP_PCT", defaults.production_drop_pct),
            service_window_days: env_or("REPRO_SERVICE_WINDOW_DAYS", defaults.service_window_days),
        };
        Ok(Self {
            database_url,
            jwt,
            herd,
        })
    }
}
