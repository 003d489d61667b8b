use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::{
    analytics::metrics::{BreedProduction, DailyProduction, MonthlyProduction, ProductionSummary},
    date_utils::iso_date,
    error::AppError,
    store::NewProductionRecord,
};

#[derive(Debug, Default, Deserialize)]
pub struct ProductionQuery {
    #[serde(default)]
    pub animal_id: Option<Uuid>,
    #[serde(default, with = "iso_date::option")]
    pub from: Option<Date>,
    #[serde(default, with = "iso_date::option")]
    pub to: Option<Date>,
}

/// Body of `POST /production`. When `quantidade` is omitted the total is the
/// sum of the shift values.
#[derive(Debug, Deserialize)]
pub struct ProductionRequest {
    pub animal_id: Uuid,
    #[serde(rename = "data", with = "iso_date")]
    pub date: Date,
    #[serde(rename = "quantidade", default)]
    pub quantity: Option<f64>,
    #[serde(rename = "manha", default)]
    pub morning: Option<f64>,
    #[serde(rename = "tarde", default)]
    pub afternoon: Option<f64>,
    #[serde(rename = "noite", default)]
    pub evening: Option<f64>,
}

fn liters(value: Option<f64>, field: &str) -> Result<Option<f64>, AppError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(AppError::bad_request(format!(
            "{field} must be a non-negative number"
        ))),
        other => Ok(other),
    }
}

impl TryFrom<ProductionRequest> for NewProductionRecord {
    type Error = AppError;

    fn try_from(req: ProductionRequest) -> Result<Self, Self::Error> {
        let morning = liters(req.morning, "manha")?;
        let afternoon = liters(req.afternoon, "tarde")?;
        let evening = liters(req.evening, "noite")?;
        let shifts = [morning, afternoon, evening];

        let quantity = match liters(req.quantity, "quantidade")? {
            Some(q) => q,
            None if shifts.iter().any(Option::is_some) => shifts.iter().flatten().sum(),
            None => return Err(AppError::bad_request("quantidade is required")),
        };

        Ok(NewProductionRecord {
            animal_id: req.animal_id,
            date: req.date,
            quantity,
            morning,
            afternoon,
            evening,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum SummaryPeriod {
    #[default]
    #[serde(rename = "diario")]
    Daily,
    #[serde(rename = "mensal")]
    Monthly,
}

pub const DEFAULT_DAILY_DAYS: i64 = 7;
pub const DEFAULT_MONTHLY_DAYS: i64 = 180;
pub const MAX_SUMMARY_DAYS: i64 = 366;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub period: SummaryPeriod,
    #[serde(default)]
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Series {
    Daily(Vec<DailyProduction>),
    Monthly(Vec<MonthlyProduction>),
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    #[serde(rename = "periodo")]
    pub period: SummaryPeriod,
    #[serde(rename = "dataInicio", with = "iso_date")]
    pub from: Date,
    #[serde(rename = "dataFim", with = "iso_date")]
    pub to: Date,
    #[serde(rename = "serie")]
    pub series: Series,
    #[serde(rename = "resumo")]
    pub summary: ProductionSummary,
    #[serde(rename = "porRaca")]
    pub by_breed: Vec<BreedProduction>,
}
