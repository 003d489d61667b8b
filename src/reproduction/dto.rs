use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::{
    analytics::metrics::{ReproductionIndicators, UpcomingBirth},
    date_utils::iso_date,
    domain::ReproductionStatus,
    error::AppError,
    store::{NewReproductionRecord, ReproductionPatch},
};

#[derive(Debug, Deserialize)]
pub struct ReproductionRequest {
    pub animal_id: Uuid,
    #[serde(rename = "dataInseminacao", with = "iso_date")]
    pub insemination_date: Date,
    #[serde(default = "pending")]
    pub status: ReproductionStatus,
    #[serde(rename = "dataPrevistaParto", default, with = "iso_date::option")]
    pub predicted_calving_date: Option<Date>,
    #[serde(rename = "observacoes", default)]
    pub notes: Option<String>,
}

fn pending() -> ReproductionStatus {
    ReproductionStatus::Pending
}

impl TryFrom<ReproductionRequest> for NewReproductionRecord {
    type Error = AppError;

    fn try_from(req: ReproductionRequest) -> Result<Self, Self::Error> {
        check_calving_after(req.insemination_date, req.predicted_calving_date)?;
        Ok(NewReproductionRecord {
            animal_id: req.animal_id,
            insemination_date: req.insemination_date,
            status: req.status,
            predicted_calving_date: req.predicted_calving_date,
            notes: req.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

pub fn check_calving_after(insemination: Date, calving: Option<Date>) -> Result<(), AppError> {
    match calving {
        Some(c) if c <= insemination => Err(AppError::bad_request(
            "dataPrevistaParto must be after dataInseminacao",
        )),
        _ => Ok(()),
    }
}

/// Body of `PATCH /reproduction/:id`; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ReproductionPatchRequest {
    #[serde(default)]
    pub status: Option<ReproductionStatus>,
    #[serde(rename = "dataPrevistaParto", default, with = "iso_date::option")]
    pub predicted_calving_date: Option<Date>,
    #[serde(rename = "observacoes", default)]
    pub notes: Option<String>,
}

impl From<ReproductionPatchRequest> for ReproductionPatch {
    fn from(req: ReproductionPatchRequest) -> Self {
        ReproductionPatch {
            status: req.status,
            predicted_calving_date: req.predicted_calving_date,
            notes: req.notes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndicatorsResponse {
    #[serde(rename = "indicadores")]
    pub indicators: ReproductionIndicators,
    #[serde(rename = "janelaServicoDias")]
    pub service_window_days: i64,
    #[serde(rename = "proximosPartos")]
    pub upcoming_births: Vec<UpcomingBirth>,
}
