use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    analytics::metrics::{
        BreedCount, DailyProduction, HerdCounts, ProductionSummary, ReproductionIndicators,
    },
    date_utils::iso_date,
    domain::{ExportFormat, ReportKind, ReportLog, ReportPeriod},
};

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(rename = "tipo")]
    pub kind: ReportKind,
    #[serde(rename = "periodo")]
    pub period: ReportPeriod,
    #[serde(rename = "formato", default)]
    pub format: ExportFormat,
    #[serde(rename = "dataInicio", default, with = "iso_date::option")]
    pub start_date: Option<Date>,
    #[serde(rename = "dataFim", default, with = "iso_date::option")]
    pub end_date: Option<Date>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReportContent {
    Production {
        #[serde(rename = "serie")]
        series: Vec<DailyProduction>,
        #[serde(rename = "resumo")]
        summary: ProductionSummary,
    },
    Reproduction {
        #[serde(rename = "indicadores")]
        indicators: ReproductionIndicators,
    },
    Animals {
        #[serde(rename = "rebanho")]
        herd: HerdCounts,
        #[serde(rename = "racas")]
        breeds: Vec<BreedCount>,
    },
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    #[serde(rename = "relatorio")]
    pub log: ReportLog,
    #[serde(rename = "conteudo")]
    pub content: ReportContent,
}
