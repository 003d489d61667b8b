use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::date_utils::iso_date;

/// Lifecycle status of an animal. Exactly one applies at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "animal_status")]
pub enum AnimalStatus {
    #[serde(rename = "lactante")]
    #[sqlx(rename = "lactante")]
    Lactating,
    #[serde(rename = "seca")]
    #[sqlx(rename = "seca")]
    Dry,
    #[serde(rename = "prenhe")]
    #[sqlx(rename = "prenhe")]
    Pregnant,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Animal {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    #[serde(rename = "numero")]
    pub tag_number: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "dataNascimento", with = "iso_date")]
    pub birth_date: Date,
    #[serde(rename = "raca")]
    pub breed: String,
    pub status: AnimalStatus,
    #[serde(rename = "dataProximoParto", default, with = "iso_date::option")]
    pub next_calving_date: Option<Date>,
    #[serde(rename = "observacoes")]
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Animal {
    /// Display label, e.g. `1001 - Mimosa`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.tag_number, self.name)
    }
}

/// One milking entry. `quantity` is the total in liters; the shift
/// breakdown is optional.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductionRecord {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    pub animal_id: Uuid,
    #[serde(rename = "data", with = "iso_date")]
    pub date: Date,
    #[serde(rename = "quantidade")]
    pub quantity: f64,
    #[serde(rename = "manha")]
    pub morning: Option<f64>,
    #[serde(rename = "tarde")]
    pub afternoon: Option<f64>,
    #[serde(rename = "noite")]
    pub evening: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reproduction_status")]
pub enum ReproductionStatus {
    #[serde(rename = "pendente")]
    #[sqlx(rename = "pendente")]
    Pending,
    #[serde(rename = "prenhe")]
    #[sqlx(rename = "prenhe")]
    Pregnant,
    #[serde(rename = "vazia")]
    #[sqlx(rename = "vazia")]
    Open,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReproductionRecord {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    pub animal_id: Uuid,
    #[serde(rename = "dataInseminacao", with = "iso_date")]
    pub insemination_date: Date,
    pub status: ReproductionStatus,
    #[serde(rename = "dataPrevistaParto", default, with = "iso_date::option")]
    pub predicted_calving_date: Option<Date>,
    #[serde(rename = "observacoes")]
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Persisted resolution flag of a synthesized alert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AlertResolution {
    #[serde(skip)]
    pub user_id: Uuid,
    pub alert_id: String,
    #[serde(rename = "resolvido")]
    pub resolved: bool,
    #[serde(rename = "resolvidoEm", with = "time::serde::rfc3339")]
    pub resolved_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    #[serde(rename = "parto")]
    Birth,
    #[serde(rename = "producao")]
    Production,
    #[serde(rename = "inseminacao")]
    Insemination,
    #[serde(rename = "sanitario")]
    Sanitary,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Birth => "parto",
            AlertKind::Production => "producao",
            AlertKind::Insemination => "inseminacao",
            AlertKind::Sanitary => "sanitario",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "parto" => Some(AlertKind::Birth),
            "producao" => Some(AlertKind::Production),
            "inseminacao" => Some(AlertKind::Insemination),
            "sanitario" => Some(AlertKind::Sanitary),
            _ => None,
        }
    }

    /// Composite alert id: one alert of a kind per animal.
    pub fn alert_id(self, animal_id: Uuid) -> String {
        format!("{}-{}", self.as_str(), animal_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "alta")]
    High,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "baixa")]
    Low,
}

/// Alert view object. Synthesized on every read, never stored as such.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "tipo")]
    pub kind: AlertKind,
    pub animal_id: Uuid,
    pub animal: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "data", with = "iso_date")]
    pub date: Date,
    #[serde(rename = "resolvido")]
    pub resolved: bool,
    #[serde(rename = "prioridade")]
    pub priority: Priority,
}

/// Parse a composite alert id (`<kind>-<animal uuid>`).
pub fn parse_alert_id(id: &str) -> Option<(AlertKind, Uuid)> {
    let (kind, animal) = id.split_once('-')?;
    Some((AlertKind::parse(kind)?, Uuid::parse_str(animal).ok()?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_kind")]
pub enum ReportKind {
    #[serde(rename = "producao")]
    #[sqlx(rename = "producao")]
    Production,
    #[serde(rename = "reproducao")]
    #[sqlx(rename = "reproducao")]
    Reproduction,
    #[serde(rename = "animais")]
    #[sqlx(rename = "animais")]
    Animals,
}

impl ReportKind {
    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Production => "Produção",
            ReportKind::Reproduction => "Reprodução",
            ReportKind::Animals => "Animais",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_period")]
pub enum ReportPeriod {
    #[serde(rename = "hoje")]
    #[sqlx(rename = "hoje")]
    Today,
    #[serde(rename = "ultimos7dias")]
    #[sqlx(rename = "ultimos7dias")]
    Last7Days,
    #[serde(rename = "ultimos30dias")]
    #[sqlx(rename = "ultimos30dias")]
    Last30Days,
    #[serde(rename = "personalizado")]
    #[sqlx(rename = "personalizado")]
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "export_format")]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "pdf")]
    #[sqlx(rename = "pdf")]
    Pdf,
    #[serde(rename = "excel")]
    #[sqlx(rename = "excel")]
    Excel,
    #[serde(rename = "csv")]
    #[sqlx(rename = "csv")]
    Csv,
}

/// Entry of the generated-report log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReportLog {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    #[serde(rename = "tipo")]
    pub kind: ReportKind,
    #[serde(rename = "periodo")]
    pub period: ReportPeriod,
    #[serde(rename = "formato")]
    pub format: ExportFormat,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "dataInicio", with = "iso_date")]
    pub start_date: Date,
    #[serde(rename = "dataFim", with = "iso_date")]
    pub end_date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
