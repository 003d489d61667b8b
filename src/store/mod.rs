use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::{
    AlertResolution, Animal, AnimalStatus, ExportFormat, ProductionRecord, ReportKind, ReportLog,
    ReportPeriod, ReproductionRecord, ReproductionStatus,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryHerdStore;
pub use postgres::PgHerdStore;

#[derive(Debug, Clone)]
pub struct NewAnimal {
    pub tag_number: String,
    pub name: String,
    pub birth_date: Date,
    pub breed: String,
    pub status: AnimalStatus,
    pub next_calving_date: Option<Date>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewProductionRecord {
    pub animal_id: Uuid,
    pub date: Date,
    pub quantity: f64,
    pub morning: Option<f64>,
    pub afternoon: Option<f64>,
    pub evening: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewReproductionRecord {
    pub animal_id: Uuid,
    pub insemination_date: Date,
    pub status: ReproductionStatus,
    pub predicted_calving_date: Option<Date>,
    pub notes: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ReproductionPatch {
    pub status: Option<ReproductionStatus>,
    pub predicted_calving_date: Option<Date>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewReportLog {
    pub kind: ReportKind,
    pub period: ReportPeriod,
    pub format: ExportFormat,
    pub title: String,
    pub start_date: Date,
    pub end_date: Date,
}

/// Per-user record store. Every call is scoped by `user_id`; rows owned by
/// other users are invisible.
#[async_trait]
pub trait HerdStore: Send + Sync {
    /// Ordered by tag number.
    async fn list_animals(&self, user_id: Uuid) -> anyhow::Result<Vec<Animal>>;
    async fn get_animal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Animal>>;
    async fn find_animal_by_tag(&self, user_id: Uuid, tag: &str) -> anyhow::Result<Option<Animal>>;
    async fn insert_animal(&self, user_id: Uuid, animal: NewAnimal) -> anyhow::Result<Animal>;
    async fn update_animal(
        &self,
        user_id: Uuid,
        id: Uuid,
        animal: NewAnimal,
    ) -> anyhow::Result<Option<Animal>>;
    /// Also removes the animal's production and reproduction records.
    async fn delete_animal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;

    /// Newest first.
    async fn list_production(&self, user_id: Uuid) -> anyhow::Result<Vec<ProductionRecord>>;
    async fn insert_production(
        &self,
        user_id: Uuid,
        record: NewProductionRecord,
    ) -> anyhow::Result<ProductionRecord>;
    async fn delete_production(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;

    /// Newest insemination first.
    async fn list_reproduction(&self, user_id: Uuid) -> anyhow::Result<Vec<ReproductionRecord>>;
    async fn insert_reproduction(
        &self,
        user_id: Uuid,
        record: NewReproductionRecord,
    ) -> anyhow::Result<ReproductionRecord>;
    async fn update_reproduction(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: ReproductionPatch,
    ) -> anyhow::Result<Option<ReproductionRecord>>;
    async fn delete_reproduction(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;

    async fn list_resolutions(&self, user_id: Uuid) -> anyhow::Result<Vec<AlertResolution>>;
    /// Insert-or-update in one step, keyed by `(user_id, alert_id)`.
    async fn upsert_resolution(
        &self,
        user_id: Uuid,
        alert_id: &str,
        resolved_at: OffsetDateTime,
    ) -> anyhow::Result<AlertResolution>;

    async fn insert_report(&self, user_id: Uuid, report: NewReportLog) -> anyhow::Result<ReportLog>;
    /// Newest first.
    async fn list_reports(&self, user_id: Uuid) -> anyhow::Result<Vec<ReportLog>>;
}
