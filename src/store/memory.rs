use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    HerdStore, NewAnimal, NewProductionRecord, NewReportLog, NewReproductionRecord,
    ReproductionPatch,
};
use crate::domain::{AlertResolution, Animal, ProductionRecord, ReportLog, ReproductionRecord};

#[derive(Default)]
struct Tables {
    animals: Vec<Animal>,
    production: Vec<ProductionRecord>,
    reproduction: Vec<ReproductionRecord>,
    resolutions: HashMap<(Uuid, String), AlertResolution>,
    reports: Vec<ReportLog>,
}

/// In-process store with the same constraints as the SQL schema: unique tag
/// per user, records must reference an existing animal of the same user,
/// deleting an animal removes its records.
#[derive(Default)]
pub struct MemoryHerdStore {
    tables: RwLock<Tables>,
}

impl MemoryHerdStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored resolution rows across all users.
    #[cfg(test)]
    pub async fn resolution_rows(&self) -> usize {
        self.tables.read().await.resolutions.len()
    }
}

impl Tables {
    fn owns_animal(&self, user_id: Uuid, animal_id: Uuid) -> bool {
        self.animals
            .iter()
            .any(|a| a.id == animal_id && a.user_id == user_id)
    }

    fn tag_taken(&self, user_id: Uuid, tag: &str, except: Option<Uuid>) -> bool {
        self.animals
            .iter()
            .any(|a| a.user_id == user_id && a.tag_number == tag && Some(a.id) != except)
    }
}

#[async_trait]
impl HerdStore for MemoryHerdStore {
    async fn list_animals(&self, user_id: Uuid) -> anyhow::Result<Vec<Animal>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Animal> = t
            .animals
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.tag_number.cmp(&b.tag_number));
        Ok(rows)
    }

    async fn get_animal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Animal>> {
        let t = self.tables.read().await;
        Ok(t.animals
            .iter()
            .find(|a| a.id == id && a.user_id == user_id)
            .cloned())
    }

    async fn find_animal_by_tag(&self, user_id: Uuid, tag: &str) -> anyhow::Result<Option<Animal>> {
        let t = self.tables.read().await;
        Ok(t.animals
            .iter()
            .find(|a| a.user_id == user_id && a.tag_number == tag)
            .cloned())
    }

    async fn insert_animal(&self, user_id: Uuid, animal: NewAnimal) -> anyhow::Result<Animal> {
        let mut t = self.tables.write().await;
        if t.tag_taken(user_id, &animal.tag_number, None) {
            anyhow::bail!("duplicate tag number {}", animal.tag_number);
        }
        let row = Animal {
            id: Uuid::new_v4(),
            user_id,
            tag_number: animal.tag_number,
            name: animal.name,
            birth_date: animal.birth_date,
            breed: animal.breed,
            status: animal.status,
            next_calving_date: animal.next_calving_date,
            notes: animal.notes,
            created_at: OffsetDateTime::now_utc(),
        };
        t.animals.push(row.clone());
        Ok(row)
    }

    async fn update_animal(
        &self,
        user_id: Uuid,
        id: Uuid,
        animal: NewAnimal,
    ) -> anyhow::Result<Option<Animal>> {
        let mut t = self.tables.write().await;
        if t.tag_taken(user_id, &animal.tag_number, Some(id)) {
            anyhow::bail!("duplicate tag number {}", animal.tag_number);
        }
        let Some(row) = t
            .animals
            .iter_mut()
            .find(|a| a.id == id && a.user_id == user_id)
        else {
            return Ok(None);
        };
        row.tag_number = animal.tag_number;
        row.name = animal.name;
        row.birth_date = animal.birth_date;
        row.breed = animal.breed;
        row.status = animal.status;
        row.next_calving_date = animal.next_calving_date;
        row.notes = animal.notes;
        Ok(Some(row.clone()))
    }

    async fn delete_animal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.animals.len();
        t.animals.retain(|a| !(a.id == id && a.user_id == user_id));
        if t.animals.len() == before {
            return Ok(false);
        }
        t.production.retain(|r| r.animal_id != id);
        t.reproduction.retain(|r| r.animal_id != id);
        Ok(true)
    }

    async fn list_production(&self, user_id: Uuid) -> anyhow::Result<Vec<ProductionRecord>> {
        let t = self.tables.read().await;
        let mut rows: Vec<ProductionRecord> = t
            .production
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(rows)
    }

    async fn insert_production(
        &self,
        user_id: Uuid,
        record: NewProductionRecord,
    ) -> anyhow::Result<ProductionRecord> {
        let mut t = self.tables.write().await;
        if !t.owns_animal(user_id, record.animal_id) {
            anyhow::bail!("animal {} does not exist", record.animal_id);
        }
        let row = ProductionRecord {
            id: Uuid::new_v4(),
            user_id,
            animal_id: record.animal_id,
            date: record.date,
            quantity: record.quantity,
            morning: record.morning,
            afternoon: record.afternoon,
            evening: record.evening,
            created_at: OffsetDateTime::now_utc(),
        };
        t.production.push(row.clone());
        Ok(row)
    }

    async fn delete_production(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.production.len();
        t.production.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(t.production.len() < before)
    }

    async fn list_reproduction(&self, user_id: Uuid) -> anyhow::Result<Vec<ReproductionRecord>> {
        let t = self.tables.read().await;
        let mut rows: Vec<ReproductionRecord> = t
            .reproduction
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.insemination_date
                .cmp(&a.insemination_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(rows)
    }

    async fn insert_reproduction(
        &self,
        user_id: Uuid,
        record: NewReproductionRecord,
    ) -> anyhow::Result<ReproductionRecord> {
        let mut t = self.tables.write().await;
        if !t.owns_animal(user_id, record.animal_id) {
            anyhow::bail!("animal {} does not exist", record.animal_id);
        }
        let row = ReproductionRecord {
            id: Uuid::new_v4(),
            user_id,
            animal_id: record.animal_id,
            insemination_date: record.insemination_date,
            status: record.status,
            predicted_calving_date: record.predicted_calving_date,
            notes: record.notes,
            created_at: OffsetDateTime::now_utc(),
        };
        t.reproduction.push(row.clone());
        Ok(row)
    }

    async fn update_reproduction(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: ReproductionPatch,
    ) -> anyhow::Result<Option<ReproductionRecord>> {
        let mut t = self.tables.write().await;
        let Some(row) = t
            .reproduction
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
        else {
            return Ok(None);
        };
        if let Some(status) = patch.status {
            row.status = status;
        }
        if let Some(date) = patch.predicted_calving_date {
            row.predicted_calving_date = Some(date);
        }
        if let Some(notes) = patch.notes {
            row.notes = Some(notes);
        }
        Ok(Some(row.clone()))
    }

    async fn delete_reproduction(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.reproduction.len();
        t.reproduction.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(t.reproduction.len() < before)
    }

    async fn list_resolutions(&self, user_id: Uuid) -> anyhow::Result<Vec<AlertResolution>> {
        let t = self.tables.read().await;
        Ok(t.resolutions
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert_resolution(
        &self,
        user_id: Uuid,
        alert_id: &str,
        resolved_at: OffsetDateTime,
    ) -> anyhow::Result<AlertResolution> {
        let mut t = self.tables.write().await;
        let row = t
            .resolutions
            .entry((user_id, alert_id.to_string()))
            .and_modify(|r| {
                r.resolved = true;
                r.resolved_at = resolved_at;
            })
            .or_insert_with(|| AlertResolution {
                user_id,
                alert_id: alert_id.to_string(),
                resolved: true,
                resolved_at,
            });
        Ok(row.clone())
    }

    async fn insert_report(&self, user_id: Uuid, report: NewReportLog) -> anyhow::Result<ReportLog> {
        let mut t = self.tables.write().await;
        let row = ReportLog {
            id: Uuid::new_v4(),
            user_id,
            kind: report.kind,
            period: report.period,
            format: report.format,
            title: report.title,
            start_date: report.start_date,
            end_date: report.end_date,
            created_at: OffsetDateTime::now_utc(),
        };
        t.reports.push(row.clone());
        Ok(row)
    }

    async fn list_reports(&self, user_id: Uuid) -> anyhow::Result<Vec<ReportLog>> {
        let t = self.tables.read().await;
        let mut rows: Vec<ReportLog> = t
            .reports
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}
