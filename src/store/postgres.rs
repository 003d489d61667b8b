use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    HerdStore, NewAnimal, NewProductionRecord, NewReportLog, NewReproductionRecord,
    ReproductionPatch,
};
use crate::domain::{AlertResolution, Animal, ProductionRecord, ReportLog, ReproductionRecord};

#[derive(Clone)]
pub struct PgHerdStore {
    db: PgPool,
}

impl PgHerdStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HerdStore for PgHerdStore {
    async fn list_animals(&self, user_id: Uuid) -> anyhow::Result<Vec<Animal>> {
        let rows = sqlx::query_as::<_, Animal>(
            r#"
            SELECT id, user_id, tag_number, name, birth_date, breed, status,
                   next_calving_date, notes, created_at
              FROM animals
             WHERE user_id = $1
             ORDER BY tag_number ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list animals")?;
        Ok(rows)
    }

    async fn get_animal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Animal>> {
        let row = sqlx::query_as::<_, Animal>(
            r#"
            SELECT id, user_id, tag_number, name, birth_date, breed, status,
                   next_calving_date, notes, created_at
              FROM animals
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get animal")?;
        Ok(row)
    }

    async fn find_animal_by_tag(&self, user_id: Uuid, tag: &str) -> anyhow::Result<Option<Animal>> {
        let row = sqlx::query_as::<_, Animal>(
            r#"
            SELECT id, user_id, tag_number, name, birth_date, breed, status,
                   next_calving_date, notes, created_at
              FROM animals
             WHERE user_id = $1 AND tag_number = $2
            "#,
        )
        .bind(user_id)
        .bind(tag)
        .fetch_optional(&self.db)
        .await
        .context("find animal by tag")?;
        Ok(row)
    }

    async fn insert_animal(&self, user_id: Uuid, animal: NewAnimal) -> anyhow::Result<Animal> {
        let row = sqlx::query_as::<_, Animal>(
            r#"
            INSERT INTO animals (id, user_id, tag_number, name, birth_date, breed, status,
                                 next_calving_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, tag_number, name, birth_date, breed, status,
                      next_calving_date, notes, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&animal.tag_number)
        .bind(&animal.name)
        .bind(animal.birth_date)
        .bind(&animal.breed)
        .bind(animal.status)
        .bind(animal.next_calving_date)
        .bind(&animal.notes)
        .fetch_one(&self.db)
        .await
        .context("insert animal")?;
        Ok(row)
    }

    async fn update_animal(
        &self,
        user_id: Uuid,
        id: Uuid,
        animal: NewAnimal,
    ) -> anyhow::Result<Option<Animal>> {
        let row = sqlx::query_as::<_, Animal>(
            r#"
            UPDATE animals
               SET tag_number = $3, name = $4, birth_date = $5, breed = $6, status = $7,
                   next_calving_date = $8, notes = $9
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, tag_number, name, birth_date, breed, status,
                      next_calving_date, notes, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&animal.tag_number)
        .bind(&animal.name)
        .bind(animal.birth_date)
        .bind(&animal.breed)
        .bind(animal.status)
        .bind(animal.next_calving_date)
        .bind(&animal.notes)
        .fetch_optional(&self.db)
        .await
        .context("update animal")?;
        Ok(row)
    }

    async fn delete_animal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        // production and reproduction rows go with it (ON DELETE CASCADE)
        let res = sqlx::query("DELETE FROM animals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete animal")?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_production(&self, user_id: Uuid) -> anyhow::Result<Vec<ProductionRecord>> {
        let rows = sqlx::query_as::<_, ProductionRecord>(
            r#"
            SELECT id, user_id, animal_id, date, quantity, morning, afternoon, evening, created_at
              FROM production_records
             WHERE user_id = $1
             ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list production")?;
        Ok(rows)
    }

    async fn insert_production(
        &self,
        user_id: Uuid,
        record: NewProductionRecord,
    ) -> anyhow::Result<ProductionRecord> {
        let row = sqlx::query_as::<_, ProductionRecord>(
            r#"
            INSERT INTO production_records (id, user_id, animal_id, date, quantity,
                                            morning, afternoon, evening)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, animal_id, date, quantity, morning, afternoon, evening, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(record.animal_id)
        .bind(record.date)
        .bind(record.quantity)
        .bind(record.morning)
        .bind(record.afternoon)
        .bind(record.evening)
        .fetch_one(&self.db)
        .await
        .context("insert production")?;
        Ok(row)
    }

    async fn delete_production(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM production_records WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete production")?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_reproduction(&self, user_id: Uuid) -> anyhow::Result<Vec<ReproductionRecord>> {
        let rows = sqlx::query_as::<_, ReproductionRecord>(
            r#"
            SELECT id, user_id, animal_id, insemination_date, status,
                   predicted_calving_date, notes, created_at
              FROM reproduction_records
             WHERE user_id = $1
             ORDER BY insemination_date DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list reproduction")?;
        Ok(rows)
    }

    async fn insert_reproduction(
        &self,
        user_id: Uuid,
        record: NewReproductionRecord,
    ) -> anyhow::Result<ReproductionRecord> {
        let row = sqlx::query_as::<_, ReproductionRecord>(
            r#"
            INSERT INTO reproduction_records (id, user_id, animal_id, insemination_date, status,
                                              predicted_calving_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, animal_id, insemination_date, status,
                      predicted_calving_date, notes, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(record.animal_id)
        .bind(record.insemination_date)
        .bind(record.status)
        .bind(record.predicted_calving_date)
        .bind(&record.notes)
        .fetch_one(&self.db)
        .await
        .context("insert reproduction")?;
        Ok(row)
    }

    async fn update_reproduction(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: ReproductionPatch,
    ) -> anyhow::Result<Option<ReproductionRecord>> {
        let row = sqlx::query_as::<_, ReproductionRecord>(
            r#"
            UPDATE reproduction_records
               SET status = COALESCE($3, status),
                   predicted_calving_date = COALESCE($4, predicted_calving_date),
                   notes = COALESCE($5, notes)
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, animal_id, insemination_date, status,
                      predicted_calving_date, notes, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(patch.status)
        .bind(patch.predicted_calving_date)
        .bind(&patch.notes)
        .fetch_optional(&self.db)
        .await
        .context("update reproduction")?;
        Ok(row)
    }

    async fn delete_reproduction(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM reproduction_records WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete reproduction")?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_resolutions(&self, user_id: Uuid) -> anyhow::Result<Vec<AlertResolution>> {
        let rows = sqlx::query_as::<_, AlertResolution>(
            r#"
            SELECT user_id, alert_id, resolved, resolved_at
              FROM alert_resolutions
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list alert resolutions")?;
        Ok(rows)
    }

    async fn upsert_resolution(
        &self,
        user_id: Uuid,
        alert_id: &str,
        resolved_at: OffsetDateTime,
    ) -> anyhow::Result<AlertResolution> {
        let row = sqlx::query_as::<_, AlertResolution>(
            r#"
            INSERT INTO alert_resolutions (user_id, alert_id, resolved, resolved_at)
            VALUES ($1, $2, TRUE, $3)
            ON CONFLICT (user_id, alert_id)
            DO UPDATE SET resolved = TRUE, resolved_at = EXCLUDED.resolved_at
            RETURNING user_id, alert_id, resolved, resolved_at
            "#,
        )
        .bind(user_id)
        .bind(alert_id)
        .bind(resolved_at)
        .fetch_one(&self.db)
        .await
        .context("upsert alert resolution")?;
        Ok(row)
    }

    async fn insert_report(&self, user_id: Uuid, report: NewReportLog) -> anyhow::Result<ReportLog> {
        let row = sqlx::query_as::<_, ReportLog>(
            r#"
            INSERT INTO reports (id, user_id, kind, period, format, title, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, kind, period, format, title, start_date, end_date, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(report.kind)
        .bind(report.period)
        .bind(report.format)
        .bind(&report.title)
        .bind(report.start_date)
        .bind(report.end_date)
        .fetch_one(&self.db)
        .await
        .context("insert report log")?;
        Ok(row)
    }

    async fn list_reports(&self, user_id: Uuid) -> anyhow::Result<Vec<ReportLog>> {
        let rows = sqlx::query_as::<_, ReportLog>(
            r#"
            SELECT id, user_id, kind, period, format, title, start_date, end_date, created_at
              FROM reports
             WHERE user_id = $1
             ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list reports")?;
        Ok(rows)
    }
}
