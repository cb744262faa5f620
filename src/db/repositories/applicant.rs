use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, LoaderTrait, ModelTrait, QueryOrder, Set,
    TransactionTrait,
};
use tracing::info;

use crate::entities::scores::STATUS_NOT_PASSED;
use crate::entities::{applicants, prelude::*, scores};
use crate::models::applicant::NewApplicant;

pub type ApplicantWithScores = (applicants::Model, Vec<scores::Model>);

/// Partial update of an applicant record. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ApplicantChanges {
    pub user_id: Option<i32>,
    pub email: Option<String>,
    pub nama_lengkap: Option<String>,
    pub nisn: Option<String>,
    pub jenis_kelamin: Option<String>,
    pub tempat_lahir: Option<String>,
    pub tanggal_lahir: Option<Option<NaiveDate>>,
    pub asal_sekolah: Option<String>,
    pub nama_ayah: Option<String>,
    pub no_wa_ayah: Option<String>,
    pub nama_ibu: Option<String>,
    pub no_wa_ibu: Option<String>,
    pub pas_foto: Option<String>,
}

pub struct ApplicantRepository {
    conn: DatabaseConnection,
}

impl ApplicantRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_with_scores(&self) -> Result<Vec<ApplicantWithScores>> {
        let applicants = Applicants::find()
            .order_by_asc(applicants::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list applicants")?;
        let scores = applicants.load_many(Scores, &self.conn).await?;

        Ok(applicants.into_iter().zip(scores).collect())
    }

    pub async fn get_with_scores(&self, id: i32) -> Result<Option<ApplicantWithScores>> {
        let Some(applicant) = Applicants::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query applicant by ID")?
        else {
            return Ok(None);
        };

        let scores = applicant
            .find_related(Scores)
            .order_by_asc(scores::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(Some((applicant, scores)))
    }

    /// Inserts the applicant and its initial score in one transaction.
    /// The score starts at zero with status [`STATUS_NOT_PASSED`].
    pub async fn create_with_score(&self, input: NewApplicant) -> Result<ApplicantWithScores> {
        let now = chrono::Utc::now().to_rfc3339();
        let fields = input.fields;

        let txn = self.conn.begin().await?;

        let applicant = applicants::ActiveModel {
            user_id: Set(input.user_id),
            email: Set(fields.email),
            nama_lengkap: Set(fields.nama_lengkap),
            nisn: Set(fields.nisn),
            jenis_kelamin: Set(fields.jenis_kelamin),
            tempat_lahir: Set(fields.tempat_lahir),
            tanggal_lahir: Set(input.tanggal_lahir),
            asal_sekolah: Set(fields.asal_sekolah),
            nama_ayah: Set(fields.nama_ayah),
            no_wa_ayah: Set(fields.no_wa_ayah),
            nama_ibu: Set(fields.nama_ibu),
            no_wa_ibu: Set(fields.no_wa_ibu),
            pas_foto: Set(input.pas_foto),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let score = scores::ActiveModel {
            datapokok_id: Set(applicant.id),
            bahasa_indonesia: Set(0.0),
            ilmu_pengetahuan_alam: Set(0.0),
            matematika: Set(0.0),
            test_membaca_al_quran: Set(0.0),
            status: Set(STATUS_NOT_PASSED.to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            "Created datapokok {} with nilai {} for user {}",
            applicant.id, score.id, applicant.user_id
        );
        Ok((applicant, vec![score]))
    }

    /// Returns `None` when the applicant does not exist.
    pub async fn update(
        &self,
        id: i32,
        changes: ApplicantChanges,
    ) -> Result<Option<ApplicantWithScores>> {
        let Some(applicant) = Applicants::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query applicant for update")?
        else {
            return Ok(None);
        };

        let mut active: applicants::ActiveModel = applicant.into();

        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = changes.$field {
                        active.$field = Set(value);
                    }
                )*
            };
        }

        apply!(
            user_id,
            email,
            nama_lengkap,
            nisn,
            jenis_kelamin,
            tempat_lahir,
            tanggal_lahir,
            asal_sekolah,
            nama_ayah,
            no_wa_ayah,
            nama_ibu,
            no_wa_ibu,
            pas_foto,
        );

        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let updated = active.update(&self.conn).await?;

        let scores = updated
            .find_related(Scores)
            .order_by_asc(scores::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(Some((updated, scores)))
    }

    /// Deletes the applicant (scores cascade) and returns the removed row.
    pub async fn delete(&self, id: i32) -> Result<Option<applicants::Model>> {
        let txn = self.conn.begin().await?;

        let Some(applicant) = Applicants::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        Applicants::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!("Deleted datapokok {}", id);
        Ok(Some(applicant))
    }
}
