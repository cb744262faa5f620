//! Domain service for applicant records (`datapokok`) and their scores (`nilai`).
//!
//! Enrollment validates the submission, uploads the photo, then writes the
//! applicant and its initial score in a single transaction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clients::storage::StorageError;
use crate::db::ApplicantWithScores;
use crate::domain::ApplicantId;
use crate::entities::{applicants, scores};
use crate::models::applicant::EnrollmentRequest;

#[derive(Debug, Error)]
pub enum ApplicantError {
    #[error("{0}")]
    Validation(String),

    #[error("User {0} does not exist")]
    UnknownUser(i32),

    #[error("Applicant {0} not found")]
    NotFound(ApplicantId),

    #[error("Image upload failed: {0}")]
    Upload(#[from] StorageError),

    #[error("Failed to save applicant: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for ApplicantError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ApplicantError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub id: i32,
    pub datapokok_id: i32,
    pub bahasa_indonesia: f64,
    pub ilmu_pengetahuan_alam: f64,
    pub matematika: f64,
    pub test_membaca_al_quran: f64,
    pub status: String,
}

impl From<scores::Model> for ScoreRecord {
    fn from(model: scores::Model) -> Self {
        Self {
            id: model.id,
            datapokok_id: model.datapokok_id,
            bahasa_indonesia: model.bahasa_indonesia,
            ilmu_pengetahuan_alam: model.ilmu_pengetahuan_alam,
            matematika: model.matematika,
            test_membaca_al_quran: model.test_membaca_al_quran,
            status: model.status,
        }
    }
}

/// Applicant with its scores attached, as returned by every read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicantRecord {
    pub id: i32,
    pub user_id: i32,
    pub email: String,
    pub nama_lengkap: String,
    pub nisn: String,
    pub jenis_kelamin: String,
    pub tempat_lahir: String,
    pub tanggal_lahir: Option<chrono::NaiveDate>,
    pub asal_sekolah: String,
    pub nama_ayah: String,
    pub no_wa_ayah: String,
    pub nama_ibu: String,
    pub no_wa_ibu: String,
    pub pas_foto: String,
    pub created_at: String,
    pub updated_at: String,
    pub nilai: Vec<ScoreRecord>,
}

impl From<ApplicantWithScores> for ApplicantRecord {
    fn from((model, scores): ApplicantWithScores) -> Self {
        let applicants::Model {
            id,
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
            created_at,
            updated_at,
        } = model;

        Self {
            id,
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
            created_at,
            updated_at,
            nilai: scores.into_iter().map(ScoreRecord::from).collect(),
        }
    }
}

/// Body of `PUT /datapokok/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicantUpdate {
    pub user_id: Option<i32>,
    pub email: Option<String>,
    pub nama_lengkap: Option<String>,
    pub nisn: Option<String>,
    pub jenis_kelamin: Option<String>,
    pub tempat_lahir: Option<String>,
    /// `YYYY-MM-DD`. An empty string clears the date; anything unparseable
    /// leaves it unchanged.
    pub tanggal_lahir: Option<String>,
    pub asal_sekolah: Option<String>,
    pub nama_ayah: Option<String>,
    pub no_wa_ayah: Option<String>,
    pub nama_ibu: Option<String>,
    pub no_wa_ibu: Option<String>,
}

#[async_trait::async_trait]
pub trait ApplicantService: Send + Sync {
    async fn list(&self) -> Result<Vec<ApplicantRecord>, ApplicantError>;

    async fn get(&self, id: ApplicantId) -> Result<ApplicantRecord, ApplicantError>;

    /// Creates an applicant with its photo and a zeroed score.
    ///
    /// # Errors
    ///
    /// - [`ApplicantError::Validation`] for a bad `user_id` or a missing,
    ///   oversized or non-image photo. Nothing is written.
    /// - [`ApplicantError::UnknownUser`] when `user_id` has no account.
    /// - [`ApplicantError::Upload`] when the blob store rejects the photo.
    ///   Nothing is written.
    /// - [`ApplicantError::Persistence`] when the transaction fails. The
    ///   uploaded photo is removed again.
    async fn enroll(&self, request: EnrollmentRequest) -> Result<ApplicantRecord, ApplicantError>;

    async fn update(
        &self,
        id: ApplicantId,
        changes: ApplicantUpdate,
    ) -> Result<ApplicantRecord, ApplicantError>;

    /// Deletes the applicant and its scores, then the stored photo.
    async fn delete(&self, id: ApplicantId) -> Result<(), ApplicantError>;
}
