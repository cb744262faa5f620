//! `SeaORM` implementation of the `ApplicantService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::clients::storage::BlobStore;
use crate::db::{ApplicantChanges, Store};
use crate::domain::ApplicantId;
use crate::models::applicant::{EnrollmentRequest, NewApplicant, PhotoUpload, parse_birth_date};
use crate::services::applicant_service::{
    ApplicantError, ApplicantRecord, ApplicantService, ApplicantUpdate,
};

pub struct SeaOrmApplicantService {
    store: Store,
    blobs: Arc<dyn BlobStore>,
    max_upload_bytes: usize,
}

impl SeaOrmApplicantService {
    #[must_use]
    pub fn new(store: Store, blobs: Arc<dyn BlobStore>, max_upload_bytes: usize) -> Self {
        Self {
            store,
            blobs,
            max_upload_bytes,
        }
    }

    async fn ensure_user_exists(&self, user_id: i32) -> Result<(), ApplicantError> {
        if self.store.user_repo().get_by_id(user_id).await?.is_none() {
            return Err(ApplicantError::UnknownUser(user_id));
        }
        Ok(())
    }

    /// Returns the photo and its MIME type.
    fn check_photo(&self, photo: Option<PhotoUpload>) -> Result<(PhotoUpload, String), ApplicantError> {
        let Some(photo) = photo.filter(|p| !p.bytes.is_empty()) else {
            return Err(ApplicantError::Validation("Image upload failed".to_string()));
        };

        if photo.bytes.len() > self.max_upload_bytes {
            return Err(ApplicantError::Validation(format!(
                "Image upload failed: file exceeds {} bytes",
                self.max_upload_bytes
            )));
        }

        let mime = photo
            .mime_type()
            .filter(|m| m.starts_with("image/"))
            .ok_or_else(|| {
                ApplicantError::Validation("Image upload failed: file is not an image".to_string())
            })?;

        Ok((photo, mime))
    }

    async fn discard_blob(&self, object: &str) {
        if let Err(e) = self.blobs.delete(object).await {
            warn!("Failed to remove photo {}: {}", object, e);
        }
    }
}

pub(crate) fn parse_user_id(raw: Option<&str>) -> Result<i32, ApplicantError> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<u32>().ok())
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(|| ApplicantError::Validation("Invalid user_id".to_string()))
}

#[async_trait]
impl ApplicantService for SeaOrmApplicantService {
    async fn list(&self) -> Result<Vec<ApplicantRecord>, ApplicantError> {
        let rows = self.store.applicant_repo().list_with_scores().await?;
        Ok(rows.into_iter().map(ApplicantRecord::from).collect())
    }

    async fn get(&self, id: ApplicantId) -> Result<ApplicantRecord, ApplicantError> {
        self.store
            .applicant_repo()
            .get_with_scores(id.value())
            .await?
            .map(ApplicantRecord::from)
            .ok_or(ApplicantError::NotFound(id))
    }

    async fn enroll(&self, request: EnrollmentRequest) -> Result<ApplicantRecord, ApplicantError> {
        let user_id = parse_user_id(request.user_id.as_deref())?;
        let tanggal_lahir = request.tanggal_lahir.as_deref().and_then(parse_birth_date);
        let (photo, mime) = self.check_photo(request.photo)?;
        self.ensure_user_exists(user_id).await?;

        let object = Uuid::new_v4().to_string();
        if let Err(e) = self.blobs.put(&object, &mime, photo.bytes).await {
            error!("Photo upload for user {} failed: {}", user_id, e);
            metrics::counter!("ppdb_enrollments_total", "outcome" => "upload_failed").increment(1);
            return Err(e.into());
        }
        let pas_foto = self.blobs.public_url(&object);

        let input = NewApplicant {
            user_id,
            tanggal_lahir,
            fields: request.fields,
            pas_foto,
        };

        match self.store.applicant_repo().create_with_score(input).await {
            Ok(created) => {
                info!("Enrolled applicant {} for user {}", created.0.id, user_id);
                metrics::counter!("ppdb_enrollments_total", "outcome" => "created").increment(1);
                Ok(ApplicantRecord::from(created))
            }
            Err(e) => {
                error!("Enrollment transaction failed, removing photo {}: {:#}", object, e);
                self.discard_blob(&object).await;
                metrics::counter!("ppdb_enrollments_total", "outcome" => "db_failed").increment(1);
                Err(ApplicantError::Persistence(e.to_string()))
            }
        }
    }

    async fn update(
        &self,
        id: ApplicantId,
        changes: ApplicantUpdate,
    ) -> Result<ApplicantRecord, ApplicantError> {
        if let Some(user_id) = changes.user_id {
            self.ensure_user_exists(user_id).await?;
        }

        let tanggal_lahir = changes.tanggal_lahir.and_then(|raw| {
            if raw.trim().is_empty() {
                Some(None)
            } else {
                parse_birth_date(&raw).map(Some)
            }
        });

        let changes = ApplicantChanges {
            user_id: changes.user_id,
            email: changes.email,
            nama_lengkap: changes.nama_lengkap,
            nisn: changes.nisn,
            jenis_kelamin: changes.jenis_kelamin,
            tempat_lahir: changes.tempat_lahir,
            tanggal_lahir,
            asal_sekolah: changes.asal_sekolah,
            nama_ayah: changes.nama_ayah,
            no_wa_ayah: changes.no_wa_ayah,
            nama_ibu: changes.nama_ibu,
            no_wa_ibu: changes.no_wa_ibu,
            pas_foto: None,
        };

        self.store
            .applicant_repo()
            .update(id.value(), changes)
            .await?
            .map(ApplicantRecord::from)
            .ok_or(ApplicantError::NotFound(id))
    }

    async fn delete(&self, id: ApplicantId) -> Result<(), ApplicantError> {
        let removed = self
            .store
            .applicant_repo()
            .delete(id.value())
            .await?
            .ok_or(ApplicantError::NotFound(id))?;

        if let Some(object) = self.blobs.object_from_url(&removed.pas_foto) {
            self.discard_blob(&object).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_must_be_unsigned_integer() {
        assert_eq!(parse_user_id(Some("1")).unwrap(), 1);
        assert_eq!(parse_user_id(Some(" 42 ")).unwrap(), 42);
        assert!(parse_user_id(None).is_err());
        assert!(parse_user_id(Some("")).is_err());
        assert!(parse_user_id(Some("-1")).is_err());
        assert!(parse_user_id(Some("abc")).is_err());
        assert!(parse_user_id(Some("4294967295")).is_err());
    }
}
