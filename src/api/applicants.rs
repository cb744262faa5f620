use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::Field},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::extract::{ApiJson, ApiMultipart};
use super::validation::parse_id;
use super::{ApiError, ApiResponse, AppState};
use crate::domain::ApplicantId;
use crate::models::applicant::{ApplicantFields, EnrollmentRequest, PhotoUpload};
use crate::services::{ApplicantRecord, ApplicantUpdate};

/// Optional `datapokok` JSON part carrying the same keys as the form fields.
#[derive(Debug, Default, Deserialize)]
struct DatapokokPart {
    #[serde(default)]
    user_id: Option<serde_json::Value>,
    #[serde(default)]
    tanggal_lahir: Option<String>,
    #[serde(flatten)]
    fields: ApplicantFields,
}

/// Multipart parts collected in arrival order. Individual fields win over
/// the `datapokok` JSON part regardless of which came first.
#[derive(Debug, Default)]
struct EnrollmentForm {
    base: Option<DatapokokPart>,
    user_id: Option<String>,
    tanggal_lahir: Option<String>,
    overrides: Vec<(String, String)>,
    photo: Option<PhotoUpload>,
}

impl EnrollmentForm {
    fn into_request(self) -> EnrollmentRequest {
        let base = self.base.unwrap_or_default();
        let mut fields = base.fields;
        for (name, value) in self.overrides {
            fields.set(&name, value);
        }

        let base_user_id = base.user_id.map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });

        EnrollmentRequest {
            user_id: self.user_id.or(base_user_id),
            tanggal_lahir: self.tanggal_lahir.or(base.tanggal_lahir),
            fields,
            photo: self.photo,
        }
    }
}

async fn read_photo(mut field: Field<'_>, max_bytes: usize) -> Result<PhotoUpload, ApiError> {
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);

    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::validation(format!("Failed to read pas_foto: {e}")))?
    {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(ApiError::validation(format!(
                "Image upload failed: file exceeds {max_bytes} bytes"
            )));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(PhotoUpload {
        file_name,
        content_type,
        bytes,
    })
}

async fn read_form(mut multipart: Multipart, max_bytes: usize) -> Result<EnrollmentForm, ApiError> {
    let mut form = EnrollmentForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Failed to read field: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "pas_foto" {
            form.photo = Some(read_photo(field, max_bytes).await?);
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| ApiError::validation(format!("Invalid field {name}: {e}")))?;

        match name.as_str() {
            "user_id" => form.user_id = Some(text),
            "tanggal_lahir" => form.tanggal_lahir = Some(text),
            "datapokok" => {
                let part = serde_json::from_str(&text).map_err(|e| {
                    ApiError::validation(format!("Invalid datapokok JSON: {e}"))
                })?;
                form.base = Some(part);
            }
            // Scores always start at zero; the part is accepted and dropped.
            "nilai" => debug!("Ignoring nilai part on enrollment"),
            _ => form.overrides.push((name, text)),
        }
    }

    Ok(form)
}

/// GET /datapokok
pub async fn list_applicants(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ApplicantRecord>>>, ApiError> {
    let applicants = state.shared.applicant_service.list().await?;
    Ok(Json(ApiResponse::success("Success get datapokok", applicants)))
}

/// GET /datapokok/{id}
pub async fn get_applicant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ApplicantRecord>>, ApiError> {
    let id = ApplicantId::new(parse_id(&id)?);
    let applicant = state.shared.applicant_service.get(id).await?;
    Ok(Json(ApiResponse::success("Success get datapokok", applicant)))
}

/// POST /datapokok (multipart)
pub async fn create_applicant(
    State(state): State<Arc<AppState>>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<(StatusCode, Json<ApiResponse<ApplicantRecord>>), ApiError> {
    let max_bytes = state.config().storage.max_upload_bytes;
    let request = read_form(multipart, max_bytes).await?.into_request();

    let applicant = state.shared.applicant_service.enroll(request).await?;
    info!("Created datapokok {}", applicant.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Success create datapokok", applicant)),
    ))
}

/// PUT /datapokok/{id}
pub async fn update_applicant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ApplicantUpdate>,
) -> Result<Json<ApiResponse<ApplicantRecord>>, ApiError> {
    let id = ApplicantId::new(parse_id(&id)?);
    let applicant = state.shared.applicant_service.update(id, payload).await?;
    Ok(Json(ApiResponse::success("Success update datapokok", applicant)))
}

/// DELETE /datapokok/{id}
pub async fn delete_applicant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = ApplicantId::new(parse_id(&id)?);
    state.shared.applicant_service.delete(id).await?;
    Ok(Json(ApiResponse::message("Success delete datapokok")))
}
